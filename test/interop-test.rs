// Tests the interop of survey data and built surfaces with the text and drawing formats
use topotin::io::*;
use topotin::*;

fn same(p1: Point3, p2: Point3) -> bool {
    p1.sub(p2).mag() < 1e-9
}

fn do_round_trip_test<T, D, S, Ed>(data: &[u8], deserialize: D, serialize: S)
where
    D: Fn(&[u8]) -> Result<T, Ed>,
    S: Fn(&T) -> Vec<u8>,
    Ed: std::fmt::Debug,
    T: PartialEq + std::fmt::Debug,
{
    let i = deserialize(data).unwrap();
    let ser = serialize(&i);
    let de = deserialize(&ser).unwrap();
    assert_eq!(i, de);
}

// A small pad with a ridge along points 2-5-8.
const POINTS: &str = "\
Point,Northing,Easting,Elevation,Description
1,5000,1000,10,GROUND
2,5000,1010,12,RIDGE
3,5000,1020,10,GROUND
4,5010,1000,11,GROUND
5,5010,1010,13.5,RIDGE
6,5010,1020,11,GROUND
7,5020,1000,10.5,GROUND
8,5020,1010,12.5,RIDGE
9,5020,1020,10,GROUND
10,5011,1012,99,\"MANHOLE, LID\"
";

const CRITERIA: &str = "\
,,,,,1
,,,,MANHOLE,0
";

const BREAKLINES: &str = "\
# ridge
2-5-8
";

fn survey() -> BuildInput {
    let mut points = PointStore::default();
    let skipped = pnezd::from_pnezd(
        POINTS.as_bytes(),
        pnezd::Columns::Pnezd,
        &mut points,
        false,
    )
    .unwrap();
    assert!(skipped.is_empty());

    let (criteria, skipped) = criteria::from_criteria(CRITERIA.as_bytes()).unwrap();
    assert!(skipped.is_empty());

    let (breaklines, skipped) = breaklines::from_breaklines(BREAKLINES.as_bytes()).unwrap();
    assert!(skipped.is_empty());

    BuildInput {
        points,
        criteria,
        breaklines,
    }
}

#[test]
fn survey_files_build_a_surface() {
    let input = survey();
    assert_eq!(input.points.len(), 10);
    let s = build(input, &BuildConfig::default(), &Monitor::new()).unwrap();

    // the manhole is not topographic
    assert_eq!(s.tin.vertices().count(), 9);
    assert!(!s.tin.contains_vertex(9));

    let ridge = s.breaklines();
    assert_eq!(ridge.len(), 1);
    let mut numbers = ridge[0].numbers().to_vec();
    if numbers[0] == 8 {
        numbers.reverse();
    }
    assert_eq!(numbers, vec![2, 5, 8]);

    assert!(!s.rough.is_empty());
    assert_eq!(s.rough.len(), s.smooth.len());
}

#[test]
fn pnezd_round_trip() {
    let read = |data: &[u8]| {
        let mut s = PointStore::default();
        pnezd::from_pnezd(data, pnezd::Columns::Pnezd, &mut s, false).map(|_| s)
    };
    do_round_trip_test(POINTS.as_bytes(), read, |s| {
        pnezd::to_pnezd(s, pnezd::Columns::Pnezd)
    });

    let read = |data: &[u8]| {
        let mut s = PointStore::default();
        pnezd::from_pnezd(data, pnezd::Columns::Penzd, &mut s, false).map(|_| s)
    };
    do_round_trip_test(POINTS.as_bytes(), read, |s| {
        pnezd::to_pnezd(s, pnezd::Columns::Penzd)
    });
}

#[test]
fn criteria_and_breaklines_round_trip() {
    do_round_trip_test(
        CRITERIA.as_bytes(),
        |d| criteria::from_criteria(d).map(|(c, _)| c),
        criteria::to_criteria,
    );
    do_round_trip_test(
        b"1-2-3\n4-5-6-4\n",
        |d| breaklines::from_breaklines(d).map(|(b, _)| b),
        |b| breaklines::to_breaklines(b),
    );
}

#[test]
fn tin_text_round_trip() {
    let s = build(survey(), &BuildConfig::default(), &Monitor::new()).unwrap();
    let text = tintext::to_tin_text("pad", &s.points, &s.tin);

    let f = tintext::from_tin_text(&text).unwrap();
    assert_eq!(f.name, "pad");
    assert_eq!(f.points.len(), 9);
    assert_eq!(f.tin.len(), s.tin.len());
    assert!(f.tin.is_consistent(&f.points));
    for (a, b) in f.tin.tris(&f.points).zip(s.tris()) {
        assert!(a.iter().zip(b).all(|(p, q)| same(*p, q)));
    }

    do_round_trip_test(&text, tintext::from_tin_text, |f| {
        tintext::to_tin_text(&f.name, &f.points, &f.tin)
    });
}

#[test]
fn drawing_export() {
    let s = build(survey(), &BuildConfig::default(), &Monitor::new()).unwrap();
    let dxf = drawing::to_dxf(&s).unwrap();

    let faces = drawing::faces_from_dxf(&dxf).unwrap();
    assert_eq!(faces.len(), s.tin.len());
    for (a, b) in faces.iter().zip(s.tris()) {
        assert!(a.iter().zip(b).all(|(p, q)| same(*p, q)));
    }

    let ridge = drawing::polylines_from_dxf(&dxf, drawing::BREAKLINE_LAYER).unwrap();
    assert_eq!(ridge.len(), 1);
    assert_eq!(ridge[0].len(), 3);

    let contours = drawing::polylines_from_dxf(&dxf, drawing::CONTOUR_LAYER).unwrap();
    assert_eq!(contours.len(), s.smooth.len());
}
