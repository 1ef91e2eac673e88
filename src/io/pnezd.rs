//! Point files: one `number,northing,easting,elevation,description` record per line.
use super::*;

/// The column order of a point file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Columns {
    /// Point, northing, easting, elevation, description.
    #[default]
    Pnezd,
    /// Point, easting, northing, elevation, description.
    Penzd,
}

/// Reads a point file into `store`.
///
/// A header line (one whose elevation column reads `z` or `Elevation`), blank lines and a
/// trailing end-of-file character are skipped. Existing point numbers are overwritten when
/// `overwrite` is set, otherwise the new point is renumbered (see [`PointStore::add`]).
///
/// Returns the records that were skipped: [`TinError::BadPointRecord`] for a malformed line
/// and [`TinError::InvalidPoint`] for a non-finite coordinate.
///
/// # Errors
/// If the text is not UTF-8.
pub fn from_pnezd(
    text: &[u8],
    columns: Columns,
    store: &mut PointStore,
    overwrite: bool,
) -> Result<Vec<TinError>> {
    let mut skipped = Vec::new();
    let mut added = 0;

    for (n, line) in lines(text)? {
        if is_filler(line) {
            continue;
        }

        let bad = || TinError::BadPointRecord {
            line: n,
            text: line.to_string(),
        };
        let Some(fields) = csv::parse_line(line).filter(|f| f.len() == 5) else {
            log::warn!("ignored line {}: {}", n, line);
            skipped.push(bad());
            continue;
        };

        if fields[3] == "z" || fields[3] == "Elevation" {
            log::debug!("skipped header on line {}", n);
            continue;
        }

        let Some((number, pos, z)) = parse_record(&fields, columns) else {
            log::warn!("bad point record on line {}: {}", n, line);
            skipped.push(bad());
            continue;
        };

        match store.add(number, pos, z, &fields[4], overwrite) {
            Ok(_) => added += 1,
            Err(e) => skipped.push(e),
        }
    }

    log::info!("read {} points, skipped {} records", added, skipped.len());
    Ok(skipped)
}

fn parse_record(fields: &[String], columns: Columns) -> Option<(i32, Point2, f64)> {
    let number = fields[0].parse().ok()?;
    let a = fields[1].parse::<f64>().ok()?;
    let b = fields[2].parse::<f64>().ok()?;
    let z = fields[3].parse().ok()?;
    let pos = match columns {
        Columns::Pnezd => [b, a],
        Columns::Penzd => [a, b],
    };
    Some((number, pos, z))
}

/// Writes every point of the store, in store order.
pub fn to_pnezd(store: &PointStore, columns: Columns) -> Vec<u8> {
    let mut out = String::new();
    for p in store.iter() {
        let [e, n] = p.pos;
        let (a, b) = match columns {
            Columns::Pnezd => (n, e),
            Columns::Penzd => (e, n),
        };
        let fields = [
            p.number.to_string(),
            a.to_string(),
            b.to_string(),
            p.z.to_string(),
            p.description.clone(),
        ];
        out.push_str(&csv::make_line(&fields));
        out.push('\n');
    }
    out.into_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;

    const FILE: &str = "\
Point,Northing,Easting,Elevation,Description
1,2000.5,1000.25,99.5,\"IP, found\"
2,2010,1000,100,TREE
oops
3,2000,abc,100,
4,2005,1005,NaN,BAD

\u{1a}
";

    #[test]
    fn reading() {
        let mut s = PointStore::default();
        let skipped = from_pnezd(FILE.as_bytes(), Columns::Pnezd, &mut s, false).unwrap();
        assert_eq!(s.len(), 2);

        let p = s.get(0).unwrap();
        assert_eq!(p.number, 1);
        assert_eq!(p.pos, [1000.25, 2000.5]);
        assert_eq!(p.z, 99.5);
        assert_eq!(p.description, "IP, found");

        assert_eq!(
            skipped,
            vec![
                TinError::BadPointRecord {
                    line: 4,
                    text: "oops".to_string()
                },
                TinError::BadPointRecord {
                    line: 5,
                    text: "3,2000,abc,100,".to_string()
                },
                TinError::InvalidPoint { number: 4 },
            ]
        );
    }

    #[test]
    fn column_orders() {
        let mut s = PointStore::default();
        from_pnezd(b"1,10,20,5,x", Columns::Penzd, &mut s, false).unwrap();
        assert_eq!(s.xy(0), [10.0, 20.0]);

        let mut s = PointStore::default();
        from_pnezd(b"1,10,20,5,x", Columns::Pnezd, &mut s, false).unwrap();
        assert_eq!(s.xy(0), [20.0, 10.0]);

        // a header using z
        let mut s = PointStore::default();
        let skipped =
            from_pnezd(b"p,e,n,z,d\n1,10,20,5,x", Columns::Penzd, &mut s, false).unwrap();
        assert!(skipped.is_empty());
        assert_eq!(s.len(), 1);
    }

    #[test]
    fn repeated_numbers() {
        let text = b"1,0,0,1,a\n1,5,5,2,b\n";

        let mut s = PointStore::default();
        from_pnezd(text, Columns::Pnezd, &mut s, false).unwrap();
        assert_eq!(s.len(), 2);
        assert_eq!(s.number(1), 2);

        let mut s = PointStore::default();
        from_pnezd(text, Columns::Pnezd, &mut s, true).unwrap();
        assert_eq!(s.len(), 1);
        assert_eq!(s.z(0), 2.0);
    }

    #[test]
    fn writing() {
        let mut s = PointStore::default();
        s.add(7, [1000.25, 2000.5], 99.5, "IP, found", false).unwrap();
        s.add(-1, [1.0, 2.0], 3.0, "", false).unwrap();

        let text = to_pnezd(&s, Columns::Pnezd);
        assert_eq!(
            std::str::from_utf8(&text).unwrap(),
            "7,2000.5,1000.25,99.5,\"IP, found\"\n-1,2,1,3,\n"
        );

        let mut back = PointStore::default();
        assert!(from_pnezd(&text, Columns::Pnezd, &mut back, false)
            .unwrap()
            .is_empty());
        assert_eq!(back, s);
    }
}
