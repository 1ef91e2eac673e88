use crate::tin::ord_edge;
use crate::*;
use rayon::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ContourKind {
    /// Polyline through the edge crossings.
    Rough,
    /// Cubic Bezier control points, `p0 c c p1 c c p2 ...`.
    Smooth,
}

/// A line of constant elevation.
///
/// Contours run with the higher ground on their left. A closed contour repeats its first
/// point.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Contour {
    pub elevation: f64,
    pub closed: bool,
    pub kind: ContourKind,
    pub points: Vec<Point3>,
}

impl Contour {
    /// The points the contour passes through; every third control point of a smooth
    /// contour.
    pub fn knots(&self) -> impl Iterator<Item = Point3> + '_ {
        let step = match self.kind {
            ContourKind::Rough => 1,
            ContourKind::Smooth => 3,
        };
        self.points.iter().copied().step_by(step)
    }

    /// Plan length of the polyline through the knots.
    pub fn len_xy(&self) -> f64 {
        let k = self.knots().collect::<Vec<_>>();
        k.windows(2).map(|w| len_xy(w[0], w[1])).sum()
    }
}

/// The contour levels in `lo..=hi`: each multiple of the `interval`, and the `extra` levels.
/// Sorted, without repeats.
pub fn contour_levels(interval: ContourInterval, extra: &[f64], lo: f64, hi: f64) -> Vec<f64> {
    let mut levels = Vec::new();
    if let ContourInterval::Every(i) = interval {
        if i > 0.0 && i.is_finite() && lo <= hi {
            let start = (lo / i).ceil() as i64;
            let end = (hi / i).floor() as i64;
            levels.extend((start..=end).map(|k| k as f64 * i));
        }
    }
    levels.extend(extra.iter().copied().filter(|l| (lo..=hi).contains(l)));
    levels.sort_unstable_by(f64::total_cmp);
    levels.dedup();
    levels
}

type EdgeKey = (u32, u32);

struct Face {
    minz: f64,
    maxz: f64,
    t: u32,
}

impl Tin {
    /// Traces the contours at `levels`, in parallel, returned in level order.
    ///
    /// A level within `epsilon` of a vertex elevation is traced slightly higher (see
    /// [`Tin::contour`]).
    ///
    /// # Errors
    /// [`TinError::Cancelled`] if the build is cancelled.
    pub fn contours(
        &self,
        store: &PointStore,
        levels: &[f64],
        epsilon: f64,
        monitor: &Monitor,
    ) -> Result<Vec<Contour>> {
        let faces = self.faces(store);
        let zs = self.vertices().map(|v| store.z(v)).collect::<Vec<_>>();

        let per_level = levels
            .par_iter()
            .map(|&level| {
                let c = trace(self, store, &faces, &zs, level, epsilon, monitor);
                monitor.advance(1);
                c
            })
            .collect::<Result<Vec<_>>>()?;

        let contours = per_level.into_iter().flatten().collect::<Vec<_>>();
        log::debug!(
            "traced {} contours over {} levels",
            contours.len(),
            levels.len()
        );
        Ok(contours)
    }

    /// Traces the contours at `level`.
    ///
    /// A level within `epsilon` of any vertex elevation is nudged up by `epsilon` (repeatedly
    /// if needed) so no contour passes through a vertex. The contours still report `level`.
    pub fn contour(&self, store: &PointStore, level: f64, epsilon: f64) -> Vec<Contour> {
        let zs = self.vertices().map(|v| store.z(v)).collect::<Vec<_>>();
        trace(
            self,
            store,
            &self.faces(store),
            &zs,
            level,
            epsilon,
            &Monitor::new(),
        )
        .unwrap_or_default()
    }

    /// Triangles sorted by their lowest elevation.
    fn faces(&self, store: &PointStore) -> Vec<Face> {
        let mut faces = self
            .triangles
            .iter()
            .enumerate()
            .map(|(t, tri)| {
                let [a, b, c] = tri.v.map(|p| store.z(p));
                Face {
                    minz: a.min(b).min(c),
                    maxz: a.max(b).max(c),
                    t: t as u32,
                }
            })
            .collect::<Vec<_>>();
        faces.sort_unstable_by(|a, b| a.minz.total_cmp(&b.minz).then(a.t.cmp(&b.t)));
        faces
    }
}

fn nudge(zs: &[f64], level: f64, epsilon: f64) -> f64 {
    if !(epsilon > 0.0) {
        return level;
    }
    let mut l = level;
    // each vertex can hold the level back at most three steps
    for _ in 0..=zs.len() * 3 {
        if !zs.iter().any(|z| (z - l).abs() <= epsilon) {
            break;
        }
        l += epsilon;
    }
    l
}

/// **Assumes `faces` is sorted by minimum z.**
fn trace(
    tin: &Tin,
    store: &PointStore,
    faces: &[Face],
    zs: &[f64],
    level: f64,
    epsilon: f64,
    monitor: &Monitor,
) -> Result<Vec<Contour>> {
    let l = nudge(zs, level, epsilon);

    // faces past here are wholly above the level
    let k = faces.partition_point(|f| f.minz < l);

    let mut next: HashMap<EdgeKey, EdgeKey> = HashMap::default();
    let mut points: HashMap<EdgeKey, Point3> = HashMap::default();

    for f in faces[..k].iter().filter(|f| l <= f.maxz) {
        monitor.checkpoint()?;

        let tri = tin.triangle(f.t);
        let above = tri.v.map(|p| store.z(p) >= l);
        // the vertex alone on its side of the level
        let Some(s) = (0..3).find(|&i| above[i] != above[(i + 1) % 3] && above[i] != above[(i + 2) % 3])
        else {
            continue;
        };

        let v = tri.v[s];
        let (n1, n2) = tri.edge(s);
        let (e1, e2) = (ord_edge(v, n1), ord_edge(v, n2));
        for e in [e1, e2] {
            points
                .entry(e)
                .or_insert_with(|| point_at_level(store, e, l, level));
        }
        // higher ground on the left
        if above[s] {
            next.insert(e1, e2);
        } else {
            next.insert(e2, e1);
        }
    }

    Ok(chain(&next, &points, level))
}

/// The crossing of edge `(i, j)` with level `l`, reported at `level`.
fn point_at_level(store: &PointStore, (i, j): EdgeKey, l: f64, level: f64) -> Point3 {
    let (p1, p2) = (store.xyz(i), store.xyz(j));
    let v = p2.sub(p1);
    let r = (l - p1[2]) / v[2];
    p1.add(v.scale(r)).with_z(level)
}

/// Links the segments into maximal runs: open runs from their start on the hull first, then
/// closed loops.
fn chain(
    next: &HashMap<EdgeKey, EdgeKey>,
    points: &HashMap<EdgeKey, Point3>,
    level: f64,
) -> Vec<Contour> {
    let ends = next.values().copied().collect::<HashSet<_>>();
    let mut starts = next
        .keys()
        .filter(|k| !ends.contains(k))
        .copied()
        .collect::<Vec<_>>();
    starts.sort_unstable();
    let mut rest = next.keys().copied().collect::<Vec<_>>();
    rest.sort_unstable();

    let mut used = HashSet::default();
    let mut contours = Vec::new();

    for s in starts.into_iter().chain(rest) {
        if !used.insert(s) {
            continue;
        }

        let mut pts = vec![points[&s]];
        let mut closed = false;
        let mut k = s;
        while let Some(&n) = next.get(&k) {
            pts.push(points[&n]);
            if n == s {
                closed = true;
                break;
            }
            if !used.insert(n) {
                break;
            }
            k = n;
        }

        contours.push(Contour {
            elevation: level,
            closed,
            kind: ContourKind::Rough,
            points: pts,
        });
    }

    contours
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(pts: &[Point3]) -> PointStore {
        let mut s = PointStore::default();
        for (i, &p) in pts.iter().enumerate() {
            s.add(i as i32 + 1, p.to_p2(), p[2], "", false).unwrap();
        }
        s
    }

    fn delaunay(s: &PointStore) -> Tin {
        let all = (0..s.len() as u32).collect::<Vec<_>>();
        let mut tin = Tin::sweep_hull(s, &all, 1e-9, &Monitor::new()).unwrap();
        tin.legalize_all(s, &BuildConfig::default(), &Monitor::new())
            .unwrap();
        tin
    }

    #[test]
    fn levels() {
        assert_eq!(
            contour_levels(ContourInterval::Every(2.0), &[3.3, 50.0, 4.0], 1.0, 7.0),
            vec![2.0, 3.3, 4.0, 6.0]
        );
        assert_eq!(
            contour_levels(ContourInterval::Every(1.0), &[], -1.5, 0.5),
            vec![-1.0, 0.0]
        );
        assert_eq!(
            contour_levels(ContourInterval::None, &[3.0], 1.0, 7.0),
            vec![3.0]
        );
        assert!(contour_levels(ContourInterval::Every(0.0), &[], 1.0, 7.0).is_empty());
    }

    #[test]
    fn ring_around_a_peak() {
        let s = store(&[
            [0.0, 0.0, 0.0],
            [10.0, 0.0, 0.0],
            [10.0, 10.0, 0.0],
            [0.0, 10.0, 0.0],
            [5.0, 5.0, 10.0],
        ]);
        let tin = delaunay(&s);
        let cs = tin.contour(&s, 5.0, 1e-6);
        assert_eq!(cs.len(), 1);

        let c = &cs[0];
        assert!(c.closed);
        assert_eq!(c.kind, ContourKind::Rough);
        assert_eq!(c.points.len(), 5);
        assert_eq!(c.points.first(), c.points.last());
        assert!(c.points.iter().all(|p| p[2] == 5.0));
        // counter-clockwise around the peak, so the peak is on the left
        let ring = Polygon2::new(c.points[..4].iter().map(|p| p.to_p2())).unwrap();
        assert_eq!(ring.signed_area(), 25.0);
        assert_eq!(c.len_xy(), 20.0);
    }

    #[test]
    fn open_across_a_slope() {
        // z = x
        let mut pts = Vec::new();
        for y in 0..3 {
            for x in 0..3 {
                pts.push([x as f64, y as f64, x as f64]);
            }
        }
        let s = store(&pts);
        let tin = delaunay(&s);

        let cs = tin.contour(&s, 0.5, 1e-6);
        assert_eq!(cs.len(), 1);
        let c = &cs[0];
        assert!(!c.closed);
        assert!(c.points.iter().all(|p| (p[0] - 0.5).abs() < 1e-12));
        // running south keeps the higher ground, east, on the left
        assert_eq!(c.points.first().map(|p| p[1]), Some(2.0));
        assert_eq!(c.points.last().map(|p| p[1]), Some(0.0));

        // level on the vertices is nudged, but reported as asked
        let cs = tin.contour(&s, 1.0, 1e-6);
        assert_eq!(cs.len(), 1);
        assert!(cs[0].points.iter().all(|p| p[2] == 1.0));
        assert!(cs[0].points.iter().all(|p| (p[0] - 1.0).abs() < 1e-5));
    }

    #[test]
    fn flat_has_no_contours() {
        let s = store(&[
            [0.0, 0.0, 100.0],
            [10.0, 0.0, 100.0],
            [10.0, 10.0, 100.0],
            [3.0, 7.0, 100.0],
        ]);
        let tin = delaunay(&s);
        for interval in [0.1, 1.0, 5.0] {
            let levels = contour_levels(ContourInterval::Every(interval), &[], 100.0, 100.0);
            let cs = tin
                .contours(&s, &levels, 1e-6, &Monitor::new())
                .unwrap();
            assert!(cs.is_empty());
        }
    }

    #[test]
    fn mound_contours() {
        let s = dummy_store();
        let tin = delaunay(&s);
        let levels = contour_levels(ContourInterval::Every(1.0), &[], 87.5, 99.5);
        assert_eq!(levels.len(), 12);

        let cs = tin.contours(&s, &levels, 1e-6, &Monitor::new()).unwrap();
        assert!(!cs.is_empty());
        // level order
        assert!(cs.windows(2).all(|w| w[0].elevation <= w[1].elevation));

        let hull = tin
            .hull()
            .iter()
            .map(|&i| s.xy(i))
            .collect::<Vec<_>>();
        let on_hull = |p: Point3| {
            (0..hull.len()).any(|i| {
                Segment2::new(hull[i], hull[(i + 1) % hull.len()]).distance_to(p) < 1e-9
            })
        };

        for c in &cs {
            if c.closed {
                assert_eq!(c.points.first(), c.points.last());
            } else {
                assert!(on_hull(c.points[0]));
                assert!(on_hull(c.points[c.points.len() - 1]));
            }

            // just left of each segment is higher
            for w in c.points.windows(2) {
                let d = w[1].sub(w[0]);
                let mid = w[0].add(d.scale(0.5));
                let left = [-d[1], d[0]];
                let off = left.scale(1e-4 / left.mag());
                let z = tin.elevation_at(&s, mid.to_p2().add(off)).unwrap();
                assert!(z > c.elevation, "{} <= {}", z, c.elevation);
            }
        }

        // the top level only rings the peak
        let top = cs.iter().filter(|c| c.elevation == 99.0).collect::<Vec<_>>();
        assert_eq!(top.len(), 1);
        assert!(top[0].closed);
    }

    #[test]
    fn cancelled_tracing() {
        let s = dummy_store();
        let tin = delaunay(&s);
        let m = Monitor::new();
        m.cancel();
        assert_eq!(
            tin.contours(&s, &[95.0], 1e-6, &m),
            Err(TinError::Cancelled)
        );
    }
}
