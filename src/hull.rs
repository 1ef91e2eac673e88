use crate::*;

impl Tin {
    /// Sweeps the selected points left to right, building the convex hull and a triangulation
    /// of its interior.
    ///
    /// The points are sorted by x, then y, then index. Upper and lower hull chains are kept as
    /// the sweep advances; each chain vertex a new point makes non-convex is popped, emitting a
    /// triangle. The result is a valid (but not yet Delaunay) triangulation.
    ///
    /// # Errors
    /// - [`TinError::TooFewPoints`] for fewer than 3 points,
    /// - [`TinError::DuplicatePoints`] if two points are within `tolerance` in both x and y,
    /// - [`TinError::CollinearPoints`] if no triangle can be made.
    pub fn sweep_hull(
        store: &PointStore,
        indices: &[u32],
        tolerance: f64,
        monitor: &Monitor,
    ) -> Result<Tin> {
        if indices.len() < 3 {
            return Err(TinError::TooFewPoints {
                count: indices.len(),
            });
        }

        let mut sorted = indices.to_vec();
        sorted.sort_unstable_by(|&a, &b| {
            ordpt(store.xy(a), store.xy(b)).then(a.cmp(&b))
        });
        sorted.dedup();

        check_duplicates(store, &sorted, tolerance)?;

        // the leading collinear run
        let s0 = store.xy(sorted[0]);
        let s1 = store.xy(sorted[1]);
        let m = sorted[2..]
            .iter()
            .position(|&i| orient(s0, s1, store.xy(i)) != 0.0)
            .map(|k| k + 2)
            .ok_or(TinError::CollinearPoints)?;

        let run = &sorted[..m];
        let p = sorted[m];
        let side = orient(s0, store.xy(run[m - 1]), store.xy(p));

        let mut tris = Vec::with_capacity(sorted.len() * 2);
        let mut upper;
        let mut lower;
        if side > 0.0 {
            // p is above the run
            tris.extend(run.windows(2).map(|w| [w[0], w[1], p]));
            lower = run.to_vec();
            lower.push(p);
            upper = vec![run[0], p];
        } else {
            tris.extend(run.windows(2).map(|w| [w[1], w[0], p]));
            upper = run.to_vec();
            upper.push(p);
            lower = vec![run[0], p];
        }

        // p only just off a long run can still be level with one of its short pieces
        if tris.iter().any(|&[a, b, c]| orient(store.xy(a), store.xy(b), store.xy(c)) <= 0.0) {
            return Err(TinError::CollinearPoints);
        }

        monitor.advance(m + 1);
        monitor.checkpoint()?;

        for &p in &sorted[m + 1..] {
            let pt = store.xy(p);

            while upper.len() >= 2 {
                let (a, b) = (upper[upper.len() - 2], upper[upper.len() - 1]);
                if orient(store.xy(a), store.xy(b), pt) > 0.0 {
                    tris.push([a, b, p]);
                    upper.pop();
                } else {
                    break;
                }
            }
            upper.push(p);

            while lower.len() >= 2 {
                let (a, b) = (lower[lower.len() - 2], lower[lower.len() - 1]);
                if orient(store.xy(a), store.xy(b), pt) < 0.0 {
                    tris.push([a, p, b]);
                    lower.pop();
                } else {
                    break;
                }
            }
            lower.push(p);

            monitor.tick()?;
        }

        let mut hull = lower;
        hull.extend(upper.iter().rev().skip(1).take(upper.len().saturating_sub(2)));

        log::debug!(
            "swept {} points into {} triangles, {} on the hull",
            sorted.len(),
            tris.len(),
            hull.len()
        );

        let mut tin = Tin::from_triangles(store.len(), tris);
        tin.hull = hull;
        Ok(tin)
    }
}

/// **Assumes `sorted` is sorted by x.** Only the window of points within `tolerance` in x is
/// searched.
fn check_duplicates(store: &PointStore, sorted: &[u32], tolerance: f64) -> Result<()> {
    for (k, &i) in sorted.iter().enumerate() {
        let [xi, yi] = store.xy(i);
        for &j in &sorted[k + 1..] {
            let [xj, yj] = store.xy(j);
            if xj - xi > tolerance {
                break;
            }
            if (yj - yi).abs() <= tolerance {
                return Err(TinError::DuplicatePoints {
                    first: store.number(i),
                    second: store.number(j),
                });
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck::TestResult;

    fn store(pts: &[Point2]) -> PointStore {
        let mut s = PointStore::default();
        for (i, &p) in pts.iter().enumerate() {
            s.add(i as i32 + 1, p, 0.0, "", false).unwrap();
        }
        s
    }

    fn all(s: &PointStore) -> Vec<u32> {
        (0..s.len() as u32).collect()
    }

    fn sweep(s: &PointStore) -> Result<Tin> {
        Tin::sweep_hull(s, &all(s), 1e-9, &Monitor::new())
    }

    #[test]
    fn three_points() {
        let s = store(&[[0.0, 0.0], [4.0, 1.0], [1.0, 3.0]]);
        let tin = sweep(&s).unwrap();
        assert_eq!(tin.len(), 1);
        assert_eq!(tin.triangle(0).v, [2, 0, 1]);
        assert_eq!(tin.hull(), &[0, 1, 2]);
        assert!(tin.is_consistent(&s));
    }

    #[test]
    fn too_few_and_collinear() {
        let s = store(&[[0.0, 0.0], [1.0, 1.0]]);
        assert_eq!(sweep(&s), Err(TinError::TooFewPoints { count: 2 }));

        let s = store(&[[0.0, 0.0], [1.0, 1.0], [3.0, 3.0], [2.0, 2.0]]);
        assert_eq!(sweep(&s), Err(TinError::CollinearPoints));
    }

    #[test]
    fn duplicates() {
        let s = store(&[[0.0, 0.0], [5.0, 1.0], [2.0, 3.0], [5.0, 1.0]]);
        assert_eq!(
            sweep(&s),
            Err(TinError::DuplicatePoints {
                first: 2,
                second: 4
            })
        );

        // within tolerance, with a point between them in sort order
        let s = store(&[[0.0, 0.0], [5.0, 1.0], [5.0005, 0.0], [2.0, 3.0], [5.001, 1.0004]]);
        assert!(sweep(&s).is_ok());
        let r = Tin::sweep_hull(&s, &all(&s), 0.01, &Monitor::new());
        assert_eq!(
            r,
            Err(TinError::DuplicatePoints {
                first: 2,
                second: 5
            })
        );
    }

    #[test]
    fn collinear_run_is_fanned() {
        // run along the x axis, then a point above and below
        let s = store(&[
            [0.0, 0.0],
            [1.0, 0.0],
            [2.0, 0.0],
            [3.0, 0.0],
            [2.5, 2.0],
            [3.5, -2.0],
        ]);
        let tin = sweep(&s).unwrap();
        assert!(tin.is_consistent(&s));
        assert_eq!(tin.len(), 6);
        // (3,0) sits on the hull edge between the two off-run points
        assert_eq!(tin.hull(), &[0, 5, 3, 4]);
        assert_eq!(tin.len() + tin.hull().len() + 2, 2 * s.len());

        // a vertical run
        let s = store(&[[0.0, 0.0], [0.0, 1.0], [0.0, 2.0], [1.0, 1.0]]);
        let tin = sweep(&s).unwrap();
        assert!(tin.is_consistent(&s));
        assert_eq!(tin.len(), 2);
        assert_eq!(tin.hull(), &[0, 3, 2, 1]);
    }

    #[test]
    fn hull_keeps_collinear_boundary_points() {
        let s = store(&[
            [0.0, 0.0],
            [2.0, 0.0],
            [4.0, 0.0],
            [4.0, 4.0],
            [0.0, 4.0],
            [2.0, 2.1],
        ]);
        let tin = sweep(&s).unwrap();
        assert!(tin.is_consistent(&s));
        assert_eq!(tin.hull(), &[0, 1, 2, 3, 4]);
        assert_eq!(tin.outlines(), vec![tin.hull().to_vec()]);
    }

    #[test]
    fn survey_scale_collinear() {
        let line = (0..6)
            .map(|t| [512_345.1 + t as f64, 4_012_345.3 + 3.0 * t as f64])
            .collect::<Vec<_>>();
        let s = store(&line);
        assert_eq!(sweep(&s), Err(TinError::CollinearPoints));

        // one point well off the line makes a fan
        let mut pts = line;
        pts.push([512_340.1, 4_012_365.3]);
        let s = store(&pts);
        let tin = sweep(&s).unwrap();
        assert!(tin.is_consistent(&s));
        assert_eq!(tin.len(), 5);
        assert_eq!(tin.hull().len(), 7);
    }

    #[test]
    fn cancelled_sweep() {
        let s = dummy_store();
        let m = Monitor::new();
        m.cancel();
        assert_eq!(
            Tin::sweep_hull(&s, &all(&s), 1e-9, &m),
            Err(TinError::Cancelled)
        );
    }

    #[quickcheck]
    fn sweep_is_convex_and_complete(cloud: PointCloudGen) -> TestResult {
        let s = cloud.store();
        let tin = match sweep(&s) {
            Ok(t) => t,
            Err(TinError::DuplicatePoints { .. }) | Err(TinError::CollinearPoints) => {
                return TestResult::discard()
            }
            Err(e) => return TestResult::error(e.to_string()),
        };

        let hull = Polygon2::new(tin.hull().iter().map(|&i| s.xy(i))).unwrap();
        // every point used, hull is convex, euler: T = 2n - h - 2
        let used = tin.vertices().count() == s.len();
        let tris = tin.len() == 2 * s.len() - tin.hull().len() - 2;

        TestResult::from_bool(used && hull.is_convex() && tris && tin.is_consistent(&s))
    }

    #[quickcheck]
    fn survey_scale_sweep_is_convex_and_complete(cloud: PointCloudGen) -> TestResult {
        let s = cloud.survey_store();
        let tin = match sweep(&s) {
            Ok(t) => t,
            Err(TinError::DuplicatePoints { .. }) | Err(TinError::CollinearPoints) => {
                return TestResult::discard()
            }
            Err(e) => return TestResult::error(e.to_string()),
        };

        let hull = Polygon2::new(tin.hull().iter().map(|&i| s.xy(i))).unwrap();
        let used = tin.vertices().count() == s.len();
        let tris = tin.len() == 2 * s.len() - tin.hull().len() - 2;

        TestResult::from_bool(used && hull.is_convex() && tris && tin.is_consistent(&s))
    }
}
