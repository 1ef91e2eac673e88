use super::*;

/// An ordered run of 3D points.
///
/// A closed polyline repeats its first point at the end.
#[derive(Clone, Debug, PartialEq)]
pub struct Polyline3(Vec<Point3>);

impl Polyline3 {
    pub fn new<I>(points: I) -> Result<Self, &'static str>
    where
        I: IntoIterator<Item = Point3>,
    {
        let points = points.into_iter().collect::<Vec<_>>();
        if points.len() < 2 {
            Err("polyline requires 2 or more points to be valid")
        } else {
            Ok(Polyline3(points))
        }
    }

    pub fn pts(&self) -> &[Point3] {
        &self.0
    }

    pub fn is_closed(&self) -> bool {
        self.0.first() == self.0.last()
    }

    /// Plan length.
    pub fn len_xy(&self) -> f64 {
        self.0.windows(2).map(|w| len_xy(w[0], w[1])).sum()
    }

    /// Douglas-Peucker simplification in plan.
    ///
    /// Every removed point is within `tolerance` of the simplified line. End points are always
    /// kept, so a closed polyline stays closed.
    pub fn simplify(&self, tolerance: f64) -> Self {
        if tolerance <= 0.0 || self.0.len() < 3 {
            return self.clone();
        }

        let mut keep = vec![false; self.0.len()];
        keep[0] = true;
        if let Some(k) = keep.last_mut() {
            *k = true;
        }

        if self.is_closed() {
            // a closed loop has a zero length chord, split at the farthest point first
            let far = (1..self.0.len() - 1)
                .max_by(|&a, &b| {
                    len_xy(self.0[0], self.0[a]).total_cmp(&len_xy(self.0[0], self.0[b]))
                })
                .unwrap_or(1);
            keep[far] = true;
            dp(&self.0, 0, far, tolerance, &mut keep);
            dp(&self.0, far, self.0.len() - 1, tolerance, &mut keep);
        } else {
            dp(&self.0, 0, self.0.len() - 1, tolerance, &mut keep);
        }

        Polyline3(
            self.0
                .iter()
                .zip(keep)
                .filter_map(|(p, k)| k.then_some(*p))
                .collect(),
        )
    }
}

fn dp(pts: &[Point3], start: usize, end: usize, tolerance: f64, keep: &mut [bool]) {
    if end <= start + 1 {
        return;
    }

    let seg = Segment2::new(pts[start], pts[end]);
    let (i, d) = (start + 1..end)
        .map(|i| (i, seg.distance_to(pts[i])))
        .fold((start, 0.0), |a, b| if b.1 > a.1 { b } else { a });

    if d > tolerance {
        keep[i] = true;
        dp(pts, start, i, tolerance, keep);
        dp(pts, i, end, tolerance, keep);
    }
}

impl IntoIterator for Polyline3 {
    type Item = Point3;
    type IntoIter = std::vec::IntoIter<Self::Item>;
    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
