use crate::*;

/// A closed plan polygon, such as a TIN hull or boundary loop.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Polygon2(Vec<Point2>);

impl Polygon2 {
    pub fn new<I, P>(points: I) -> Result<Self, &'static str>
    where
        I: IntoIterator<Item = P>,
        P: ToPoint2,
    {
        let points = points.into_iter().map(ToPoint2::to_p2).collect::<Vec<_>>();
        if points.len() < 3 {
            Err("polygon requires 3 or more points to be valid")
        } else {
            Ok(Polygon2(points))
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn pts(&self) -> &[Point2] {
        &self.0
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = Point2> + '_ {
        self.0.iter().copied()
    }

    fn segments(&self) -> impl Iterator<Item = (Point2, Point2)> + '_ {
        let n = self.len();
        (0..n).map(move |i| (self.0[i], self.0[(i + 1) % n]))
    }

    /// Signed plan area, positive when the points wind counter-clockwise.
    pub fn signed_area(&self) -> f64 {
        let o = self.0[0];
        self.segments()
            .map(|(a, b)| orient(o, a, b))
            .sum::<f64>()
            * 0.5
    }

    /// Returns if the polygon is convex and wound counter-clockwise.
    ///
    /// Collinear runs along an edge are allowed.
    pub fn is_convex(&self) -> bool {
        let n = self.len();
        self.signed_area() > 0.0
            && (0..n).all(|i| orient(self.0[i], self.0[(i + 1) % n], self.0[(i + 2) % n]) >= 0.0)
    }
}

impl Area for Polygon2 {
    /// 2D plan area.
    ///
    /// # Example
    /// ```rust
    /// use topotin::*;
    /// let p = Polygon2::new([
    ///     [0.0, 0.0],
    ///     [2.0, 0.0],
    ///     [2.0, 3.0],
    ///     [0.0, 3.0]
    /// ]).unwrap();
    ///
    /// assert!((p.area() - 6.0).abs() < 1e-3);
    /// ```
    fn area(&self) -> f64 {
        self.signed_area().abs()
    }
}

/// Test if a point is _inside_ a polygon, represented by a vector of points.
///
/// Uses a winding counting number test.
///
/// # Panics
/// Panics if the number of points is < 3.
pub fn point_inside<P, O>(ps: &[P], point: O) -> bool
where
    O: ToPoint2,
    for<'a> &'a P: ToPoint2,
{
    if ps.len() < 3 {
        panic!("requires at least 3 points to form a polygon");
    }

    use std::iter::*;
    // uses the counting winding number test!

    let point = point.to_p2();
    let one_off = ps.len() - 1; // shouldn't underflow since we maintain > 3 pts invariant
    let froms = &ps[..one_off];
    let tos = &ps[1..];

    let segments = froms
        .iter()
        .zip(tos.iter())
        .chain(once((&ps[one_off], &ps[0])))
        .map(|(a, b)| (a.to_p2(), b.to_p2()));

    let mut winding = 0;

    let pointy = point[1];
    for (from, to) in segments {
        let fromy = from[1];
        let toy = to[1];
        if fromy <= pointy {
            if toy > pointy && orient(from, to, point) > 0.0 {
                winding += 1;
            }
        } else if toy <= pointy && orient(from, to, point) < 0.0 {
            winding -= 1;
        }
    }

    winding != 0
}

/// Test if point is _inside_ the polygon.
impl<O: ToPoint2> Envelops<O> for Polygon2 {
    fn envelops(&self, p: O) -> bool {
        point_inside(&self.0, p)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_inside_testing() {
        let polygon = Polygon2::new(
            [[0.0, 0.0], [0.0, 1.0], [1.0, 1.0], [1.0, 0.0]]
                .iter()
                .copied(),
        )
        .unwrap();
        assert_eq!(polygon.envelops([0.5, 0.5]), true);
        assert_eq!(polygon.envelops([0.9, 0.9]), true);
        assert_eq!(polygon.envelops([0.00001, 0.00001]), true);

        assert_eq!(polygon.envelops([-0.3, 0.1]), false);
        assert_eq!(polygon.envelops([0.3, -0.1]), false);
        assert_eq!(polygon.envelops([1.1, 0.1]), false);
        assert_eq!(polygon.envelops([0.5, 1.1]), false);
    }

    #[test]
    fn convexity() {
        let ccw = Polygon2::new([[0.0, 0.0], [1.0, 0.0], [2.0, 0.0], [2.0, 2.0], [0.0, 2.0]])
            .unwrap();
        assert!(ccw.is_convex());
        assert!((ccw.signed_area() - 4.0).abs() < 1e-12);

        let cw = Polygon2::new([[0.0, 0.0], [0.0, 2.0], [2.0, 2.0], [2.0, 0.0]]).unwrap();
        assert!(!cw.is_convex());
        assert!((cw.area() - 4.0).abs() < 1e-12);

        let dented =
            Polygon2::new([[0.0, 0.0], [2.0, 0.0], [1.0, 0.5], [2.0, 2.0], [0.0, 2.0]]).unwrap();
        assert!(!dented.is_convex());
    }
}
