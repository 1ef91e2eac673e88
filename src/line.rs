use crate::*;

/// A 2D line segment between two points.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Segment2 {
    pub from: Point2,
    pub to: Point2,
}

impl Segment2 {
    pub fn new(from: impl ToPoint2, to: impl ToPoint2) -> Self {
        Self {
            from: from.to_p2(),
            to: to.to_p2(),
        }
    }

    pub fn len(&self) -> f64 {
        len_xy(self.from, self.to)
    }

    /// Returns if the segment has no length.
    pub fn is_degenerate(&self) -> bool {
        self.from == self.to
    }

    /// The point at parameter `t`, `0` being `from` and `1` being `to`.
    pub fn at(&self, t: f64) -> Point2 {
        self.from.add(self.to.sub(self.from).scale(t))
    }

    /// The point where the segments cross, if they do so properly (see [`segments_cross`]).
    pub fn crossing(&self, other: &Self) -> Option<Point2> {
        if !segments_cross(self.from, self.to, other.from, other.to) {
            return None;
        }

        // parametric intersection, denominator is non-zero since the segments cross
        let r = self.to.sub(self.from);
        let s = other.to.sub(other.from);
        let qp = other.from.sub(self.from);
        let den = r[0] * s[1] - r[1] * s[0];
        let t = (qp[0] * s[1] - qp[1] * s[0]) / den;
        Some(self.at(t))
    }

    /// Perpendicular distance from `p` to the segment, clamped to the end points.
    pub fn distance_to(&self, p: impl ToPoint2) -> f64 {
        let p = p.to_p2();
        if self.is_degenerate() {
            return len_xy(self.from, p);
        }

        let d = self.to.sub(self.from);
        let t = (p.sub(self.from)[0] * d[0] + p.sub(self.from)[1] * d[1])
            / (d[0] * d[0] + d[1] * d[1]);
        len_xy(self.at(t.clamp(0.0, 1.0)), p)
    }
}
