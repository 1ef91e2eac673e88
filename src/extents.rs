use crate::*;

pub type Extents2 = Extents<Point2>;
pub type Extents3 = Extents<Point3>;

#[derive(Copy, Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Extents<P> {
    pub origin: P,
    pub size: P,
}

impl<P> Extents<P>
where
    P: Copy + Point + Add,
{
    pub fn zero() -> Self {
        Self {
            origin: P::zero(),
            size: P::zero(),
        }
    }

    pub fn from_min_max(min: P, max: P) -> Self {
        let size = max.sub(min);

        Self { origin: min, size }
    }

    pub fn max(&self) -> P {
        self.origin.add(self.size)
    }

    pub fn union(self, other: Self) -> Self {
        let origin = self.origin.min_all(other.origin);
        let max = self.max().max_all(other.max());
        let size = max.sub(origin);

        Self { origin, size }
    }

    /// Expand the extents by a value.
    ///
    /// A negative value can be used to _shrink_ the extents.
    /// Shrinking beyond `size / 2` results in a [`Self::zero`] and non-finite values are
    /// ignored.
    pub fn expand(self, by: f64) -> Self {
        if !by.is_finite() {
            return self;
        }

        let x = P::all(by);

        let size = self.size.add(x.scale(2.0));
        if size.into_iter().any(|x| x < 0.0) {
            return Self::zero();
        }

        let origin = self.origin.sub(x);

        Self { origin, size }
    }
}

impl Extents3 {
    /// The elevation range `(lo, hi)`.
    pub fn z_range(&self) -> (f64, f64) {
        (self.origin[2], self.max()[2])
    }
}

impl From<Extents3> for Extents2 {
    /// Convert a 3D AABB to 2D AABB by dropping Z value.
    fn from(value: Extents3) -> Self {
        let Extents { origin, size } = value;
        Self {
            origin: origin.to_p2(),
            size: size.to_p2(),
        }
    }
}

impl FromIterator<Point3> for Extents3 {
    fn from_iter<T>(iter: T) -> Self
    where
        T: IntoIterator<Item = Point3>,
    {
        let mut iter = iter.into_iter();
        let Some(init) = iter.next() else { return Self::zero(); };

        let (min, max) = iter.fold((init, init), |(min, max), p| {
            (min.min_all(p), max.max_all(p))
        });

        Self::from_min_max(min, max)
    }
}

impl FromIterator<Point2> for Extents2 {
    fn from_iter<T>(iter: T) -> Self
    where
        T: IntoIterator<Item = Point2>,
    {
        let mut iter = iter.into_iter();
        let Some(init) = iter.next() else { return Self::zero(); };

        let (min, max) = iter.fold((init, init), |(min, max), p| {
            (min.min_all(p), max.max_all(p))
        });

        Self::from_min_max(min, max)
    }
}

impl Envelops<Point2> for Extents2 {
    fn envelops(&self, p: Point2) -> bool {
        let [x, y] = p;

        let [mx, my] = self.origin;

        if x < mx || y < my {
            return false;
        }

        let [mx, my] = self.max();

        x <= mx && y <= my
    }
}

pub trait Aabb {
    type Space;

    fn aabb(&self) -> Extents<Self::Space>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck::TestResult;

    type P3 = (i32, i32, i32);

    #[quickcheck]
    fn extents_envelop_their_points(a: P3, b: P3, c: P3) -> TestResult {
        let pts = [a, b, c].map(|(x, y, z)| [x as f64, y as f64, z as f64]);
        if a == b || b == c {
            return TestResult::discard();
        }

        let e3 = Extents3::from_iter(pts);
        let e2 = Extents2::from(e3);

        TestResult::from_bool(pts.iter().all(|p| e2.envelops(p.to_p2())))
    }

    #[test]
    fn z_range_and_union() {
        let a = Extents3::from_iter([[0.0, 0.0, 10.0], [1.0, 1.0, 12.0]]);
        let b = Extents3::from_iter([[2.0, -1.0, 9.0], [3.0, 0.0, 9.5]]);
        assert_eq!(a.z_range(), (10.0, 12.0));

        let u = a.union(b);
        assert_eq!(u.origin, [0.0, -1.0, 9.0]);
        assert_eq!(u.max(), [3.0, 1.0, 12.0]);
    }

    #[test]
    fn expand_test() {
        let e = Extents2::from_min_max(Point2::zero(), Point2::all(1.0));

        assert_eq!(
            e.expand(0.5),
            Extents2 {
                origin: [-0.5, -0.5],
                size: [2.0, 2.0]
            }
        );

        assert_eq!(e.expand(-0.8), Extents2::zero());
        assert_eq!(e.expand(f64::NAN), e);
    }
}
