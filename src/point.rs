use std::ops;

pub trait Point: Copy + Sized + IntoIterator<Item = f64> {
    /// Set all the values to this value.
    fn all(v: f64) -> Self;

    /// Set all values to zero.
    fn zero() -> Self {
        Self::all(0.)
    }

    /// Scale point by multiplying all dimensions by `scalar`.
    fn scale(self, scalar: f64) -> Self;

    /// Calculate the magnitude of the vector.
    fn mag(self) -> f64 {
        self.into_iter()
            .zip(self)
            .map(|(a, b)| a * b)
            .sum::<f64>()
            .sqrt()
    }

    /// Return the minimum of each dimension.
    fn min_all(self, b: Self) -> Self {
        xfm(self, b, f64::min)
    }

    /// Return the maximum of each dimension.
    fn max_all(self, b: Self) -> Self {
        xfm(self, b, f64::max)
    }

    /// Perform a transformation on each pair of dimensions.
    fn xfm<F: Fn(f64, f64) -> f64>(self, b: Self, f: F) -> Self;
}

pub trait Add<Rhs = Self> {
    fn add(self, rhs: Rhs) -> Self;
    fn sub(self, rhs: Rhs) -> Self
    where
        Self: Sized + Copy,
        Rhs: Point,
    {
        self.add(rhs.scale(-1.0))
    }
}

/// 2D Point (X,Y).
///
/// Survey positions are stored as `[easting, northing]`.
pub type Point2 = [f64; 2];

/// 3D Point (X,Y,Z).
pub type Point3 = [f64; 3];

impl Add for Point2 {
    fn add(self, rhs: Self) -> Self {
        xfm(self, rhs, ops::Add::add)
    }

    fn sub(self, rhs: Self) -> Self {
        xfm(self, rhs, ops::Sub::sub)
    }
}
impl Point for Point2 {
    fn all(v: f64) -> Self {
        [v; 2]
    }
    fn scale(self, scalar: f64) -> Self {
        self.map(|f| f * scalar)
    }
    fn xfm<F: Fn(f64, f64) -> f64>(self, b: Self, f: F) -> Self {
        [f(self[0], b[0]), f(self[1], b[1])]
    }
}

impl Add for Point3 {
    fn add(self, rhs: Self) -> Self {
        Self::xfm(self, rhs, ops::Add::add)
    }

    fn sub(self, rhs: Self) -> Self {
        Self::xfm(self, rhs, ops::Sub::sub)
    }
}
impl Point for Point3 {
    fn all(v: f64) -> Self {
        [v; 3]
    }
    fn scale(self, scalar: f64) -> Self {
        self.map(|f| f * scalar)
    }
    fn xfm<F: Fn(f64, f64) -> f64>(self, b: Self, f: F) -> Self {
        [f(self[0], b[0]), f(self[1], b[1]), f(self[2], b[2])]
    }
}

pub trait ToPoint2 {
    fn to_p2(self) -> Point2;
}

impl ToPoint2 for Point2 {
    fn to_p2(self) -> Point2 {
        self
    }
}
impl ToPoint2 for &Point2 {
    fn to_p2(self) -> Point2 {
        *self
    }
}
impl ToPoint2 for Point3 {
    fn to_p2(self) -> Point2 {
        let [x, y, _] = self;
        [x, y]
    }
}
impl ToPoint2 for &Point3 {
    fn to_p2(self) -> Point2 {
        (*self).to_p2()
    }
}

pub trait WithZ: ToPoint2 + Sized {
    fn with_z(self, z: f64) -> Point3 {
        let [x, y] = self.to_p2();
        [x, y, z]
    }
}

impl WithZ for Point2 {}
impl WithZ for Point3 {}

pub fn dot_prod(a: Point3, b: Point3) -> f64 {
    a.into_iter().zip(b).map(|(a, b)| a * b).sum()
}

#[allow(clippy::many_single_char_names)]
pub fn xprod(a: Point3, b: Point3) -> Point3 {
    let [ax, ay, az] = a;
    let [bx, by, bz] = b;
    let x = ay * bz - az * by;
    let y = az * bx - ax * bz;
    let z = ax * by - ay * bx;
    [x, y, z]
}

/// Plan distance between two points.
pub fn len_xy(a: impl ToPoint2, b: impl ToPoint2) -> f64 {
    a.to_p2().sub(b.to_p2()).mag()
}

/// Rounding of a product of two differences, relative to the product.
const PRODUCT_ERR: f64 = 2.0 * f64::EPSILON;
/// Rounding of a stored coordinate, relative to the coordinate's magnitude.
const COORD_ERR: f64 = 4.0 * f64::EPSILON;

/// Sorts `pts` with [`ordpt`], returning if an odd number of swaps was needed.
fn sort_with_parity<const N: usize>(pts: &mut [Point2; N]) -> bool {
    let mut odd = false;
    for i in 1..N {
        let mut j = i;
        while j > 0 && ordpt(pts[j], pts[j - 1]).is_lt() {
            pts.swap(j, j - 1);
            odd = !odd;
            j -= 1;
        }
    }
    odd
}

/// Twice the signed area of the triangle `a b c`.
///
/// - `> 0`: `c` is **left** of `a -> b` (counter-clockwise),
/// - `= 0`: collinear,
/// - `< 0`: `c` is **right** of `a -> b` (clockwise).
///
/// The points are taken in sorted order and the sign restored afterwards, so every ordering of
/// the same three points gives the same magnitude. The area is computed relative to the lowest
/// point, and an area within the rounding of the products and of the coordinates themselves
/// (which grows with their magnitude) is returned as zero. At survey coordinates, points
/// collinear on paper are collinear here.
pub fn orient(a: Point2, b: Point2, c: Point2) -> f64 {
    let mut p = [a, b, c];
    let odd = sort_with_parity(&mut p);
    let [a, b, c] = p;

    let [bx, by] = b.sub(a);
    let [cx, cy] = c.sub(a);
    let (l, r) = (bx * cy, by * cx);
    let det = l - r;

    let scale = a
        .into_iter()
        .chain(b)
        .chain(c)
        .fold(0.0f64, |m, x| m.max(x.abs()));
    let bound = (l.abs() + r.abs()) * PRODUCT_ERR
        + scale * (bx.abs() + by.abs() + cx.abs() + cy.abs()) * COORD_ERR;

    if det.abs() <= bound {
        0.0
    } else if odd {
        -det
    } else {
        det
    }
}

/// In-circle determinant: positive when `d` lies strictly inside the circumcircle of the
/// counter-clockwise triangle `a b c`, zero when cocircular.
///
/// Like [`orient`], the points are taken in sorted order so both diagonals of a quadrilateral
/// see the same determinant. Values smaller than the rounding bound of the determinant are
/// returned as zero, so cocircular configurations (such as the corners of a square) do not
/// flip back and forth.
pub fn in_circle(a: Point2, b: Point2, c: Point2, d: Point2) -> f64 {
    let mut p = [a, b, c, d];
    let odd = sort_with_parity(&mut p);
    let [a, b, c, d] = p;
    let det = lifted_det(a, b, c, d);
    if odd {
        -det
    } else {
        det
    }
}

#[allow(clippy::many_single_char_names)]
fn lifted_det(a: Point2, b: Point2, c: Point2, d: Point2) -> f64 {
    let [adx, ady] = a.sub(d);
    let [bdx, bdy] = b.sub(d);
    let [cdx, cdy] = c.sub(d);

    let alift = adx * adx + ady * ady;
    let blift = bdx * bdx + bdy * bdy;
    let clift = cdx * cdx + cdy * cdy;

    let bc = bdx * cdy - cdx * bdy;
    let ca = cdx * ady - adx * cdy;
    let ab = adx * bdy - bdx * ady;

    let det = alift * bc + blift * ca + clift * ab;

    let permanent = alift * ((bdx * cdy).abs() + (cdx * bdy).abs())
        + blift * ((cdx * ady).abs() + (adx * cdy).abs())
        + clift * ((adx * bdy).abs() + (bdx * ady).abs());

    if det.abs() <= permanent * 1e-12 {
        0.0
    } else {
        det
    }
}

/// Returns if the open segments `a b` and `c d` cross at a single interior point.
///
/// Touching at an endpoint, or collinear overlap, is **not** a proper crossing.
pub fn segments_cross(a: Point2, b: Point2, c: Point2, d: Point2) -> bool {
    let o1 = orient(a, b, c);
    let o2 = orient(a, b, d);
    let o3 = orient(c, d, a);
    let o4 = orient(c, d, b);
    o1 * o2 < 0.0 && o3 * o4 < 0.0
}

/// Returns if `p` lies on the segment `a b`, excluding the endpoints.
pub fn strictly_between(a: Point2, b: Point2, p: Point2) -> bool {
    if orient(a, b, p) != 0.0 {
        return false;
    }
    let ab = b.sub(a);
    let ap = p.sub(a);
    let t = ab[0] * ap[0] + ab[1] * ap[1];
    t > 0.0 && t < ab[0] * ab[0] + ab[1] * ab[1]
}

/// Apply an ordering to points by testing each x,y,z.
pub fn ordpt<P: Point>(a: P, b: P) -> std::cmp::Ordering {
    use std::cmp::Ordering::Equal;

    a.into_iter().zip(b).fold(
        Equal,
        |o, (a, b)| {
            if o == Equal {
                a.total_cmp(&b)
            } else {
                o
            }
        },
    )
}

/// Helper function which effectively transforms to [`Point::xfm`].
#[inline(always)]
pub fn xfm<P: Point, F: Fn(f64, f64) -> f64>(a: P, b: P, f: F) -> P {
    P::xfm(a, b, f)
}
