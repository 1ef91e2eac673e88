use crate::*;

/// Ax + By + Cz = D
#[derive(Debug, Clone)]
pub struct Plane {
    d: f64,
    normal: Point3,
    centroid: Point3,
}

impl Plane {
    pub fn new(centroid: Point3, normal: Point3) -> Self {
        let d = dot_prod(normal, centroid);
        Self {
            d,
            normal,
            centroid,
        }
    }

    pub fn a(&self) -> f64 {
        self.normal[0]
    }

    pub fn b(&self) -> f64 {
        self.normal[1]
    }

    pub fn c(&self) -> f64 {
        self.normal[2]
    }

    pub fn d(&self) -> f64 {
        self.d
    }

    pub fn centroid(&self) -> Point3 {
        self.centroid
    }

    pub fn normal(&self) -> Point3 {
        self.normal
    }

    pub fn is_vertical(&self) -> bool {
        self.c() == 0.0
    }

    /// The elevation of the plane at `p`.
    /// Returns `None` if the plane is vertical (c == 0).
    pub fn register_z(&self, p: impl ToPoint2) -> Option<f64> {
        if self.is_vertical() {
            return None;
        }

        // work relative to the centroid, survey coordinates are large
        let [px, py] = p.to_p2().sub(self.centroid.to_p2());
        let dz = -(self.a() * px + self.b() * py) / self.c();
        Some(self.centroid[2] + dz)
    }
}

impl From<[Point3; 3]> for Plane {
    fn from(tri: [Point3; 3]) -> Self {
        let n = tri[0].scale(-1.0);
        let a = tri[1].add(n); // p1 - p0
        let b = tri[2].add(n); // p2 - p0
        Plane::new(tri[0], xprod(a, b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plane_from_tri() {
        let plane = Plane::from([[0.0, 0.0, 1.0], [2.0, 0.0, 3.0], [0.0, 2.0, 1.0]]);

        assert!(!plane.is_vertical());
        let x = plane.register_z([1.0, 1.0]).unwrap() - 2.0;
        assert!(x.abs() < 1e-11);
        let x = plane.register_z([0.5, 1.5]).unwrap() - 1.5;
        assert!(x.abs() < 1e-11);

        let vertical = Plane::from([[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]]);
        assert!(vertical.is_vertical());
        assert_eq!(vertical.register_z([0.0, 0.0]), None);
    }

    #[test]
    fn survey_sized_coordinates() {
        let plane = Plane::from([
            [512_000.0, 4_100_000.0, 250.0],
            [512_010.0, 4_100_000.0, 251.0],
            [512_000.0, 4_100_010.0, 250.0],
        ]);
        let x = plane.register_z([512_005.0, 4_100_003.0]).unwrap() - 250.5;
        assert!(x.abs() < 1e-9);
    }
}
