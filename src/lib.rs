//! Triangulated surfaces and contours from topographic survey points.
//!
//! A [`Build`] runs the whole pipeline on a background thread: the selected survey points are
//! swept into a convex hull triangulation, legalised into a Delaunay TIN, constrained to the
//! breaklines, then analysed for critical points and contoured.
//! The frozen result is a [`Surface`].
use rustc_hash::FxHashMap as HashMap;
use rustc_hash::FxHashSet as HashSet;

#[cfg(test)]
extern crate quickcheck;
#[cfg(test)]
#[macro_use(quickcheck)]
extern crate quickcheck_macros;

mod breakline;
mod build;
mod config;
mod constrain;
mod contour;
mod critical;
mod delaunay;
mod error;
mod extents;
mod hull;
#[cfg(feature = "io")]
pub mod io;
mod line;
mod plane;
mod point;
pub mod polygon;
mod polyline;
mod progress;
mod smooth;
mod store;
mod tin;

pub use breakline::*;
pub use build::*;
pub use config::*;
pub use contour::*;
pub use critical::*;
pub use delaunay::*;
pub use error::*;
pub use extents::*;
pub use line::*;
pub use plane::*;
pub use point::*;
pub use polygon::*;
pub use polyline::*;
pub use progress::*;
pub use smooth::*;
pub use store::*;
pub use tin::*;

/// Result with a [`TinError`] as the default error.
pub type Result<T, E = TinError> = std::result::Result<T, E>;

pub trait Envelops<O> {
    fn envelops(&self, object: O) -> bool;
}

/// Area can be calculated from an object.
///
/// Note that area is contextual from the object.
/// For instance, a [`Polygon2`] would be the _plan_ area.
/// If implementing this trait be sure to be **explicit** about the area being calculated.
pub trait Area {
    /// Calculate the area of an object.
    fn area(&self) -> f64;
}

/// A small store of topo points on a 5x4 grid with a mound in the middle.
#[cfg(test)]
fn dummy_store() -> PointStore {
    let mut store = PointStore::default();
    let mut n = 1;
    for y in 0..4 {
        for x in 0..5 {
            let (fx, fy) = (x as f64 * 10.0, y as f64 * 10.0);
            let dx = fx - 20.0;
            let dy = fy - 15.0;
            // slight jitter keeps the grid off cocircular configurations
            let jitter = ((x * 7 + y * 3) % 5) as f64 * 0.13;
            let z = 100.0 - (dx * dx + dy * dy) / 50.0;
            store
                .add(n, [fx + jitter, fy - jitter], z, "TOPO", false)
                .unwrap();
            n += 1;
        }
    }
    store
}

#[cfg(test)]
#[derive(Clone, Debug)]
struct PointCloudGen {
    pub points: Vec<Point3>,
}

#[cfg(test)]
impl quickcheck::Arbitrary for PointCloudGen {
    fn arbitrary(g: &mut quickcheck::Gen) -> Self {
        let n = usize::arbitrary(g) % 40 + 3;
        let points = std::iter::repeat_with(|| {
            // quarter units keep orientation tests exact
            let x = (i16::arbitrary(g) as f64) / 4.0;
            let y = (i16::arbitrary(g) as f64) / 4.0;
            let z = (i8::arbitrary(g) as f64) / 4.0;
            [x, y, z]
        })
        .take(n)
        .collect();
        Self { points }
    }
}

#[cfg(test)]
impl PointCloudGen {
    /// Load the cloud into a store, numbering from 1.
    fn store(&self) -> PointStore {
        let mut store = PointStore::default();
        for (i, p) in self.points.iter().enumerate() {
            store
                .add(i as i32 + 1, p.to_p2(), p[2], "", false)
                .unwrap();
        }
        store
    }

    /// Load the cloud about a survey sized origin, where coordinates no longer store exactly.
    fn survey_store(&self) -> PointStore {
        let mut store = PointStore::default();
        for (i, p) in self.points.iter().enumerate() {
            let pos = p.to_p2().add(SURVEY_ORIGIN);
            store.add(i as i32 + 1, pos, p[2], "", false).unwrap();
        }
        store
    }
}

/// Easting and northing of a typical site.
#[cfg(test)]
const SURVEY_ORIGIN: Point2 = [512_345.1, 4_012_345.3];
