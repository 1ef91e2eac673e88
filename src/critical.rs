use crate::*;
use rayon::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum CriticalKind {
    /// Every neighbour is lower.
    Max,
    /// Every neighbour is higher.
    Min,
    Saddle,
}

/// A vertex of the TIN where the surface has a local extremum or saddle.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CriticalPoint {
    /// Point index in the store.
    pub index: u32,
    pub kind: CriticalKind,
    pub elevation: f64,
}

impl Tin {
    /// Classifies every vertex against its ring, in vertex order.
    pub fn critical_points(&self, store: &PointStore) -> Vec<CriticalPoint> {
        let vertices = self.vertices().collect::<Vec<_>>();
        let cps = vertices
            .par_iter()
            .filter_map(|&v| {
                self.classify_vertex(store, v).map(|kind| CriticalPoint {
                    index: v,
                    kind,
                    elevation: store.z(v),
                })
            })
            .collect::<Vec<_>>();

        log::debug!(
            "{} critical points in {} vertices",
            cps.len(),
            vertices.len()
        );
        cps
    }

    /// Returns the kind of critical point `v` is, `None` for a regular point (or one not in
    /// the TIN).
    ///
    /// Equal elevations are ordered by point index, the higher index being above.
    pub fn classify_vertex(&self, store: &PointStore, v: u32) -> Option<CriticalKind> {
        let ring = self.ring(v)?;
        let zv = store.z(v);
        let above = ring
            .vertices
            .iter()
            .map(|&n| {
                let zn = store.z(n);
                zn > zv || (zn == zv && n > v)
            })
            .collect::<Vec<_>>();

        if above.iter().all(|&x| !x) {
            return Some(CriticalKind::Max);
        }
        if above.iter().all(|&x| x) {
            return Some(CriticalKind::Min);
        }

        let mut changes = above.windows(2).filter(|w| w[0] != w[1]).count();
        if ring.closed && above.first() != above.last() {
            changes += 1;
        }

        let saddle = if ring.closed { changes >= 4 } else { changes >= 2 };
        saddle.then_some(CriticalKind::Saddle)
    }
}

/// The lowest minimum and highest maximum elevations.
pub fn elevation_range(critical: &[CriticalPoint]) -> Option<(f64, f64)> {
    critical
        .iter()
        .filter(|c| c.kind != CriticalKind::Saddle)
        .map(|c| c.elevation)
        .fold(None, |r, z| match r {
            None => Some((z, z)),
            Some((lo, hi)) => Some((lo.min(z), hi.max(z))),
        })
}
