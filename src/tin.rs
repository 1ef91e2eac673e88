use crate::*;
use std::collections::BTreeSet;

/// A counter-clockwise triangle in the [`Tin`] arena.
///
/// `n[i]` is the neighbouring triangle across the edge _opposite_ `v[i]`, that is the edge
/// `v[i+1] -> v[i+2]`. Hull edges have no neighbour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Triangle {
    pub v: [u32; 3],
    pub n: [Option<u32>; 3],
}

impl Triangle {
    pub fn new(v: [u32; 3]) -> Self {
        Self { v, n: [None; 3] }
    }

    /// The position of vertex `p` in the triangle.
    pub fn slot(&self, p: u32) -> Option<usize> {
        self.v.iter().position(|&x| x == p)
    }

    /// The directed edge opposite slot `i`.
    pub fn edge(&self, i: usize) -> (u32, u32) {
        (self.v[(i + 1) % 3], self.v[(i + 2) % 3])
    }

    /// The slot opposite the directed edge `a -> b`.
    pub fn edge_slot(&self, a: u32, b: u32) -> Option<usize> {
        (0..3).find(|&i| self.edge(i) == (a, b))
    }
}

/// An undirected TIN edge, derived from the triangle arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    /// `a -> b` runs counter-clockwise around `left`.
    pub a: u32,
    pub b: u32,
    pub left: u32,
    /// `None` on the hull.
    pub right: Option<u32>,
    /// Pinned by a breakline.
    pub constrained: bool,
}

/// The triangles around a vertex, in counter-clockwise order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ring {
    /// The neighbouring vertices.
    ///
    /// An open ring (around a hull vertex) has one more vertex than triangles.
    pub vertices: Vec<u32>,
    pub triangles: Vec<u32>,
    /// The ring goes all the way around (the vertex is interior).
    pub closed: bool,
}

/// A triangulated irregular network.
///
/// The TIN owns _no_ points; every vertex is a `u32` index into a [`PointStore`].
/// Triangles live in an arena and are addressed by their `u32` index, which is stable for the
/// life of the TIN (flips rewrite triangles in place).
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Tin {
    pub(crate) triangles: Vec<Triangle>,
    /// Pinned edges as `(min, max)` vertex pairs.
    pub(crate) constrained: BTreeSet<(u32, u32)>,
    /// Counter-clockwise hull vertices.
    pub(crate) hull: Vec<u32>,
    /// A triangle for each vertex, indexed by point index.
    pub(crate) vt: Vec<Option<u32>>,
}

pub(crate) fn ord_edge(a: u32, b: u32) -> (u32, u32) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

impl Tin {
    /// Builds a TIN from counter-clockwise triangles over a store of `points` points, linking
    /// neighbours across shared edges.
    ///
    /// The hull is the boundary loop of the triangles.
    pub fn from_triangles(points: usize, tris: impl IntoIterator<Item = [u32; 3]>) -> Self {
        let triangles = tris.into_iter().map(Triangle::new).collect::<Vec<_>>();
        let mut tin = Self {
            triangles,
            constrained: BTreeSet::new(),
            hull: Vec::new(),
            vt: vec![None; points],
        };
        tin.relink();
        tin.hull = tin.outlines().into_iter().next().unwrap_or_default();
        tin
    }

    /// Rebuild the neighbour links and vertex lookup from the triangle vertices.
    pub(crate) fn relink(&mut self) {
        let mut edges: HashMap<(u32, u32), (u32, usize)> =
            HashMap::with_capacity_and_hasher(self.triangles.len() * 3, Default::default());

        for t in 0..self.triangles.len() {
            for i in 0..3 {
                let (a, b) = self.triangles[t].edge(i);
                match edges.remove(&(b, a)) {
                    Some((u, j)) => {
                        self.triangles[t].n[i] = Some(u);
                        self.triangles[u as usize].n[j] = Some(t as u32);
                    }
                    None => {
                        self.triangles[t].n[i] = None;
                        edges.insert((a, b), (t as u32, i));
                    }
                }
            }
            for p in self.triangles[t].v {
                if let Some(x) = self.vt.get_mut(p as usize) {
                    *x = Some(t as u32);
                }
            }
        }
    }

    pub fn len(&self) -> usize {
        self.triangles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    pub fn triangle(&self, t: u32) -> &Triangle {
        &self.triangles[t as usize]
    }

    /// Counter-clockwise hull vertices, collinear hull points included.
    pub fn hull(&self) -> &[u32] {
        &self.hull
    }

    /// The hull as a plan polygon, `None` for an empty TIN.
    pub fn boundary(&self, store: &PointStore) -> Option<Polygon2> {
        Polygon2::new(self.hull.iter().map(|&p| store.xy(p))).ok()
    }

    /// The bounding box of the vertices.
    pub fn extents(&self, store: &PointStore) -> Extents3 {
        self.vertices().map(|v| store.xyz(v)).collect()
    }

    /// The point indices used by the TIN.
    pub fn vertices(&self) -> impl Iterator<Item = u32> + '_ {
        self.vt
            .iter()
            .enumerate()
            .filter_map(|(i, t)| t.map(|_| i as u32))
    }

    pub fn contains_vertex(&self, p: u32) -> bool {
        matches!(self.vt.get(p as usize), Some(Some(_)))
    }

    /// The 3D triangles, looked up in `store`.
    pub fn tris<'a>(&'a self, store: &'a PointStore) -> impl ExactSizeIterator<Item = [Point3; 3]> + 'a {
        self.triangles
            .iter()
            .map(move |t| t.v.map(|p| store.xyz(p)))
    }

    /// Every edge once.
    pub fn edges(&self) -> Vec<Edge> {
        let mut v = Vec::with_capacity(self.triangles.len() * 3 / 2 + self.hull.len());
        for (t, tri) in self.triangles.iter().enumerate() {
            let t = t as u32;
            for i in 0..3 {
                let right = tri.n[i];
                if right.map(|u| t < u).unwrap_or(true) {
                    let (a, b) = tri.edge(i);
                    v.push(Edge {
                        a,
                        b,
                        left: t,
                        right,
                        constrained: self.is_constrained(a, b),
                    });
                }
            }
        }
        v
    }

    /// The triangle left of the directed edge `a -> b`, and the slot opposite it.
    pub fn find_edge(&self, a: u32, b: u32) -> Option<(u32, usize)> {
        let ring = self.ring(a)?;
        ring.triangles.into_iter().find_map(|t| {
            self.triangles[t as usize]
                .edge_slot(a, b)
                .map(|i| (t, i))
        })
    }

    /// Returns if `a` and `b` are joined by an edge.
    pub fn has_edge(&self, a: u32, b: u32) -> bool {
        self.find_edge(a, b).is_some() || self.find_edge(b, a).is_some()
    }

    pub fn is_constrained(&self, a: u32, b: u32) -> bool {
        self.constrained.contains(&ord_edge(a, b))
    }

    /// Pinned edges as `(min, max)` vertex pairs.
    pub fn constrained_edges(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        self.constrained.iter().copied()
    }

    pub(crate) fn pin(&mut self, a: u32, b: u32) {
        self.constrained.insert(ord_edge(a, b));
    }

    /// The ring of triangles and vertices around `p`.
    ///
    /// Returns `None` if `p` is not in the TIN.
    pub fn ring(&self, p: u32) -> Option<Ring> {
        let start = (*self.vt.get(p as usize)?)?;
        let limit = self.triangles.len() + 1;

        // rotate clockwise to the hull, or all the way around
        let mut t = start;
        let mut closed = false;
        for _ in 0..limit {
            let tri = &self.triangles[t as usize];
            let k = tri.slot(p)?;
            match tri.n[(k + 2) % 3] {
                Some(u) if u == start => {
                    closed = true;
                    t = start;
                    break;
                }
                Some(u) => t = u,
                None => break,
            }
        }

        // walk counter-clockwise
        let first = t;
        let mut vertices = Vec::new();
        let mut triangles = Vec::new();
        for _ in 0..limit {
            let tri = &self.triangles[t as usize];
            let k = tri.slot(p)?;
            triangles.push(t);
            if vertices.is_empty() {
                vertices.push(tri.v[(k + 1) % 3]);
            }
            let c = tri.v[(k + 2) % 3];
            match tri.n[(k + 1) % 3] {
                Some(u) if u == first => break,
                Some(u) => {
                    vertices.push(c);
                    t = u;
                }
                None => {
                    vertices.push(c);
                    break;
                }
            }
        }

        Some(Ring {
            vertices,
            triangles,
            closed,
        })
    }

    /// The boundary loops of the TIN, counter-clockwise, first point not repeated.
    ///
    /// A TIN over a convex hull has exactly one loop.
    pub fn outlines(&self) -> Vec<Vec<u32>> {
        let mut next: HashMap<u32, u32> = HashMap::default();
        for tri in &self.triangles {
            for i in 0..3 {
                if tri.n[i].is_none() {
                    let (a, b) = tri.edge(i);
                    next.insert(a, b);
                }
            }
        }

        let mut starts = next.keys().copied().collect::<Vec<_>>();
        starts.sort_unstable();

        let mut seen = HashSet::default();
        let mut loops = Vec::new();
        for s in starts {
            if seen.contains(&s) {
                continue;
            }
            let mut l = Vec::new();
            let mut p = s;
            while seen.insert(p) {
                l.push(p);
                match next.get(&p) {
                    Some(&q) => p = q,
                    None => break,
                }
            }
            loops.push(l);
        }

        loops
    }

    /// Checks the arena invariants, logging each failure.
    ///
    /// - every triangle has positive area,
    /// - neighbour links are symmetric and share the edge,
    /// - every vertex lookup points at a triangle using the vertex,
    /// - every pinned edge is an edge.
    pub fn is_consistent(&self, store: &PointStore) -> bool {
        let mut ok = true;

        for (t, tri) in self.triangles.iter().enumerate() {
            let [a, b, c] = tri.v.map(|p| store.xy(p));
            if orient(a, b, c) <= 0.0 {
                log::warn!("triangle {} {:?} is not counter-clockwise", t, tri.v);
                ok = false;
            }

            for i in 0..3 {
                let Some(u) = tri.n[i] else { continue };
                let (a, b) = tri.edge(i);
                let back = self
                    .triangles
                    .get(u as usize)
                    .and_then(|x| x.edge_slot(b, a).map(|j| x.n[j]));
                if back != Some(Some(t as u32)) {
                    log::warn!("triangle {} neighbour {} does not link back", t, u);
                    ok = false;
                }
            }
        }

        for (p, t) in self.vt.iter().enumerate() {
            let Some(t) = t else { continue };
            let uses = self
                .triangles
                .get(*t as usize)
                .map(|x| x.slot(p as u32).is_some())
                .unwrap_or(false);
            if !uses {
                log::warn!("point {} lookup is wrong", store.number(p as u32));
                ok = false;
            }
        }

        for &(a, b) in &self.constrained {
            if !self.has_edge(a, b) {
                log::warn!(
                    "pinned edge {}-{} is not an edge",
                    store.number(a),
                    store.number(b)
                );
                ok = false;
            }
        }

        ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 0--1--2
    /// | /| /|
    /// |/ |/ |
    /// 3--4--5
    fn strip() -> (PointStore, Tin) {
        let mut s = PointStore::default();
        for (i, p) in [
            [0.0, 1.0],
            [1.0, 1.0],
            [2.0, 1.0],
            [0.0, 0.0],
            [1.0, 0.0],
            [2.0, 0.0],
        ]
        .into_iter()
        .enumerate()
        {
            s.add(i as i32 + 1, p, i as f64, "", false).unwrap();
        }
        let tin = Tin::from_triangles(6, [[0, 3, 1], [1, 3, 4], [1, 4, 2], [2, 4, 5]]);
        (s, tin)
    }

    #[test]
    fn linking() {
        let (s, tin) = strip();
        assert!(tin.is_consistent(&s));
        assert_eq!(tin.len(), 4);
        assert_eq!(tin.triangle(0).n, [Some(1), None, None]);
        assert_eq!(tin.triangle(1).n, [None, Some(2), Some(0)]);

        let edges = tin.edges();
        assert_eq!(edges.len(), 9);
        assert_eq!(edges.iter().filter(|e| e.right.is_none()).count(), 6);
    }

    #[test]
    fn hull_and_outline() {
        let (_, tin) = strip();
        assert_eq!(tin.hull(), &[0, 3, 4, 5, 2, 1]);
        assert_eq!(tin.outlines(), vec![vec![0, 3, 4, 5, 2, 1]]);
    }

    #[test]
    fn rings() {
        let (_, tin) = strip();

        let r = tin.ring(1).unwrap();
        assert!(!r.closed);
        assert_eq!(r.vertices, vec![0, 3, 4, 2]);
        assert_eq!(r.triangles, vec![0, 1, 2]);

        let r = tin.ring(5).unwrap();
        assert_eq!(r.vertices, vec![2, 4]);

        assert_eq!(tin.ring(9), None);
    }

    #[test]
    fn closed_ring() {
        let mut s = PointStore::default();
        for (i, p) in [[0.0, 0.0], [2.0, 0.0], [1.0, 2.0], [1.0, 0.7]]
            .into_iter()
            .enumerate()
        {
            s.add(i as i32, p, 0.0, "", false).unwrap();
        }
        let tin = Tin::from_triangles(4, [[0, 1, 3], [1, 2, 3], [2, 0, 3]]);
        assert!(tin.is_consistent(&s));
        let r = tin.ring(3).unwrap();
        assert!(r.closed);
        assert_eq!(r.triangles.len(), 3);
        assert_eq!(r.vertices.len(), 3);
        let mut v = r.vertices.clone();
        v.sort();
        assert_eq!(v, vec![0, 1, 2]);
    }

    #[test]
    fn finding_edges() {
        let (_, tin) = strip();
        assert_eq!(tin.find_edge(3, 1), Some((0, 0)));
        assert_eq!(tin.find_edge(1, 3), Some((1, 2)));
        assert!(tin.has_edge(4, 1));
        assert!(!tin.has_edge(0, 4));
        assert!(!tin.has_edge(0, 5));
    }

    #[test]
    fn inconsistent_tin_is_reported() {
        let (s, mut tin) = strip();
        tin.triangles[0].v = [0, 1, 3]; // clockwise
        assert!(!tin.is_consistent(&s));

        let (s, mut tin) = strip();
        tin.pin(0, 5);
        assert!(!tin.is_consistent(&s));
    }
}
