use crate::*;
use std::collections::VecDeque;
use std::time::Instant;

/// Where a point lies in a [`Tin`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location {
    /// Strictly inside the triangle.
    Inside(u32),
    /// On the edge opposite the slot of the triangle.
    OnEdge(u32, usize),
    /// On an existing vertex.
    OnVertex(u32),
    Outside,
}

/// Caps the number of edge flips and the time spent flipping.
pub(crate) struct FlipBudget {
    ceiling: usize,
    deadline: Option<Instant>,
    flips: usize,
}

impl FlipBudget {
    pub fn new(config: &BuildConfig, points: usize) -> Self {
        Self {
            ceiling: config.flip_ceiling(points),
            deadline: config.flip_time_budget.map(|d| Instant::now() + d),
            flips: 0,
        }
    }

    pub fn unlimited() -> Self {
        Self {
            ceiling: usize::MAX,
            deadline: None,
            flips: 0,
        }
    }

    pub fn flips(&self) -> usize {
        self.flips
    }

    pub fn spend(&mut self) -> Result<()> {
        self.flips += 1;
        let late = self.flips % 64 == 0
            && self.deadline.map(|d| Instant::now() > d).unwrap_or(false);
        if self.flips > self.ceiling || late {
            log::warn!("gave up after {} flips", self.flips);
            Err(TinError::TookTooLong { flips: self.flips })
        } else {
            Ok(())
        }
    }
}

impl Tin {
    /// Legalises every interior edge of the TIN by edge flipping until every edge that is not
    /// pinned is locally Delaunay. Returns the number of flips.
    ///
    /// # Errors
    /// - [`TinError::TookTooLong`] if the flip ceiling or time budget of `config` is spent,
    /// - [`TinError::Cancelled`] if the build is cancelled.
    pub fn legalize_all(
        &mut self,
        store: &PointStore,
        config: &BuildConfig,
        monitor: &Monitor,
    ) -> Result<usize> {
        let queue = self
            .edges()
            .into_iter()
            .filter(|e| e.right.is_some())
            .map(|e| (e.a, e.b))
            .collect::<VecDeque<_>>();

        let mut budget = FlipBudget::new(config, store.len());
        self.legalize(store, queue, &mut budget, monitor)?;
        log::debug!("legalised TIN with {} flips", budget.flips());
        Ok(budget.flips())
    }

    /// Works through the `queue` of edges, flipping each edge which fails the in-circle test
    /// and queueing the four outer edges of its quadrilateral. Pinned edges are never flipped.
    pub(crate) fn legalize(
        &mut self,
        store: &PointStore,
        mut queue: VecDeque<(u32, u32)>,
        budget: &mut FlipBudget,
        monitor: &Monitor,
    ) -> Result<()> {
        while let Some((a, b)) = queue.pop_front() {
            monitor.advance(1);
            if self.is_constrained(a, b) {
                continue;
            }
            // stale entries (edge since flipped away) are skipped
            let Some((t, i)) = self.find_edge(a, b) else { continue };
            let Some((p, q)) = self.quad(t, i) else { continue };

            let [pp, pa, pb, pq] = [p, a, b, q].map(|x| store.xy(x));
            let illegal = in_circle(pp, pa, pb, pq) > 0.0;
            if illegal && orient(pp, pa, pq) > 0.0 && orient(pq, pb, pp) > 0.0 {
                self.flip(t, i);
                budget.spend()?;
                monitor.checkpoint()?;
                queue.extend([(a, q), (q, b), (b, p), (p, a)]);
            }
        }

        Ok(())
    }

    /// The apexes `(p, q)` either side of the edge opposite slot `i` of `t`.
    /// `p` is in `t`, `None` if the edge is on the hull.
    pub(crate) fn quad(&self, t: u32, i: usize) -> Option<(u32, u32)> {
        let tri = &self.triangles[t as usize];
        let u = &self.triangles[tri.n[i]? as usize];
        let (a, b) = tri.edge(i);
        let j = u.edge_slot(b, a)?;
        Some((tri.v[i], u.v[j]))
    }

    /// Flips the edge opposite slot `i` of triangle `t`.
    ///
    /// ```text
    ///      b              b
    ///     /|\            / \
    ///    / | \          / u \
    ///   p t|u q   =>   p-----q
    ///    \ | /          \ t /
    ///     \|/            \ /
    ///      a              a
    /// ```
    ///
    /// The caller is responsible for the quadrilateral being strictly convex.
    /// Returns `false` if the edge is on the hull.
    pub(crate) fn flip(&mut self, t: u32, i: usize) -> bool {
        let tri = self.triangles[t as usize];
        let Some(u) = tri.n[i] else { return false };
        let utri = self.triangles[u as usize];
        let (a, b) = tri.edge(i);
        let Some(j) = utri.edge_slot(b, a) else { return false };

        let p = tri.v[i];
        let q = utri.v[j];
        let t_a = tri.n[(i + 1) % 3]; // across b-p
        let t_b = tri.n[(i + 2) % 3]; // across p-a
        let u_a = utri.n[(j + 1) % 3]; // across a-q
        let u_b = utri.n[(j + 2) % 3]; // across q-b

        self.triangles[t as usize] = Triangle {
            v: [p, a, q],
            n: [u_a, Some(u), t_b],
        };
        self.triangles[u as usize] = Triangle {
            v: [q, b, p],
            n: [t_a, Some(t), u_b],
        };

        self.relink_across(u_a, q, a, t);
        self.relink_across(t_a, p, b, u);

        self.vt[p as usize] = Some(t);
        self.vt[a as usize] = Some(t);
        self.vt[q as usize] = Some(u);
        self.vt[b as usize] = Some(u);

        true
    }

    /// Point the neighbour link of `x` across its directed edge `a -> b` at `to`.
    fn relink_across(&mut self, x: Option<u32>, a: u32, b: u32, to: u32) {
        let Some(x) = x else { return };
        let tri = &mut self.triangles[x as usize];
        if let Some(k) = tri.edge_slot(a, b) {
            tri.n[k] = Some(to);
        }
    }

    /// Finds where `pt` lies, walking from the `hint` triangle toward it.
    ///
    /// The walk is bounded, falling back to a scan of every triangle.
    pub fn locate(&self, store: &PointStore, pt: Point2, hint: Option<u32>) -> Location {
        if self.is_empty() {
            return Location::Outside;
        }

        let mut t = hint
            .filter(|&h| (h as usize) < self.len())
            .unwrap_or(0);

        for _ in 0..self.len() {
            let tri = &self.triangles[t as usize];
            let o = self.orients(store, t, pt);
            match (0..3).find(|&i| o[i] < 0.0) {
                Some(i) => match tri.n[i] {
                    Some(u) => t = u,
                    // convex hull, so leaving through a hull edge is outside
                    None => return Location::Outside,
                },
                None => return classify(tri, t, o),
            }
        }

        log::debug!("walk to ({}, {}) did not converge, scanning", pt[0], pt[1]);
        (0..self.len() as u32)
            .find_map(|t| {
                let o = self.orients(store, t, pt);
                o.iter()
                    .all(|&x| x >= 0.0)
                    .then(|| classify(&self.triangles[t as usize], t, o))
            })
            .unwrap_or(Location::Outside)
    }

    fn orients(&self, store: &PointStore, t: u32, pt: Point2) -> [f64; 3] {
        let tri = &self.triangles[t as usize];
        [0, 1, 2].map(|i| {
            let (a, b) = tri.edge(i);
            orient(store.xy(a), store.xy(b), pt)
        })
    }

    /// Inserts point `p` of the store into the TIN and re-legalises.
    ///
    /// A point inside a triangle splits it in three, a point on an edge splits the triangles
    /// either side in two (one for a hull edge). A pinned edge which is split stays pinned as
    /// its two halves.
    ///
    /// # Errors
    /// [`TinError::SingularConfiguration`] if `p` is already in the TIN, lies on a vertex or is
    /// outside the hull.
    pub fn insert(&mut self, store: &PointStore, p: u32) -> Result<()> {
        if self.contains_vertex(p) {
            return Err(TinError::SingularConfiguration(format!(
                "point {} is already in the TIN",
                store.number(p)
            )));
        }
        if self.vt.len() <= p as usize {
            self.vt.resize(p as usize + 1, None);
        }

        let hint = self.len().checked_sub(1).map(|x| x as u32);
        let queue = match self.locate(store, store.xy(p), hint) {
            Location::Inside(t) => self.split_tri(t, p),
            Location::OnEdge(t, i) => self.split_edge(t, i, p),
            Location::OnVertex(v) => {
                return Err(TinError::SingularConfiguration(format!(
                    "point {} is on point {}",
                    store.number(p),
                    store.number(v)
                )))
            }
            Location::Outside => {
                return Err(TinError::SingularConfiguration(format!(
                    "point {} is outside the TIN",
                    store.number(p)
                )))
            }
        };

        self.legalize(store, queue, &mut FlipBudget::unlimited(), &Monitor::new())
    }

    fn push(&mut self, tri: Triangle) -> u32 {
        self.triangles.push(tri);
        (self.triangles.len() - 1) as u32
    }

    /// 1 -> 3 split, returning the edges to legalise.
    fn split_tri(&mut self, t: u32, p: u32) -> VecDeque<(u32, u32)> {
        let Triangle {
            v: [v0, v1, v2],
            n: [n0, n1, n2],
        } = self.triangles[t as usize];

        let t1 = t1_index(self);
        let t2 = t1 + 1;

        self.triangles[t as usize] = Triangle {
            v: [v0, v1, p],
            n: [Some(t1), Some(t2), n2],
        };
        self.push(Triangle {
            v: [v1, v2, p],
            n: [Some(t2), Some(t), n0],
        });
        self.push(Triangle {
            v: [v2, v0, p],
            n: [Some(t), Some(t1), n1],
        });

        self.relink_across(n0, v2, v1, t1);
        self.relink_across(n1, v0, v2, t2);

        self.vt[v0 as usize] = Some(t);
        self.vt[v1 as usize] = Some(t);
        self.vt[p as usize] = Some(t);
        self.vt[v2 as usize] = Some(t1);

        VecDeque::from([(v0, v1), (v1, v2), (v2, v0)])
    }

    /// 2 -> 4 split (1 -> 2 on the hull), returning the edges to legalise.
    fn split_edge(&mut self, t: u32, i: usize, p: u32) -> VecDeque<(u32, u32)> {
        let tri = self.triangles[t as usize];
        let c = tri.v[i];
        let (a, b) = tri.edge(i);
        let t_a = tri.n[(i + 1) % 3]; // across b-c
        let t_b = tri.n[(i + 2) % 3]; // across c-a
        let u = tri.n[i];

        let t1 = t1_index(self);
        let mut queue = VecDeque::from([(c, a), (b, c)]);

        match u.map(|u| (u, self.triangles[u as usize])) {
            Some((u, utri)) => {
                let j = utri.edge_slot(b, a).unwrap_or(0);
                let d = utri.v[j];
                let u_a = utri.n[(j + 1) % 3]; // across a-d
                let u_b = utri.n[(j + 2) % 3]; // across d-b
                let u1 = t1 + 1;

                self.triangles[t as usize] = Triangle {
                    v: [c, a, p],
                    n: [Some(u1), Some(t1), t_b],
                };
                self.push(Triangle {
                    v: [c, p, b],
                    n: [Some(u), t_a, Some(t)],
                });
                self.triangles[u as usize] = Triangle {
                    v: [d, b, p],
                    n: [Some(t1), Some(u1), u_b],
                };
                self.push(Triangle {
                    v: [d, p, a],
                    n: [Some(t), u_a, Some(u)],
                });

                self.relink_across(t_a, c, b, t1);
                self.relink_across(u_a, d, a, u1);

                self.vt[d as usize] = Some(u);
                self.vt[a as usize] = Some(u1);
                queue.extend([(d, b), (a, d)]);
            }
            None => {
                self.triangles[t as usize] = Triangle {
                    v: [c, a, p],
                    n: [None, Some(t1), t_b],
                };
                self.push(Triangle {
                    v: [c, p, b],
                    n: [None, t_a, Some(t)],
                });
                self.relink_across(t_a, c, b, t1);
                self.vt[a as usize] = Some(t);

                if let Some(k) = self.hull.iter().position(|&x| x == a) {
                    self.hull.insert(k + 1, p);
                }
            }
        }

        self.vt[c as usize] = Some(t);
        self.vt[p as usize] = Some(t);
        self.vt[b as usize] = Some(t1);

        if self.constrained.remove(&ord_edge(a, b)) {
            self.pin(a, p);
            self.pin(p, b);
        }

        queue
    }

    /// The unpinned interior edges which fail the in-circle test.
    pub fn non_delaunay_edges(&self, store: &PointStore) -> Vec<(u32, u32)> {
        self.edges()
            .into_iter()
            .filter(|e| !e.constrained)
            .filter(|e| {
                let i = self.triangles[e.left as usize].edge_slot(e.a, e.b);
                let Some((p, q)) = i.and_then(|i| self.quad(e.left, i)) else {
                    return false;
                };
                let [pp, pa, pb, pq] = [p, e.a, e.b, q].map(|x| store.xy(x));
                in_circle(pp, pa, pb, pq) > 0.0
            })
            .map(|e| (e.a, e.b))
            .collect()
    }

    /// The elevation of the TIN at a station.
    ///
    /// # Errors
    /// [`TinError::StationOutOfRange`] if `pt` is outside the TIN.
    pub fn elevation_at(&self, store: &PointStore, pt: Point2) -> Result<f64> {
        let out = TinError::StationOutOfRange { at: pt };
        let t = match self.locate(store, pt, None) {
            Location::Inside(t) | Location::OnEdge(t, _) => t,
            Location::OnVertex(v) => return Ok(store.z(v)),
            Location::Outside => return Err(out),
        };

        let tri = self.triangles[t as usize].v.map(|p| store.xyz(p));
        Plane::from(tri).register_z(pt).ok_or(out)
    }
}

fn t1_index(tin: &Tin) -> u32 {
    tin.triangles.len() as u32
}

fn classify(tri: &Triangle, t: u32, o: [f64; 3]) -> Location {
    let zeros = [0, 1, 2].map(|i| o[i] == 0.0);
    match zeros {
        [false, false, false] => Location::Inside(t),
        [true, false, false] => Location::OnEdge(t, 0),
        [false, true, false] => Location::OnEdge(t, 1),
        [false, false, true] => Location::OnEdge(t, 2),
        // on two edges, so at the vertex they share
        [true, true, false] => Location::OnVertex(tri.v[2]),
        [true, false, true] => Location::OnVertex(tri.v[1]),
        [false, true, true] => Location::OnVertex(tri.v[0]),
        [true, true, true] => Location::Outside,
    }
}
