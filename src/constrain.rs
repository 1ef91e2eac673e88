use crate::delaunay::FlipBudget;
use crate::tin::ord_edge;
use crate::*;
use std::collections::VecDeque;

impl Tin {
    /// Resolves the `breaklines` and forces each of their segments to be a pinned edge.
    ///
    /// The breaklines are validated first (see [`resolve_breaklines`]). Each segment which is
    /// not already an edge is forced in by flipping the edges it crosses, after which the
    /// surrounding edges are re-legalised. Pinned edges are never flipped.
    ///
    /// With `config.strict_breaklines` unset, a breakline which fails is unpinned and returned
    /// with its error instead of failing the whole insertion.
    ///
    /// # Errors
    /// - the breakline errors of [`resolve_breaklines`],
    /// - [`TinError::BreaklinesCross`] if a segment passes through a point or crosses a pinned
    ///   edge,
    /// - [`TinError::SingularConfiguration`] if a segment cannot be forced in,
    /// - [`TinError::TookTooLong`] and [`TinError::Cancelled`] as for
    ///   [`Tin::legalize_all`].
    pub fn insert_breaklines(
        &mut self,
        store: &PointStore,
        breaklines: &[Breakline],
        config: &BuildConfig,
        monitor: &Monitor,
    ) -> Result<Vec<(Breakline, TinError)>> {
        let strict = config.strict_breaklines;
        let ResolvedBreaklines {
            segments,
            owners,
            mut rejected,
        } = resolve_breaklines(store, self, breaklines, strict)?;

        let mut budget = FlipBudget::new(config, store.len());
        let mut dropped = false;

        // segments of a breakline are contiguous
        let mut start = 0;
        while start < segments.len() {
            let owner = owners[start];
            let end = owners[start..]
                .iter()
                .position(|&o| o != owner)
                .map_or(segments.len(), |k| start + k);

            let mut pinned = Vec::new();
            let r = segments[start..end].iter().try_for_each(|&(a, b)| {
                let fresh = !self.is_constrained(a, b);
                self.force_edge(store, a, b, &mut budget, monitor)?;
                if fresh {
                    pinned.push(ord_edge(a, b));
                }
                monitor.tick()
            });

            match r {
                Ok(()) => (),
                Err(e) if !strict && e.is_breakline_error() => {
                    log::warn!("breakline {} rejected: {}", owner, e);
                    for p in &pinned {
                        self.constrained.remove(p);
                    }
                    rejected.push((breaklines[owner].clone(), e));
                    dropped = true;
                }
                Err(e) => return Err(e),
            }

            start = end;
        }

        if dropped {
            // flips made for a dropped breakline may have left edges illegal
            let queue = self
                .edges()
                .into_iter()
                .filter(|e| e.right.is_some())
                .map(|e| (e.a, e.b))
                .collect();
            self.legalize(store, queue, &mut budget, monitor)?;
        }

        log::debug!(
            "{} pinned edges, {} breaklines rejected, {} flips",
            self.constrained.len(),
            rejected.len(),
            budget.flips()
        );

        Ok(rejected)
    }

    /// Forces the segment `a -> b` to be an edge and pins it.
    ///
    /// # Errors
    /// - [`TinError::BreaklinesCross`] if the segment passes through a point or crosses a
    ///   pinned edge,
    /// - [`TinError::SingularConfiguration`] if `a` or `b` is not in the TIN or the segment
    ///   cannot be forced in.
    pub fn constrain_segment(&mut self, store: &PointStore, a: u32, b: u32) -> Result<()> {
        self.force_edge(store, a, b, &mut FlipBudget::unlimited(), &Monitor::new())
    }

    fn force_edge(
        &mut self,
        store: &PointStore,
        a: u32,
        b: u32,
        budget: &mut FlipBudget,
        monitor: &Monitor,
    ) -> Result<()> {
        if !self.contains_vertex(a) || !self.contains_vertex(b) || a == b {
            return Err(singular(store, a, b));
        }
        if self.has_edge(a, b) {
            self.pin(a, b);
            return Ok(());
        }

        let (pa, pb) = (store.xy(a), store.xy(b));
        let mut queue = VecDeque::from(self.crossed_edges(store, a, b)?);
        let mut legalize = VecDeque::new();
        let mut stalls = 0;

        while let Some((x, y)) = queue.pop_front() {
            let (t, i) = self
                .find_edge(x, y)
                .ok_or_else(|| singular(store, a, b))?;
            let (p, q) = self.quad(t, i).ok_or_else(|| singular(store, a, b))?;
            let [pp, px, py, pq] = [p, x, y, q].map(|v| store.xy(v));

            if orient(pp, px, pq) > 0.0 && orient(pq, py, pp) > 0.0 {
                self.flip(t, i);
                budget.spend()?;
                monitor.checkpoint()?;
                stalls = 0;

                legalize.extend([(x, q), (q, y), (y, p), (p, x)]);
                if segments_cross(pa, pb, pp, pq) {
                    queue.push_back((p, q));
                } else {
                    legalize.push_back((p, q));
                }
            } else {
                // not convex yet, come back once its neighbours have moved
                queue.push_back((x, y));
                stalls += 1;
                if stalls > queue.len() {
                    return Err(singular(store, a, b));
                }
            }
        }

        if !self.has_edge(a, b) {
            return Err(singular(store, a, b));
        }
        self.pin(a, b);
        self.legalize(store, legalize, budget, monitor)
    }

    /// The edges crossed by the segment `a -> b`, in order from `a`, each directed from its
    /// vertex right of the segment to its vertex left of it.
    fn crossed_edges(&self, store: &PointStore, a: u32, b: u32) -> Result<Vec<(u32, u32)>> {
        let (pa, pb) = (store.xy(a), store.xy(b));
        let side = |v: u32| orient(pa, pb, store.xy(v));
        let through = |at: Point2| TinError::BreaklinesCross {
            from: store.number(a),
            to: store.number(b),
            at,
        };

        let ring = self.ring(a).ok_or_else(|| singular(store, a, b))?;
        if let Some(&v) = ring
            .vertices
            .iter()
            .find(|&&v| strictly_between(pa, pb, store.xy(v)))
        {
            return Err(through(store.xy(v)));
        }

        // the triangle around a which the segment leaves through
        let (mut t, mut r, mut l) = ring
            .triangles
            .iter()
            .find_map(|&t| {
                let tri = &self.triangles[t as usize];
                let (c, d) = tri.edge(tri.slot(a)?);
                (side(c) < 0.0 && side(d) > 0.0).then_some((t, c, d))
            })
            .ok_or_else(|| singular(store, a, b))?;

        let mut crossed = Vec::new();
        loop {
            if self.is_constrained(r, l) {
                let at = Segment2::new(pa, pb)
                    .crossing(&Segment2::new(store.xy(r), store.xy(l)))
                    .unwrap_or_else(|| store.xy(r));
                return Err(through(at));
            }
            crossed.push((r, l));
            if crossed.len() > self.len() {
                return Err(singular(store, a, b));
            }

            let tri = &self.triangles[t as usize];
            let u = tri
                .edge_slot(r, l)
                .and_then(|i| tri.n[i])
                .ok_or_else(|| singular(store, a, b))?;
            let utri = &self.triangles[u as usize];
            let e = utri
                .edge_slot(l, r)
                .map(|j| utri.v[j])
                .ok_or_else(|| singular(store, a, b))?;

            if e == b {
                break;
            }
            let s = side(e);
            if s == 0.0 {
                return Err(through(store.xy(e)));
            } else if s > 0.0 {
                l = e;
            } else {
                r = e;
            }
            t = u;
        }

        Ok(crossed)
    }
}

fn singular(store: &PointStore, a: u32, b: u32) -> TinError {
    TinError::SingularConfiguration(format!(
        "could not insert breakline segment {}-{}",
        store.number(a),
        store.number(b)
    ))
}
