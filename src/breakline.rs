use crate::*;
use rayon::prelude::*;
use std::collections::BTreeMap;

/// A sequence of point numbers, each consecutive pair being a segment which must be a TIN
/// edge. A closed breakline repeats its first number.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Breakline(pub Vec<i32>);

impl Breakline {
    pub fn new(numbers: impl IntoIterator<Item = i32>) -> Self {
        Self(numbers.into_iter().collect())
    }

    pub fn numbers(&self) -> &[i32] {
        &self.0
    }

    pub fn is_closed(&self) -> bool {
        self.0.len() > 2 && self.0.first() == self.0.last()
    }

    /// Consecutive pairs, repeated numbers skipped.
    pub fn segments(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        self.0
            .windows(2)
            .map(|w| (w[0], w[1]))
            .filter(|(a, b)| a != b)
    }
}

/// Breaklines resolved against a TIN.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedBreaklines {
    /// Segments as point index pairs, in breakline order.
    pub segments: Vec<(u32, u32)>,
    /// The breakline index of each segment.
    pub owners: Vec<usize>,
    /// Breaklines dropped in lenient mode, with the reason.
    pub rejected: Vec<(Breakline, TinError)>,
}

#[derive(Clone, Copy)]
struct Seg {
    owner: usize,
    a: u32,
    b: u32,
    line: Segment2,
}

/// Resolves breaklines to point indices and checks that they only meet at shared listed
/// points.
///
/// Every number must be a point of the `tin`. Breaklines are checked in order, each against
/// itself and those accepted before it.
///
/// In strict mode the first invalid breakline fails with its error, otherwise it is rejected
/// and reported.
///
/// # Errors
/// - [`TinError::BadBreaklineEndpoint`] for a point that is not in the TIN,
/// - [`TinError::BreaklineCrossing`] for two segments crossing away from a listed point.
pub fn resolve_breaklines(
    store: &PointStore,
    tin: &Tin,
    breaklines: &[Breakline],
    strict: bool,
) -> Result<ResolvedBreaklines> {
    let mut accepted: Vec<Seg> = Vec::new();
    let mut rejected = Vec::new();

    for (k, bl) in breaklines.iter().enumerate() {
        match check_breakline(store, tin, k, bl, &accepted) {
            Ok(segs) => accepted.extend(segs),
            Err(e) if strict => return Err(e),
            Err(e) => {
                log::warn!("breakline {} rejected: {}", k, e);
                rejected.push((bl.clone(), e));
            }
        }
    }

    Ok(ResolvedBreaklines {
        owners: accepted.iter().map(|s| s.owner).collect(),
        segments: accepted.into_iter().map(|s| (s.a, s.b)).collect(),
        rejected,
    })
}

fn check_breakline(
    store: &PointStore,
    tin: &Tin,
    owner: usize,
    bl: &Breakline,
    accepted: &[Seg],
) -> Result<Vec<Seg>> {
    let index = |n: i32| {
        store
            .index_of(n)
            .filter(|&i| tin.contains_vertex(i))
            .ok_or(TinError::BadBreaklineEndpoint {
                breakline: owner,
                point: n,
            })
    };

    let segs = bl
        .segments()
        .map(|(a, b)| {
            let (a, b) = (index(a)?, index(b)?);
            Ok(Seg {
                owner,
                a,
                b,
                line: Segment2::new(store.xy(a), store.xy(b)),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    // against itself
    for (i, s) in segs.iter().enumerate() {
        if let Some(at) = segs[i + 1..].iter().find_map(|t| s.line.crossing(&t.line)) {
            return Err(TinError::BreaklineCrossing {
                first: owner,
                second: owner,
                at,
            });
        }
    }

    // against the accepted
    let crossing = segs.par_iter().find_map_first(|s| {
        accepted
            .iter()
            .find_map(|t| s.line.crossing(&t.line).map(|at| (t.owner, at)))
    });
    if let Some((first, at)) = crossing {
        return Err(TinError::BreaklineCrossing {
            first,
            second: owner,
            at,
        });
    }

    Ok(segs)
}

/// Joins segments which share end points into the longest runs, breaking at points where
/// more than two segments meet. Closed loops repeat their first number.
pub fn join_segments(segments: impl IntoIterator<Item = (i32, i32)>) -> Vec<Breakline> {
    let mut adj: BTreeMap<i32, Vec<i32>> = BTreeMap::new();
    for (a, b) in segments {
        if a == b {
            continue;
        }
        adj.entry(a).or_default().push(b);
        adj.entry(b).or_default().push(a);
    }
    for v in adj.values_mut() {
        v.sort_unstable();
        v.dedup();
    }

    let mut used: HashSet<(i32, i32)> = HashSet::default();
    let key = |a: i32, b: i32| if a <= b { (a, b) } else { (b, a) };
    let mut lines = Vec::new();

    let walk = |start: i32, used: &mut HashSet<(i32, i32)>| {
        let mut out = Vec::new();
        for &first in &adj[&start] {
            if used.contains(&key(start, first)) {
                continue;
            }
            let mut line = vec![start];
            let (mut prev, mut cur) = (start, first);
            used.insert(key(prev, cur));
            line.push(cur);
            while adj[&cur].len() == 2 && cur != start {
                let Some(&next) = adj[&cur].iter().find(|&&n| n != prev) else { break };
                if !used.insert(key(cur, next)) {
                    break;
                }
                line.push(next);
                prev = cur;
                cur = next;
            }
            out.push(Breakline(line));
        }
        out
    };

    // runs start at ends and junctions
    let starts = adj
        .iter()
        .filter(|(_, v)| v.len() != 2)
        .map(|(&k, _)| k)
        .collect::<Vec<_>>();
    for s in starts {
        lines.extend(walk(s, &mut used));
    }
    // what remains are loops
    let rest = adj.keys().copied().collect::<Vec<_>>();
    for s in rest {
        lines.extend(walk(s, &mut used));
    }

    lines
}

/// Joins breaklines which share end points, such as fragments of the same feature.
pub fn join_breaklines(breaklines: &[Breakline]) -> Vec<Breakline> {
    join_segments(breaklines.iter().flat_map(|b| b.segments()))
}

impl Tin {
    /// The pinned edges, joined back into breaklines of point numbers.
    pub fn breaklines(&self, store: &PointStore) -> Vec<Breakline> {
        join_segments(
            self.constrained_edges()
                .map(|(a, b)| (store.number(a), store.number(b))),
        )
    }
}
