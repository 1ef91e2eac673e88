use crate::*;
use rayon::prelude::*;

/// Samples per span when measuring along a curve.
const SAMPLES: usize = 16;

/// Fits tangent continuous cubic Bezier curves through rough contours.
///
/// Tangents at the knots are Catmull-Rom: half the chord between the neighbouring knots, or
/// the end chord at the ends of an open contour. A closed contour makes a closed curve.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ContourSmoother {
    /// Douglas-Peucker tolerance applied to the rough points first, `0` keeps every point.
    pub tolerance: f64,
}

impl ContourSmoother {
    pub fn new(tolerance: f64) -> Self {
        Self { tolerance }
    }

    /// Smooths one contour.
    ///
    /// Contours with fewer than 3 knots (4 when closed) after simplification are returned as
    /// rough polylines.
    pub fn smooth(&self, rough: &Contour) -> Contour {
        if rough.kind == ContourKind::Smooth {
            return rough.clone();
        }

        let mut knots = rough.points.clone();
        if self.tolerance > 0.0 {
            if let Ok(p) = Polyline3::new(knots.iter().copied()) {
                knots = p.simplify(self.tolerance).into_iter().collect();
            }
        }

        let closed = rough.closed && knots.first() == knots.last();
        if knots.len() < 3 || (closed && knots.len() < 4) {
            return Contour {
                points: knots,
                ..rough.clone()
            };
        }

        let n = knots.len();
        let tangents = (0..n)
            .map(|i| {
                if closed {
                    // the last knot repeats the first
                    let m = n - 1;
                    knots[(i + 1) % m].sub(knots[(i + m - 1) % m]).scale(0.5)
                } else if i == 0 {
                    knots[1].sub(knots[0])
                } else if i == n - 1 {
                    knots[n - 1].sub(knots[n - 2])
                } else {
                    knots[i + 1].sub(knots[i - 1]).scale(0.5)
                }
            })
            .collect::<Vec<_>>();

        let mut points = Vec::with_capacity(3 * (n - 1) + 1);
        points.push(knots[0]);
        for i in 0..n - 1 {
            points.push(knots[i].add(tangents[i].scale(1.0 / 3.0)));
            points.push(knots[i + 1].sub(tangents[i + 1].scale(1.0 / 3.0)));
            points.push(knots[i + 1]);
        }

        Contour {
            elevation: rough.elevation,
            closed: rough.closed,
            kind: ContourKind::Smooth,
            points,
        }
    }

    /// Smooths the contours in parallel, keeping their order.
    ///
    /// # Errors
    /// [`TinError::Cancelled`] if the build is cancelled.
    pub fn smooth_all(&self, rough: &[Contour], monitor: &Monitor) -> Result<Vec<Contour>> {
        rough
            .par_iter()
            .map(|c| {
                monitor.checkpoint()?;
                let s = self.smooth(c);
                monitor.advance(1);
                Ok(s)
            })
            .collect()
    }
}

/// Evaluates the cubic Bezier with control points `p` at `t` in `0..=1`.
pub fn bezier(p: [Point3; 4], t: f64) -> Point3 {
    let u = 1.0 - t;
    let [a, b, c, d] = p;
    a.scale(u * u * u)
        .add(b.scale(3.0 * u * u * t))
        .add(c.scale(3.0 * u * t * t))
        .add(d.scale(t * t * t))
}

impl Contour {
    /// The contour as cubic spans. A rough segment is a straight span.
    pub fn spans(&self) -> Vec<[Point3; 4]> {
        match self.kind {
            ContourKind::Smooth => self
                .points
                .windows(4)
                .step_by(3)
                .map(|w| [w[0], w[1], w[2], w[3]])
                .collect(),
            ContourKind::Rough => self
                .points
                .windows(2)
                .map(|w| {
                    let d = w[1].sub(w[0]).scale(1.0 / 3.0);
                    [w[0], w[0].add(d), w[1].sub(d), w[1]]
                })
                .collect(),
        }
    }

    /// Points along the contour, `per_span` for each span plus the start.
    pub fn sample(&self, per_span: usize) -> Vec<Point3> {
        let per_span = per_span.max(1);
        let spans = self.spans();
        let mut pts = Vec::with_capacity(spans.len() * per_span + 1);
        if let Some(s) = spans.first() {
            pts.push(s[0]);
        }
        for s in spans {
            pts.extend(
                (1..=per_span).map(|i| bezier(s, i as f64 / per_span as f64).with_z(self.elevation)),
            );
        }
        pts
    }

    /// The point a plan distance `along` the contour from its start.
    ///
    /// # Errors
    /// [`TinError::StationOutOfRange`] past either end, reported as `[along, 0]`
    /// (station, offset).
    pub fn station(&self, along: f64) -> Result<Point3> {
        let out = TinError::StationOutOfRange { at: [along, 0.0] };
        if !(along >= 0.0) {
            return Err(out);
        }

        let mut walked = 0.0;
        let mut last = None;
        for span in self.spans() {
            let (mut prev, mut tp) = (span[0], 0.0);
            for i in 1..=SAMPLES {
                let t = i as f64 / SAMPLES as f64;
                let p = bezier(span, t);
                let d = len_xy(prev, p);
                if d > 0.0 && walked + d >= along {
                    let t = tp + (t - tp) * (along - walked) / d;
                    return Ok(bezier(span, t).with_z(self.elevation));
                }
                walked += d;
                prev = p;
                tp = t;
            }
            last = Some(span[3]);
        }

        // the far end, within rounding of the summed length
        match last {
            Some(p) if along - walked <= 1e-9 * walked.max(1.0) => Ok(p.with_z(self.elevation)),
            _ => Err(out),
        }
    }
}
