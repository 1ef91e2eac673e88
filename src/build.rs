use crate::*;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::JoinHandle;

/// Everything a build consumes.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct BuildInput {
    pub points: PointStore,
    /// Selects the topographic points, all points with none.
    pub criteria: Criteria,
    pub breaklines: Vec<Breakline>,
}

/// The frozen result of a build.
#[derive(Debug, Clone, PartialEq)]
pub struct Surface {
    pub points: PointStore,
    pub tin: Tin,
    pub critical: Vec<CriticalPoint>,
    pub rough: Vec<Contour>,
    /// Empty if smoothing is switched off.
    pub smooth: Vec<Contour>,
    /// Breaklines dropped by a lenient build.
    pub rejected: Vec<(Breakline, TinError)>,
}

impl Surface {
    /// See [`Tin::elevation_at`].
    pub fn elevation_at(&self, pt: Point2) -> Result<f64> {
        self.tin.elevation_at(&self.points, pt)
    }

    /// The pinned edges joined into breaklines.
    pub fn breaklines(&self) -> Vec<Breakline> {
        self.tin.breaklines(&self.points)
    }

    /// The 3D triangles.
    pub fn tris(&self) -> impl ExactSizeIterator<Item = [Point3; 3]> + '_ {
        self.tin.tris(&self.points)
    }

    pub fn extents(&self) -> Extents3 {
        self.tin.extents(&self.points)
    }
}

impl Area for Surface {
    /// Plan area inside the hull.
    fn area(&self) -> f64 {
        self.tin
            .boundary(&self.points)
            .map(|b| b.area())
            .unwrap_or_default()
    }
}

/// Runs the build pipeline on the calling thread, reporting into `monitor`.
///
/// The phases run in order: [`Phase::Hull`], [`Phase::Triangulate`],
/// [`Phase::ConstrainBreaklines`], [`Phase::FindCritical`], [`Phase::Trace`] and
/// [`Phase::Smooth`] (when enabled). The monitor finishes in [`Phase::Done`],
/// [`Phase::Cancelled`] or [`Phase::Failed`].
///
/// # Errors
/// Whatever error stopped the pipeline; nothing partial is returned.
pub fn build(input: BuildInput, config: &BuildConfig, monitor: &Monitor) -> Result<Surface> {
    let r = run(input, config, monitor);
    match &r {
        Ok(_) => monitor.enter(Phase::Done, 0),
        Err(TinError::Cancelled) => {
            log::info!("build cancelled");
            monitor.enter(Phase::Cancelled, 0);
        }
        Err(e) => {
            log::warn!("build failed: {}", e);
            monitor.enter(Phase::Failed, 0);
        }
    }
    r
}

fn run(input: BuildInput, config: &BuildConfig, monitor: &Monitor) -> Result<Surface> {
    let BuildInput {
        points,
        criteria,
        breaklines,
    } = input;

    let selected = points.select(&criteria);
    log::debug!("{} of {} points are topographic", selected.len(), points.len());

    monitor.enter(Phase::Hull, selected.len());
    let mut tin = Tin::sweep_hull(&points, &selected, config.duplicate_tolerance, monitor)?;

    monitor.enter(Phase::Triangulate, tin.len() * 3 / 2);
    tin.legalize_all(&points, config, monitor)?;

    let segments = breaklines.iter().map(|b| b.segments().count()).sum();
    monitor.enter(Phase::ConstrainBreaklines, segments);
    let rejected = tin.insert_breaklines(&points, &breaklines, config, monitor)?;

    // the TIN is frozen from here
    let tin = tin;

    monitor.enter(Phase::FindCritical, tin.vertices().count());
    monitor.checkpoint()?;
    let critical = tin.critical_points(&points);
    monitor.advance(tin.vertices().count());

    let levels = elevation_range(&critical)
        .map(|(lo, hi)| contour_levels(config.contour_interval, &config.extra_levels, lo, hi))
        .unwrap_or_default();
    monitor.enter(Phase::Trace, levels.len());
    let rough = tin.contours(&points, &levels, config.level_epsilon, monitor)?;

    let smooth = if config.smooth {
        monitor.enter(Phase::Smooth, rough.len());
        ContourSmoother::new(config.smooth_tolerance).smooth_all(&rough, monitor)?
    } else {
        Vec::new()
    };

    let (zlo, zhi) = tin.extents(&points).z_range();
    log::info!(
        "built TIN of {} triangles over {} points, z {} to {}, {} contours",
        tin.len(),
        selected.len(),
        zlo,
        zhi,
        rough.len()
    );

    Ok(Surface {
        points,
        tin,
        critical,
        rough,
        smooth,
        rejected,
    })
}

enum State {
    Running(JoinHandle<Result<Surface>>),
    Finished(Result<Arc<Surface>>),
}

/// A build running on a background thread.
///
/// Progress can be polled and a cancel requested from any thread. The result is published
/// once, when the build finishes. Dropping a running build cancels it.
pub struct Build {
    monitor: Arc<Monitor>,
    state: Mutex<State>,
}

impl Build {
    /// Starts building `input` on a new thread.
    pub fn start(input: BuildInput, config: BuildConfig) -> Self {
        let monitor = Arc::new(Monitor::new());
        let m = Arc::clone(&monitor);
        let handle = std::thread::spawn(move || build(input, &config, &m));

        Self {
            monitor,
            state: Mutex::new(State::Running(handle)),
        }
    }

    /// Requests a cancel, observed at the next checkpoint of the build.
    pub fn cancel(&self) {
        self.monitor.cancel();
    }

    pub fn progress(&self) -> Progress {
        self.monitor.progress()
    }

    pub fn is_finished(&self) -> bool {
        match &*self.lock() {
            State::Running(h) => h.is_finished(),
            State::Finished(_) => true,
        }
    }

    /// The result, if the build has finished.
    pub fn result(&self) -> Option<Result<Arc<Surface>>> {
        let mut state = self.lock();
        if let State::Running(h) = &*state {
            if !h.is_finished() {
                return None;
            }
        }
        Some(settle(&mut state))
    }

    /// Blocks until the build finishes.
    pub fn wait(&self) -> Result<Arc<Surface>> {
        settle(&mut self.lock())
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for Build {
    fn drop(&mut self) {
        if !self.is_finished() {
            self.cancel();
        }
    }
}

/// Joins a running build, returning its result.
fn settle(state: &mut State) -> Result<Arc<Surface>> {
    if let State::Running(_) = state {
        let old = std::mem::replace(state, State::Finished(Err(TinError::Cancelled)));
        if let State::Running(h) = old {
            let r = h.join().unwrap_or_else(|_| {
                Err(TinError::SingularConfiguration(
                    "build thread panicked".to_string(),
                ))
            });
            *state = State::Finished(r.map(Arc::new));
        }
    }

    match state {
        State::Finished(r) => r.clone(),
        State::Running(_) => Err(TinError::Cancelled),
    }
}
