use crate::*;
use std::sync::atomic::{AtomicBool, AtomicU8, AtomicUsize, Ordering::*};

/// The stages of a TIN build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[repr(u8)]
pub enum Phase {
    Idle,
    Hull,
    Triangulate,
    ConstrainBreaklines,
    FindCritical,
    Trace,
    Smooth,
    Done,
    Cancelled,
    Failed,
}

impl Phase {
    const ALL: [Phase; 10] = [
        Phase::Idle,
        Phase::Hull,
        Phase::Triangulate,
        Phase::ConstrainBreaklines,
        Phase::FindCritical,
        Phase::Trace,
        Phase::Smooth,
        Phase::Done,
        Phase::Cancelled,
        Phase::Failed,
    ];

    /// The user facing description of the phase.
    pub fn label(self) -> &'static str {
        match self {
            Phase::Idle => "",
            Phase::Hull => "Sweeping convex hull...",
            Phase::Triangulate => "Flipping edges...",
            Phase::ConstrainBreaklines => "Inserting breaklines...",
            Phase::FindCritical => "Finding critical points...",
            Phase::Trace => "Drawing rough contours...",
            Phase::Smooth => "Drawing smooth contours...",
            Phase::Done => "Done",
            Phase::Cancelled => "Cancelled",
            Phase::Failed => "Failed",
        }
    }

    /// The build has stopped in this phase.
    pub fn is_terminal(self) -> bool {
        matches!(self, Phase::Done | Phase::Cancelled | Phase::Failed)
    }

    fn from_u8(x: u8) -> Self {
        Self::ALL.get(x as usize).copied().unwrap_or(Phase::Failed)
    }
}

/// A snapshot of build progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub phase: Phase,
    pub done: usize,
    pub total: usize,
}

impl Progress {
    pub fn label(&self) -> &'static str {
        self.phase.label()
    }

    /// Fraction through the current phase, `0..=1`.
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            (self.done as f64 / self.total as f64).min(1.0)
        }
    }
}

/// Shared progress and cancellation state of a build.
///
/// The build thread reports into the monitor, any other thread may read it or request a
/// cancel. A cancel is observed at the next [`Monitor::checkpoint`].
#[derive(Debug, Default)]
pub struct Monitor {
    phase: AtomicU8,
    done: AtomicUsize,
    total: AtomicUsize,
    cancel: AtomicBool,
}

impl Monitor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move to `phase`, resetting the counter to `0 / total`.
    pub fn enter(&self, phase: Phase, total: usize) {
        if !phase.is_terminal() {
            log::info!("{}", phase.label());
        }
        self.done.store(0, Relaxed);
        self.total.store(total, Relaxed);
        self.phase.store(phase as u8, Release);
    }

    pub fn advance(&self, by: usize) {
        self.done.fetch_add(by, Relaxed);
    }

    /// Returns `Err(Cancelled)` once a cancel is requested.
    pub fn checkpoint(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(TinError::Cancelled)
        } else {
            Ok(())
        }
    }

    /// Advance by one and check for cancellation.
    pub fn tick(&self) -> Result<()> {
        self.advance(1);
        self.checkpoint()
    }

    pub fn cancel(&self) {
        self.cancel.store(true, Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.load(Acquire)
    }

    pub fn phase(&self) -> Phase {
        Phase::from_u8(self.phase.load(Acquire))
    }

    pub fn progress(&self) -> Progress {
        Progress {
            phase: self.phase(),
            done: self.done.load(Relaxed),
            total: self.total.load(Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phase_roundtrip() {
        for p in Phase::ALL {
            assert_eq!(Phase::from_u8(p as u8), p);
        }
        assert_eq!(Phase::Hull.label(), "Sweeping convex hull...");
        assert_eq!(Phase::Smooth.label(), "Drawing smooth contours...");
    }

    #[test]
    fn monitor_counts_and_cancels() {
        let m = Monitor::new();
        assert_eq!(m.phase(), Phase::Idle);

        m.enter(Phase::Trace, 4);
        m.tick().unwrap();
        m.tick().unwrap();
        let p = m.progress();
        assert_eq!((p.phase, p.done, p.total), (Phase::Trace, 2, 4));
        assert_eq!(p.fraction(), 0.5);
        assert_eq!(p.label(), "Drawing rough contours...");

        m.cancel();
        assert_eq!(m.tick(), Err(TinError::Cancelled));
        assert_eq!(m.checkpoint(), Err(TinError::Cancelled));
    }
}
