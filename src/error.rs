use crate::*;

/// Failures raised while building or querying a TIN.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TinError {
    #[error("a TIN needs at least 3 points, got {count}")]
    TooFewPoints { count: usize },

    #[error("points {first} and {second} are in the same place")]
    DuplicatePoints { first: i32, second: i32 },

    #[error("all points are collinear")]
    CollinearPoints,

    #[error("point {number} has a non-finite coordinate")]
    InvalidPoint { number: i32 },

    #[error("no free number left to renumber point {number}")]
    NoFreeNumber { number: i32 },

    #[error("line {line}: bad point record '{text}'")]
    BadPointRecord { line: usize, text: String },

    #[error("breakline {breakline} ends at point {point}, which is not in the TIN")]
    BadBreaklineEndpoint { breakline: usize, point: i32 },

    #[error("breaklines {first} and {second} intersect at ({}, {})", .at[0], .at[1])]
    BreaklineCrossing {
        first: usize,
        second: usize,
        at: Point2,
    },

    #[error("breakline {from}-{to} crosses another breakline or point near ({}, {})", .at[0], .at[1])]
    BreaklinesCross { from: i32, to: i32, at: Point2 },

    #[error("line {line}: bad breakline format '{text}'")]
    BadBreaklineFormat { line: usize, text: String },

    #[error("singular configuration: {0}")]
    SingularConfiguration(String),

    #[error("Took too long to make TIN ({flips} flips)")]
    TookTooLong { flips: usize },

    #[error("({}, {}) is outside the TIN", .at[0], .at[1])]
    StationOutOfRange { at: Point2 },

    #[error("build cancelled")]
    Cancelled,
}

impl TinError {
    /// Errors that can be retried, either with relaxed settings or by asking again.
    pub fn is_recoverable(&self) -> bool {
        use TinError::*;
        match self {
            SingularConfiguration(_) | TookTooLong { .. } | Cancelled => true,
            StationOutOfRange { .. } | BadPointRecord { .. } | BadBreaklineFormat { .. } => true,
            TooFewPoints { .. }
            | DuplicatePoints { .. }
            | CollinearPoints
            | InvalidPoint { .. }
            | NoFreeNumber { .. }
            | BadBreaklineEndpoint { .. }
            | BreaklineCrossing { .. }
            | BreaklinesCross { .. } => false,
        }
    }

    /// The error concerns a breakline, and lenient builds may drop the offender.
    pub fn is_breakline_error(&self) -> bool {
        matches!(
            self,
            TinError::BadBreaklineEndpoint { .. }
                | TinError::BreaklineCrossing { .. }
                | TinError::BreaklinesCross { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages() {
        let e = TinError::BreaklineCrossing {
            first: 0,
            second: 1,
            at: [1.5, 2.0],
        };
        assert_eq!(e.to_string(), "breaklines 0 and 1 intersect at (1.5, 2)");

        let e = TinError::TookTooLong { flips: 12 };
        assert_eq!(e.to_string(), "Took too long to make TIN (12 flips)");
    }

    #[test]
    fn recoverable() {
        assert!(TinError::Cancelled.is_recoverable());
        assert!(TinError::TookTooLong { flips: 1 }.is_recoverable());
        assert!(TinError::SingularConfiguration("x".into()).is_recoverable());
        assert!(!TinError::CollinearPoints.is_recoverable());
        assert!(!TinError::TooFewPoints { count: 2 }.is_recoverable());

        let e = TinError::BreaklinesCross {
            from: 1,
            to: 2,
            at: [0.0, 0.0],
        };
        assert!(e.is_breakline_error());
        assert!(!e.is_recoverable());
        assert!(!TinError::Cancelled.is_breakline_error());
    }
}
