#![forbid(unsafe_code)]

//! Reportable reorder failures.
//!
//! Only two situations surface as errors. Everything else the coordinator
//! handles silently: a shape change or a second start cancels the active
//! session, and lookups that miss during resolution are skipped.

use std::fmt;

use crate::index::GridIndex;

/// Errors returned by the reorder coordinator.
#[derive(Debug, Clone, PartialEq)]
pub enum ReorderError {
    /// A drag was requested for an index with no mounted cell.
    InvalidDragTarget { index: GridIndex },
    /// A configuration value is out of range.
    InvalidConfig { field: &'static str, value: f64 },
}

impl fmt::Display for ReorderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidDragTarget { index } => {
                write!(f, "drag target {index} is not visible")
            }
            Self::InvalidConfig { field, value } => {
                write!(f, "invalid {field} value {value}")
            }
        }
    }
}

impl std::error::Error for ReorderError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages() {
        let err = ReorderError::InvalidDragTarget {
            index: GridIndex::new(4, 1),
        };
        assert_eq!(err.to_string(), "drag target (4, 1) is not visible");

        let err = ReorderError::InvalidConfig {
            field: "autoscroll.coefficient",
            value: 0.0,
        };
        assert_eq!(err.to_string(), "invalid autoscroll.coefficient value 0");
    }
}
