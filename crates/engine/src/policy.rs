//! Scheduling policies for assigning work units to workers.

use crate::error::EngineError;
use serde::{Deserialize, Serialize};

/// How the domain is sliced and handed to workers.
///
/// Chunk sizes count scheduling units: rows of a 2-D domain, cells of a
/// 1-D one. Dispatch happens once when the work source is built, never per
/// cell. `Auto` is an alias for `Static { chunk: None }`; there is no
/// hidden heuristic behind it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Policy {
    /// Precomputed ranges. `chunk: None` gives each worker one contiguous
    /// range; `Some(c)` deals fixed-size chunks round-robin.
    Static { chunk: Option<usize> },
    /// Workers pull fixed-size chunks from a shared cursor. `chunk: None`
    /// leaves the size to the engine, which picks a claim-amortizing
    /// default distinct from an explicit `Some(1)`.
    Dynamic { chunk: Option<usize> },
    /// Like `Dynamic`, but the chunk shrinks with the remaining work:
    /// `chunk = max(min_chunk, remaining / (workers * factor))`.
    Guided { min_chunk: usize, factor: usize },
    Auto,
}

impl Policy {
    pub fn contiguous() -> Self {
        Policy::Static { chunk: None }
    }

    pub fn dynamic() -> Self {
        Policy::Dynamic { chunk: None }
    }

    pub fn guided() -> Self {
        Policy::Guided {
            min_chunk: 1,
            factor: 2,
        }
    }

    /// Label used in reports: `static`, `static,100`, `dynamic,1`,
    /// `guided`, `auto`.
    pub fn name(&self) -> String {
        match self {
            Policy::Static { chunk: None } => "static".to_string(),
            Policy::Static { chunk: Some(chunk) } => format!("static,{chunk}"),
            Policy::Dynamic { chunk: None } => "dynamic".to_string(),
            Policy::Dynamic { chunk: Some(chunk) } => format!("dynamic,{chunk}"),
            Policy::Guided { .. } => "guided".to_string(),
            Policy::Auto => "auto".to_string(),
        }
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        match *self {
            Policy::Static { chunk: Some(0) } => Err(EngineError::Config(
                "static chunk size must be positive".into(),
            )),
            Policy::Dynamic { chunk: Some(0) } => Err(EngineError::Config(
                "dynamic chunk size must be positive".into(),
            )),
            Policy::Guided { min_chunk: 0, .. } => Err(EngineError::Config(
                "guided minimum chunk must be positive".into(),
            )),
            Policy::Guided { factor: 0, .. } => Err(EngineError::Config(
                "guided shrink factor must be positive".into(),
            )),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_match_report_labels() {
        assert_eq!(Policy::contiguous().name(), "static");
        assert_eq!(Policy::Static { chunk: Some(100) }.name(), "static,100");
        assert_eq!(Policy::dynamic().name(), "dynamic");
        assert_eq!(Policy::Dynamic { chunk: Some(1) }.name(), "dynamic,1");
        assert_eq!(Policy::guided().name(), "guided");
        assert_eq!(Policy::Auto.name(), "auto");
    }

    #[test]
    fn zero_parameters_are_rejected() {
        assert!(Policy::Static { chunk: Some(0) }.validate().is_err());
        assert!(Policy::Dynamic { chunk: Some(0) }.validate().is_err());
        assert!(Policy::Guided { min_chunk: 0, factor: 2 }.validate().is_err());
        assert!(Policy::Guided { min_chunk: 1, factor: 0 }.validate().is_err());
        assert!(Policy::Auto.validate().is_ok());
        assert!(Policy::dynamic().validate().is_ok());
    }
}
