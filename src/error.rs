//! Error types for rainfx.
//!
//! Only two conditions surface as errors: a configuration that can never
//! produce a valid simulation, and an index outside the grid it addresses.
//! Degenerate probabilities and empty populations are ordinary simulation
//! outcomes and are reported through the normal return values instead.

/// Errors returned by fallible rainfx operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SimError {
    /// A configuration value is out of its valid domain.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// An index addressed a cell outside the grid.
    #[error("{what} index {index} out of range (len {len})")]
    OutOfRange {
        /// What was being indexed (axis or map name).
        what: &'static str,
        /// The offending index.
        index: i64,
        /// Valid length along that axis.
        len: usize,
    },
}

impl SimError {
    pub(crate) fn config(msg: impl Into<String>) -> Self {
        SimError::InvalidConfiguration(msg.into())
    }

    /// Check `index` against `0..len`, returning it as `usize` on success.
    pub(crate) fn check_index(
        what: &'static str,
        index: i64,
        len: usize,
    ) -> Result<usize, SimError> {
        if index < 0 || index as u64 >= len as u64 {
            Err(SimError::OutOfRange { what, index, len })
        } else {
            Ok(index as usize)
        }
    }
}

/// Shorthand result type.
pub type Result<T, E = SimError> = std::result::Result<T, E>;
