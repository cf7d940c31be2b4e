//! # Error Types
//!
//! This module defines all error types for the staff library.
//!
//! Every fallible operation returns [`StaffError`] synchronously at the point
//! where the offending value was supplied. Nothing is retried or recovered
//! internally, and because every value is immutable a failed call never leaves
//! anything half-modified.
//!
//! ## Error Types
//! - `InvalidValue` - Malformed construction arguments (zero BPM, zero denominator, ...)
//! - `NotFound` - Articulation or stored-instrument lookup miss
//! - `IndexOutOfBounds` - Pattern indexing miss
//! - `IncompatibleTuning` - Ordering requested between pitches of different tunings
//! - `Io` / `Serialization` - Instrument store failures
//!
//! ## Usage
//! ```rust
//! use staff::{Duration, StaffError};
//!
//! match Duration::new(0) {
//!     Ok(_) => unreachable!(),
//!     Err(StaffError::InvalidValue(message)) => eprintln!("Bad duration: {}", message),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, StaffError>;

#[derive(Error, Debug)]
pub enum StaffError {
    /// A constructor or transform received an argument outside its domain.
    ///
    /// # Example
    /// ```
    /// # use staff::StaffError;
    /// let err = StaffError::InvalidValue("bpm must be positive, got 0".to_string());
    /// assert_eq!(err.to_string(), "Invalid value: bpm must be positive, got 0");
    /// ```
    #[error("Invalid value: {0}")]
    InvalidValue(String),

    /// A named lookup found nothing.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Pattern index outside `-len..len`.
    ///
    /// # Example
    /// ```
    /// # use staff::StaffError;
    /// let err = StaffError::IndexOutOfBounds { index: -6, len: 5 };
    /// assert_eq!(err.to_string(), "Index -6 out of bounds for pattern of length 5");
    /// ```
    #[error("Index {index} out of bounds for pattern of length {len}")]
    IndexOutOfBounds { index: isize, len: usize },

    /// Two pitches with different diapasons or octave divisions were compared
    /// by number. Compare them by frequency instead.
    #[error("Incompatible tuning: {0}")]
    IncompatibleTuning(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_yaml::Error),
}
