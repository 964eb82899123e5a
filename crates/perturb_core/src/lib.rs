//! Black-box sensitivity analysis by repeated simulation
//!
//! This crate measures how scalar statistics ("moments") of a simulation
//! change when one field of the simulated object is perturbed over a range of
//! magnitudes. It supports:
//! - Relative and absolute change strategies, broadcast over containers
//! - Caller-supplied lenses for reading and rebuilding one field
//! - Capture of anticipated field-validation failures as missing points
//! - Parallel evaluation of each perturbation's domain (rayon)
//! - Lazy derivation of sensitivity curves by index, label or pattern
//!
//! # Example
//!
//! ```ignore
//! use perturb_core::{AnalysisSession, Change, FnLens, Moment, Perturbation};
//!
//! let mut session = AnalysisSession::new(model, |m: &Model| m.run())?;
//!
//! let rate = FnLens::new(|m: &Model| m.rate, |m: &Model, rate| m.with_rate(rate));
//! session.register(
//!     Perturbation::new("rate", rate, Change::Relative)?.domain([-0.1, 0.0, 0.1]),
//! )?;
//!
//! let mean = Moment::new("mean", |r: &Output| r.mean(), Change::Relative);
//! let curve = session.sensitivity("rate", &mean)?;
//! ```

#![warn(clippy::all)]

// ============================================================================
// Core modules
// ============================================================================

pub mod change;
pub mod engine;
pub mod lens;
pub mod moment;
pub mod perturbation;
pub mod query;
pub mod session;

// ============================================================================
// Support modules
// ============================================================================

pub mod config;
pub mod error;
pub mod logging;
pub mod progress;

// ============================================================================
// Test modules
// ============================================================================

#[cfg(test)]
mod tests;

// ============================================================================
// Public re-exports for convenience
// ============================================================================

pub use change::{ABSOLUTE, Adjustable, Change, RELATIVE};
pub use config::{DomainSpec, SessionConfig};
pub use error::{AnalysisError, ErrorKind, FieldError, LookupError, SimulationError};
pub use lens::{FnLens, Lens};
pub use moment::Moment;
pub use perturbation::Perturbation;
pub use progress::RegistrationProgress;
pub use query::{Reference, SensitivityCurve};
pub use session::{AnalysisSession, Entry, SessionBuilder};
