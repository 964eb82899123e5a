//! Integration tests for the perturbation engine
//!
//! Tests are organized by topic:
//! - `end_to_end` - Registration and sensitivity curves for simple models
//! - `failures` - Captured field failures and aborted registrations
//! - `lookup` - Resolving references by index, label and pattern
//! - `concurrency` - Ordering and progress under parallel evaluation

mod end_to_end;

use crate::error::FieldError;
use crate::lens::FnLens;

/// Model with one scalar field `a`
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Params {
    pub a: f64,
}

/// Simulation output with `b = 2 * a`
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Output {
    pub b: f64,
}

pub(crate) fn simulate(params: &Params) -> Output {
    Output { b: 2.0 * params.a }
}

/// Lens on `Params::a` rejecting negative values with a domain error
pub(crate) fn field_a() -> FnLens<
    Params,
    f64,
    impl Fn(&Params) -> f64 + Send + Sync + 'static,
    impl Fn(&Params, f64) -> Result<Params, FieldError> + Send + Sync + 'static,
> {
    FnLens::new(
        |p: &Params| p.a,
        |_: &Params, a: f64| {
            if a < 0.0 {
                Err(FieldError::domain(format!("a must be non-negative, got {a}")))
            } else {
                Ok(Params { a })
            }
        },
    )
}

pub(crate) fn assert_close(actual: &[f64], expected: &[f64]) {
    assert_eq!(actual.len(), expected.len(), "length mismatch");
    for (i, (a, e)) in actual.iter().zip(expected).enumerate() {
        assert!(
            (a - e).abs() < 1e-9,
            "index {i}: expected {e}, got {a} ({actual:?})"
        );
    }
}
