//! Perturbation engine - builds perturbed objects and evaluates them.
//!
//! Each point of a domain is evaluated independently: the perturbed object is
//! built from the baseline, then simulated. With the `parallel` feature the
//! points run on a rayon pool; results are gathered in domain order either way.

use std::sync::Arc;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::error::{AnalysisError, FieldError, SimulationError};
use crate::perturbation::Perturbation;
use crate::progress::RegistrationProgress;

/// Type-erased simulate function shared with worker threads
pub(crate) type Simulator<O, R> = Arc<dyn Fn(&O) -> Result<R, SimulationError> + Send + Sync>;

/// Build the object obtained by applying `perturbation` at `delta`.
///
/// Returns `Ok(None)` when the lens fails with an error kind the perturbation
/// captures; any other lens error is returned. `object` is never modified.
pub fn apply_at<O>(
    object: &O,
    perturbation: &Perturbation<O>,
    delta: f64,
) -> Result<Option<O>, FieldError> {
    match perturbation
        .accessor()
        .perturbed(object, perturbation.change(), delta)
    {
        Ok(modified) => Ok(Some(modified)),
        Err(err) if perturbation.captures(err.kind) => {
            tracing::debug!(
                label = perturbation.label(),
                delta,
                error = %err,
                "captured field failure"
            );
            Ok(None)
        }
        Err(err) => Err(err),
    }
}

/// Evaluate one domain point: perturb, then simulate
fn evaluate_point<O, R>(
    baseline: &O,
    perturbation: &Perturbation<O>,
    simulate: &Simulator<O, R>,
    delta: f64,
    progress: Option<&RegistrationProgress>,
) -> Result<Option<R>, AnalysisError> {
    let modified =
        apply_at(baseline, perturbation, delta).map_err(|source| AnalysisError::Field {
            label: perturbation.label().to_string(),
            delta,
            source,
        })?;

    let result = match modified {
        Some(object) => {
            tracing::trace!(label = perturbation.label(), delta, "simulating point");
            let result = simulate(&object).map_err(|source| AnalysisError::Simulation {
                label: perturbation.label().to_string(),
                delta,
                source,
            })?;
            Some(result)
        }
        None => None,
    };

    if let Some(p) = progress {
        p.increment();
    }
    Ok(result)
}

/// Evaluate every point of `domain`, preserving domain order.
///
/// Stops at the first uncaptured error; no partial results are returned.
#[cfg(feature = "parallel")]
pub(crate) fn evaluate_domain<O, R>(
    baseline: &O,
    perturbation: &Perturbation<O>,
    domain: &[f64],
    simulate: &Simulator<O, R>,
    pool: Option<&rayon::ThreadPool>,
    progress: Option<&RegistrationProgress>,
) -> Result<Vec<Option<R>>, AnalysisError>
where
    O: Sync,
    R: Send,
{
    let run = || {
        domain
            .par_iter()
            .map(|&delta| evaluate_point(baseline, perturbation, simulate, delta, progress))
            .collect::<Result<Vec<_>, _>>()
    };

    match pool {
        Some(pool) => pool.install(run),
        None => run(),
    }
}

#[cfg(not(feature = "parallel"))]
pub(crate) fn evaluate_domain<O, R>(
    baseline: &O,
    perturbation: &Perturbation<O>,
    domain: &[f64],
    simulate: &Simulator<O, R>,
    progress: Option<&RegistrationProgress>,
) -> Result<Vec<Option<R>>, AnalysisError> {
    domain
        .iter()
        .map(|&delta| evaluate_point(baseline, perturbation, simulate, delta, progress))
        .collect()
}
