//! Analysis sessions: a baseline object, its simulate function, and the
//! results of every registered perturbation.
//!
//! Registration is eager: [`AnalysisSession::register`] evaluates the simulate
//! function at every point of the perturbation's domain before returning. The
//! raw results are stored; curves are derived from them at query time (see
//! [`crate::query`]).
//!
//! # Concurrency
//!
//! Domain points are simulated concurrently on worker threads, so the simulate
//! function must tolerate being called from several threads at once on
//! independent objects. The `Send + Sync` bounds enforce that it is shareable;
//! any interior shared state it touches (global caches, files, RNGs) is the
//! caller's responsibility.

use std::fmt;
use std::sync::Arc;

use crate::config::SessionConfig;
use crate::engine::{self, Simulator};
use crate::error::{AnalysisError, SimulationError};
use crate::perturbation::Perturbation;
use crate::progress::RegistrationProgress;

/// A registered perturbation and the simulation results over its domain.
///
/// `results[i]` corresponds to the i-th domain value; `None` marks a point
/// where the perturbed object could not be built (captured failure).
#[derive(Debug)]
pub struct Entry<O, R> {
    perturbation: Perturbation<O>,
    results: Vec<Option<R>>,
}

impl<O, R> Entry<O, R> {
    pub fn perturbation(&self) -> &Perturbation<O> {
        &self.perturbation
    }

    pub fn results(&self) -> &[Option<R>] {
        &self.results
    }

    /// Number of points with a captured failure
    pub fn failure_count(&self) -> usize {
        self.results.iter().filter(|r| r.is_none()).count()
    }
}

/// Builder for [`AnalysisSession`]
pub struct SessionBuilder<O, R> {
    baseline: O,
    simulate: Simulator<O, R>,
    label: Option<String>,
    default_domain: Option<Vec<f64>>,
    baseline_result: Option<R>,
    config: SessionConfig,
}

impl<O, R> SessionBuilder<O, R> {
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Domain for perturbations without their own; overrides the config's
    pub fn default_domain(mut self, domain: impl Into<Vec<f64>>) -> Self {
        self.default_domain = Some(domain.into());
        self
    }

    /// Use a precomputed baseline result instead of simulating the baseline
    pub fn baseline_result(mut self, result: R) -> Self {
        self.baseline_result = Some(result);
        self
    }

    pub fn config(mut self, config: SessionConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> Result<AnalysisSession<O, R>, AnalysisError> {
        let baseline_result = match self.baseline_result {
            Some(result) => result,
            None => (self.simulate)(&self.baseline).map_err(AnalysisError::Baseline)?,
        };

        let default_domain = self
            .default_domain
            .unwrap_or_else(|| self.config.default_domain.values());

        #[cfg(feature = "parallel")]
        let pool = if self.config.threads == rayon::current_num_threads() {
            None
        } else {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(self.config.threads)
                .build()
                .map_err(|e| AnalysisError::ThreadPool(e.to_string()))?;
            Some(pool)
        };

        tracing::debug!(
            label = self.label.as_deref().unwrap_or(""),
            default_points = default_domain.len(),
            threads = self.config.threads,
            "analysis session created"
        );

        Ok(AnalysisSession {
            label: self.label,
            baseline: self.baseline,
            simulate: self.simulate,
            baseline_result,
            default_domain,
            entries: Vec::new(),
            #[cfg(feature = "parallel")]
            pool,
        })
    }
}

/// Baseline object, simulate function, and registered perturbation results.
///
/// `register*` take `&mut self` and queries take `&self`, so a session is
/// never read while a registration is in flight. Sharing one across threads
/// needs the usual external lock.
pub struct AnalysisSession<O, R> {
    label: Option<String>,
    baseline: O,
    simulate: Simulator<O, R>,
    baseline_result: R,
    default_domain: Vec<f64>,
    entries: Vec<Entry<O, R>>,
    #[cfg(feature = "parallel")]
    pool: Option<rayon::ThreadPool>,
}

impl<O, R> AnalysisSession<O, R>
where
    O: Send + Sync + 'static,
    R: Send + 'static,
{
    /// Start building a session around an infallible simulate function
    pub fn builder<F>(baseline: O, simulate: F) -> SessionBuilder<O, R>
    where
        F: Fn(&O) -> R + Send + Sync + 'static,
    {
        Self::from_simulator(
            baseline,
            Arc::new(move |object: &O| -> Result<R, SimulationError> { Ok(simulate(object)) }),
        )
    }

    /// Start building a session around a fallible simulate function.
    ///
    /// Errors from `simulate` are never captured: they abort the registration
    /// that triggered them.
    pub fn try_builder<F, E>(baseline: O, simulate: F) -> SessionBuilder<O, R>
    where
        F: Fn(&O) -> Result<R, E> + Send + Sync + 'static,
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::from_simulator(
            baseline,
            Arc::new(move |object: &O| -> Result<R, SimulationError> {
                simulate(object).map_err(SimulationError::new)
            }),
        )
    }

    /// Session with default configuration; simulates the baseline once
    pub fn new<F>(baseline: O, simulate: F) -> Result<Self, AnalysisError>
    where
        F: Fn(&O) -> R + Send + Sync + 'static,
    {
        Self::builder(baseline, simulate).build()
    }

    fn from_simulator(baseline: O, simulate: Simulator<O, R>) -> SessionBuilder<O, R> {
        SessionBuilder {
            baseline,
            simulate,
            label: None,
            default_domain: None,
            baseline_result: None,
            config: SessionConfig::default(),
        }
    }

    /// Evaluate `perturbation` over its effective domain and store the results.
    ///
    /// On an uncaptured error nothing is stored and the error is returned.
    pub fn register(&mut self, perturbation: Perturbation<O>) -> Result<&mut Self, AnalysisError> {
        let results = self.evaluate(&perturbation, None)?;
        self.push_entry(perturbation, results);
        Ok(self)
    }

    /// Like [`register`](Self::register), counting finished points on `progress`
    pub fn register_with_progress(
        &mut self,
        perturbation: Perturbation<O>,
        progress: &RegistrationProgress,
    ) -> Result<&mut Self, AnalysisError> {
        progress.reset(perturbation.effective_domain(&self.default_domain).len());
        let results = self.evaluate(&perturbation, Some(progress))?;
        self.push_entry(perturbation, results);
        Ok(self)
    }

    /// Register several perturbations at once.
    ///
    /// All of them are evaluated before any is stored, so an error leaves the
    /// session unchanged.
    pub fn register_all(
        &mut self,
        perturbations: impl IntoIterator<Item = Perturbation<O>>,
    ) -> Result<&mut Self, AnalysisError> {
        let evaluated = perturbations
            .into_iter()
            .map(|p| {
                let results = self.evaluate(&p, None)?;
                Ok((p, results))
            })
            .collect::<Result<Vec<_>, AnalysisError>>()?;

        for (perturbation, results) in evaluated {
            self.push_entry(perturbation, results);
        }
        Ok(self)
    }

    fn evaluate(
        &self,
        perturbation: &Perturbation<O>,
        progress: Option<&RegistrationProgress>,
    ) -> Result<Vec<Option<R>>, AnalysisError> {
        let domain = perturbation.effective_domain(&self.default_domain);
        tracing::debug!(
            label = perturbation.label(),
            points = domain.len(),
            "evaluating perturbation"
        );

        #[cfg(feature = "parallel")]
        let results = engine::evaluate_domain(
            &self.baseline,
            perturbation,
            domain,
            &self.simulate,
            self.pool.as_ref(),
            progress,
        );

        #[cfg(not(feature = "parallel"))]
        let results =
            engine::evaluate_domain(&self.baseline, perturbation, domain, &self.simulate, progress);

        if let Err(e) = &results {
            tracing::warn!(label = perturbation.label(), error = %e, "registration aborted");
        }
        results
    }

    fn push_entry(&mut self, perturbation: Perturbation<O>, results: Vec<Option<R>>) {
        let entry = Entry {
            perturbation,
            results,
        };
        tracing::info!(
            label = entry.perturbation.label(),
            points = entry.results.len(),
            failures = entry.failure_count(),
            "registered perturbation"
        );
        self.entries.push(entry);
    }
}

impl<O, R> AnalysisSession<O, R> {
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn baseline(&self) -> &O {
        &self.baseline
    }

    pub fn baseline_result(&self) -> &R {
        &self.baseline_result
    }

    pub fn default_domain(&self) -> &[f64] {
        &self.default_domain
    }

    /// Registered entries in registration order
    pub fn entries(&self) -> &[Entry<O, R>] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entry(&self, index: usize) -> Result<&Entry<O, R>, AnalysisError> {
        self.entries
            .get(index)
            .ok_or(AnalysisError::IndexOutOfRange {
                index,
                len: self.entries.len(),
            })
    }

    /// Domain the entry at `index` was evaluated over
    pub fn effective_domain(&self, index: usize) -> Result<&[f64], AnalysisError> {
        let entry = self.entry(index)?;
        Ok(entry.perturbation.effective_domain(&self.default_domain))
    }
}

impl<O, R> fmt::Debug for AnalysisSession<O, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entries: Vec<&str> = self
            .entries
            .iter()
            .map(|entry| entry.perturbation.label())
            .collect();
        f.debug_struct("AnalysisSession")
            .field("label", &self.label)
            .field("default_domain", &self.default_domain)
            .field("entries", &entries)
            .finish_non_exhaustive()
    }
}

impl<O, R> fmt::Display for AnalysisSession<O, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.label {
            Some(label) => write!(f, "AnalysisSession {label:?}")?,
            None => write!(f, "AnalysisSession")?,
        }
        write!(f, " ({} perturbations)", self.entries.len())?;
        for (i, entry) in self.entries.iter().enumerate() {
            write!(f, "\n  [{i}] {}", entry.perturbation)?;
        }
        Ok(())
    }
}
