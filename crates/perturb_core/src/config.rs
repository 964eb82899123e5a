//! Session configuration.

use serde::{Deserialize, Serialize};

/// How the magnitudes of a domain are produced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DomainSpec {
    /// Explicit magnitudes, used as given
    Values(Vec<f64>),
    /// `steps` evenly spaced points from `min` to `max` inclusive
    Linspace { min: f64, max: f64, steps: usize },
}

impl DomainSpec {
    /// Generate the domain values
    #[must_use]
    pub fn values(&self) -> Vec<f64> {
        match self {
            DomainSpec::Values(values) => values.clone(),
            DomainSpec::Linspace { min, max, steps } => linspace(*min, *max, *steps),
        }
    }
}

impl Default for DomainSpec {
    fn default() -> Self {
        DomainSpec::Linspace {
            min: -0.1,
            max: 0.1,
            steps: 11,
        }
    }
}

/// Evenly spaced values from `min` to `max` inclusive.
///
/// A single step yields `[min]`; zero steps yield an empty domain.
#[must_use]
pub fn linspace(min: f64, max: f64, steps: usize) -> Vec<f64> {
    match steps {
        0 => Vec::new(),
        1 => vec![min],
        _ => {
            let step_size = (max - min) / (steps - 1) as f64;
            (0..steps)
                .map(|i| {
                    // pin the endpoint so it is exactly `max`
                    if i == steps - 1 {
                        max
                    } else {
                        min + step_size * i as f64
                    }
                })
                .collect()
        }
    }
}

/// Configuration for an [`AnalysisSession`](crate::session::AnalysisSession)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Domain used by perturbations that do not carry their own
    #[serde(default)]
    pub default_domain: DomainSpec,
    /// Number of worker threads for registrations (defaults to CPU count)
    #[serde(default = "default_threads")]
    pub threads: usize,
}

fn default_threads() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            default_domain: DomainSpec::default(),
            threads: default_threads(),
        }
    }
}
