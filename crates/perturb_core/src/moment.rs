//! Moment descriptors: scalar statistics extracted from simulation results.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::change::Change;

/// Named scalar statistic of a simulation result, plus the strategy used to
/// measure its change against the baseline.
pub struct Moment<R> {
    label: String,
    metadata: Value,
    extract: Arc<dyn Fn(&R) -> f64 + Send + Sync>,
    change: Change,
}

impl<R> Moment<R> {
    pub fn new<F>(label: impl Into<String>, extract: F, change: Change) -> Self
    where
        F: Fn(&R) -> f64 + Send + Sync + 'static,
    {
        Self {
            label: label.into(),
            metadata: Value::Null,
            extract: Arc::new(extract),
            change,
        }
    }

    pub fn metadata(mut self, metadata: impl Into<Value>) -> Self {
        self.metadata = metadata.into();
        self
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn metadata_value(&self) -> &Value {
        &self.metadata
    }

    pub fn change(&self) -> Change {
        self.change
    }

    /// Extract the statistic from one result
    pub fn extract(&self, result: &R) -> f64 {
        (self.extract)(result)
    }

    /// Label used for curves: `"<label> (<change>)"`
    pub fn curve_label(&self) -> String {
        format!("{} ({})", self.label, self.change)
    }
}

impl<R> Clone for Moment<R> {
    fn clone(&self) -> Self {
        Self {
            label: self.label.clone(),
            metadata: self.metadata.clone(),
            extract: Arc::clone(&self.extract),
            change: self.change,
        }
    }
}

impl<R> fmt::Debug for Moment<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Moment")
            .field("label", &self.label)
            .field("metadata", &self.metadata)
            .field("change", &self.change)
            .finish_non_exhaustive()
    }
}

impl<R> fmt::Display for Moment<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Moment {:?} ({} change)", self.label, self.change)
    }
}
