//! Perturbation descriptors.

use std::fmt;
use std::sync::Arc;

use rustc_hash::FxHashSet;
use serde_json::Value;

use crate::change::Change;
use crate::error::{AnalysisError, ErrorKind};
use crate::lens::{FieldAccess, Lens};

/// One named way of varying a field of `O` by a magnitude.
///
/// Built standalone, then handed to
/// [`AnalysisSession::register`](crate::session::AnalysisSession::register).
/// The lens is shared behind an `Arc`, so clones are cheap and the descriptor
/// can be reused across sessions.
pub struct Perturbation<O> {
    label: String,
    metadata: Value,
    accessor: Arc<dyn FieldAccess<O>>,
    change: Change,
    captured: FxHashSet<ErrorKind>,
    domain: Option<Vec<f64>>,
}

impl<O> Perturbation<O> {
    /// Create a perturbation capturing [`ErrorKind::Domain`] failures.
    ///
    /// Fails with [`AnalysisError::EmptyLabel`] if `label` is empty.
    pub fn new<L>(label: impl Into<String>, lens: L, change: Change) -> Result<Self, AnalysisError>
    where
        L: Lens<O> + Send + Sync + 'static,
    {
        let label = label.into();
        if label.is_empty() {
            return Err(AnalysisError::EmptyLabel);
        }
        let mut captured = FxHashSet::default();
        captured.insert(ErrorKind::Domain);
        Ok(Self {
            label,
            metadata: Value::Null,
            accessor: Arc::new(lens),
            change,
            captured,
            domain: None,
        })
    }

    pub fn metadata(mut self, metadata: impl Into<Value>) -> Self {
        self.metadata = metadata.into();
        self
    }

    /// Use these magnitudes instead of the session's default domain
    pub fn domain(mut self, domain: impl Into<Vec<f64>>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    /// Replace the set of captured error kinds
    pub fn capture(mut self, kinds: impl IntoIterator<Item = ErrorKind>) -> Self {
        self.captured = kinds.into_iter().collect();
        self
    }

    /// Add one kind to the captured set
    pub fn also_capture(mut self, kind: ErrorKind) -> Self {
        self.captured.insert(kind);
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

    pub fn own_domain(&self) -> Option<&[f64]> {
        self.domain.as_deref()
    }

    /// The perturbation's own domain if set, else `default`
    pub fn effective_domain<'a>(&'a self, default: &'a [f64]) -> &'a [f64] {
        self.domain.as_deref().unwrap_or(default)
    }

    pub fn captures(&self, kind: ErrorKind) -> bool {
        self.captured.contains(&kind)
    }

    /// Captured kinds in a stable order
    pub fn captured_kinds(&self) -> Vec<ErrorKind> {
        let mut kinds: Vec<ErrorKind> = self.captured.iter().copied().collect();
        kinds.sort();
        kinds
    }

    pub(crate) fn accessor(&self) -> &dyn FieldAccess<O> {
        self.accessor.as_ref()
    }
}

impl<O> Clone for Perturbation<O> {
    fn clone(&self) -> Self {
        Self {
            label: self.label.clone(),
            metadata: self.metadata.clone(),
            accessor: Arc::clone(&self.accessor),
            change: self.change,
            captured: self.captured.clone(),
            domain: self.domain.clone(),
        }
    }
}

impl<O> fmt::Debug for Perturbation<O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Perturbation")
            .field("label", &self.label)
            .field("metadata", &self.metadata)
            .field("change", &self.change)
            .field("captured", &self.captured_kinds())
            .field("domain", &self.domain)
            .finish_non_exhaustive()
    }
}

impl<O> fmt::Display for Perturbation<O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Perturbation {:?} ({} change", self.label, self.change)?;
        match &self.domain {
            Some(domain) => write!(f, ", {} points)", domain.len()),
            None => write!(f, ", default domain)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FieldError;
    use crate::lens::FnLens;

    fn scalar_lens() -> impl Lens<f64, Value = f64> + Send + Sync + 'static {
        FnLens::new(|x: &f64| *x, |_: &f64, v: f64| Ok::<f64, FieldError>(v))
    }

    #[test]
    fn test_empty_label_rejected() {
        let err = Perturbation::new("", scalar_lens(), Change::Absolute).unwrap_err();
        assert!(matches!(err, AnalysisError::EmptyLabel));
    }

    #[test]
    fn test_defaults() {
        let p = Perturbation::new("x", scalar_lens(), Change::Relative).unwrap();
        assert_eq!(p.label(), "x");
        assert_eq!(p.metadata_value(), &Value::Null);
        assert_eq!(p.captured_kinds(), vec![ErrorKind::Domain]);
        assert!(p.own_domain().is_none());
        assert_eq!(p.effective_domain(&[0.0, 1.0]), &[0.0, 1.0]);
    }

    #[test]
    fn test_setters() {
        let p = Perturbation::new("x", scalar_lens(), Change::Absolute)
            .unwrap()
            .metadata("rate")
            .domain(vec![-1.0, 1.0])
            .capture([ErrorKind::Argument])
            .also_capture(ErrorKind::Overflow);

        assert_eq!(p.metadata_value(), &Value::from("rate"));
        assert_eq!(p.effective_domain(&[0.0]), &[-1.0, 1.0]);
        assert!(!p.captures(ErrorKind::Domain));
        assert_eq!(
            p.captured_kinds(),
            vec![ErrorKind::Argument, ErrorKind::Overflow]
        );
    }

    #[test]
    fn test_display() {
        let p = Perturbation::new("rate", scalar_lens(), Change::Relative).unwrap();
        assert_eq!(
            p.to_string(),
            "Perturbation \"rate\" (relative change, default domain)"
        );
        let p = p.domain([0.0, 0.1, 0.2]);
        assert_eq!(
            p.to_string(),
            "Perturbation \"rate\" (relative change, 3 points)"
        );
    }
}
