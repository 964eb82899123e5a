//! Sensitivity queries over a session's stored results.
//!
//! Curves are recomputed from the raw results on every call; nothing is cached.

use std::fmt;

use regex::Regex;
use serde::Serialize;
use serde_json::Value;

use crate::error::{AnalysisError, LookupError};
use crate::moment::Moment;
use crate::session::{AnalysisSession, Entry};

/// Reference to a registered perturbation
#[derive(Debug, Clone)]
pub enum Reference {
    /// Direct index into the entries, not validated by lookup
    Index(usize),
    /// Unique entry whose label contains this text
    Label(String),
    /// Unique entry whose label matches this pattern
    Pattern(Regex),
}

impl Reference {
    fn matches(&self, label: &str) -> bool {
        match self {
            Reference::Index(_) => false,
            Reference::Label(text) => label.contains(text.as_str()),
            Reference::Pattern(re) => re.is_match(label),
        }
    }
}

impl From<usize> for Reference {
    fn from(index: usize) -> Self {
        Reference::Index(index)
    }
}

impl From<&str> for Reference {
    fn from(text: &str) -> Self {
        Reference::Label(text.to_string())
    }
}

impl From<String> for Reference {
    fn from(text: String) -> Self {
        Reference::Label(text)
    }
}

impl From<Regex> for Reference {
    fn from(re: Regex) -> Self {
        Reference::Pattern(re)
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reference::Index(i) => write!(f, "#{i}"),
            Reference::Label(text) => f.write_str(text),
            Reference::Pattern(re) => write!(f, "/{}/", re.as_str()),
        }
    }
}

/// Change of a moment across a perturbation's domain, ready for plotting.
///
/// `y[i]` is NaN where the perturbed object could not be built; it
/// serializes as `null`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SensitivityCurve {
    pub label: String,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub metadata: Value,
}

impl SensitivityCurve {
    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// `(x, y)` pairs in domain order
    pub fn points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.x.iter().copied().zip(self.y.iter().copied())
    }

    /// Indices of points without a result
    pub fn failures(&self) -> Vec<usize> {
        self.y
            .iter()
            .enumerate()
            .filter(|(_, y)| y.is_nan())
            .map(|(i, _)| i)
            .collect()
    }
}

impl fmt::Display for SensitivityCurve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} points", self.label, self.len())?;
        let failed = self.failures().len();
        if failed > 0 {
            write!(f, " ({failed} failed)")?;
        }
        Ok(())
    }
}

impl<O, R> AnalysisSession<O, R> {
    /// Resolve a reference to an entry index.
    ///
    /// Indices are returned unchanged. Labels and patterns must match exactly
    /// one registered label.
    pub fn lookup(&self, reference: impl Into<Reference>) -> Result<usize, LookupError> {
        let reference = reference.into();
        if let Reference::Index(index) = reference {
            return Ok(index);
        }

        let matches: Vec<usize> = self
            .entries()
            .iter()
            .enumerate()
            .filter(|(_, entry)| reference.matches(entry.perturbation().label()))
            .map(|(i, _)| i)
            .collect();

        match matches.as_slice() {
            [index] => Ok(*index),
            [] => Err(LookupError::NotFound {
                reference: reference.to_string(),
            }),
            _ => Err(LookupError::AmbiguousMatch {
                reference: reference.to_string(),
                labels: matches
                    .iter()
                    .map(|&i| self.entries()[i].perturbation().label().to_string())
                    .collect(),
            }),
        }
    }

    /// Change of `moment` relative to the baseline across the referenced
    /// perturbation's domain
    pub fn sensitivity(
        &self,
        reference: impl Into<Reference>,
        moment: &Moment<R>,
    ) -> Result<SensitivityCurve, AnalysisError> {
        let index = self.lookup(reference)?;
        self.curve_at(index, moment)
    }

    /// One curve per moment for the same perturbation
    pub fn sensitivities(
        &self,
        reference: impl Into<Reference>,
        moments: &[Moment<R>],
    ) -> Result<Vec<SensitivityCurve>, AnalysisError> {
        let index = self.lookup(reference)?;
        moments.iter().map(|m| self.curve_at(index, m)).collect()
    }

    /// The curve of `moment` for every entry, in registration order
    pub fn sensitivity_all(&self, moment: &Moment<R>) -> Vec<SensitivityCurve> {
        self.entries()
            .iter()
            .map(|entry| self.curve_for(entry, moment))
            .collect()
    }

    fn curve_at(&self, index: usize, moment: &Moment<R>) -> Result<SensitivityCurve, AnalysisError> {
        let entry = self.entry(index)?;
        Ok(self.curve_for(entry, moment))
    }

    fn curve_for(&self, entry: &Entry<O, R>, moment: &Moment<R>) -> SensitivityCurve {
        let baseline = moment.extract(self.baseline_result());
        let change = moment.change();

        let y = entry
            .results()
            .iter()
            .map(|result| match result {
                Some(r) => change.measure(moment.extract(r), baseline),
                None => f64::NAN,
            })
            .collect();

        SensitivityCurve {
            label: moment.curve_label(),
            x: entry
                .perturbation()
                .effective_domain(self.default_domain())
                .to_vec(),
            y,
            metadata: moment.metadata_value().clone(),
        }
    }
}
