use std::fmt;

/// Tags identifying the cause of a failed field update.
///
/// A [`Perturbation`](crate::perturbation::Perturbation) captures failures by
/// membership of these tags in its captured set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ErrorKind {
    /// Value outside the mathematical domain of the field (e.g. negative variance)
    Domain,
    /// Value rejected as an invalid argument
    Argument,
    /// An internal consistency check failed
    Assertion,
    /// Index or range violation
    OutOfBounds,
    /// Numeric overflow or non-finite value
    Overflow,
    /// The object cannot be rebuilt in its current state
    InvalidState,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Domain => "domain error",
            ErrorKind::Argument => "argument error",
            ErrorKind::Assertion => "assertion error",
            ErrorKind::OutOfBounds => "out of bounds",
            ErrorKind::Overflow => "overflow",
            ErrorKind::InvalidState => "invalid state",
        };
        f.write_str(name)
    }
}

/// Error raised by a [`Lens`](crate::lens::Lens) while rebuilding an object
#[derive(Debug, Clone, PartialEq)]
pub struct FieldError {
    pub kind: ErrorKind,
    pub message: String,
}

impl FieldError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn domain(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Domain, message)
    }

    pub fn argument(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Argument, message)
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for FieldError {}

/// Error returned by a caller-supplied simulate function.
///
/// The original error is kept as the `source()` so callers can downcast it.
#[derive(Debug)]
pub struct SimulationError {
    inner: Box<dyn std::error::Error + Send + Sync + 'static>,
}

impl SimulationError {
    pub fn new<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self {
            inner: Box::new(err),
        }
    }

    /// Attempt to recover the concrete error produced by the simulate function
    pub fn downcast_ref<E: std::error::Error + 'static>(&self) -> Option<&E> {
        self.inner.downcast_ref::<E>()
    }
}

impl fmt::Display for SimulationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "simulation failed: {}", self.inner)
    }
}

impl std::error::Error for SimulationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(self.inner.as_ref())
    }
}

/// Errors resolving a reference to a registered perturbation
#[derive(Debug, Clone, PartialEq)]
pub enum LookupError {
    /// No label matched the reference
    NotFound { reference: String },
    /// More than one label matched the reference
    AmbiguousMatch {
        reference: String,
        labels: Vec<String>,
    },
}

impl fmt::Display for LookupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LookupError::NotFound { reference } => {
                write!(f, "no labels match {reference:?}")
            }
            LookupError::AmbiguousMatch { reference, labels } => {
                write!(f, "multiple labels match {reference:?}: {labels:?}")
            }
        }
    }
}

impl std::error::Error for LookupError {}

/// Top-level error for session construction, registration and queries
#[derive(Debug)]
pub enum AnalysisError {
    /// A perturbation was built with an empty label
    EmptyLabel,
    /// The simulate function failed on the baseline object
    Baseline(SimulationError),
    /// A field update failed with an error kind the perturbation does not capture
    Field {
        label: String,
        delta: f64,
        source: FieldError,
    },
    /// The simulate function failed on a perturbed object
    Simulation {
        label: String,
        delta: f64,
        source: SimulationError,
    },
    Lookup(LookupError),
    /// Resolved index is past the end of the registered entries
    IndexOutOfRange { index: usize, len: usize },
    /// The worker pool could not be created
    ThreadPool(String),
}

impl fmt::Display for AnalysisError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnalysisError::EmptyLabel => write!(f, "perturbation label must not be empty"),
            AnalysisError::Baseline(e) => write!(f, "baseline {e}"),
            AnalysisError::Field {
                label,
                delta,
                source,
            } => write!(f, "perturbation {label:?} at {delta}: {source}"),
            AnalysisError::Simulation {
                label,
                delta,
                source,
            } => write!(f, "perturbation {label:?} at {delta}: {source}"),
            AnalysisError::Lookup(e) => write!(f, "{e}"),
            AnalysisError::IndexOutOfRange { index, len } => {
                write!(f, "index {index} out of range for {len} entries")
            }
            AnalysisError::ThreadPool(msg) => write!(f, "worker pool error: {msg}"),
        }
    }
}

impl std::error::Error for AnalysisError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AnalysisError::Baseline(e) => Some(e),
            AnalysisError::Field { source, .. } => Some(source),
            AnalysisError::Simulation { source, .. } => Some(source),
            AnalysisError::Lookup(e) => Some(e),
            _ => None,
        }
    }
}

impl From<LookupError> for AnalysisError {
    fn from(e: LookupError) -> Self {
        AnalysisError::Lookup(e)
    }
}
