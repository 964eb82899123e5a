//! Field access for perturbations.
//!
//! A [`Lens`] addresses one field of an object: it reads the field and builds a
//! new object with the field replaced, leaving the original untouched. Lenses
//! are supplied by the caller; this crate only consumes them.

use std::marker::PhantomData;

use crate::change::{Adjustable, Change};
use crate::error::FieldError;

/// Pure get/replace pair addressing one field of `O`
pub trait Lens<O> {
    type Value: Adjustable;

    /// Read the current field value
    fn get(&self, object: &O) -> Self::Value;

    /// Build a copy of `object` with the field set to `value`.
    ///
    /// Validation failures are reported as a [`FieldError`] whose kind decides
    /// whether a perturbation captures it.
    fn with_replaced(&self, object: &O, value: Self::Value) -> Result<O, FieldError>;
}

/// Lens built from a getter and a fallible setter closure.
///
/// ```ignore
/// let rate = FnLens::new(
///     |m: &Model| m.rate,
///     |m: &Model, rate| Model::new(rate, m.size),
/// );
/// ```
pub struct FnLens<O, V, G, S> {
    getter: G,
    setter: S,
    _marker: PhantomData<fn(&O) -> V>,
}

impl<O, V, G, S> FnLens<O, V, G, S>
where
    G: Fn(&O) -> V,
    S: Fn(&O, V) -> Result<O, FieldError>,
{
    pub fn new(getter: G, setter: S) -> Self {
        Self {
            getter,
            setter,
            _marker: PhantomData,
        }
    }
}

impl<O, V, G, S> Lens<O> for FnLens<O, V, G, S>
where
    V: Adjustable,
    G: Fn(&O) -> V,
    S: Fn(&O, V) -> Result<O, FieldError>,
{
    type Value = V;

    fn get(&self, object: &O) -> V {
        (self.getter)(object)
    }

    fn with_replaced(&self, object: &O, value: V) -> Result<O, FieldError> {
        (self.setter)(object, value)
    }
}

/// Object-safe view of a lens: read, change and rebuild in one step.
///
/// Lets a perturbation hold any lens regardless of its field type.
pub(crate) trait FieldAccess<O>: Send + Sync {
    fn perturbed(&self, object: &O, change: Change, delta: f64) -> Result<O, FieldError>;
}

impl<O, L> FieldAccess<O> for L
where
    L: Lens<O> + Send + Sync,
{
    fn perturbed(&self, object: &O, change: Change, delta: f64) -> Result<O, FieldError> {
        let current = self.get(object);
        let value = current.adjusted(change, delta);
        self.with_replaced(object, value)
    }
}
