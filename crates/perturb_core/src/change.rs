//! Change strategies: how a perturbation magnitude is applied to a value and
//! how an observed change is measured against a baseline.

use std::fmt;

use serde::{Deserialize, Serialize};

/// How a magnitude `delta` relates a changed value to its base value.
///
/// For every strategy `measure(apply(x, delta), x) == delta` (up to rounding),
/// with `x != 0` required for [`Change::Relative`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Change {
    /// `x * (1 + delta)`
    Relative,
    /// `x + delta`
    Absolute,
}

pub const RELATIVE: Change = Change::Relative;
pub const ABSOLUTE: Change = Change::Absolute;

impl Change {
    /// Apply `delta` to a scalar base value
    #[must_use]
    pub fn apply(self, base: f64, delta: f64) -> f64 {
        match self {
            Change::Relative => base * (1.0 + delta),
            Change::Absolute => base + delta,
        }
    }

    /// Measure the change of `changed` against `base`
    #[must_use]
    pub fn measure(self, changed: f64, base: f64) -> f64 {
        match self {
            Change::Relative => changed / base - 1.0,
            Change::Absolute => changed - base,
        }
    }

    /// Apply `delta` to any [`Adjustable`] value, broadcasting over containers
    #[must_use]
    pub fn apply_to<T: Adjustable>(self, base: &T, delta: f64) -> T {
        base.adjusted(self, delta)
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Change::Relative => "relative",
            Change::Absolute => "absolute",
        }
    }
}

impl fmt::Display for Change {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Values a [`Change`] can be applied to.
///
/// Containers apply the change elementwise.
pub trait Adjustable: Sized {
    fn adjusted(&self, change: Change, delta: f64) -> Self;
}

impl Adjustable for f64 {
    fn adjusted(&self, change: Change, delta: f64) -> Self {
        change.apply(*self, delta)
    }
}

impl Adjustable for f32 {
    fn adjusted(&self, change: Change, delta: f64) -> Self {
        change.apply(f64::from(*self), delta) as f32
    }
}

impl<T: Adjustable> Adjustable for Vec<T> {
    fn adjusted(&self, change: Change, delta: f64) -> Self {
        self.iter().map(|v| v.adjusted(change, delta)).collect()
    }
}

impl<T: Adjustable, const N: usize> Adjustable for [T; N] {
    fn adjusted(&self, change: Change, delta: f64) -> Self {
        std::array::from_fn(|i| self[i].adjusted(change, delta))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_apply_and_measure() {
        assert_eq!(Change::Absolute.apply(10.0, 0.5), 10.5);
        assert_eq!(Change::Relative.apply(10.0, 0.5), 15.0);
        assert_eq!(Change::Absolute.measure(12.0, 10.0), 2.0);
        assert!((Change::Relative.measure(12.0, 10.0) - 0.2).abs() < 1e-12);
    }

    #[test]
    fn test_broadcast_over_containers() {
        let v = vec![1.0, 2.0, 4.0];
        assert_eq!(Change::Relative.apply_to(&v, 0.5), vec![1.5, 3.0, 6.0]);

        let arr = [[1.0_f64, 2.0], [3.0, 4.0]];
        assert_eq!(
            Change::Absolute.apply_to(&arr, 1.0),
            [[2.0, 3.0], [4.0, 5.0]]
        );

        let single: f32 = 2.0;
        assert_eq!(Change::Absolute.apply_to(&single, 0.5), 2.5_f32);
    }

    #[test]
    fn test_display_names() {
        assert_eq!(RELATIVE.to_string(), "relative");
        assert_eq!(ABSOLUTE.to_string(), "absolute");
    }

    proptest! {
        #[test]
        fn absolute_round_trip(x in -1e6f64..1e6, delta in -1e3f64..1e3) {
            let y = Change::Absolute.apply(x, delta);
            let back = Change::Absolute.measure(y, x);
            prop_assert!((back - delta).abs() <= 1e-9 * (1.0 + x.abs()));
        }

        #[test]
        fn relative_round_trip(x in prop_oneof![-1e6f64..-1e-3, 1e-3f64..1e6], delta in -10.0f64..10.0) {
            let y = Change::Relative.apply(x, delta);
            let back = Change::Relative.measure(y, x);
            prop_assert!((back - delta).abs() <= 1e-9 * (1.0 + delta.abs()));
        }
    }
}
