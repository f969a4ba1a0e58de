//! Operational noise parameters.
//!
//! Every local operation in the repeater chain is modelled as "ideal with
//! probability p, fully depolarizing otherwise". Measurements flip to the
//! orthogonal outcome with probability `1 - pproj`.

use serde::{Deserialize, Serialize};

use crate::error::{QrepError, QrepResult};

/// Probabilities that one-qubit gates, two-qubit gates and single-qubit
/// measurements behave ideally.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NoiseParameters {
    /// Probability of a clean one-qubit operation.
    pub p1: f64,
    /// Probability of a clean two-qubit operation.
    pub p2: f64,
    /// Probability of projecting onto the correct basis state.
    pub pproj: f64,
}

impl NoiseParameters {
    /// Create a validated parameter set.
    pub fn new(p1: f64, p2: f64, pproj: f64) -> QrepResult<Self> {
        let params = Self { p1, p2, pproj };
        params.validate()?;
        Ok(params)
    }

    /// Perfect gates and measurements.
    pub fn noiseless() -> Self {
        Self {
            p1: 1.0,
            p2: 1.0,
            pproj: 1.0,
        }
    }

    /// Check that every probability lies in [0, 1].
    pub fn validate(&self) -> QrepResult<()> {
        check_probability("p1", self.p1)?;
        check_probability("p2", self.p2)?;
        check_probability("pproj", self.pproj)
    }
}

impl Default for NoiseParameters {
    fn default() -> Self {
        Self {
            p1: 0.99,
            p2: 0.99,
            pproj: 0.99,
        }
    }
}

pub(crate) fn check_probability(name: &'static str, value: f64) -> QrepResult<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(QrepError::InvalidProbability { name, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_ninety_nine_percent() {
        let noise = NoiseParameters::default();
        assert_eq!(noise.p1, 0.99);
        assert_eq!(noise.p2, 0.99);
        assert_eq!(noise.pproj, 0.99);
        assert!(noise.validate().is_ok());
    }

    #[test]
    fn test_out_of_range_rejected() {
        let err = NoiseParameters::new(0.9, 1.2, 0.9).unwrap_err();
        assert!(matches!(
            err,
            QrepError::InvalidProbability { name: "p2", .. }
        ));
        assert!(NoiseParameters::new(-0.1, 0.9, 0.9).is_err());
        assert!(NoiseParameters::new(0.9, 0.9, f64::NAN).is_err());
    }
}
