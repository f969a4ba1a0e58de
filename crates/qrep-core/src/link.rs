//! Fibre link model.
//!
//! A link of length `L` km operated at nesting level `n` is split into `2^n`
//! elementary sub-links of `L / 2^n` km. Photon survival over one sub-link
//! follows the usual exponential attenuation law
//!
//!   η = 10^(−α · d / 10)
//!
//! with `α` in dB/km. The elementary pair is the ideal |Φ+⟩ with one half
//! sent through a depolarizing channel of ideal-operation probability `η`.

use serde::{Deserialize, Serialize};

use crate::bell::BellDiagonalState;
use crate::error::{QrepError, QrepResult};

/// Deepest supported nesting level (segment counts must fit in a `u64`).
pub const MAX_NESTING_LEVEL: u32 = 63;

/// Attenuation of standard telecom fibre at 1550 nm, in dB/km.
pub const DEFAULT_ATTENUATION_DB_PER_KM: f64 = 0.17;

/// One (length, attenuation, nesting level) point of a sweep.
///
/// Only constructible through [`LinkConfiguration::new`] (deserialisation
/// goes through the same checks), so the nesting level always lies in
/// `1..=63`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "LinkFields")]
pub struct LinkConfiguration {
    length_km: f64,
    attenuation_db_per_km: f64,
    nesting_level: u32,
}

#[derive(Deserialize)]
struct LinkFields {
    length_km: f64,
    attenuation_db_per_km: f64,
    nesting_level: u32,
}

impl TryFrom<LinkFields> for LinkConfiguration {
    type Error = QrepError;

    fn try_from(raw: LinkFields) -> QrepResult<Self> {
        Self::new(raw.length_km, raw.attenuation_db_per_km, raw.nesting_level)
    }
}

impl LinkConfiguration {
    /// Create a validated link configuration.
    pub fn new(length_km: f64, attenuation_db_per_km: f64, nesting_level: u32) -> QrepResult<Self> {
        if !length_km.is_finite() || length_km < 0.0 {
            return Err(QrepError::InvalidLength(length_km));
        }
        if !attenuation_db_per_km.is_finite() || attenuation_db_per_km < 0.0 {
            return Err(QrepError::InvalidConfig(format!(
                "attenuation must be a non-negative finite number of dB/km, got {attenuation_db_per_km}"
            )));
        }
        if nesting_level == 0 || nesting_level > MAX_NESTING_LEVEL {
            return Err(QrepError::InvalidNestingLevel(nesting_level));
        }
        Ok(Self {
            length_km,
            attenuation_db_per_km,
            nesting_level,
        })
    }

    /// Total link length in km.
    pub fn length_km(&self) -> f64 {
        self.length_km
    }

    /// Fibre attenuation in dB/km.
    pub fn attenuation_db_per_km(&self) -> f64 {
        self.attenuation_db_per_km
    }

    /// Number of times the link is halved.
    pub fn nesting_level(&self) -> u32 {
        self.nesting_level
    }

    /// Number of elementary sub-links, `2^n`.
    pub fn sub_links(&self) -> u64 {
        1u64 << self.nesting_level
    }

    /// Length of one elementary sub-link in km.
    pub fn sub_link_km(&self) -> f64 {
        self.length_km / 2f64.powi(self.nesting_level as i32)
    }

    /// Photon survival probability over one sub-link.
    pub fn transmissivity(&self) -> f64 {
        10f64.powf(-self.attenuation_db_per_km * self.sub_link_km() / 10.0)
    }

    /// The pair shared across one sub-link, before any repeater operation.
    ///
    /// Read back isotropically: A is the squared overlap with |Φ+⟩ (clamped
    /// to 1) and the remaining weight is spread evenly over B, C and D.
    pub fn elementary_pair(&self) -> BellDiagonalState {
        let transmitted = BellDiagonalState::ideal().depolarize(self.transmissivity());
        BellDiagonalState::werner(transmitted.fidelity().min(1.0))
    }
}
