//! Bell-diagonal state algebra.
//!
//! A two-qubit state that is diagonal in the Bell basis is fully described by
//! four weights:
//!
//! ```text
//!   ρ = A·|Φ+⟩⟨Φ+| + B·|Ψ−⟩⟨Ψ−| + C·|Ψ+⟩⟨Ψ+| + D·|Φ−⟩⟨Φ−|
//!
//!   |Φ±⟩ = (|00⟩ ± |11⟩)/√2      |Ψ±⟩ = (|01⟩ ± |10⟩)/√2
//! ```
//!
//! The target pair is |Φ+⟩, so the fidelity of a state is simply `A`.
//!
//! Two noisy operations keep a state Bell-diagonal and are implemented here
//! in closed form:
//!
//! - **Purification** (Oxford / Deutsch et al. recurrence): two copies are
//!   consumed, one survives with probability `N`
//!   ([`success_probability`], [`purify_coefficient_a`] … [`purify`]).
//! - **Connection** (entanglement swapping at the shared node):
//!   ([`connect_coefficient_a`] … [`connect`]).
//!
//! Both transforms follow the depolarizing-gate / faulty-projector model of
//! W. Dür, "Quantum communication over long distances using quantum
//! repeaters": a one-qubit (two-qubit) operation is ideal with probability
//! `p1` (`p2`) and otherwise replaces its qubits by the maximally mixed
//! state; a measurement projects onto the orthogonal outcome with
//! probability `1 − pproj`.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{QrepError, QrepResult};
use crate::noise::NoiseParameters;

/// Absolute tolerance on `|A + B + C + D − 1|`.
pub const COEFFICIENT_TOLERANCE: f64 = 1e-4;

/// A two-qubit state diagonal in the Bell basis.
///
/// Immutable: every transform returns a new value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "[f64; 4]", into = "[f64; 4]")]
pub struct BellDiagonalState {
    a: f64,
    b: f64,
    c: f64,
    d: f64,
}

impl BellDiagonalState {
    /// Build a state from its four Bell-basis weights.
    ///
    /// Fails with [`QrepError::CoefficientSum`] when the weights do not sum
    /// to one within [`COEFFICIENT_TOLERANCE`], and with
    /// [`QrepError::InvalidCoefficient`] for negative or non-finite weights.
    ///
    /// ```rust
    /// use qrep_core::BellDiagonalState;
    ///
    /// let mixed = BellDiagonalState::new(0.25, 0.25, 0.25, 0.25).unwrap();
    /// assert_eq!(mixed.fidelity(), 0.25);
    /// assert!(BellDiagonalState::new(0.5, 0.5, 0.5, 0.5).is_err());
    /// ```
    pub fn new(a: f64, b: f64, c: f64, d: f64) -> QrepResult<Self> {
        for (name, value) in [("A", a), ("B", b), ("C", c), ("D", d)] {
            if !value.is_finite() || value < -COEFFICIENT_TOLERANCE {
                return Err(QrepError::InvalidCoefficient { name, value });
            }
        }
        let sum = a + b + c + d;
        if (sum - 1.0).abs() >= COEFFICIENT_TOLERANCE {
            return Err(QrepError::CoefficientSum { sum });
        }
        Ok(Self { a, b, c, d })
    }

    /// The noiseless target pair |Φ+⟩.
    pub fn ideal() -> Self {
        Self {
            a: 1.0,
            b: 0.0,
            c: 0.0,
            d: 0.0,
        }
    }

    /// Isotropic (Werner) state with fidelity `f`: B = C = D = (1 − f)/3.
    ///
    /// `f` is clamped to [0, 1].
    pub fn werner(f: f64) -> Self {
        let a = f.clamp(0.0, 1.0);
        let rest = (1.0 - a) / 3.0;
        Self {
            a,
            b: rest,
            c: rest,
            d: rest,
        }
    }

    /// Internal constructor for transform outputs that sum to one by
    /// construction.
    fn from_normalized(a: f64, b: f64, c: f64, d: f64) -> Self {
        debug_assert!(
            ((a + b + c + d) - 1.0).abs() < COEFFICIENT_TOLERANCE,
            "transform broke normalisation: {a} + {b} + {c} + {d}"
        );
        Self { a, b, c, d }
    }

    /// Weight of |Φ+⟩.
    pub fn a(&self) -> f64 {
        self.a
    }

    /// Weight of |Ψ−⟩.
    pub fn b(&self) -> f64 {
        self.b
    }

    /// Weight of |Ψ+⟩.
    pub fn c(&self) -> f64 {
        self.c
    }

    /// Weight of |Φ−⟩.
    pub fn d(&self) -> f64 {
        self.d
    }

    /// Fidelity with the target pair |Φ+⟩.
    pub fn fidelity(&self) -> f64 {
        self.a
    }

    /// `[A, B, C, D]`.
    pub fn coefficients(&self) -> [f64; 4] {
        [self.a, self.b, self.c, self.d]
    }

    /// Apply a one-qubit depolarizing channel to either half of the pair.
    ///
    /// With probability `p` the qubit is untouched; otherwise one of X, Y, Z
    /// acts on it with equal probability. Each Pauli permutes the Bell basis,
    /// so every weight `c_k` becomes `p·c_k + (1 − p)/3 · (1 − c_k)`.
    pub fn depolarize(&self, p: f64) -> Self {
        let p = p.clamp(0.0, 1.0);
        let flip = (1.0 - p) / 3.0;
        let total = self.a + self.b + self.c + self.d;
        let mix = |w: f64| p * w + flip * (total - w);
        Self::from_normalized(mix(self.a), mix(self.b), mix(self.c), mix(self.d))
    }
}

impl TryFrom<[f64; 4]> for BellDiagonalState {
    type Error = QrepError;

    fn try_from([a, b, c, d]: [f64; 4]) -> QrepResult<Self> {
        Self::new(a, b, c, d)
    }
}

impl From<BellDiagonalState> for [f64; 4] {
    fn from(state: BellDiagonalState) -> Self {
        state.coefficients()
    }
}

impl fmt::Display for BellDiagonalState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "bell(A={:.6}, B={:.6}, C={:.6}, D={:.6})",
            self.a, self.b, self.c, self.d
        )
    }
}

// ---------------------------------------------------------------------------
// Purification
// ---------------------------------------------------------------------------
//
// `first` and `second` are the two consumed copies (subscripts 1 and 2 in the
// literature). Every expression below is the usual bilinear form in the
// sixteen products A1·A2 … D1·D2, grouped by powers of `pproj`:
//
//   numerator_k = base + p2² · bracket_k
//   base        = A1 + (B1 + C1 + D1)(A2 + B2 + C2 + D2)
//   bracket_k   = 8·hit_k − S1·S2 − 16·pproj(1 − pproj)·(hit_k − leak_k)
//   8·N         = 4·(base + p2²·(1 − 2·pproj)²·X1·X2),  X = A + B − C − D
//
// with S = A + B + C + D, `hit_k` the products that land on component k
// after an ideal round and `leak_k` the products that reach it through a
// single flipped measurement.

fn base_weight(first: &BellDiagonalState, second: &BellDiagonalState) -> f64 {
    first.a + (first.b + first.c + first.d) * (second.a + second.b + second.c + second.d)
}

fn total_product(first: &BellDiagonalState, second: &BellDiagonalState) -> f64 {
    (first.a + first.b + first.c + first.d) * (second.a + second.b + second.c + second.d)
}

/// Unnormalised numerators of the four purified weights.
fn purify_numerators(
    first: &BellDiagonalState,
    second: &BellDiagonalState,
    pproj: f64,
    p2: f64,
) -> [f64; 4] {
    let (a1, b1, c1, d1) = (first.a, first.b, first.c, first.d);
    let (a2, b2, c2, d2) = (second.a, second.b, second.c, second.d);

    let base = base_weight(first, second);
    let all = total_product(first, second);
    let flip = 16.0 * pproj * (1.0 - pproj);
    let gate = p2 * p2;

    let bracket = |hit: f64, leak: f64| 8.0 * hit - all - flip * (hit - leak);

    let hit_a = a1 * a2 + b1 * b2;
    let hit_b = c1 * d2 + c2 * d1;
    let hit_c = c1 * c2 + d1 * d2;
    let hit_d = a1 * b2 + a2 * b1;

    let leak_a = a2 * c1 + b2 * d1;
    let leak_b = b1 * c2 + a1 * d2;
    let leak_c = a1 * c2 + b1 * d2;
    let leak_d = b2 * c1 + a2 * d1;

    [
        base + gate * bracket(hit_a, leak_a),
        base + gate * bracket(hit_b, leak_b),
        base + gate * bracket(hit_c, leak_c),
        base + gate * bracket(hit_d, leak_d),
    ]
}

/// Probability that one purification round keeps its output pair.
///
/// Both parties measure their target qubits and the round survives when the
/// outcomes agree. The result lies in [0, 1]. When both copies are the same
/// state it is at least 1/2, but two distinct copies of opposite parity
/// (an `A + B` pair against a `C + D` pair) can drive it to zero under
/// perfect gates, so callers guard against a zero denominator.
pub fn success_probability(
    first: &BellDiagonalState,
    second: &BellDiagonalState,
    pproj: f64,
    p2: f64,
) -> f64 {
    let parity1 = first.a + first.b - first.c - first.d;
    let parity2 = second.a + second.b - second.c - second.d;
    let readout = (1.0 - 2.0 * pproj).powi(2);
    4.0 * (base_weight(first, second) + p2 * p2 * readout * parity1 * parity2) / 8.0
}

fn purify_coefficient(
    k: usize,
    first: &BellDiagonalState,
    second: &BellDiagonalState,
    pproj: f64,
    p2: f64,
) -> f64 {
    purify_numerators(first, second, pproj, p2)[k]
        / (8.0 * success_probability(first, second, pproj, p2))
}

/// Post-purification weight of |Φ+⟩ (not renormalised; see [`purify`]).
pub fn purify_coefficient_a(
    first: &BellDiagonalState,
    second: &BellDiagonalState,
    pproj: f64,
    p2: f64,
) -> f64 {
    purify_coefficient(0, first, second, pproj, p2)
}

/// Post-purification weight of |Ψ−⟩ (not renormalised; see [`purify`]).
pub fn purify_coefficient_b(
    first: &BellDiagonalState,
    second: &BellDiagonalState,
    pproj: f64,
    p2: f64,
) -> f64 {
    purify_coefficient(1, first, second, pproj, p2)
}

/// Post-purification weight of |Ψ+⟩ (not renormalised; see [`purify`]).
pub fn purify_coefficient_c(
    first: &BellDiagonalState,
    second: &BellDiagonalState,
    pproj: f64,
    p2: f64,
) -> f64 {
    purify_coefficient(2, first, second, pproj, p2)
}

/// Post-purification weight of |Φ−⟩ (not renormalised; see [`purify`]).
pub fn purify_coefficient_d(
    first: &BellDiagonalState,
    second: &BellDiagonalState,
    pproj: f64,
    p2: f64,
) -> f64 {
    purify_coefficient(3, first, second, pproj, p2)
}

/// Output of one successful purification round.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Purified {
    /// The surviving pair.
    pub state: BellDiagonalState,
    /// Probability `N` that the round was accepted.
    pub success_probability: f64,
}

/// Run one purification round on two copies.
///
/// The four coefficients are evaluated together and renormalised as a set.
/// Returns `None` when the success probability is not a positive finite
/// number, i.e. the renormalisation would divide by zero.
pub fn purify(
    first: &BellDiagonalState,
    second: &BellDiagonalState,
    noise: &NoiseParameters,
) -> Option<Purified> {
    let n = success_probability(first, second, noise.pproj, noise.p2);
    if !n.is_finite() || n <= 0.0 {
        return None;
    }

    let raw = purify_numerators(first, second, noise.pproj, noise.p2).map(|w| w / (8.0 * n));
    let total: f64 = raw.iter().sum();
    if !total.is_finite() || total <= 0.0 {
        return None;
    }

    let [a, b, c, d] = raw.map(|w| (w / total).max(0.0));
    let total = a + b + c + d;
    Some(Purified {
        state: BellDiagonalState::from_normalized(a / total, b / total, c / total, d / total),
        success_probability: n,
    })
}

// ---------------------------------------------------------------------------
// Connection
// ---------------------------------------------------------------------------

/// `p1·(p2·(pproj²·ideal + (1 − pproj)²·double + cross) + (1 − p2)/4) + (1 − p1)/4`
fn connect_weight(ideal: f64, double: f64, cross: f64, pproj: f64, p1: f64, p2: f64) -> f64 {
    let projected = pproj * pproj * ideal + (1.0 - pproj).powi(2) * double + cross;
    p1 * (p2 * projected + (1.0 - p2) / 4.0) + (1.0 - p1) / 4.0
}

fn squares(s: &BellDiagonalState) -> f64 {
    s.a * s.a + s.b * s.b + s.c * s.c + s.d * s.d
}

fn same_parity(s: &BellDiagonalState) -> f64 {
    2.0 * s.a * s.b + 2.0 * s.c * s.d
}

fn phase_mix(s: &BellDiagonalState) -> f64 {
    2.0 * s.a * s.c + 2.0 * s.b * s.d
}

fn cross_mix(s: &BellDiagonalState) -> f64 {
    2.0 * s.a * s.d + 2.0 * s.b * s.c
}

/// Weight of |Φ+⟩ after swapping two copies of `state`.
pub fn connect_coefficient_a(state: &BellDiagonalState, pproj: f64, p1: f64, p2: f64) -> f64 {
    let single = 2.0 * pproj * (1.0 - pproj) * (state.a + state.b) * (state.c + state.d);
    connect_weight(squares(state), same_parity(state), single, pproj, p1, p2)
}

/// Weight of |Ψ−⟩ after swapping two copies of `state`.
pub fn connect_coefficient_b(state: &BellDiagonalState, pproj: f64, p1: f64, p2: f64) -> f64 {
    let single = 2.0 * pproj * (1.0 - pproj) * (state.a + state.b) * (state.c + state.d);
    connect_weight(same_parity(state), squares(state), single, pproj, p1, p2)
}

/// Weight of |Ψ+⟩ after swapping two copies of `state`.
pub fn connect_coefficient_c(state: &BellDiagonalState, pproj: f64, p1: f64, p2: f64) -> f64 {
    let single = pproj * (1.0 - pproj) * (squares(state) + same_parity(state));
    connect_weight(phase_mix(state), cross_mix(state), single, pproj, p1, p2)
}

/// Weight of |Φ−⟩ after swapping two copies of `state`.
pub fn connect_coefficient_d(state: &BellDiagonalState, pproj: f64, p1: f64, p2: f64) -> f64 {
    let single = pproj * (1.0 - pproj) * (squares(state) + same_parity(state));
    connect_weight(cross_mix(state), phase_mix(state), single, pproj, p1, p2)
}

/// Join two adjacent links holding `state` into one link of twice the span.
///
/// The outputs sum to one by construction, no renormalisation is applied.
pub fn connect(state: &BellDiagonalState, noise: &NoiseParameters) -> BellDiagonalState {
    let NoiseParameters { p1, p2, pproj } = *noise;
    BellDiagonalState::from_normalized(
        connect_coefficient_a(state, pproj, p1, p2),
        connect_coefficient_b(state, pproj, p1, p2),
        connect_coefficient_c(state, pproj, p1, p2),
        connect_coefficient_d(state, pproj, p1, p2),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_state_is_valid() {
        let s = BellDiagonalState::new(0.25, 0.25, 0.25, 0.25).unwrap();
        assert_eq!(s.fidelity(), 0.25);
    }

    #[test]
    fn test_sum_error_reports_sum() {
        match BellDiagonalState::new(0.5, 0.5, 0.5, 0.5) {
            Err(QrepError::CoefficientSum { sum }) => assert!((sum - 2.0).abs() < 1e-12),
            other => panic!("expected CoefficientSum, got {other:?}"),
        }
    }

    #[test]
    fn test_small_drift_accepted() {
        assert!(BellDiagonalState::new(0.70004, 0.1, 0.1, 0.1).is_ok());
        assert!(BellDiagonalState::new(0.7002, 0.1, 0.1, 0.1).is_err());
    }

    #[test]
    fn test_negative_and_nan_rejected() {
        assert!(matches!(
            BellDiagonalState::new(1.2, -0.2, 0.0, 0.0),
            Err(QrepError::InvalidCoefficient { name: "B", .. })
        ));
        assert!(BellDiagonalState::new(f64::NAN, 0.0, 0.0, 1.0).is_err());
    }

    #[test]
    fn test_werner_is_isotropic() {
        let s = BellDiagonalState::werner(0.7);
        assert!((s.b() - 0.1).abs() < 1e-12);
        assert_eq!(s.b(), s.c());
        assert_eq!(s.c(), s.d());
    }

    #[test]
    fn test_depolarize_ideal_pair() {
        let s = BellDiagonalState::ideal().depolarize(0.9);
        assert!((s.a() - 0.9).abs() < 1e-12);
        for w in [s.b(), s.c(), s.d()] {
            assert!((w - 0.1 / 3.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_serde_rejects_unnormalised_array() {
        let ok: BellDiagonalState = serde_json::from_str("[0.7, 0.1, 0.1, 0.1]").unwrap();
        assert_eq!(ok.fidelity(), 0.7);
        assert!(serde_json::from_str::<BellDiagonalState>("[0.7, 0.7, 0.1, 0.1]").is_err());
    }

    #[test]
    fn test_purify_flags_zero_denominator() {
        // Unphysical inputs chosen so that N = 0.
        let first = BellDiagonalState {
            a: 0.0,
            b: 0.0,
            c: 0.0,
            d: 0.0,
        };
        assert!(purify(&first, &first, &NoiseParameters::noiseless()).is_none());
    }
}
