//! The recursive-proof aggregation state.
//!
//! An [`AggregationState`] is an opaque, composable token standing for a
//! not-yet-finally-checked recursive verification result: two curve
//! point commitments produced by the proving engine's recursion output,
//! the public-input block those points commit to, the witness locations
//! the engine assigned them, and a flag recording whether a prior
//! recursive verification has actually happened.
//!
//! This crate never interprets the algebra inside the token. Its only
//! operations here are lifting to circuit form, lowering to native
//! form, and combination of two states — the last delegated entirely to
//! the external proving engine
//! ([`ProvingEngine::verify_and_combine`](crate::context::ProvingEngine)).

use pasta_curves::group::prime::PrimeCurveAffine as _;
use pasta_curves::{EpAffine, Fp};

use crate::constants::{AGGREGATION_PUBLIC_INPUTS_LENGTH, AGGREGATION_WITNESS_INDICES_LENGTH};
use crate::primitives::Sequence;

/// The native (off-circuit) form of a pending recursive-verification
/// token.
///
/// The public-input and witness-index blocks are fixed-width and
/// zero-padded, like every other sequence in this protocol: the wire
/// codec carries no length prefixes.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AggregationState {
    /// First recursion-output commitment.
    pub p0: EpAffine,
    /// Second recursion-output commitment.
    pub p1: EpAffine,
    /// Public-input commitments, zero-padded to
    /// [`AGGREGATION_PUBLIC_INPUTS_LENGTH`].
    pub public_inputs: Sequence<Fp>,
    /// Witness locations of the recursion output, zero-padded to
    /// [`AGGREGATION_WITNESS_INDICES_LENGTH`].
    pub proof_witness_indices: Sequence<u32>,
    /// Whether a prior recursive verification has populated this state.
    pub has_data: bool,
}

impl AggregationState {
    /// The empty state: no prior verification, identity commitments,
    /// all-zero blocks.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            p0: EpAffine::identity(),
            p1: EpAffine::identity(),
            public_inputs: Sequence::zeroed(AGGREGATION_PUBLIC_INPUTS_LENGTH),
            proof_witness_indices: Sequence::zeroed(AGGREGATION_WITNESS_INDICES_LENGTH),
            has_data: false,
        }
    }
}

impl Default for AggregationState {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_state_has_declared_widths() {
        let state = AggregationState::empty();
        assert_eq!(state.public_inputs.capacity(), AGGREGATION_PUBLIC_INPUTS_LENGTH);
        assert_eq!(
            state.proof_witness_indices.capacity(),
            AGGREGATION_WITNESS_INDICES_LENGTH
        );
        assert!(!state.has_data);
    }
}
