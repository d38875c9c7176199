//! Circuit form of the aggregation state.

use crate::aggregation::AggregationState;
use crate::context::ProvingContext;
use crate::primitives::{Sequence, point_from_coords, point_to_coords};

/// A curve-point commitment bound into a circuit as its two affine
/// coordinates, with `(0, 0)` standing for the identity.
#[derive(Debug)]
pub struct CircuitPoint<C: ProvingContext> {
    /// Witness for the affine x coordinate.
    pub x: C::Var,
    /// Witness for the affine y coordinate.
    pub y: C::Var,
}

// Manual impl: the derive would demand `C: Clone`, but only the
// witness handles are cloned and `ProvingContext` already requires
// `Var: Clone`.
impl<C: ProvingContext> Clone for CircuitPoint<C> {
    fn clone(&self) -> Self {
        Self {
            x: self.x.clone(),
            y: self.y.clone(),
        }
    }
}

impl<C: ProvingContext> CircuitPoint<C> {
    pub fn lift(point: &pasta_curves::EpAffine, cx: &mut C) -> Self {
        let (x, y) = point_to_coords(point);
        Self {
            x: cx.alloc(x),
            y: cx.alloc(y),
        }
    }

    /// # Panics
    ///
    /// If the resolved coordinates name no curve point — the witness
    /// was corrupted mid-construction, a contract violation.
    pub fn lower(&self, cx: &C) -> pasta_curves::EpAffine {
        point_from_coords(cx.resolve(&self.x), cx.resolve(&self.y))
            .unwrap_or_else(|| panic!("resolved coordinates do not name a curve point"))
    }

    pub(crate) fn mark_public(&self, cx: &mut C) {
        cx.mark_public(&self.x);
        cx.mark_public(&self.y);
    }
}

/// Circuit form of [`AggregationState`].
///
/// The point commitments and public-input block are witness-bound; the
/// witness-location indices and presence flag are bookkeeping the
/// engine reads natively, so they cross representations untouched —
/// mirroring how the engine's own recursion plumbing treats them.
#[derive(Debug)]
pub struct CircuitAggregationState<C: ProvingContext> {
    /// First recursion-output commitment.
    pub p0: CircuitPoint<C>,
    /// Second recursion-output commitment.
    pub p1: CircuitPoint<C>,
    /// Witness-bound public-input block, declared width preserved.
    pub public_inputs: Vec<C::Var>,
    /// Witness locations, carried natively.
    pub proof_witness_indices: Sequence<u32>,
    /// Presence flag, carried natively.
    pub has_data: bool,
}

impl<C: ProvingContext> Clone for CircuitAggregationState<C> {
    fn clone(&self) -> Self {
        Self {
            p0: self.p0.clone(),
            p1: self.p1.clone(),
            public_inputs: self.public_inputs.clone(),
            proof_witness_indices: self.proof_witness_indices.clone(),
            has_data: self.has_data,
        }
    }
}

impl<C: ProvingContext> CircuitAggregationState<C> {
    /// Lifts a native aggregation state into the context, reconstructing
    /// the token from its components inside the circuit.
    #[must_use]
    pub fn lift(native: &AggregationState, cx: &mut C) -> Self {
        Self {
            p0: CircuitPoint::lift(&native.p0, cx),
            p1: CircuitPoint::lift(&native.p1, cx),
            public_inputs: native.public_inputs.iter().map(|value| cx.alloc(*value)).collect(),
            proof_witness_indices: native.proof_witness_indices.clone(),
            has_data: native.has_data,
        }
    }

    /// Lowers this state back to native form.
    #[must_use]
    pub fn lower(&self, cx: &C) -> AggregationState {
        AggregationState {
            p0: self.p0.lower(cx),
            p1: self.p1.lower(cx),
            public_inputs: Sequence::from_slots(
                self.public_inputs.len(),
                self.public_inputs.iter().map(|var| cx.resolve(var)).collect(),
            ),
            proof_witness_indices: self.proof_witness_indices.clone(),
            has_data: self.has_data,
        }
    }

    pub(crate) fn mark_public(&self, cx: &mut C) {
        self.p0.mark_public(cx);
        self.p1.mark_public(cx);
        for var in &self.public_inputs {
            cx.mark_public(var);
        }
    }
}
