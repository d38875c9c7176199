//! Native simulation of the merge reduction.
//!
//! This is the out-of-circuit execution path: a [`ProvingContext`]
//! whose variables are plain field elements, an engine that performs
//! the aggregation arithmetic directly on curve points, and the
//! process-boundary operation that runs one reduction over serialized
//! buffers. Simulation answers "would this pair of subtrees merge
//! cleanly" without building a constraint system, which is how rollup
//! builders vet candidate trees before committing prover time.

use blake2b_simd::Params;
use ff::PrimeField as _;
use pasta_curves::group::Curve as _;
use pasta_curves::{Ep, Fp};

use crate::circuit::{CircuitAggregationState, CircuitPoint};
use crate::codec::{self, DecodeError};
use crate::constants::{Capacities, LOG_DIGEST_PERSONALIZATION, LOGS_HASH_WIDTH};
use crate::context::{ProvingContext, ProvingEngine};
use crate::diagnostics::Diagnostics;
use crate::merge::merge;
use crate::primitives::{point_from_coords, point_to_coords};

/// A proving context whose variables are the values themselves.
///
/// Allocation is the identity, addition is field addition, and public
/// marking records the value so callers can inspect what a real
/// circuit would have exposed.
#[derive(Clone, Debug, Default)]
pub struct Simulator {
    public_values: Vec<Fp>,
}

impl Simulator {
    /// A fresh context with no public values recorded.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Values marked public, in marking order.
    #[must_use]
    pub fn public_values(&self) -> &[Fp] {
        &self.public_values
    }
}

impl ProvingContext for Simulator {
    type Var = Fp;

    fn alloc(&mut self, value: Fp) -> Fp {
        value
    }

    fn resolve(&self, var: &Fp) -> Fp {
        *var
    }

    fn add(&mut self, left: &Fp, right: &Fp) -> Fp {
        *left + *right
    }

    fn mark_public(&mut self, var: &Fp) {
        self.public_values.push(*var);
    }
}

/// The native proving engine: aggregation by direct curve arithmetic,
/// log-digest recombination by personalized BLAKE2b.
#[derive(Clone, Copy, Debug, Default)]
pub struct NativeEngine;

impl NativeEngine {
    /// Adds two committed points. `None` if either child's coordinates
    /// name no curve point, which is the native analogue of a failed
    /// recursive verification.
    fn accumulate_point(
        cx: &Simulator,
        left: &CircuitPoint<Simulator>,
        right: &CircuitPoint<Simulator>,
    ) -> Option<CircuitPoint<Simulator>> {
        let left_point = point_from_coords(cx.resolve(&left.x), cx.resolve(&left.y))?;
        let right_point = point_from_coords(cx.resolve(&right.x), cx.resolve(&right.y))?;
        let sum = (Ep::from(left_point) + Ep::from(right_point)).to_affine();
        let (x, y) = point_to_coords(&sum);
        Some(CircuitPoint { x, y })
    }
}

impl ProvingEngine<Simulator> for NativeEngine {
    fn verify_and_combine(
        &self,
        cx: &mut Simulator,
        left: &CircuitAggregationState<Simulator>,
        right: &CircuitAggregationState<Simulator>,
    ) -> (CircuitAggregationState<Simulator>, bool) {
        let p0 = Self::accumulate_point(cx, &left.p0, &right.p0);
        let p1 = Self::accumulate_point(cx, &left.p1, &right.p1);
        let ok = p0.is_some() && p1.is_some();

        let public_inputs = left
            .public_inputs
            .iter()
            .zip(&right.public_inputs)
            .map(|(left_var, right_var)| cx.add(left_var, right_var))
            .collect();
        // A child without data contributes nothing; the surviving
        // child's witness locations carry forward.
        let proof_witness_indices = if left.has_data {
            left.proof_witness_indices.clone()
        } else {
            right.proof_witness_indices.clone()
        };

        (
            CircuitAggregationState {
                p0: p0.unwrap_or_else(|| left.p0.clone()),
                p1: p1.unwrap_or_else(|| left.p1.clone()),
                public_inputs,
                proof_witness_indices,
                has_data: left.has_data || right.has_data,
            },
            ok,
        )
    }

    fn combine_log_digests(
        &self,
        cx: &mut Simulator,
        left: &[Fp; LOGS_HASH_WIDTH],
        right: &[Fp; LOGS_HASH_WIDTH],
    ) -> [Fp; LOGS_HASH_WIDTH] {
        let mut hasher = Params::new()
            .hash_length(32)
            .personal(LOG_DIGEST_PERSONALIZATION)
            .to_state();
        for half in left.iter().chain(right) {
            hasher.update(cx.resolve(half).to_repr().as_ref());
        }
        let digest = hasher.finalize();
        split_digest(digest.as_bytes()).map(|value| cx.alloc(value))
    }
}

/// Splits a 32-byte digest into two 128-bit field elements, low half
/// first. Each half is below the modulus by construction.
fn split_digest(bytes: &[u8]) -> [Fp; LOGS_HASH_WIDTH] {
    let mut low = [0u8; 16];
    let mut high = [0u8; 16];
    let (low_bytes, high_bytes) = bytes.split_at(16);
    low.copy_from_slice(low_bytes);
    high.copy_from_slice(high_bytes);
    [
        Fp::from_u128(u128::from_le_bytes(low)),
        Fp::from_u128(u128::from_le_bytes(high)),
    ]
}

/// Result of one simulated reduction at a process boundary.
#[derive(Clone, Debug)]
pub struct MergeOutput {
    /// The serialized parent subtree, valid only if `diagnostics` is
    /// empty.
    pub parent: Vec<u8>,
    /// Serialized findings payload, empty on a clean merge.
    pub diagnostics: Vec<u8>,
}

/// Runs one merge reduction over serialized child subtrees.
///
/// Both buffers must encode subtrees at `child_caps`; the returned
/// parent is encoded at `child_caps.doubled()`. Malformed buffers are
/// the one fatal path, everything the reduction itself detects lands
/// in the diagnostics payload instead.
pub fn simulate_merge(
    left_bytes: &[u8],
    right_bytes: &[u8],
    child_caps: &Capacities,
) -> Result<MergeOutput, DecodeError> {
    let left_native = codec::decode_subtree(left_bytes, child_caps)?;
    let right_native = codec::decode_subtree(right_bytes, child_caps)?;

    let mut cx = Simulator::new();
    let mut diag = Diagnostics::new("simulate_merge");
    let left_subtree = left_native.lift(&mut cx);
    let right_subtree = right_native.lift(&mut cx);
    let parent = merge(&mut cx, &NativeEngine, left_subtree, right_subtree, &mut diag);

    let native = parent.lower(&cx);
    parent.effects.mark_as_output(&mut cx);
    Ok(MergeOutput {
        parent: codec::encode_subtree(&native),
        diagnostics: diag.to_payload(),
    })
}
