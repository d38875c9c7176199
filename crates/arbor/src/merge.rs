//! The merge reducer: pairwise binary combination of rollup subtrees.
//!
//! Rollup construction reduces subtrees bottom-up:
//!
//! ```text
//!  kernel      kernel      kernel      kernel     <-- height 0 leaves
//!    \           /           \           /
//!     merge(l, r)             merge(l, r)         <-- height 1
//!           \                      /
//!            \                    /
//!             merge(l, r)                         <-- height 2, root
//! ```
//!
//! Each reduction is a pure function of its two inputs plus the
//! caller's [`Diagnostics`] collector and proving context. Sibling
//! reductions share no data and may run in parallel, each with its own
//! context and collector, joined at the next level.
//!
//! Recoverable defects (root discontinuity, height mismatch, aggregation
//! failure) are recorded and construction continues, so one simulation
//! pass enumerates every defect of a candidate tree. The returned
//! parent is only valid if the collector stayed empty.

use core::fmt;

use pasta_curves::Fp;

use crate::circuit::CircuitAccumulatedEffects;
use crate::context::{ProvingContext, ProvingEngine};
use crate::diagnostics::{Diagnostics, FindingKind};
use crate::effects::AccumulatedEffects;

/// The tracked state-tree roots at one edge of a subtree.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TreeRoots {
    /// Commitment (note data) tree root.
    #[cfg_attr(feature = "serde", serde(with = "crate::primitives::fp_serde"))]
    pub commitment_root: Fp,
    /// Nullifier tree root.
    #[cfg_attr(feature = "serde", serde(with = "crate::primitives::fp_serde"))]
    pub nullifier_root: Fp,
    /// Contract tree root.
    #[cfg_attr(feature = "serde", serde(with = "crate::primitives::fp_serde"))]
    pub contract_root: Fp,
    /// Cross-domain message tree root.
    #[cfg_attr(feature = "serde", serde(with = "crate::primitives::fp_serde"))]
    pub message_root: Fp,
}

impl TreeRoots {
    /// All-zero roots, for padding and test scaffolding.
    #[must_use]
    pub fn zeroed() -> Self {
        Self {
            commitment_root: Fp::default(),
            nullifier_root: Fp::default(),
            contract_root: Fp::default(),
            message_root: Fp::default(),
        }
    }

    fn named(&self) -> [(&'static str, Fp); 4] {
        [
            ("commitment tree", self.commitment_root),
            ("nullifier tree", self.nullifier_root),
            ("contract tree", self.contract_root),
            ("message tree", self.message_root),
        ]
    }
}

impl fmt::Display for TreeRoots {
    #[expect(clippy::use_debug, reason = "field elements only implement Debug")]
    fn fmt(&self, out: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            out,
            "commitment={:?} nullifier={:?} contract={:?} message={:?}",
            self.commitment_root, self.nullifier_root, self.contract_root, self.message_root
        )
    }
}

/// One subtree of the merge tree: circuit-form accumulated effects plus
/// the subtree metadata the continuity checks run over.
#[derive(Clone, Debug)]
pub struct Subtree<C: ProvingContext> {
    /// Accumulated effects of every transaction under this subtree.
    pub effects: CircuitAccumulatedEffects<C>,
    /// Height of this subtree in the merge tree; kernels are height 0.
    pub height: u64,
    /// Tracked roots before the first transaction of this subtree.
    pub start: TreeRoots,
    /// Tracked roots after the last transaction of this subtree.
    pub end: TreeRoots,
}

/// The native (wire-side) form of a subtree, as decoded from or
/// encoded to a process boundary buffer.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct NativeSubtree {
    /// Accumulated effects of every transaction under this subtree.
    pub effects: AccumulatedEffects,
    /// Height of this subtree in the merge tree; kernels are height 0.
    pub height: u64,
    /// Tracked roots before the first transaction of this subtree.
    pub start: TreeRoots,
    /// Tracked roots after the last transaction of this subtree.
    pub end: TreeRoots,
}

impl NativeSubtree {
    /// Allocates this subtree's effects into `cx`. Metadata stays
    /// native; the continuity checks run outside the constraint system.
    pub fn lift<C: ProvingContext>(&self, cx: &mut C) -> Subtree<C> {
        Subtree {
            effects: CircuitAccumulatedEffects::lift(&self.effects, cx),
            height: self.height,
            start: self.start,
            end: self.end,
        }
    }
}

impl<C: ProvingContext> Subtree<C> {
    /// Reads this subtree's effects back out of `cx` into native form.
    pub fn lower(&self, cx: &C) -> NativeSubtree {
        NativeSubtree {
            effects: self.effects.lower(cx),
            height: self.height,
            start: self.start,
            end: self.end,
        }
    }
}

/// Reduces two sibling subtrees into their parent.
///
/// Both children must be circuit-form records of identical declared
/// capacities — exactly half the parent's for every sequence field, a
/// static protocol invariant established by capacity sizing upstream,
/// not re-checked here.
///
/// 1. **Continuity**: heights must match and `left.end` must equal
///    `right.start` for every tracked root. Violations are recorded in
///    `diag`, one finding per defect, and construction continues.
/// 2. **Concatenation**: every sequence field of the parent is
///    `left ++ right`, index-preserving, left block first.
/// 3. **Aggregation**: the parent's token is the engine's
///    verify-and-combine over the children's; a reported failure is
///    recorded, not thrown.
/// 4. **Metadata**: parent height is `left.height + 1`; the parent
///    spans `left.start` to `right.end`.
///
/// Deterministic for fixed inputs: no randomness, no I/O, no time.
#[must_use]
pub fn merge<C, E>(
    cx: &mut C,
    engine: &E,
    left: Subtree<C>,
    right: Subtree<C>,
    diag: &mut Diagnostics,
) -> Subtree<C>
where
    C: ProvingContext,
    E: ProvingEngine<C>,
{
    // 1. Continuity.
    if left.height != right.height {
        diag.record(
            FindingKind::StructuralMismatch,
            format!(
                "subtree heights differ: left {} vs right {}",
                left.height, right.height
            ),
        );
    }
    for ((name, left_end), (_, right_start)) in
        left.end.named().into_iter().zip(right.start.named())
    {
        if left_end != right_start {
            diag.record(
                FindingKind::StructuralMismatch,
                format!("{name} root discontinuity between left end and right start"),
            );
        }
    }

    // 3. Aggregation combination (before the children's effects are
    // consumed by concatenation).
    let (aggregation_state, combined_ok) = engine.verify_and_combine(
        cx,
        &left.effects.aggregation_state,
        &right.effects.aggregation_state,
    );
    if !combined_ok {
        diag.record(
            FindingKind::AggregationFailure,
            "proving engine rejected recursive-proof combination",
        );
    }

    let encrypted_logs_hash = engine.combine_log_digests(
        cx,
        &left.effects.encrypted_logs_hash,
        &right.effects.encrypted_logs_hash,
    );
    let unencrypted_logs_hash = engine.combine_log_digests(
        cx,
        &left.effects.unencrypted_logs_hash,
        &right.effects.unencrypted_logs_hash,
    );
    let encrypted_log_preimages_length = cx.add(
        &left.effects.encrypted_log_preimages_length,
        &right.effects.encrypted_log_preimages_length,
    );
    let unencrypted_log_preimages_length = cx.add(
        &left.effects.unencrypted_log_preimages_length,
        &right.effects.unencrypted_log_preimages_length,
    );

    // 2. Positional concatenation, left block first. Left and right
    // capacities sum exactly to the parent's declared capacity, so no
    // overflow or truncation is possible by construction.
    let effects = CircuitAccumulatedEffects {
        aggregation_state,
        new_commitments: concat(left.effects.new_commitments, right.effects.new_commitments),
        new_nullifiers: concat(left.effects.new_nullifiers, right.effects.new_nullifiers),
        private_call_stack: concat(
            left.effects.private_call_stack,
            right.effects.private_call_stack,
        ),
        public_call_stack: concat(
            left.effects.public_call_stack,
            right.effects.public_call_stack,
        ),
        new_l2_to_l1_msgs: concat(left.effects.new_l2_to_l1_msgs, right.effects.new_l2_to_l1_msgs),
        encrypted_logs_hash,
        unencrypted_logs_hash,
        encrypted_log_preimages_length,
        unencrypted_log_preimages_length,
        new_contracts: concat(left.effects.new_contracts, right.effects.new_contracts),
        optionally_revealed_data: concat(
            left.effects.optionally_revealed_data,
            right.effects.optionally_revealed_data,
        ),
        public_data_update_requests: concat(
            left.effects.public_data_update_requests,
            right.effects.public_data_update_requests,
        ),
        public_data_reads: concat(left.effects.public_data_reads, right.effects.public_data_reads),
    };

    // 4. Metadata propagation.
    Subtree {
        effects,
        height: left.height + 1,
        start: left.start,
        end: right.end,
    }
}

fn concat<T>(mut left: Vec<T>, right: Vec<T>) -> Vec<T> {
    left.extend(right);
    left
}
