//! BLAKE2b-based mock of a recursive proving engine.
//!
//! [`MockContext`] is a proving context with a real witness table:
//! variables are table indices, so tests catch code that confuses a
//! witness with its value. [`MockEngine`] stands in for the recursive
//! verifier: it derives the parent's commitments from a personalized
//! BLAKE2b digest of the children's, and its verdict is configurable
//! so tests can exercise the aggregation-failure path.
//!
//! Nothing here is sound. It exists so the merge layer can be tested
//! without a proof system.

use blake2b_simd::Params;
use ff::PrimeField;
use group::{Curve, Group};
use pasta_curves::{Ep, Fp, Fq};

use arbor::circuit::{CircuitAggregationState, CircuitPoint};
use arbor::constants::{AGGREGATION_WITNESS_INDICES_LENGTH, LOGS_HASH_WIDTH};
use arbor::{ProvingContext, ProvingEngine, Sequence};

const COMBINE_PERSONALIZATION: &[u8; 16] = b"ArborMock-Combin";
const DIGEST_PERSONALIZATION: &[u8; 16] = b"ArborMock-LogDig";

/// A proving context backed by an explicit witness table.
///
/// Variables are indices into the table. Resolving an index the
/// context never allocated is a caller bug and panics.
#[derive(Debug, Default)]
pub struct MockContext {
    witnesses: Vec<Fp>,
    public: Vec<usize>,
}

impl MockContext {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of allocated witnesses.
    #[must_use]
    pub fn witness_count(&self) -> usize {
        self.witnesses.len()
    }

    /// Witness indices marked public, in marking order.
    #[must_use]
    pub fn public_indices(&self) -> &[usize] {
        &self.public
    }
}

impl ProvingContext for MockContext {
    type Var = usize;

    fn alloc(&mut self, value: Fp) -> usize {
        self.witnesses.push(value);
        self.witnesses.len() - 1
    }

    fn resolve(&self, var: &usize) -> Fp {
        self.witnesses
            .get(*var)
            .copied()
            .unwrap_or_else(|| panic!("witness {var} was never allocated"))
    }

    fn add(&mut self, left: &usize, right: &usize) -> usize {
        let sum = self.resolve(left) + self.resolve(right);
        self.alloc(sum)
    }

    fn mark_public(&mut self, var: &usize) {
        self.public.push(*var);
    }
}

/// A stand-in recursive verifier with a configurable verdict.
#[derive(Clone, Copy, Debug)]
pub struct MockEngine {
    verdict: bool,
}

impl MockEngine {
    /// An engine that accepts every combination.
    #[must_use]
    pub fn accepting() -> Self {
        Self { verdict: true }
    }

    /// An engine that rejects every combination, for exercising the
    /// failure-recording path.
    #[must_use]
    pub fn rejecting() -> Self {
        Self { verdict: false }
    }
}

impl ProvingEngine<MockContext> for MockEngine {
    fn verify_and_combine(
        &self,
        cx: &mut MockContext,
        left: &CircuitAggregationState<MockContext>,
        right: &CircuitAggregationState<MockContext>,
    ) -> (CircuitAggregationState<MockContext>, bool) {
        let mut hasher = Params::new()
            .hash_length(32)
            .personal(COMBINE_PERSONALIZATION)
            .to_state();
        for side in [left, right] {
            for var in [&side.p0.x, &side.p0.y, &side.p1.x, &side.p1.y] {
                hasher.update(cx.resolve(var).to_repr().as_ref());
            }
            for var in &side.public_inputs {
                hasher.update(cx.resolve(var).to_repr().as_ref());
            }
        }
        let digest = hasher.finalize();

        let p0_native = (Ep::generator() * scalar_at(digest.as_bytes(), 0)).to_affine();
        let p1_native = (Ep::generator() * scalar_at(digest.as_bytes(), 8)).to_affine();
        let p0 = CircuitPoint::lift(&p0_native, cx);
        let p1 = CircuitPoint::lift(&p1_native, cx);

        let public_inputs: Vec<usize> = left
            .public_inputs
            .iter()
            .zip(&right.public_inputs)
            .map(|(left_var, right_var)| cx.add(left_var, right_var))
            .collect();

        // The parent's witness locations are where this combination
        // landed its point coordinates.
        let locations = [p0.x, p0.y, p1.x, p1.y]
            .into_iter()
            .map(|index| u32::try_from(index).unwrap_or(u32::MAX))
            .collect::<Vec<u32>>();
        let proof_witness_indices =
            Sequence::from_leading(AGGREGATION_WITNESS_INDICES_LENGTH, &locations);

        (
            CircuitAggregationState {
                p0,
                p1,
                public_inputs,
                proof_witness_indices,
                has_data: left.has_data || right.has_data,
            },
            self.verdict,
        )
    }

    fn combine_log_digests(
        &self,
        cx: &mut MockContext,
        left: &[usize; LOGS_HASH_WIDTH],
        right: &[usize; LOGS_HASH_WIDTH],
    ) -> [usize; LOGS_HASH_WIDTH] {
        let mut hasher = Params::new()
            .hash_length(32)
            .personal(DIGEST_PERSONALIZATION)
            .to_state();
        for var in left.iter().chain(right) {
            hasher.update(cx.resolve(var).to_repr().as_ref());
        }
        let digest = hasher.finalize();

        let (low, high) = digest.as_bytes().split_at(16);
        [half_to_field(low), half_to_field(high)].map(|value| cx.alloc(value))
    }
}

fn scalar_at(bytes: &[u8], offset: usize) -> Fq {
    let mut word = [0u8; 8];
    word.copy_from_slice(bytes.get(offset..offset + 8).unwrap_or(&[0; 8]));
    Fq::from(u64::from_le_bytes(word))
}

fn half_to_field(half: &[u8]) -> Fp {
    let mut bytes = [0u8; 16];
    bytes.copy_from_slice(half);
    Fp::from_u128(u128::from_le_bytes(bytes))
}

#[cfg(test)]
mod tests {
    use ff::Field;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use arbor::circuit::CircuitAccumulatedEffects;
    use arbor::diagnostics::{Diagnostics, FindingKind};
    use arbor::merge::{NativeSubtree, Subtree, TreeRoots, merge};
    use arbor::records::{
        ContractDeployment, OptionallyRevealedData, PublicDataRead, PublicDataUpdateRequest,
    };
    use arbor::{AccumulatedEffects, Capacities};

    use super::*;

    fn roots(tag: u64) -> TreeRoots {
        TreeRoots {
            commitment_root: Fp::from(tag),
            nullifier_root: Fp::from(tag + 1),
            contract_root: Fp::from(tag + 2),
            message_root: Fp::from(tag + 3),
        }
    }

    fn leaf(commitments: &[Fp], start: TreeRoots, end: TreeRoots) -> NativeSubtree {
        let caps = Capacities::KERNEL;
        let mut effects = AccumulatedEffects::zeroed(&caps);
        effects.new_commitments = Sequence::from_leading(caps.new_commitments, commitments);
        effects.encrypted_log_preimages_length = 7;
        effects.unencrypted_log_preimages_length = 3;
        NativeSubtree {
            effects,
            height: 0,
            start,
            end,
        }
    }

    /// A kernel record with every sequence field populated, values
    /// derived from `tag` so left and right children are distinct.
    fn populated_effects(tag: u64) -> AccumulatedEffects {
        let caps = Capacities::KERNEL;
        let mut effects = AccumulatedEffects::zeroed(&caps);
        effects.new_commitments = Sequence::from_leading(
            caps.new_commitments,
            &[Fp::from(tag + 1), Fp::from(tag + 2)],
        );
        effects.new_nullifiers =
            Sequence::from_leading(caps.new_nullifiers, &[Fp::from(tag + 3)]);
        effects.private_call_stack = Sequence::from_leading(
            caps.private_call_stack,
            &[Fp::from(tag + 4), Fp::from(tag + 5)],
        );
        effects.public_call_stack =
            Sequence::from_leading(caps.public_call_stack, &[Fp::from(tag + 6)]);
        effects.new_l2_to_l1_msgs =
            Sequence::from_leading(caps.new_l2_to_l1_msgs, &[Fp::from(tag + 7)]);
        effects.encrypted_logs_hash = [Fp::from(tag + 8), Fp::from(tag + 9)];
        effects.unencrypted_logs_hash = [Fp::from(tag + 10), Fp::from(tag + 11)];
        effects.encrypted_log_preimages_length = tag + 12;
        effects.unencrypted_log_preimages_length = tag + 13;
        effects.new_contracts = Sequence::from_leading(
            caps.new_contracts,
            &[ContractDeployment {
                contract_address: Fp::from(tag + 14),
                portal_contract_address: Fp::from(tag + 15),
                function_tree_root: Fp::from(tag + 16),
            }],
        );
        effects.optionally_revealed_data = Sequence::from_leading(
            caps.optionally_revealed_data,
            &[OptionallyRevealedData {
                call_stack_item_hash: Fp::from(tag + 17),
                function_selector: u32::try_from(tag + 18).unwrap(),
                vk_hash: Fp::from(tag + 19),
                portal_contract_address: Fp::from(tag + 20),
                pay_fee_from_l1: true,
                pay_fee_from_public_l2: false,
                called_from_l1: false,
                called_from_public_l2: true,
            }],
        );
        effects.public_data_update_requests = Sequence::from_leading(
            caps.public_data_update_requests,
            &[PublicDataUpdateRequest {
                leaf_index: Fp::from(tag + 21),
                old_value: Fp::from(tag + 22),
                new_value: Fp::from(tag + 23),
            }],
        );
        effects.public_data_reads = Sequence::from_leading(
            caps.public_data_reads,
            &[PublicDataRead {
                leaf_index: Fp::from(tag + 24),
                value: Fp::from(tag + 25),
            }],
        );
        effects
    }

    /// Lowering a lifted record reproduces it exactly, through a
    /// context where variables are table indices rather than values.
    #[test]
    fn conversion_round_trip() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut effects = populated_effects(40);
        effects.new_commitments = Sequence::from_leading(
            Capacities::KERNEL.new_commitments,
            &[Fp::random(&mut rng), Fp::random(&mut rng)],
        );
        effects.encrypted_logs_hash = [Fp::random(&mut rng), Fp::random(&mut rng)];

        let mut cx = MockContext::new();
        let circuit = CircuitAccumulatedEffects::lift(&effects, &mut cx);
        assert_eq!(circuit.lower(&cx), effects);
    }

    /// One clean reduction over two kernel leaves: parent sequences are
    /// left block then right block, padding preserved in place, lengths
    /// summed, no findings.
    #[test]
    fn clean_merge_pipeline() {
        let c1 = Fp::from(11u64);
        let c2 = Fp::from(12u64);
        let c3 = Fp::from(13u64);
        let left = leaf(&[c1, c2], roots(100), roots(200));
        let right = leaf(&[c3], roots(200), roots(300));

        let mut cx = MockContext::new();
        let mut diag = Diagnostics::new("clean_merge_pipeline");
        let left = left.lift(&mut cx);
        let right = right.lift(&mut cx);
        let parent = merge(&mut cx, &MockEngine::accepting(), left, right, &mut diag);
        assert!(diag.is_empty());

        let native = parent.lower(&cx);
        assert_eq!(native.height, 1);
        assert_eq!(native.start, roots(100));
        assert_eq!(native.end, roots(300));
        assert_eq!(
            native.effects.new_commitments.as_slots(),
            &[c1, c2, Fp::ZERO, Fp::ZERO, c3, Fp::ZERO, Fp::ZERO, Fp::ZERO],
        );
        assert_eq!(native.effects.encrypted_log_preimages_length, 14);
        assert_eq!(native.effects.unencrypted_log_preimages_length, 6);
        assert_eq!(
            native.effects.capacities(),
            Capacities::KERNEL.doubled(),
        );

        parent.effects.mark_as_output(&mut cx);
        assert!(!cx.public_indices().is_empty());
    }

    /// Merging fully-populated children concatenates every sequence
    /// field left block first, sums the preimage lengths, and the
    /// lowered sub-records survive the selector and flag narrowing.
    #[test]
    fn merge_concatenates_every_sequence_field() {
        fn joined<T: Clone>(left: &Sequence<T>, right: &Sequence<T>) -> Vec<T> {
            left.iter().chain(right.iter()).cloned().collect()
        }

        let left_effects = populated_effects(100);
        let right_effects = populated_effects(200);
        let left = NativeSubtree {
            effects: left_effects.clone(),
            height: 0,
            start: roots(0),
            end: roots(10),
        };
        let right = NativeSubtree {
            effects: right_effects.clone(),
            height: 0,
            start: roots(10),
            end: roots(20),
        };

        let mut cx = MockContext::new();
        let mut diag = Diagnostics::new("full_merge");
        let left = left.lift(&mut cx);
        let right = right.lift(&mut cx);
        let parent = merge(&mut cx, &MockEngine::accepting(), left, right, &mut diag);
        assert!(diag.is_empty());

        let native = parent.lower(&cx);
        assert_eq!(
            native.effects.new_commitments.as_slots(),
            joined(&left_effects.new_commitments, &right_effects.new_commitments),
        );
        assert_eq!(
            native.effects.new_nullifiers.as_slots(),
            joined(&left_effects.new_nullifiers, &right_effects.new_nullifiers),
        );
        assert_eq!(
            native.effects.private_call_stack.as_slots(),
            joined(&left_effects.private_call_stack, &right_effects.private_call_stack),
        );
        assert_eq!(
            native.effects.public_call_stack.as_slots(),
            joined(&left_effects.public_call_stack, &right_effects.public_call_stack),
        );
        assert_eq!(
            native.effects.new_l2_to_l1_msgs.as_slots(),
            joined(&left_effects.new_l2_to_l1_msgs, &right_effects.new_l2_to_l1_msgs),
        );
        assert_eq!(
            native.effects.new_contracts.as_slots(),
            joined(&left_effects.new_contracts, &right_effects.new_contracts),
        );
        assert_eq!(
            native.effects.optionally_revealed_data.as_slots(),
            joined(
                &left_effects.optionally_revealed_data,
                &right_effects.optionally_revealed_data,
            ),
        );
        assert_eq!(
            native.effects.public_data_update_requests.as_slots(),
            joined(
                &left_effects.public_data_update_requests,
                &right_effects.public_data_update_requests,
            ),
        );
        assert_eq!(
            native.effects.public_data_reads.as_slots(),
            joined(&left_effects.public_data_reads, &right_effects.public_data_reads),
        );
        assert_eq!(native.effects.encrypted_log_preimages_length, 112 + 212);
        assert_eq!(native.effects.unencrypted_log_preimages_length, 113 + 213);
        // The nonzero disclosure record came through the u32/bool
        // narrowing intact.
        let disclosed = native.effects.optionally_revealed_data.as_slots().first().unwrap();
        assert_eq!(disclosed.function_selector, 118);
        assert!(disclosed.pay_fee_from_l1);
        assert!(!disclosed.pay_fee_from_public_l2);
        assert!(disclosed.called_from_public_l2);
    }

    /// Four leaves reduce through two levels; commitment blocks appear
    /// in leaf order and capacities quadruple at the root.
    #[test]
    fn two_level_tree() {
        let commitments: Vec<Fp> = (1u64..=4).map(Fp::from).collect();
        let leaves: Vec<NativeSubtree> = commitments
            .iter()
            .enumerate()
            .map(|(slot, value)| {
                let tag = u64::try_from(slot).unwrap() * 100;
                leaf(core::slice::from_ref(value), roots(tag), roots(tag + 100))
            })
            .collect();

        let mut cx = MockContext::new();
        let engine = MockEngine::accepting();
        let mut diag = Diagnostics::new("two_level_tree");
        let lifted: Vec<Subtree<MockContext>> =
            leaves.iter().map(|subtree| subtree.lift(&mut cx)).collect();

        let mut level = lifted;
        let mid_right = level.pop().unwrap();
        let mid_left = level.pop().unwrap();
        let first_right = level.pop().unwrap();
        let first_left = level.pop().unwrap();
        let low = merge(&mut cx, &engine, first_left, first_right, &mut diag);
        let high = merge(&mut cx, &engine, mid_left, mid_right, &mut diag);
        let root = merge(&mut cx, &engine, low, high, &mut diag);
        assert!(diag.is_empty());

        let native = root.lower(&cx);
        assert_eq!(native.height, 2);
        assert_eq!(native.start, roots(0));
        assert_eq!(native.end, roots(400));
        let caps = native.effects.capacities();
        assert_eq!(caps, Capacities::at_height(2));
        // Each leaf's commitment sits at the start of its block.
        let slots = native.effects.new_commitments.as_slots();
        for (block, expected) in commitments.iter().enumerate() {
            assert_eq!(slots.get(block * 4), Some(expected));
        }
    }

    /// A rejecting engine produces an aggregation-failure finding and
    /// still returns a structurally complete parent.
    #[test]
    fn rejected_aggregation_is_recorded() {
        let left = leaf(&[], roots(1), roots(2));
        let right = leaf(&[], roots(2), roots(3));

        let mut cx = MockContext::new();
        let mut diag = Diagnostics::new("rejected_aggregation");
        let left = left.lift(&mut cx);
        let right = right.lift(&mut cx);
        let parent = merge(&mut cx, &MockEngine::rejecting(), left, right, &mut diag);

        assert_eq!(diag.findings().len(), 1);
        assert_eq!(
            diag.findings().first().unwrap().kind,
            FindingKind::AggregationFailure
        );
        assert_eq!(parent.height, 1);
    }

    /// Height and seam mismatches each produce their own finding.
    #[test]
    fn discontinuities_accumulate() {
        let mut left = leaf(&[], roots(1), roots(2));
        left.height = 1;
        let right = leaf(&[], roots(9), roots(3));

        let mut cx = MockContext::new();
        let mut diag = Diagnostics::new("discontinuities");
        let left = left.lift(&mut cx);
        let right = right.lift(&mut cx);
        let _parent = merge(&mut cx, &MockEngine::accepting(), left, right, &mut diag);

        // One height finding plus four root findings.
        let structural = diag
            .findings()
            .iter()
            .filter(|finding| finding.kind == FindingKind::StructuralMismatch)
            .count();
        assert_eq!(structural, 5);
    }
}
