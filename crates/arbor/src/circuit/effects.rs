//! Circuit form of the accumulated-effects record and its sub-records.
//!
//! Each `lift` is a structural field-by-field mapping in declared field
//! order; each `lower` is its exact inverse. Sequences keep their
//! declared widths and slot order — padding is lifted and lowered like
//! any other slot.

use pasta_curves::Fp;

use crate::context::ProvingContext;
use crate::effects::AccumulatedEffects;
use crate::primitives::{Sequence, fp_to_bool, fp_to_u32, fp_to_u64};
use crate::records::{
    ContractDeployment, OptionallyRevealedData, PublicDataRead, PublicDataUpdateRequest,
};

use super::aggregation::CircuitAggregationState;

fn lift_scalars<C: ProvingContext>(seq: &Sequence<Fp>, cx: &mut C) -> Vec<C::Var> {
    seq.iter().map(|value| cx.alloc(*value)).collect()
}

fn lower_scalars<C: ProvingContext>(vars: &[C::Var], cx: &C) -> Sequence<Fp> {
    Sequence::from_slots(vars.len(), vars.iter().map(|var| cx.resolve(var)).collect())
}

fn alloc_bool<C: ProvingContext>(flag: bool, cx: &mut C) -> C::Var {
    cx.alloc(Fp::from(u64::from(flag)))
}

/// Circuit form of [`ContractDeployment`].
#[derive(Clone, Debug)]
pub struct CircuitContractDeployment<C: ProvingContext> {
    /// Witness for the deployed contract address.
    pub contract_address: C::Var,
    /// Witness for the portal contract address.
    pub portal_contract_address: C::Var,
    /// Witness for the function tree root.
    pub function_tree_root: C::Var,
}

impl<C: ProvingContext> CircuitContractDeployment<C> {
    fn lift(native: &ContractDeployment, cx: &mut C) -> Self {
        Self {
            contract_address: cx.alloc(native.contract_address),
            portal_contract_address: cx.alloc(native.portal_contract_address),
            function_tree_root: cx.alloc(native.function_tree_root),
        }
    }

    fn lower(&self, cx: &C) -> ContractDeployment {
        ContractDeployment {
            contract_address: cx.resolve(&self.contract_address),
            portal_contract_address: cx.resolve(&self.portal_contract_address),
            function_tree_root: cx.resolve(&self.function_tree_root),
        }
    }

    fn mark_public(&self, cx: &mut C) {
        cx.mark_public(&self.contract_address);
        cx.mark_public(&self.portal_contract_address);
        cx.mark_public(&self.function_tree_root);
    }
}

/// Circuit form of [`OptionallyRevealedData`].
///
/// Flags and the selector are bound as 0/1 and small-integer witnesses;
/// lowering narrows them back and treats out-of-range values as
/// contract violations.
#[derive(Clone, Debug)]
pub struct CircuitOptionallyRevealedData<C: ProvingContext> {
    /// Witness for the call-stack item hash.
    pub call_stack_item_hash: C::Var,
    /// Witness for the function selector.
    pub function_selector: C::Var,
    /// Witness for the verification-key hash.
    pub vk_hash: C::Var,
    /// Witness for the portal contract address.
    pub portal_contract_address: C::Var,
    /// Witness for the settlement-layer fee flag.
    pub pay_fee_from_l1: C::Var,
    /// Witness for the public-L2 fee flag.
    pub pay_fee_from_public_l2: C::Var,
    /// Witness for the settlement-layer origin flag.
    pub called_from_l1: C::Var,
    /// Witness for the public-L2 origin flag.
    pub called_from_public_l2: C::Var,
}

impl<C: ProvingContext> CircuitOptionallyRevealedData<C> {
    fn lift(native: &OptionallyRevealedData, cx: &mut C) -> Self {
        Self {
            call_stack_item_hash: cx.alloc(native.call_stack_item_hash),
            function_selector: cx.alloc(Fp::from(u64::from(native.function_selector))),
            vk_hash: cx.alloc(native.vk_hash),
            portal_contract_address: cx.alloc(native.portal_contract_address),
            pay_fee_from_l1: alloc_bool(native.pay_fee_from_l1, cx),
            pay_fee_from_public_l2: alloc_bool(native.pay_fee_from_public_l2, cx),
            called_from_l1: alloc_bool(native.called_from_l1, cx),
            called_from_public_l2: alloc_bool(native.called_from_public_l2, cx),
        }
    }

    fn lower(&self, cx: &C) -> OptionallyRevealedData {
        OptionallyRevealedData {
            call_stack_item_hash: cx.resolve(&self.call_stack_item_hash),
            function_selector: fp_to_u32(cx.resolve(&self.function_selector)),
            vk_hash: cx.resolve(&self.vk_hash),
            portal_contract_address: cx.resolve(&self.portal_contract_address),
            pay_fee_from_l1: fp_to_bool(cx.resolve(&self.pay_fee_from_l1)),
            pay_fee_from_public_l2: fp_to_bool(cx.resolve(&self.pay_fee_from_public_l2)),
            called_from_l1: fp_to_bool(cx.resolve(&self.called_from_l1)),
            called_from_public_l2: fp_to_bool(cx.resolve(&self.called_from_public_l2)),
        }
    }

    fn mark_public(&self, cx: &mut C) {
        cx.mark_public(&self.call_stack_item_hash);
        cx.mark_public(&self.function_selector);
        cx.mark_public(&self.vk_hash);
        cx.mark_public(&self.portal_contract_address);
        cx.mark_public(&self.pay_fee_from_l1);
        cx.mark_public(&self.pay_fee_from_public_l2);
        cx.mark_public(&self.called_from_l1);
        cx.mark_public(&self.called_from_public_l2);
    }
}

/// Circuit form of [`PublicDataUpdateRequest`].
#[derive(Clone, Debug)]
pub struct CircuitPublicDataUpdateRequest<C: ProvingContext> {
    /// Witness for the public data tree leaf index.
    pub leaf_index: C::Var,
    /// Witness for the value before the write.
    pub old_value: C::Var,
    /// Witness for the value after the write.
    pub new_value: C::Var,
}

impl<C: ProvingContext> CircuitPublicDataUpdateRequest<C> {
    fn lift(native: &PublicDataUpdateRequest, cx: &mut C) -> Self {
        Self {
            leaf_index: cx.alloc(native.leaf_index),
            old_value: cx.alloc(native.old_value),
            new_value: cx.alloc(native.new_value),
        }
    }

    fn lower(&self, cx: &C) -> PublicDataUpdateRequest {
        PublicDataUpdateRequest {
            leaf_index: cx.resolve(&self.leaf_index),
            old_value: cx.resolve(&self.old_value),
            new_value: cx.resolve(&self.new_value),
        }
    }

    fn mark_public(&self, cx: &mut C) {
        cx.mark_public(&self.leaf_index);
        cx.mark_public(&self.old_value);
        cx.mark_public(&self.new_value);
    }
}

/// Circuit form of [`PublicDataRead`].
#[derive(Clone, Debug)]
pub struct CircuitPublicDataRead<C: ProvingContext> {
    /// Witness for the public data tree leaf index.
    pub leaf_index: C::Var,
    /// Witness for the observed value.
    pub value: C::Var,
}

impl<C: ProvingContext> CircuitPublicDataRead<C> {
    fn lift(native: &PublicDataRead, cx: &mut C) -> Self {
        Self {
            leaf_index: cx.alloc(native.leaf_index),
            value: cx.alloc(native.value),
        }
    }

    fn lower(&self, cx: &C) -> PublicDataRead {
        PublicDataRead {
            leaf_index: cx.resolve(&self.leaf_index),
            value: cx.resolve(&self.value),
        }
    }

    fn mark_public(&self, cx: &mut C) {
        cx.mark_public(&self.leaf_index);
        cx.mark_public(&self.value);
    }
}

/// Circuit form of [`AccumulatedEffects`].
///
/// Sequence fields keep their declared widths as slot vectors of
/// witness handles; merging concatenates them left block first, exactly
/// like the native form.
#[derive(Clone, Debug)]
pub struct CircuitAccumulatedEffects<C: ProvingContext> {
    /// Pending recursive-proof verification token.
    pub aggregation_state: CircuitAggregationState<C>,
    /// State-insertion effects.
    pub new_commitments: Vec<C::Var>,
    /// State-invalidation effects.
    pub new_nullifiers: Vec<C::Var>,
    /// Pending private nested-call references.
    pub private_call_stack: Vec<C::Var>,
    /// Pending public nested-call references.
    pub public_call_stack: Vec<C::Var>,
    /// Outbound cross-domain messages.
    pub new_l2_to_l1_msgs: Vec<C::Var>,
    /// Running encrypted-log digest, split halves.
    pub encrypted_logs_hash: [C::Var; 2],
    /// Running unencrypted-log digest, split halves.
    pub unencrypted_logs_hash: [C::Var; 2],
    /// Byte-length meter for encrypted log payloads.
    pub encrypted_log_preimages_length: C::Var,
    /// Byte-length meter for unencrypted log payloads.
    pub unencrypted_log_preimages_length: C::Var,
    /// Contract-deployment records.
    pub new_contracts: Vec<CircuitContractDeployment<C>>,
    /// Conditionally disclosed records.
    pub optionally_revealed_data: Vec<CircuitOptionallyRevealedData<C>>,
    /// Writes to public state.
    pub public_data_update_requests: Vec<CircuitPublicDataUpdateRequest<C>>,
    /// Reads of public state.
    pub public_data_reads: Vec<CircuitPublicDataRead<C>>,
}

impl<C: ProvingContext> CircuitAccumulatedEffects<C> {
    /// Lifts a native record into the context, field by field in
    /// declared order.
    #[must_use]
    pub fn lift(native: &AccumulatedEffects, cx: &mut C) -> Self {
        Self {
            aggregation_state: CircuitAggregationState::lift(&native.aggregation_state, cx),
            new_commitments: lift_scalars(&native.new_commitments, cx),
            new_nullifiers: lift_scalars(&native.new_nullifiers, cx),
            private_call_stack: lift_scalars(&native.private_call_stack, cx),
            public_call_stack: lift_scalars(&native.public_call_stack, cx),
            new_l2_to_l1_msgs: lift_scalars(&native.new_l2_to_l1_msgs, cx),
            encrypted_logs_hash: native.encrypted_logs_hash.map(|half| cx.alloc(half)),
            unencrypted_logs_hash: native.unencrypted_logs_hash.map(|half| cx.alloc(half)),
            encrypted_log_preimages_length: cx
                .alloc(Fp::from(native.encrypted_log_preimages_length)),
            unencrypted_log_preimages_length: cx
                .alloc(Fp::from(native.unencrypted_log_preimages_length)),
            new_contracts: native
                .new_contracts
                .iter()
                .map(|record| CircuitContractDeployment::lift(record, cx))
                .collect(),
            optionally_revealed_data: native
                .optionally_revealed_data
                .iter()
                .map(|record| CircuitOptionallyRevealedData::lift(record, cx))
                .collect(),
            public_data_update_requests: native
                .public_data_update_requests
                .iter()
                .map(|record| CircuitPublicDataUpdateRequest::lift(record, cx))
                .collect(),
            public_data_reads: native
                .public_data_reads
                .iter()
                .map(|record| CircuitPublicDataRead::lift(record, cx))
                .collect(),
        }
    }

    /// Lowers this record back to native form, the exact inverse of
    /// [`lift`](Self::lift).
    #[must_use]
    pub fn lower(&self, cx: &C) -> AccumulatedEffects {
        AccumulatedEffects {
            aggregation_state: self.aggregation_state.lower(cx),
            new_commitments: lower_scalars::<C>(&self.new_commitments, cx),
            new_nullifiers: lower_scalars::<C>(&self.new_nullifiers, cx),
            private_call_stack: lower_scalars::<C>(&self.private_call_stack, cx),
            public_call_stack: lower_scalars::<C>(&self.public_call_stack, cx),
            new_l2_to_l1_msgs: lower_scalars::<C>(&self.new_l2_to_l1_msgs, cx),
            encrypted_logs_hash: {
                let [low, high] = &self.encrypted_logs_hash;
                [cx.resolve(low), cx.resolve(high)]
            },
            unencrypted_logs_hash: {
                let [low, high] = &self.unencrypted_logs_hash;
                [cx.resolve(low), cx.resolve(high)]
            },
            encrypted_log_preimages_length: fp_to_u64(
                cx.resolve(&self.encrypted_log_preimages_length),
            ),
            unencrypted_log_preimages_length: fp_to_u64(
                cx.resolve(&self.unencrypted_log_preimages_length),
            ),
            new_contracts: Sequence::from_slots(
                self.new_contracts.len(),
                self.new_contracts.iter().map(|record| record.lower(cx)).collect(),
            ),
            optionally_revealed_data: Sequence::from_slots(
                self.optionally_revealed_data.len(),
                self.optionally_revealed_data.iter().map(|record| record.lower(cx)).collect(),
            ),
            public_data_update_requests: Sequence::from_slots(
                self.public_data_update_requests.len(),
                self.public_data_update_requests.iter().map(|record| record.lower(cx)).collect(),
            ),
            public_data_reads: Sequence::from_slots(
                self.public_data_reads.len(),
                self.public_data_reads.iter().map(|record| record.lower(cx)).collect(),
            ),
        }
    }

    /// Marks every scalar of every field — padding slots included — as
    /// an externally observable output of the enclosing proof.
    ///
    /// Consumes the record: the single permitted application happens
    /// after all merge and lift operations are complete, immediately
    /// before the external engine finalizes the proof. A second call is
    /// a compile error, not a runtime check.
    pub fn mark_as_output(self, cx: &mut C) {
        self.aggregation_state.mark_public(cx);
        for var in self
            .new_commitments
            .iter()
            .chain(&self.new_nullifiers)
            .chain(&self.private_call_stack)
            .chain(&self.public_call_stack)
            .chain(&self.new_l2_to_l1_msgs)
            .chain(&self.encrypted_logs_hash)
            .chain(&self.unencrypted_logs_hash)
        {
            cx.mark_public(var);
        }
        cx.mark_public(&self.encrypted_log_preimages_length);
        cx.mark_public(&self.unencrypted_log_preimages_length);
        for record in &self.new_contracts {
            record.mark_public(cx);
        }
        for record in &self.optionally_revealed_data {
            record.mark_public(cx);
        }
        for record in &self.public_data_update_requests {
            record.mark_public(cx);
        }
        for record in &self.public_data_reads {
            record.mark_public(cx);
        }
    }
}
