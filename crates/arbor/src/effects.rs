//! The accumulated-effects record.
//!
//! An [`AccumulatedEffects`] is the fixed-capacity record of every
//! side-effect produced by one transaction kernel or one rollup
//! subtree: state insertions and invalidations, pending nested calls,
//! outbound messages, running log digests, contract deployments,
//! conditional disclosures, and public-state accesses — plus the
//! pending recursive-proof token covering them.
//!
//! A record is created once (by a kernel, natively, or by a merge
//! reduction) and is immutable afterwards; the only later mutation is
//! the single mark-as-output walk applied to its circuit form before
//! the enclosing proof is finalized.

use core::fmt;

use pasta_curves::Fp;

use crate::aggregation::AggregationState;
use crate::constants::{Capacities, LOGS_HASH_WIDTH};
use crate::primitives::Sequence;
use crate::records::{
    ContractDeployment, OptionallyRevealedData, PublicDataRead, PublicDataUpdateRequest,
};

/// Fixed-capacity record of all side-effects of a transaction or
/// rollup subtree, in native (off-circuit) form.
///
/// Every sequence field holds exactly its declared capacity, unused
/// tail slots at canonical zero. Equality is structural and total:
/// two records are equal iff every slot, padding included, matches.
/// Insertion order inside each sequence is significant and preserved
/// verbatim across conversion, serialization, and merging.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AccumulatedEffects {
    /// Pending recursive-proof verification token.
    pub aggregation_state: AggregationState,

    /// State-insertion effects.
    pub new_commitments: Sequence<Fp>,
    /// State-invalidation effects.
    pub new_nullifiers: Sequence<Fp>,

    /// Pending private nested-call references.
    pub private_call_stack: Sequence<Fp>,
    /// Pending public nested-call references.
    pub public_call_stack: Sequence<Fp>,
    /// Outbound cross-domain messages.
    pub new_l2_to_l1_msgs: Sequence<Fp>,

    /// Running hash of encrypted log emissions, a 256-bit digest split
    /// across two field-sized halves.
    pub encrypted_logs_hash: [Fp; LOGS_HASH_WIDTH],
    /// Running hash of unencrypted log emissions, split the same way.
    pub unencrypted_logs_hash: [Fp; LOGS_HASH_WIDTH],

    /// Total byte length of the out-of-band encrypted log payloads,
    /// carried so size-dependent cost can be metered without the
    /// payloads themselves.
    pub encrypted_log_preimages_length: u64,
    /// Total byte length of the out-of-band unencrypted log payloads.
    pub unencrypted_log_preimages_length: u64,

    /// Contract-deployment records.
    pub new_contracts: Sequence<ContractDeployment>,

    /// Data conditionally disclosed from private execution.
    pub optionally_revealed_data: Sequence<OptionallyRevealedData>,

    /// Writes to public state.
    pub public_data_update_requests: Sequence<PublicDataUpdateRequest>,
    /// Reads of public state.
    pub public_data_reads: Sequence<PublicDataRead>,
}

impl AccumulatedEffects {
    /// An all-zero record with the given sequence layout.
    #[must_use]
    pub fn zeroed(caps: &Capacities) -> Self {
        Self {
            aggregation_state: AggregationState::empty(),
            new_commitments: Sequence::zeroed(caps.new_commitments),
            new_nullifiers: Sequence::zeroed(caps.new_nullifiers),
            private_call_stack: Sequence::zeroed(caps.private_call_stack),
            public_call_stack: Sequence::zeroed(caps.public_call_stack),
            new_l2_to_l1_msgs: Sequence::zeroed(caps.new_l2_to_l1_msgs),
            encrypted_logs_hash: [Fp::default(); LOGS_HASH_WIDTH],
            unencrypted_logs_hash: [Fp::default(); LOGS_HASH_WIDTH],
            encrypted_log_preimages_length: 0,
            unencrypted_log_preimages_length: 0,
            new_contracts: Sequence::zeroed(caps.new_contracts),
            optionally_revealed_data: Sequence::zeroed(caps.optionally_revealed_data),
            public_data_update_requests: Sequence::zeroed(caps.public_data_update_requests),
            public_data_reads: Sequence::zeroed(caps.public_data_reads),
        }
    }

    /// The sequence layout this record was built with, read back from
    /// the stored capacities.
    #[must_use]
    pub fn capacities(&self) -> Capacities {
        Capacities {
            new_commitments: self.new_commitments.capacity(),
            new_nullifiers: self.new_nullifiers.capacity(),
            private_call_stack: self.private_call_stack.capacity(),
            public_call_stack: self.public_call_stack.capacity(),
            new_l2_to_l1_msgs: self.new_l2_to_l1_msgs.capacity(),
            new_contracts: self.new_contracts.capacity(),
            optionally_revealed_data: self.optionally_revealed_data.capacity(),
            public_data_update_requests: self.public_data_update_requests.capacity(),
            public_data_reads: self.public_data_reads.capacity(),
        }
    }

    /// Asserts that every sequence holds exactly the declared capacity.
    ///
    /// Field-by-field construction goes through the public fields; this
    /// check is for callers assembling records by hand before handing
    /// them to the codec or the merge reducer.
    ///
    /// # Panics
    ///
    /// If any sequence deviates from `caps`. Capacity mismatch is a
    /// caller error, not a recoverable condition.
    pub fn assert_layout(&self, caps: &Capacities) {
        assert!(
            self.capacities() == *caps,
            "accumulated-effects record deviates from its declared layout"
        );
    }
}

/// Non-normative textual dump: every field in declared order.
///
/// For diagnostics only — never used for equality or hashing.
impl fmt::Display for AccumulatedEffects {
    #[expect(clippy::use_debug, reason = "field elements and points only implement Debug")]
    fn fmt(&self, out: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(out, "aggregation_state:")?;
        writeln!(out, "  p0: {:?}", self.aggregation_state.p0)?;
        writeln!(out, "  p1: {:?}", self.aggregation_state.p1)?;
        writeln!(out, "  public_inputs: {:?}", self.aggregation_state.public_inputs.as_slots())?;
        writeln!(
            out,
            "  proof_witness_indices: {:?}",
            self.aggregation_state.proof_witness_indices.as_slots()
        )?;
        writeln!(out, "  has_data: {}", self.aggregation_state.has_data)?;
        writeln!(out, "new_commitments: {:?}", self.new_commitments.as_slots())?;
        writeln!(out, "new_nullifiers: {:?}", self.new_nullifiers.as_slots())?;
        writeln!(out, "private_call_stack: {:?}", self.private_call_stack.as_slots())?;
        writeln!(out, "public_call_stack: {:?}", self.public_call_stack.as_slots())?;
        writeln!(out, "new_l2_to_l1_msgs: {:?}", self.new_l2_to_l1_msgs.as_slots())?;
        writeln!(out, "encrypted_logs_hash: {:?}", self.encrypted_logs_hash)?;
        writeln!(out, "unencrypted_logs_hash: {:?}", self.unencrypted_logs_hash)?;
        writeln!(
            out,
            "encrypted_log_preimages_length: {}",
            self.encrypted_log_preimages_length
        )?;
        writeln!(
            out,
            "unencrypted_log_preimages_length: {}",
            self.unencrypted_log_preimages_length
        )?;
        writeln!(out, "new_contracts: {:?}", self.new_contracts.as_slots())?;
        writeln!(out, "optionally_revealed_data: {:?}", self.optionally_revealed_data.as_slots())?;
        writeln!(
            out,
            "public_data_update_requests: {:?}",
            self.public_data_update_requests.as_slots()
        )?;
        writeln!(out, "public_data_reads: {:?}", self.public_data_reads.as_slots())
    }
}


#[cfg(test)]
mod tests {
    use ff::Field as _;

    use super::*;

    #[test]
    fn zeroed_record_matches_requested_layout() {
        let caps = Capacities::KERNEL;
        let effects = AccumulatedEffects::zeroed(&caps);
        assert_eq!(effects.capacities(), caps);
        effects.assert_layout(&caps);
    }

    /// Two records differing only in an otherwise-unused padding slot
    /// are not equal.
    #[test]
    fn equality_covers_padding() {
        let caps = Capacities::KERNEL;
        let base = AccumulatedEffects::zeroed(&caps);
        let mut touched = base.clone();
        touched.new_nullifiers =
            Sequence::from_leading(caps.new_nullifiers, &[Fp::ZERO, Fp::ZERO, Fp::from(1u64)]);
        assert_ne!(base, touched);
    }

    #[test]
    fn display_dump_lists_fields_in_declared_order() {
        let effects = AccumulatedEffects::zeroed(&Capacities::KERNEL);
        let dump = effects.to_string();
        let order = [
            "aggregation_state",
            "new_commitments",
            "new_nullifiers",
            "private_call_stack",
            "public_call_stack",
            "new_l2_to_l1_msgs",
            "encrypted_logs_hash",
            "unencrypted_logs_hash",
            "encrypted_log_preimages_length",
            "unencrypted_log_preimages_length",
            "new_contracts",
            "optionally_revealed_data",
            "public_data_update_requests",
            "public_data_reads",
        ];
        let mut cursor = 0;
        for name in order {
            let at = dump.find(&format!("\n{name}:")).or_else(|| {
                dump.starts_with(&format!("{name}:")).then_some(0)
            });
            let position = at.unwrap_or_else(|| panic!("field {name} missing from dump"));
            assert!(position >= cursor, "field {name} out of declared order");
            cursor = position;
        }
    }
}
