//! Exact binary serialization of accumulated records.
//!
//! The layout is the wire contract between the transaction-kernel
//! process, the rollup builder, and the settlement consumer: a flat
//! concatenation with no length prefixes, since every capacity is
//! static and known from the declared layout. The field order below is
//! canonical and maintained by hand, in lockstep with the data model:
//!
//! 1. `aggregation_state` (p0, p1, public inputs, witness indices,
//!    presence flag)
//! 2. `new_commitments`
//! 3. `new_nullifiers`
//! 4. `private_call_stack`
//! 5. `public_call_stack`
//! 6. `new_l2_to_l1_msgs`
//! 7. `encrypted_logs_hash`
//! 8. `unencrypted_logs_hash`
//! 9. `encrypted_log_preimages_length`
//! 10. `unencrypted_log_preimages_length`
//! 11. `new_contracts`
//! 12. `optionally_revealed_data`
//! 13. `public_data_update_requests`
//! 14. `public_data_reads`
//!
//! Per-type widths: field elements are their 32-byte canonical repr
//! (little-endian limbs); points are 64-byte affine coordinate pairs
//! with `(0, 0)` denoting the identity; `u64`/`u32` are little-endian;
//! flags are one byte, `0` or `1`. Sequences are their elements'
//! encodings concatenated in slot order, padding included.
//!
//! `decode(encode(x)) == x` holds exactly for every valid record,
//! including the all-zero record.

use core::fmt;

use ff::PrimeField as _;
use pasta_curves::{EpAffine, Fp};

use crate::aggregation::AggregationState;
use crate::constants::{
    AGGREGATION_PUBLIC_INPUTS_LENGTH, AGGREGATION_WITNESS_INDICES_LENGTH, Capacities,
    LOGS_HASH_WIDTH,
};
use crate::effects::AccumulatedEffects;
use crate::merge::{NativeSubtree, TreeRoots};
use crate::primitives::{Sequence, point_from_coords, point_to_coords};
use crate::records::{
    ContractDeployment, OptionallyRevealedData, PublicDataRead, PublicDataUpdateRequest,
};

/// A decode rejection.
///
/// Decoding is the only fallible direction: encoding a well-formed
/// record cannot fail.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DecodeError {
    /// The buffer ended before the declared layout was satisfied.
    UnexpectedEnd,
    /// The buffer continued past the declared layout.
    TrailingBytes {
        /// Number of unconsumed bytes.
        remaining: usize,
    },
    /// Thirty-two bytes that are not a canonical field element.
    InvalidFieldElement,
    /// Sixty-four bytes that name no curve point.
    InvalidPoint,
    /// A flag byte that is neither `0` nor `1`.
    InvalidFlag,
}

impl fmt::Display for DecodeError {
    fn fmt(&self, out: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnexpectedEnd => out.write_str("buffer ended before the declared layout"),
            Self::TrailingBytes { remaining } => {
                write!(out, "{remaining} bytes remain past the declared layout")
            }
            Self::InvalidFieldElement => out.write_str("non-canonical field element"),
            Self::InvalidPoint => out.write_str("coordinates name no curve point"),
            Self::InvalidFlag => out.write_str("flag byte is neither 0 nor 1"),
        }
    }
}

impl core::error::Error for DecodeError {}

/// Serializes an accumulated record in the canonical field order.
#[must_use]
pub fn encode_effects(effects: &AccumulatedEffects) -> Vec<u8> {
    let mut buf = Vec::new();
    write_aggregation_state(&mut buf, &effects.aggregation_state);
    write_fp_sequence(&mut buf, &effects.new_commitments);
    write_fp_sequence(&mut buf, &effects.new_nullifiers);
    write_fp_sequence(&mut buf, &effects.private_call_stack);
    write_fp_sequence(&mut buf, &effects.public_call_stack);
    write_fp_sequence(&mut buf, &effects.new_l2_to_l1_msgs);
    for half in &effects.encrypted_logs_hash {
        write_fp(&mut buf, half);
    }
    for half in &effects.unencrypted_logs_hash {
        write_fp(&mut buf, half);
    }
    buf.extend_from_slice(&effects.encrypted_log_preimages_length.to_le_bytes());
    buf.extend_from_slice(&effects.unencrypted_log_preimages_length.to_le_bytes());
    for record in &effects.new_contracts {
        write_contract(&mut buf, record);
    }
    for record in &effects.optionally_revealed_data {
        write_optionally_revealed(&mut buf, record);
    }
    for record in &effects.public_data_update_requests {
        write_update_request(&mut buf, record);
    }
    for record in &effects.public_data_reads {
        write_data_read(&mut buf, record);
    }
    buf
}

/// Deserializes an accumulated record with the given sequence layout.
///
/// The buffer must match the layout exactly: short and over-long
/// buffers are both rejected.
pub fn decode_effects(bytes: &[u8], caps: &Capacities) -> Result<AccumulatedEffects, DecodeError> {
    let mut reader = Reader::new(bytes);
    let effects = read_effects(&mut reader, caps)?;
    reader.finish()?;
    Ok(effects)
}

/// Serializes a native subtree: the accumulated record followed by its
/// metadata (height, start roots, end roots).
#[must_use]
pub fn encode_subtree(subtree: &NativeSubtree) -> Vec<u8> {
    let mut buf = encode_effects(&subtree.effects);
    buf.extend_from_slice(&subtree.height.to_le_bytes());
    write_tree_roots(&mut buf, &subtree.start);
    write_tree_roots(&mut buf, &subtree.end);
    buf
}

/// Deserializes a native subtree with the given sequence layout.
pub fn decode_subtree(bytes: &[u8], caps: &Capacities) -> Result<NativeSubtree, DecodeError> {
    let mut reader = Reader::new(bytes);
    let effects = read_effects(&mut reader, caps)?;
    let height = reader.read_u64()?;
    let start = read_tree_roots(&mut reader)?;
    let end = read_tree_roots(&mut reader)?;
    reader.finish()?;
    Ok(NativeSubtree {
        effects,
        height,
        start,
        end,
    })
}

// ── writers ─────────────────────────────────────────────────────────

fn write_fp(buf: &mut Vec<u8>, value: &Fp) {
    buf.extend_from_slice(value.to_repr().as_ref());
}

fn write_fp_sequence(buf: &mut Vec<u8>, seq: &Sequence<Fp>) {
    for value in seq {
        write_fp(buf, value);
    }
}

fn write_point(buf: &mut Vec<u8>, point: &EpAffine) {
    let (x, y) = point_to_coords(point);
    write_fp(buf, &x);
    write_fp(buf, &y);
}

fn write_flag(buf: &mut Vec<u8>, flag: bool) {
    buf.push(u8::from(flag));
}

fn write_aggregation_state(buf: &mut Vec<u8>, state: &AggregationState) {
    write_point(buf, &state.p0);
    write_point(buf, &state.p1);
    write_fp_sequence(buf, &state.public_inputs);
    for index in &state.proof_witness_indices {
        buf.extend_from_slice(&index.to_le_bytes());
    }
    write_flag(buf, state.has_data);
}

fn write_contract(buf: &mut Vec<u8>, record: &ContractDeployment) {
    write_fp(buf, &record.contract_address);
    write_fp(buf, &record.portal_contract_address);
    write_fp(buf, &record.function_tree_root);
}

fn write_optionally_revealed(buf: &mut Vec<u8>, record: &OptionallyRevealedData) {
    write_fp(buf, &record.call_stack_item_hash);
    buf.extend_from_slice(&record.function_selector.to_le_bytes());
    write_fp(buf, &record.vk_hash);
    write_fp(buf, &record.portal_contract_address);
    write_flag(buf, record.pay_fee_from_l1);
    write_flag(buf, record.pay_fee_from_public_l2);
    write_flag(buf, record.called_from_l1);
    write_flag(buf, record.called_from_public_l2);
}

fn write_update_request(buf: &mut Vec<u8>, record: &PublicDataUpdateRequest) {
    write_fp(buf, &record.leaf_index);
    write_fp(buf, &record.old_value);
    write_fp(buf, &record.new_value);
}

fn write_data_read(buf: &mut Vec<u8>, record: &PublicDataRead) {
    write_fp(buf, &record.leaf_index);
    write_fp(buf, &record.value);
}

fn write_tree_roots(buf: &mut Vec<u8>, roots: &TreeRoots) {
    write_fp(buf, &roots.commitment_root);
    write_fp(buf, &roots.nullifier_root);
    write_fp(buf, &roots.contract_root);
    write_fp(buf, &roots.message_root);
}

// ── readers ─────────────────────────────────────────────────────────

struct Reader<'buf> {
    bytes: &'buf [u8],
}

impl<'buf> Reader<'buf> {
    fn new(bytes: &'buf [u8]) -> Self {
        Self { bytes }
    }

    fn take(&mut self, count: usize) -> Result<&'buf [u8], DecodeError> {
        if self.bytes.len() < count {
            return Err(DecodeError::UnexpectedEnd);
        }
        let (taken, rest) = self.bytes.split_at(count);
        self.bytes = rest;
        Ok(taken)
    }

    fn read_fp(&mut self) -> Result<Fp, DecodeError> {
        let mut repr = [0u8; 32];
        repr.copy_from_slice(self.take(32)?);
        Option::from(Fp::from_repr(repr)).ok_or(DecodeError::InvalidFieldElement)
    }

    fn read_point(&mut self) -> Result<EpAffine, DecodeError> {
        let x = self.read_fp()?;
        let y = self.read_fp()?;
        point_from_coords(x, y).ok_or(DecodeError::InvalidPoint)
    }

    fn read_u32(&mut self) -> Result<u32, DecodeError> {
        let mut bytes = [0u8; 4];
        bytes.copy_from_slice(self.take(4)?);
        Ok(u32::from_le_bytes(bytes))
    }

    fn read_u64(&mut self) -> Result<u64, DecodeError> {
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(self.take(8)?);
        Ok(u64::from_le_bytes(bytes))
    }

    fn read_flag(&mut self) -> Result<bool, DecodeError> {
        match self.take(1)?.first().copied() {
            Some(0) => Ok(false),
            Some(1) => Ok(true),
            Some(_) | None => Err(DecodeError::InvalidFlag),
        }
    }

    fn read_fp_sequence(&mut self, capacity: usize) -> Result<Sequence<Fp>, DecodeError> {
        let mut slots = Vec::with_capacity(capacity);
        for _ in 0..capacity {
            slots.push(self.read_fp()?);
        }
        Ok(Sequence::from_slots(capacity, slots))
    }

    fn finish(&self) -> Result<(), DecodeError> {
        if self.bytes.is_empty() {
            Ok(())
        } else {
            Err(DecodeError::TrailingBytes {
                remaining: self.bytes.len(),
            })
        }
    }
}

fn read_records<T>(
    reader: &mut Reader<'_>,
    capacity: usize,
    mut read_one: impl FnMut(&mut Reader<'_>) -> Result<T, DecodeError>,
) -> Result<Sequence<T>, DecodeError>
where
    T: Clone + Default,
{
    let mut slots = Vec::with_capacity(capacity);
    for _ in 0..capacity {
        slots.push(read_one(reader)?);
    }
    Ok(Sequence::from_slots(capacity, slots))
}

fn read_aggregation_state(reader: &mut Reader<'_>) -> Result<AggregationState, DecodeError> {
    let p0 = reader.read_point()?;
    let p1 = reader.read_point()?;
    let public_inputs = reader.read_fp_sequence(AGGREGATION_PUBLIC_INPUTS_LENGTH)?;
    let mut indices = Vec::with_capacity(AGGREGATION_WITNESS_INDICES_LENGTH);
    for _ in 0..AGGREGATION_WITNESS_INDICES_LENGTH {
        indices.push(reader.read_u32()?);
    }
    let has_data = reader.read_flag()?;
    Ok(AggregationState {
        p0,
        p1,
        public_inputs,
        proof_witness_indices: Sequence::from_slots(AGGREGATION_WITNESS_INDICES_LENGTH, indices),
        has_data,
    })
}

fn read_contract(reader: &mut Reader<'_>) -> Result<ContractDeployment, DecodeError> {
    Ok(ContractDeployment {
        contract_address: reader.read_fp()?,
        portal_contract_address: reader.read_fp()?,
        function_tree_root: reader.read_fp()?,
    })
}

fn read_optionally_revealed(reader: &mut Reader<'_>) -> Result<OptionallyRevealedData, DecodeError> {
    Ok(OptionallyRevealedData {
        call_stack_item_hash: reader.read_fp()?,
        function_selector: reader.read_u32()?,
        vk_hash: reader.read_fp()?,
        portal_contract_address: reader.read_fp()?,
        pay_fee_from_l1: reader.read_flag()?,
        pay_fee_from_public_l2: reader.read_flag()?,
        called_from_l1: reader.read_flag()?,
        called_from_public_l2: reader.read_flag()?,
    })
}

fn read_update_request(reader: &mut Reader<'_>) -> Result<PublicDataUpdateRequest, DecodeError> {
    Ok(PublicDataUpdateRequest {
        leaf_index: reader.read_fp()?,
        old_value: reader.read_fp()?,
        new_value: reader.read_fp()?,
    })
}

fn read_data_read(reader: &mut Reader<'_>) -> Result<PublicDataRead, DecodeError> {
    Ok(PublicDataRead {
        leaf_index: reader.read_fp()?,
        value: reader.read_fp()?,
    })
}

fn read_tree_roots(reader: &mut Reader<'_>) -> Result<TreeRoots, DecodeError> {
    Ok(TreeRoots {
        commitment_root: reader.read_fp()?,
        nullifier_root: reader.read_fp()?,
        contract_root: reader.read_fp()?,
        message_root: reader.read_fp()?,
    })
}

fn read_effects(
    reader: &mut Reader<'_>,
    caps: &Capacities,
) -> Result<AccumulatedEffects, DecodeError> {
    let aggregation_state = read_aggregation_state(reader)?;
    let new_commitments = reader.read_fp_sequence(caps.new_commitments)?;
    let new_nullifiers = reader.read_fp_sequence(caps.new_nullifiers)?;
    let private_call_stack = reader.read_fp_sequence(caps.private_call_stack)?;
    let public_call_stack = reader.read_fp_sequence(caps.public_call_stack)?;
    let new_l2_to_l1_msgs = reader.read_fp_sequence(caps.new_l2_to_l1_msgs)?;
    let mut encrypted_logs_hash = [Fp::default(); LOGS_HASH_WIDTH];
    for half in &mut encrypted_logs_hash {
        *half = reader.read_fp()?;
    }
    let mut unencrypted_logs_hash = [Fp::default(); LOGS_HASH_WIDTH];
    for half in &mut unencrypted_logs_hash {
        *half = reader.read_fp()?;
    }
    let encrypted_log_preimages_length = reader.read_u64()?;
    let unencrypted_log_preimages_length = reader.read_u64()?;
    let new_contracts = read_records(reader, caps.new_contracts, read_contract)?;
    let optionally_revealed_data =
        read_records(reader, caps.optionally_revealed_data, read_optionally_revealed)?;
    let public_data_update_requests =
        read_records(reader, caps.public_data_update_requests, read_update_request)?;
    let public_data_reads = read_records(reader, caps.public_data_reads, read_data_read)?;
    Ok(AccumulatedEffects {
        aggregation_state,
        new_commitments,
        new_nullifiers,
        private_call_stack,
        public_call_stack,
        new_l2_to_l1_msgs,
        encrypted_logs_hash,
        unencrypted_logs_hash,
        encrypted_log_preimages_length,
        unencrypted_log_preimages_length,
        new_contracts,
        optionally_revealed_data,
        public_data_update_requests,
        public_data_reads,
    })
}

#[cfg(test)]
mod tests {
    use ff::Field as _;
    use proptest::prelude::*;
    use rand::SeedableRng as _;
    use rand::rngs::StdRng;

    use super::*;

    fn filled_effects(caps: &Capacities, seed: u64) -> AccumulatedEffects {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut effects = AccumulatedEffects::zeroed(caps);
        effects.new_commitments = Sequence::from_slots(
            caps.new_commitments,
            (0..caps.new_commitments).map(|_| Fp::random(&mut rng)).collect(),
        );
        effects.new_nullifiers = Sequence::from_slots(
            caps.new_nullifiers,
            (0..caps.new_nullifiers).map(|_| Fp::random(&mut rng)).collect(),
        );
        effects.private_call_stack = Sequence::from_slots(
            caps.private_call_stack,
            (0..caps.private_call_stack).map(|_| Fp::random(&mut rng)).collect(),
        );
        effects.public_call_stack = Sequence::from_slots(
            caps.public_call_stack,
            (0..caps.public_call_stack).map(|_| Fp::random(&mut rng)).collect(),
        );
        effects.new_l2_to_l1_msgs = Sequence::from_slots(
            caps.new_l2_to_l1_msgs,
            (0..caps.new_l2_to_l1_msgs).map(|_| Fp::random(&mut rng)).collect(),
        );
        effects.encrypted_logs_hash = [Fp::random(&mut rng), Fp::random(&mut rng)];
        effects.unencrypted_logs_hash = [Fp::random(&mut rng), Fp::random(&mut rng)];
        effects.encrypted_log_preimages_length = 1024;
        effects.unencrypted_log_preimages_length = 4096;
        effects.new_contracts = Sequence::from_slots(
            caps.new_contracts,
            (0..caps.new_contracts)
                .map(|_| ContractDeployment {
                    contract_address: Fp::random(&mut rng),
                    portal_contract_address: Fp::random(&mut rng),
                    function_tree_root: Fp::random(&mut rng),
                })
                .collect(),
        );
        effects.optionally_revealed_data = Sequence::from_slots(
            caps.optionally_revealed_data,
            (0..caps.optionally_revealed_data)
                .map(|slot| OptionallyRevealedData {
                    call_stack_item_hash: Fp::random(&mut rng),
                    function_selector: u32::try_from(slot).unwrap(),
                    vk_hash: Fp::random(&mut rng),
                    portal_contract_address: Fp::random(&mut rng),
                    pay_fee_from_l1: slot % 2 == 0,
                    pay_fee_from_public_l2: slot % 2 == 1,
                    called_from_l1: false,
                    called_from_public_l2: true,
                })
                .collect(),
        );
        effects.public_data_update_requests = Sequence::from_slots(
            caps.public_data_update_requests,
            (0..caps.public_data_update_requests)
                .map(|_| PublicDataUpdateRequest {
                    leaf_index: Fp::random(&mut rng),
                    old_value: Fp::random(&mut rng),
                    new_value: Fp::random(&mut rng),
                })
                .collect(),
        );
        effects.public_data_reads = Sequence::from_slots(
            caps.public_data_reads,
            (0..caps.public_data_reads)
                .map(|_| PublicDataRead {
                    leaf_index: Fp::random(&mut rng),
                    value: Fp::random(&mut rng),
                })
                .collect(),
        );
        effects
    }

    /// The all-zero record round-trips exactly.
    #[test]
    fn zeroed_round_trip() {
        let caps = Capacities::KERNEL;
        let effects = AccumulatedEffects::zeroed(&caps);
        let bytes = encode_effects(&effects);
        assert_eq!(decode_effects(&bytes, &caps).unwrap(), effects);
    }

    /// A maximally-full record (every slot populated) round-trips
    /// exactly, at kernel and doubled layouts.
    #[test]
    fn full_round_trip_at_two_layouts() {
        for caps in [Capacities::KERNEL, Capacities::KERNEL.doubled()] {
            let effects = filled_effects(&caps, 7);
            let bytes = encode_effects(&effects);
            assert_eq!(decode_effects(&bytes, &caps).unwrap(), effects);
        }
    }

    #[test]
    fn subtree_round_trip() {
        let caps = Capacities::KERNEL;
        let subtree = NativeSubtree {
            effects: filled_effects(&caps, 11),
            height: 3,
            start: TreeRoots {
                commitment_root: Fp::from(1u64),
                nullifier_root: Fp::from(2u64),
                contract_root: Fp::from(3u64),
                message_root: Fp::from(4u64),
            },
            end: TreeRoots::zeroed(),
        };
        let bytes = encode_subtree(&subtree);
        let decoded = decode_subtree(&bytes, &caps).unwrap();
        assert_eq!(decoded.effects, subtree.effects);
        assert_eq!(decoded.height, subtree.height);
        assert_eq!(decoded.start, subtree.start);
        assert_eq!(decoded.end, subtree.end);
    }

    #[test]
    fn short_buffer_is_rejected() {
        let caps = Capacities::KERNEL;
        let bytes = encode_effects(&AccumulatedEffects::zeroed(&caps));
        let truncated = &bytes[..bytes.len() - 1];
        assert_eq!(decode_effects(truncated, &caps), Err(DecodeError::UnexpectedEnd));
    }

    #[test]
    fn trailing_bytes_are_rejected() {
        let caps = Capacities::KERNEL;
        let mut bytes = encode_effects(&AccumulatedEffects::zeroed(&caps));
        bytes.push(0);
        assert_eq!(
            decode_effects(&bytes, &caps),
            Err(DecodeError::TrailingBytes { remaining: 1 })
        );
    }

    #[test]
    fn bad_flag_byte_is_rejected() {
        let caps = Capacities::KERNEL;
        let mut bytes = encode_effects(&AccumulatedEffects::zeroed(&caps));
        // The aggregation presence flag sits right after p0, p1, the
        // public-input block, and the witness-index block.
        let flag_offset = 64 + 64 + 32 * AGGREGATION_PUBLIC_INPUTS_LENGTH
            + 4 * AGGREGATION_WITNESS_INDICES_LENGTH;
        bytes[flag_offset] = 7;
        assert_eq!(decode_effects(&bytes, &caps), Err(DecodeError::InvalidFlag));
    }

    proptest! {
        /// Round trip holds for arbitrary slot contents derived from a
        /// seed, at the kernel layout.
        #[test]
        fn random_round_trip(seed in any::<u64>()) {
            let caps = Capacities::KERNEL;
            let effects = filled_effects(&caps, seed);
            let bytes = encode_effects(&effects);
            prop_assert_eq!(decode_effects(&bytes, &caps).unwrap(), effects);
        }
    }
}
