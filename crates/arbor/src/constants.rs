//! Protocol-wide constants: kernel capacities, tree heights, and
//! domain-separation tags.
//!
//! These values are a versioned contract shared by every component that
//! consumes this crate — transaction kernels, rollup builders, and the
//! settlement consumer all agree on them. They are configuration, not
//! behavior: immutable after compilation, never resized at runtime.
//!
//! Capacities apply at the *kernel* level (height-0 leaves of the merge
//! tree). Each merge level doubles every sequence capacity, because the
//! parent's sequences are the positional concatenation of its two
//! children's. [`Capacities`] carries the per-level layout.

/// Maximum state-insertion effects (new commitments) per kernel record.
pub const KERNEL_NEW_COMMITMENTS_LENGTH: usize = 4;

/// Maximum state-invalidation effects (new nullifiers) per kernel record.
pub const KERNEL_NEW_NULLIFIERS_LENGTH: usize = 4;

/// Maximum pending private nested-call references per kernel record.
pub const KERNEL_PRIVATE_CALL_STACK_LENGTH: usize = 8;

/// Maximum pending public nested-call references per kernel record.
pub const KERNEL_PUBLIC_CALL_STACK_LENGTH: usize = 8;

/// Maximum outbound cross-domain (L2 to L1) messages per kernel record.
pub const KERNEL_NEW_L2_TO_L1_MSGS_LENGTH: usize = 2;

/// Maximum contract deployments per kernel record.
pub const KERNEL_NEW_CONTRACTS_LENGTH: usize = 1;

/// Maximum conditionally-disclosed records per kernel record.
pub const KERNEL_OPTIONALLY_REVEALED_DATA_LENGTH: usize = 4;

/// Maximum public-state writes per kernel record.
pub const KERNEL_PUBLIC_DATA_UPDATE_REQUESTS_LENGTH: usize = 4;

/// Maximum public-state reads per kernel record.
pub const KERNEL_PUBLIC_DATA_READS_LENGTH: usize = 4;

/// Width of the split log digest: a 256-bit hash carried as two
/// field-sized halves.
pub const LOGS_HASH_WIDTH: usize = 2;

/// Fixed width of the aggregation state's public-input block.
///
/// The proving engine's recursion output is two curve points exposed as
/// four limbs each — sixteen field slots, zero-padded when a prior
/// verification has not populated them.
pub const AGGREGATION_PUBLIC_INPUTS_LENGTH: usize = 16;

/// Fixed width of the aggregation state's witness-index block.
///
/// One witness location per public-input slot.
pub const AGGREGATION_WITNESS_INDICES_LENGTH: usize = 16;

/// Height of the commitment (note data) tree.
pub const COMMITMENT_TREE_HEIGHT: usize = 8;

/// Height of the nullifier tree.
pub const NULLIFIER_TREE_HEIGHT: usize = 8;

/// Height of the contract tree.
pub const CONTRACT_TREE_HEIGHT: usize = 8;

/// Height of the cross-domain message tree.
pub const MESSAGE_TREE_HEIGHT: usize = 8;

/// BLAKE2b personalization for recombining the running log digests when
/// two accumulated records are merged.
///
/// Used by the native simulation engine; a production proving engine
/// substitutes its own in-circuit hash under the same seam.
pub const LOG_DIGEST_PERSONALIZATION: &[u8; 16] = b"Arbor-LogDigest_";

/// Domain-separation tags for hashing and commitment derivation.
///
/// Downstream components hash accumulated records field by field; every
/// such hash is domain-separated by one of these tags. The numeric
/// values are part of the versioned protocol contract and must never be
/// reordered.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(u8)]
pub enum DomainTag {
    /// State-insertion effects.
    Commitment = 0x01,
    /// State-invalidation effects.
    Nullifier = 0x02,
    /// Nested-call references.
    CallStackItem = 0x03,
    /// Outbound cross-domain messages.
    OutboundMessage = 0x04,
    /// Contract-deployment records.
    ContractLeaf = 0x05,
    /// Public-state access records.
    PublicDataLeaf = 0x06,
    /// Running log digests.
    LogDigest = 0x07,
}

impl DomainTag {
    /// The tag's single-byte wire form.
    #[must_use]
    pub const fn as_byte(self) -> u8 {
        match self {
            Self::Commitment => 0x01,
            Self::Nullifier => 0x02,
            Self::CallStackItem => 0x03,
            Self::OutboundMessage => 0x04,
            Self::ContractLeaf => 0x05,
            Self::PublicDataLeaf => 0x06,
            Self::LogDigest => 0x07,
        }
    }
}

/// The per-level sequence layout of an accumulated record.
///
/// Kernel records use [`Capacities::KERNEL`]. Each merge level doubles
/// every capacity: a parent's declared capacity is *defined* as the sum
/// of its two (identical) children's, so concatenation can never
/// overflow or truncate.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Capacities {
    /// Slots for new commitments.
    pub new_commitments: usize,
    /// Slots for new nullifiers.
    pub new_nullifiers: usize,
    /// Slots for pending private calls.
    pub private_call_stack: usize,
    /// Slots for pending public calls.
    pub public_call_stack: usize,
    /// Slots for outbound cross-domain messages.
    pub new_l2_to_l1_msgs: usize,
    /// Slots for contract deployments.
    pub new_contracts: usize,
    /// Slots for conditionally-disclosed records.
    pub optionally_revealed_data: usize,
    /// Slots for public-state writes.
    pub public_data_update_requests: usize,
    /// Slots for public-state reads.
    pub public_data_reads: usize,
}

impl Capacities {
    /// The kernel-level (height 0) layout.
    pub const KERNEL: Self = Self {
        new_commitments: KERNEL_NEW_COMMITMENTS_LENGTH,
        new_nullifiers: KERNEL_NEW_NULLIFIERS_LENGTH,
        private_call_stack: KERNEL_PRIVATE_CALL_STACK_LENGTH,
        public_call_stack: KERNEL_PUBLIC_CALL_STACK_LENGTH,
        new_l2_to_l1_msgs: KERNEL_NEW_L2_TO_L1_MSGS_LENGTH,
        new_contracts: KERNEL_NEW_CONTRACTS_LENGTH,
        optionally_revealed_data: KERNEL_OPTIONALLY_REVEALED_DATA_LENGTH,
        public_data_update_requests: KERNEL_PUBLIC_DATA_UPDATE_REQUESTS_LENGTH,
        public_data_reads: KERNEL_PUBLIC_DATA_READS_LENGTH,
    };

    /// The layout one merge level up: every capacity doubled.
    #[must_use]
    pub const fn doubled(self) -> Self {
        Self {
            new_commitments: self.new_commitments * 2,
            new_nullifiers: self.new_nullifiers * 2,
            private_call_stack: self.private_call_stack * 2,
            public_call_stack: self.public_call_stack * 2,
            new_l2_to_l1_msgs: self.new_l2_to_l1_msgs * 2,
            new_contracts: self.new_contracts * 2,
            optionally_revealed_data: self.optionally_revealed_data * 2,
            public_data_update_requests: self.public_data_update_requests * 2,
            public_data_reads: self.public_data_reads * 2,
        }
    }

    /// The layout for a subtree of the given height: kernel capacities
    /// scaled by `2^height`.
    #[must_use]
    pub fn at_height(height: u32) -> Self {
        let mut caps = Self::KERNEL;
        for _ in 0..height {
            caps = caps.doubled();
        }
        caps
    }
}
