//! Sub-records carried inside an accumulated-effects record.
//!
//! Each of these is a small value type with a canonical all-zero form
//! (its [`Default`]) used for sequence padding. Equality is structural
//! and total — padding instances compare like any other value.

use pasta_curves::Fp;

/// A contract-deployment effect.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ContractDeployment {
    /// Address of the deployed contract in the contract tree.
    #[cfg_attr(feature = "serde", serde(with = "crate::primitives::fp_serde"))]
    pub contract_address: Fp,
    /// Address of the paired portal contract on the settlement layer.
    #[cfg_attr(feature = "serde", serde(with = "crate::primitives::fp_serde"))]
    pub portal_contract_address: Fp,
    /// Root of the deployed contract's function tree.
    #[cfg_attr(feature = "serde", serde(with = "crate::primitives::fp_serde"))]
    pub function_tree_root: Fp,
}

/// Data conditionally disclosed from private execution.
///
/// Private kernels reveal these fields only when the corresponding
/// disclosure flag demands it; undisclosed slots stay zero.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OptionallyRevealedData {
    /// Hash of the call-stack item this disclosure belongs to.
    #[cfg_attr(feature = "serde", serde(with = "crate::primitives::fp_serde"))]
    pub call_stack_item_hash: Fp,
    /// Selector of the called function.
    pub function_selector: u32,
    /// Hash of the verification key used for the call.
    #[cfg_attr(feature = "serde", serde(with = "crate::primitives::fp_serde"))]
    pub vk_hash: Fp,
    /// Portal contract address, revealed for cross-domain calls.
    #[cfg_attr(feature = "serde", serde(with = "crate::primitives::fp_serde"))]
    pub portal_contract_address: Fp,
    /// Fee for this call is paid from the settlement layer.
    pub pay_fee_from_l1: bool,
    /// Fee for this call is paid from public L2 state.
    pub pay_fee_from_public_l2: bool,
    /// The call originated from the settlement layer.
    pub called_from_l1: bool,
    /// The call originated from public L2 execution.
    pub called_from_public_l2: bool,
}

/// A write to public state.
///
/// Carries both the old and new value so the write can be applied and
/// audited against the public data tree.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PublicDataUpdateRequest {
    /// Leaf index in the public data tree.
    #[cfg_attr(feature = "serde", serde(with = "crate::primitives::fp_serde"))]
    pub leaf_index: Fp,
    /// Value before the write.
    #[cfg_attr(feature = "serde", serde(with = "crate::primitives::fp_serde"))]
    pub old_value: Fp,
    /// Value after the write.
    #[cfg_attr(feature = "serde", serde(with = "crate::primitives::fp_serde"))]
    pub new_value: Fp,
}

impl PublicDataUpdateRequest {
    /// Whether this slot is padding (no write requested).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// A read of public state.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PublicDataRead {
    /// Leaf index in the public data tree.
    #[cfg_attr(feature = "serde", serde(with = "crate::primitives::fp_serde"))]
    pub leaf_index: Fp,
    /// Value observed at the leaf.
    #[cfg_attr(feature = "serde", serde(with = "crate::primitives::fp_serde"))]
    pub value: Fp,
}

impl PublicDataRead {
    /// Whether this slot is padding (no read performed).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
