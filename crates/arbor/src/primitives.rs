//! Fixed-capacity sequences and scalar helpers.
//!
//! Every effect list in an accumulated record is a [`Sequence`]: a
//! zero-padded block of exactly its declared capacity. Padding is part
//! of the value — equality and hashing cover every slot, and insertion
//! order is preserved verbatim through conversion, serialization, and
//! merging, because downstream commitment of these records is
//! order-sensitive.

use ff::PrimeField as _;
use pasta_curves::arithmetic::{Coordinates, CurveAffine as _};
use pasta_curves::group::prime::PrimeCurveAffine as _;
use pasta_curves::{EpAffine, Fp};

/// A fixed-capacity, zero-padded effect sequence.
///
/// The capacity is declared at construction and never changes; the
/// backing storage always holds exactly `capacity` slots, with unused
/// tail slots at the element type's canonical zero ([`Default`]).
/// Supplying more elements than the capacity is a caller error and
/// panics — capacity sizing upstream is the only guard, there is no
/// runtime overflow policy.
///
/// Two sequences are equal iff every slot matches, padding included.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Sequence<T> {
    slots: Vec<T>,
}

impl<T: Clone + Default> Sequence<T> {
    /// An all-zero sequence of the given capacity.
    #[must_use]
    pub fn zeroed(capacity: usize) -> Self {
        Self {
            slots: vec![T::default(); capacity],
        }
    }

    /// A sequence built from leading elements, zero-padded to `capacity`.
    ///
    /// # Panics
    ///
    /// If more than `capacity` elements are supplied. Capacity
    /// violations are programmer errors, not recoverable conditions.
    #[must_use]
    pub fn from_leading(capacity: usize, leading: &[T]) -> Self {
        assert!(
            leading.len() <= capacity,
            "sequence capacity violated: {} elements in {capacity} slots",
            leading.len(),
        );
        let mut slots = leading.to_vec();
        slots.resize(capacity, T::default());
        Self { slots }
    }

    /// A sequence from exactly `capacity` slots, padding supplied by the
    /// caller.
    ///
    /// # Panics
    ///
    /// If the slot count differs from the declared capacity in either
    /// direction. Field-by-field construction must supply every slot.
    #[must_use]
    pub fn from_slots(capacity: usize, slots: Vec<T>) -> Self {
        assert!(
            slots.len() == capacity,
            "sequence must be supplied at exactly its declared capacity: got {}, declared {capacity}",
            slots.len(),
        );
        Self { slots }
    }

    /// The positional concatenation of two sequences, left block first.
    ///
    /// The result's capacity is the sum of the inputs' — the merge
    /// step's static invariant that a parent capacity is defined as the
    /// sum of its children's makes overflow impossible by construction.
    #[must_use]
    pub fn concat(left: Self, right: Self) -> Self {
        let mut slots = left.slots;
        slots.extend(right.slots);
        Self { slots }
    }
}

#[expect(
    clippy::multiple_inherent_impl,
    reason = "constructors require Clone + Default bounds, accessors do not"
)]
impl<T> Sequence<T> {
    /// The declared capacity (always equal to the stored slot count).
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Every slot in insertion order, padding included.
    pub fn iter(&self) -> core::slice::Iter<'_, T> {
        self.slots.iter()
    }

    /// Every slot as a slice, padding included.
    #[must_use]
    pub fn as_slots(&self) -> &[T] {
        &self.slots
    }
}

impl<'seq, T> IntoIterator for &'seq Sequence<T> {
    type Item = &'seq T;
    type IntoIter = core::slice::Iter<'seq, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.slots.iter()
    }
}

impl<T> IntoIterator for Sequence<T> {
    type Item = T;
    type IntoIter = <Vec<T> as IntoIterator>::IntoIter;

    fn into_iter(self) -> Self::IntoIter {
        self.slots.into_iter()
    }
}

/// Serde helpers for field elements, carried as their 32-byte
/// canonical repr.
#[cfg(feature = "serde")]
pub(crate) mod fp_serde {
    use ff::PrimeField as _;
    use pasta_curves::Fp;
    use serde::{Deserialize as _, Deserializer, Serialize as _, Serializer};

    pub(crate) fn serialize<S: Serializer>(fp: &Fp, serializer: S) -> Result<S::Ok, S::Error> {
        fp.to_repr().serialize(serializer)
    }

    pub(crate) fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Fp, D::Error> {
        let bytes = <[u8; 32]>::deserialize(deserializer)?;
        Option::from(Fp::from_repr(bytes))
            .ok_or_else(|| serde::de::Error::custom("invalid field element"))
    }
}

/// Splits a point commitment into its affine coordinates, with the
/// identity represented as `(0, 0)`.
///
/// `(0, 0)` is never a valid affine point on this curve, so the
/// representation is unambiguous and keeps circuit and wire forms
/// branch-free.
#[must_use]
pub fn point_to_coords(point: &EpAffine) -> (Fp, Fp) {
    let coords: Option<Coordinates<EpAffine>> = Option::from(point.coordinates());
    coords.map_or((Fp::default(), Fp::default()), |affine| (*affine.x(), *affine.y()))
}

/// Rebuilds a point commitment from its affine coordinates.
///
/// `(0, 0)` denotes the identity. Returns `None` for coordinates that
/// name no curve point — the codec surfaces that as a decode error,
/// while circuit lowering treats it as a contract violation.
#[must_use]
pub fn point_from_coords(x: Fp, y: Fp) -> Option<EpAffine> {
    if x == Fp::default() && y == Fp::default() {
        return Some(EpAffine::identity());
    }
    Option::from(EpAffine::from_xy(x, y))
}

/// Narrows a field element back to the `u64` it was lifted from.
///
/// Only byte-length meters round-trip through this helper; a value
/// outside `u64` range means the caller broke the representation
/// contract, which is fatal by design.
///
/// # Panics
///
/// If any repr byte beyond the low eight is non-zero.
#[must_use]
pub fn fp_to_u64(value: Fp) -> u64 {
    let repr = value.to_repr();
    let (low, high) = repr.split_at(8);
    assert!(
        high.iter().all(|&byte| byte == 0),
        "field element does not fit a u64 byte-length meter"
    );
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(low);
    u64::from_le_bytes(bytes)
}

/// Narrows a field element back to the `u32` it was lifted from.
///
/// # Panics
///
/// If the value does not fit a `u32`; like [`fp_to_u64`], overflow
/// here is a representation-contract violation.
#[must_use]
pub fn fp_to_u32(value: Fp) -> u32 {
    u32::try_from(fp_to_u64(value))
        .unwrap_or_else(|_| panic!("field element does not fit a u32 selector"))
}

/// Narrows a field element back to the boolean it was lifted from.
///
/// # Panics
///
/// If the value is neither zero nor one.
#[must_use]
pub fn fp_to_bool(value: Fp) -> bool {
    if value == Fp::default() {
        false
    } else {
        assert!(value == Fp::from(1u64), "field element is not a boolean flag");
        true
    }
}
