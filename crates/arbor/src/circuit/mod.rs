//! Circuit-form (in-circuit) representations and the conversion
//! contract.
//!
//! Native and circuit forms are two concrete families of types, not one
//! generic record with a representation tag. Conversion is a pair of
//! explicit structural mappings, each valid in exactly one direction
//! and checked by the type system rather than at runtime:
//!
//! - `lift(native, cx)` binds every scalar of a native record into the
//!   supplied [`ProvingContext`](crate::context::ProvingContext),
//!   field by field, sub-record by sub-record, introducing no padding
//!   and no reordering. The result resolves back to a record
//!   observably equal to the input.
//! - `lower(&circuit, cx)` is the inverse mapping, valid once the
//!   circuit value is fully resolved.
//! - `mark_as_output(circuit, cx)` walks every scalar of every field —
//!   every element of every sequence, padding included — and marks it
//!   as an externally observable output of the enclosing proof. It
//!   consumes the record: applying it twice does not compile, which is
//!   how this crate enforces the exactly-once lifecycle rule.
//!
//! ```text
//!  kernel (native) ──lift──▶ circuit ──merge──▶ circuit ──lower──▶ native
//!                                        │
//!                                        └─mark_as_output─▶ finalize (engine)
//! ```

mod aggregation;
mod effects;

pub use aggregation::{CircuitAggregationState, CircuitPoint};
pub use effects::{
    CircuitAccumulatedEffects, CircuitContractDeployment, CircuitOptionallyRevealedData,
    CircuitPublicDataRead, CircuitPublicDataUpdateRequest,
};
