//! # arbor
//!
//! The accumulation and merge layer of a rollup proof pipeline.
//!
//! Arbor sits between per-transaction kernels and the final rollup
//! proof. Each kernel emits a fixed-capacity record of transaction
//! effects, and arbor reduces them pairwise into one block-wide record:
//!
//! - **Accumulated effects**: zero-padded, fixed-capacity sequences of
//!   commitments, nullifiers, call-stack items, messages, deployments,
//!   and public state accesses, plus split log digests and an
//!   aggregation token
//! - **Dual representation**: every record exists in native form (plain
//!   field elements, serializable) and circuit form (witnesses bound to
//!   a proving context), with explicit, lossless conversion between the
//!   two
//! - **Merge reduction**: a binary tree of pairwise reductions, each
//!   checking seam continuity, combining aggregation tokens through a
//!   pluggable engine, and concatenating sequences positionally
//!
//! ## Capacity discipline
//!
//! Sequence capacities are part of a record's layout, not its data.
//! Merging two records of capacity `n` yields one of capacity `2n`, so
//! a subtree at height `h` carries kernel capacities scaled by `2^h`.
//! [`constants::Capacities`] names the layouts; construction panics
//! rather than silently truncating.
//!
//! ## Failure accumulation
//!
//! Recoverable defects (seam discontinuities, rejected aggregations)
//! are recorded in a caller-supplied [`diagnostics::Diagnostics`]
//! collector and reduction continues, so one pass over a candidate
//! tree enumerates every defect. Layout violations panic: they are
//! caller bugs, not data conditions.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![allow(clippy::pub_use, reason = "exporting items for consumers")]

pub mod aggregation;
pub mod circuit;
pub mod codec;
pub mod constants;
pub mod context;
pub mod diagnostics;
pub mod effects;
pub mod merge;
pub mod records;
pub mod simulate;

mod primitives;

pub use aggregation::AggregationState;
pub use circuit::{CircuitAccumulatedEffects, CircuitAggregationState};
pub use constants::Capacities;
pub use context::{ProvingContext, ProvingEngine};
pub use diagnostics::{Diagnostics, Finding, FindingKind};
pub use effects::AccumulatedEffects;
pub use merge::{NativeSubtree, Subtree, TreeRoots, merge};
pub use primitives::Sequence;
pub use simulate::{MergeOutput, NativeEngine, Simulator, simulate_merge};
