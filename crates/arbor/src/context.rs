//! Seams to the external proving engine.
//!
//! Circuit construction happens against two traits rather than a
//! concrete proving system:
//!
//! - [`ProvingContext`] is the witness allocator: the resource that
//!   binds concrete values into a circuit under construction. Every
//!   lift operation takes one as an explicit argument — there is no
//!   hidden or global conversion state, and a context is exclusively
//!   owned by one construction session.
//! - [`ProvingEngine`] supplies the two cryptographic operations this
//!   core delegates: verifying-and-combining two recursive-proof
//!   tokens, and recombining running log digests.
//!
//! All operations here are synchronous and side-effect-free apart from
//! allocations inside the context itself. Sibling subtree reductions
//! may run in parallel, each with its own context; serializing access
//! to a shared context is the caller's concern, never this crate's.

use pasta_curves::Fp;

use crate::circuit::CircuitAggregationState;
use crate::constants::LOGS_HASH_WIDTH;

/// A proving context: allocates and tracks witnesses during circuit
/// construction.
///
/// `Var` is the engine's handle for one witness-bound scalar. For the
/// built-in simulation context the handle is the value itself; for a
/// real engine it is typically a witness-table index.
pub trait ProvingContext {
    /// Handle to a witness-bound scalar.
    type Var: Clone + core::fmt::Debug;

    /// Binds a concrete value into the circuit, returning its handle.
    fn alloc(&mut self, value: Fp) -> Self::Var;

    /// Resolves a handle back to its concrete value.
    ///
    /// Valid only once the witness is fully assigned; resolving a
    /// mid-construction placeholder is a contract violation and may
    /// panic.
    fn resolve(&self, var: &Self::Var) -> Fp;

    /// The witness for the sum of two bound scalars.
    fn add(&mut self, left: &Self::Var, right: &Self::Var) -> Self::Var;

    /// Marks a bound scalar as an externally observable output of the
    /// enclosing proof.
    fn mark_public(&mut self, var: &Self::Var);
}

/// The external proving engine's operations over circuit values.
///
/// Everything cryptographic lives behind this trait: this crate treats
/// both operations as black boxes and only routes their inputs and
/// outputs.
pub trait ProvingEngine<C: ProvingContext> {
    /// Verifies two pending recursive-proof tokens and combines them
    /// into one, reporting success.
    ///
    /// A `false` flag means the combination did not verify; the caller
    /// records it and continues — the returned state is still
    /// structurally usable so a simulation pass can keep enumerating
    /// defects.
    fn verify_and_combine(
        &self,
        cx: &mut C,
        left: &CircuitAggregationState<C>,
        right: &CircuitAggregationState<C>,
    ) -> (CircuitAggregationState<C>, bool);

    /// Recombines two running 256-bit log digests (each split across
    /// two field-sized halves) into the parent's running digest.
    fn combine_log_digests(
        &self,
        cx: &mut C,
        left: &[C::Var; LOGS_HASH_WIDTH],
        right: &[C::Var; LOGS_HASH_WIDTH],
    ) -> [C::Var; LOGS_HASH_WIDTH];
}
