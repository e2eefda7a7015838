//! Message combiners.
//!
//! A combiner folds every message addressed to the same vertex in the same
//! superstep into a single payload. The router applies it as messages are
//! buffered by the sending partition and again when the buffers of all
//! partitions are merged at the barrier, so a vertex never receives more than
//! one message per superstep when a combiner is set.
//!
//! The engine does not check that a combiner is commutative or associative.
//! Messages are always folded in the same order for a fixed partitioning
//! (sending partition first, then send order), so results are repeatable, but
//! an order sensitive combiner gives results that depend on that order.

use crate::core::utils::errors::ProgramError;
use std::ops::AddAssign;

pub trait Combiner<Id, M>: Send + Sync {
    /// Folds `message` into `combined`, both addressed to `target`.
    fn combine(&self, target: &Id, combined: &mut M, message: M) -> Result<(), ProgramError>;
}

impl<Id, M, F> Combiner<Id, M> for F
where
    F: Fn(&Id, &mut M, M) -> Result<(), ProgramError> + Send + Sync,
{
    fn combine(&self, target: &Id, combined: &mut M, message: M) -> Result<(), ProgramError> {
        self(target, combined, message)
    }
}

/// Keeps the smallest message.
#[derive(Debug, Clone, Copy, Default)]
pub struct MinCombiner;

impl<Id, M: PartialOrd> Combiner<Id, M> for MinCombiner {
    fn combine(&self, _target: &Id, combined: &mut M, message: M) -> Result<(), ProgramError> {
        if message < *combined {
            *combined = message;
        }
        Ok(())
    }
}

/// Keeps the largest message.
#[derive(Debug, Clone, Copy, Default)]
pub struct MaxCombiner;

impl<Id, M: PartialOrd> Combiner<Id, M> for MaxCombiner {
    fn combine(&self, _target: &Id, combined: &mut M, message: M) -> Result<(), ProgramError> {
        if message > *combined {
            *combined = message;
        }
        Ok(())
    }
}

/// Adds messages up.
#[derive(Debug, Clone, Copy, Default)]
pub struct SumCombiner;

impl<Id, M: AddAssign> Combiner<Id, M> for SumCombiner {
    fn combine(&self, _target: &Id, combined: &mut M, message: M) -> Result<(), ProgramError> {
        *combined += message;
        Ok(())
    }
}
