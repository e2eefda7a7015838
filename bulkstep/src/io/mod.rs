//! Output side of a job: what cleanup turns vertices into.

#[cfg(feature = "io")]
pub mod csv_writer;

/// Turns the final state of a vertex into an output record.
///
/// Called from [`crate::db::task::context::CleanupContext::write`], possibly
/// from several threads at once.
pub trait GraphWriter<Id, V>: Sync {
    type Output: Send;

    fn write(&self, id: &Id, value: &V) -> Self::Output;
}

/// Writes `(id, value)` pairs.
#[derive(Debug, Clone, Copy, Default)]
pub struct TupleWriter;

impl<Id: Clone + Send, V: Clone + Send> GraphWriter<Id, V> for TupleWriter {
    type Output = (Id, V);

    fn write(&self, id: &Id, value: &V) -> Self::Output {
        (id.clone(), value.clone())
    }
}

impl<Id, V, O, F> GraphWriter<Id, V> for F
where
    F: Fn(&Id, &V) -> O + Sync,
    O: Send,
{
    type Output = O;

    fn write(&self, id: &Id, value: &V) -> O {
        self(id, value)
    }
}
