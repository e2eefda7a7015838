//! Message buffering and delivery between supersteps.
//!
//! While superstep `t` runs, every partition writes the messages of its
//! vertices into its own [`Outbox`], bucketed by the partition owning the
//! target. Nothing else is shared, so partitions never contend on message
//! buffers. At the barrier [`MessageBuffers::barrier`] hands every bucket to
//! its target partition, which folds them (in sending partition order) into a
//! sealed [`Inbox`]. The sealed inboxes are what superstep `t + 1` reads; the
//! ones read during `t` are dropped at the same time, so a message is seen in
//! exactly one superstep.

use super::combiner::Combiner;
use crate::core::{
    storage::{GraphLayout, Partition},
    utils::errors::{BspError, ProgramError},
    StateType, VertexId, VID,
};
use bulkstep_api::core::entities::LocalVertexRef;
use indexmap::IndexMap;
use itertools::Either;
use rayon::prelude::*;
use rustc_hash::FxBuildHasher;
use std::{mem, sync::Arc};

enum Bucket<Id, M> {
    Plain(Vec<(VID, M)>),
    Combined {
        msgs: IndexMap<VID, M, FxBuildHasher>,
        combiner: Arc<dyn Combiner<Id, M>>,
    },
}

impl<Id, M> Bucket<Id, M> {
    fn new(combiner: Option<&Arc<dyn Combiner<Id, M>>>) -> Self {
        match combiner {
            Some(combiner) => Bucket::Combined {
                msgs: IndexMap::default(),
                combiner: combiner.clone(),
            },
            None => Bucket::Plain(vec![]),
        }
    }

    fn into_messages(self) -> impl Iterator<Item = (VID, M)> {
        match self {
            Bucket::Plain(msgs) => Either::Left(msgs.into_iter()),
            Bucket::Combined { msgs, .. } => Either::Right(msgs.into_iter()),
        }
    }
}

/// Messages sent by the vertices of one partition during one superstep.
///
/// An outbox built with a combiner folds messages to the same target as they
/// are pushed, one without keeps every message in send order.
pub struct Outbox<Id, M> {
    buckets: Vec<Bucket<Id, M>>,
    sent: usize,
}

impl<Id, M: StateType> Outbox<Id, M> {
    pub fn new(n_partitions: usize, combiner: Option<&Arc<dyn Combiner<Id, M>>>) -> Self {
        Self {
            buckets: (0..n_partitions).map(|_| Bucket::new(combiner)).collect(),
            sent: 0,
        }
    }

    /// Number of messages sent, before any combining.
    pub fn sent(&self) -> usize {
        self.sent
    }

    pub fn is_combining(&self) -> bool {
        matches!(self.buckets.first(), Some(Bucket::Combined { .. }))
    }

    /// Buffers `msg` for `target`, combining it with an earlier message to the
    /// same target when this outbox combines.
    pub fn push(
        &mut self,
        target: LocalVertexRef,
        target_id: &Id,
        msg: M,
    ) -> Result<(), ProgramError> {
        self.sent += 1;
        match &mut self.buckets[target.partition] {
            Bucket::Plain(msgs) => {
                msgs.push((target.vid, msg));
                Ok(())
            }
            Bucket::Combined { msgs, combiner } => match msgs.get_mut(&target.vid) {
                Some(combined) => combiner.combine(target_id, combined, msg),
                None => {
                    msgs.insert(target.vid, msg);
                    Ok(())
                }
            },
        }
    }
}

/// Messages delivered to the vertices of one partition for one superstep.
///
/// Built once at the barrier and read-only afterwards.
#[derive(Debug)]
pub struct Inbox<M> {
    slots: Vec<Vec<M>>,
    len: usize,
}

impl<M: StateType> Inbox<M> {
    pub fn empty(n_vertices: usize) -> Self {
        Self {
            slots: (0..n_vertices).map(|_| vec![]).collect(),
            len: 0,
        }
    }

    pub fn messages(&self, vid: VID) -> &[M] {
        self.slots
            .get(vid.index())
            .map(|msgs| msgs.as_slice())
            .unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn build<Id: VertexId, V, E>(
        superstep: usize,
        partition: &Partition<Id, V, E>,
        buckets: Vec<Bucket<Id, M>>,
        combiner: Option<&dyn Combiner<Id, M>>,
    ) -> Result<Self, BspError> {
        let mut inbox = Self::empty(partition.len());
        for (vid, msg) in buckets.into_iter().flat_map(|b| b.into_messages()) {
            let slot = &mut inbox.slots[vid.index()];
            match (combiner, slot.first_mut()) {
                (Some(combiner), Some(combined)) => {
                    let target = partition.id_at(vid);
                    combiner
                        .combine(target, combined, msg)
                        .map_err(|source| BspError::Combiner {
                            superstep,
                            target: format!("{:?}", target),
                            source: Box::new(source),
                        })?;
                }
                _ => {
                    slot.push(msg);
                    inbox.len += 1;
                }
            }
        }
        Ok(inbox)
    }
}

/// Sealed inboxes of every partition for one superstep.
#[derive(Debug)]
pub struct Inboxes<M> {
    partitions: Vec<Inbox<M>>,
}

impl<M: StateType> Inboxes<M> {
    pub fn empty<Id, V, E>(partitions: &[Partition<Id, V, E>]) -> Self {
        Self {
            partitions: partitions.iter().map(|p| Inbox::empty(p.len())).collect(),
        }
    }

    pub fn partition(&self, partition: usize) -> &Inbox<M> {
        &self.partitions[partition]
    }

    pub fn as_slice(&self) -> &[Inbox<M>] {
        &self.partitions
    }

    /// Total number of messages waiting for delivery.
    pub fn pending(&self) -> usize {
        self.partitions.iter().map(|i| i.len()).sum()
    }
}

/// The double buffer between two supersteps: the sealed inboxes being read
/// and the outboxes being written.
pub struct MessageBuffers<Id, M> {
    current: Inboxes<M>,
    next: Vec<Outbox<Id, M>>,
    combiner: Option<Arc<dyn Combiner<Id, M>>>,
}

impl<Id: VertexId, M: StateType> MessageBuffers<Id, M> {
    pub fn new<V, E>(
        partitions: &[Partition<Id, V, E>],
        combiner: Option<Box<dyn Combiner<Id, M>>>,
    ) -> Self {
        let combiner: Option<Arc<dyn Combiner<Id, M>>> = combiner.map(Arc::from);
        Self {
            current: Inboxes::empty(partitions),
            next: Self::fresh_outboxes(partitions.len(), combiner.as_ref()),
            combiner,
        }
    }

    fn fresh_outboxes(
        n_partitions: usize,
        combiner: Option<&Arc<dyn Combiner<Id, M>>>,
    ) -> Vec<Outbox<Id, M>> {
        (0..n_partitions)
            .map(|_| Outbox::new(n_partitions, combiner))
            .collect()
    }

    /// The inboxes to read and the outboxes to write during a superstep.
    pub fn split_mut(&mut self) -> (&Inboxes<M>, &mut [Outbox<Id, M>]) {
        (&self.current, &mut self.next)
    }

    /// Exchanges messages between partitions and seals them as the inboxes of
    /// the next superstep. Returns the number of messages sent during the
    /// superstep that just ended.
    pub fn barrier<V: Send + Sync, E: Send + Sync>(
        &mut self,
        superstep: usize,
        partitions: &[Partition<Id, V, E>],
    ) -> Result<usize, BspError> {
        let n_partitions = partitions.len();
        let outboxes = mem::replace(
            &mut self.next,
            Self::fresh_outboxes(n_partitions, self.combiner.as_ref()),
        );
        let sent = outboxes.iter().map(|o| o.sent()).sum();

        let mut incoming: Vec<Vec<Bucket<Id, M>>> = (0..n_partitions)
            .map(|_| Vec::with_capacity(outboxes.len()))
            .collect();
        for outbox in outboxes {
            for (target, bucket) in outbox.buckets.into_iter().enumerate() {
                incoming[target].push(bucket);
            }
        }

        let combiner = self.combiner.as_deref();
        let sealed = incoming
            .into_par_iter()
            .zip(partitions.par_iter())
            .map(|(buckets, partition)| Inbox::build(superstep, partition, buckets, combiner))
            .collect::<Result<Vec<_>, _>>()?;

        // the inboxes read during `superstep` are dropped here
        self.current = Inboxes { partitions: sealed };
        Ok(sent)
    }

    pub fn pending(&self) -> usize {
        self.current.pending()
    }
}

/// Resolves `target` and buffers `msg` for it.
pub(crate) fn route<Id: VertexId, M: StateType>(
    layout: &GraphLayout<Id>,
    outbox: &mut Outbox<Id, M>,
    target: &Id,
    msg: M,
) -> Result<(), ProgramError> {
    let local = layout.resolve(target).ok_or_else(|| ProgramError::UnknownVertex {
        target: format!("{:?}", target),
    })?;
    outbox
        .push(local, target, msg)
        .map_err(|source| ProgramError::Combine {
            target: format!("{:?}", target),
            source: Box::new(source),
        })
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::core::{
        entities::Vertex,
        state::combiner::{MinCombiner, SumCombiner},
        storage::{GraphBuilder, GraphStore},
    };

    fn graph(n_partitions: usize, ids: impl IntoIterator<Item = u64>) -> GraphStore<u64, (), ()> {
        let mut builder = GraphBuilder::new(n_partitions);
        for id in ids {
            builder.add_vertex(Vertex::new(id, ())).unwrap();
        }
        builder.build().unwrap()
    }

    fn delivered(
        buffers: &MessageBuffers<u64, u64>,
        g: &GraphStore<u64, (), ()>,
        id: u64,
    ) -> Vec<u64> {
        let local = g.layout().resolve(&id).unwrap();
        buffers
            .current
            .partition(local.partition)
            .messages(local.vid)
            .to_vec()
    }

    #[test]
    fn messages_are_only_visible_after_the_barrier() {
        let g = graph(3, 0..10);
        let mut buffers: MessageBuffers<u64, u64> = MessageBuffers::new(g.partitions(), None);
        {
            let (_, outboxes) = buffers.split_mut();
            route(g.layout(), &mut outboxes[0], &4, 1).unwrap();
            route(g.layout(), &mut outboxes[1], &4, 2).unwrap();
            route(g.layout(), &mut outboxes[0], &5, 3).unwrap();
        }
        assert_eq!(buffers.pending(), 0);

        let sent = buffers.barrier(0, g.partitions()).unwrap();
        assert_eq!(sent, 3);
        assert_eq!(buffers.pending(), 3);
        // sending partition order, then send order
        assert_eq!(delivered(&buffers, &g, 4), vec![1, 2]);
        assert_eq!(delivered(&buffers, &g, 5), vec![3]);

        // nothing sent during the next superstep, nothing delivered after it
        buffers.barrier(1, g.partitions()).unwrap();
        assert_eq!(buffers.pending(), 0);
        assert!(delivered(&buffers, &g, 4).is_empty());
    }

    #[test]
    fn combiner_leaves_one_message_per_target() {
        let g = graph(4, 0..20);
        let min: Box<dyn Combiner<u64, u64>> = Box::new(MinCombiner);
        let mut buffers = MessageBuffers::new(g.partitions(), Some(min));
        {
            let (_, outboxes) = buffers.split_mut();
            for (sender, msg) in [(0, 9), (1, 3), (2, 7), (3, 5), (0, 4)] {
                route(g.layout(), &mut outboxes[sender], &11, msg).unwrap();
            }
        }
        let sent = buffers.barrier(0, g.partitions()).unwrap();
        assert_eq!(sent, 5);
        assert_eq!(buffers.pending(), 1);
        assert_eq!(delivered(&buffers, &g, 11), vec![3]);
    }

    #[test]
    fn sum_combiner_folds_across_partitions() {
        let g = graph(2, 0..6);
        let sum: Box<dyn Combiner<u64, u64>> = Box::new(SumCombiner);
        let mut buffers = MessageBuffers::new(g.partitions(), Some(sum));
        {
            let (_, outboxes) = buffers.split_mut();
            route(g.layout(), &mut outboxes[0], &2, 1).unwrap();
            route(g.layout(), &mut outboxes[0], &2, 2).unwrap();
            route(g.layout(), &mut outboxes[1], &2, 4).unwrap();
        }
        buffers.barrier(0, g.partitions()).unwrap();
        assert_eq!(delivered(&buffers, &g, 2), vec![7]);
    }

    #[test]
    fn unknown_target_is_rejected_at_send_time() {
        let g = graph(2, 0..3);
        let mut outbox: Outbox<u64, u64> = Outbox::new(2, None);
        let err = route(g.layout(), &mut outbox, &99, 1).unwrap_err();
        assert!(matches!(err, ProgramError::UnknownVertex { target } if target == "99"));
        assert_eq!(outbox.sent(), 0);
    }

    #[test]
    fn outbox_combines_only_with_a_combiner() {
        let g = graph(1, 0..3);
        let min: Arc<dyn Combiner<u64, u64>> = Arc::new(MinCombiner);

        let mut plain: Outbox<u64, u64> = Outbox::new(1, None);
        let mut combining = Outbox::new(1, Some(&min));
        assert!(!plain.is_combining());
        assert!(combining.is_combining());
        for msg in [5, 2, 8] {
            route(g.layout(), &mut plain, &1, msg).unwrap();
            route(g.layout(), &mut combining, &1, msg).unwrap();
        }
        assert_eq!(plain.sent(), 3);
        assert_eq!(combining.sent(), 3);

        let collect = |outbox: Outbox<u64, u64>| {
            outbox
                .buckets
                .into_iter()
                .flat_map(|b| b.into_messages())
                .map(|(_, msg)| msg)
                .collect::<Vec<_>>()
        };
        assert_eq!(collect(plain), vec![5, 2, 8]);
        assert_eq!(collect(combining), vec![2]);
    }

    #[test]
    fn failing_combiner_is_reported_for_the_target() {
        let g = graph(1, 0..3);
        let refuse: Arc<dyn Combiner<u64, u64>> =
            Arc::new(|_: &u64, _: &mut u64, _: u64| Err::<(), _>(ProgramError::msg("no")));
        let mut outbox = Outbox::new(1, Some(&refuse));
        route(g.layout(), &mut outbox, &1, 1).unwrap();
        let err = route(g.layout(), &mut outbox, &1, 2).unwrap_err();
        assert!(matches!(err, ProgramError::Combine { target, .. } if target == "1"));
    }
}
