use super::{not_enough_replicas, ReplicaAssigner};
use crate::load::LoadTracker;
use crate::models::{BrokerId, ClusterModel, Partition};
use crate::rotation::BrokerRotation;
use crate::MigrationError;
use tracing::trace;

/// Places each follower on the least loaded target broker.
///
/// Load includes the leaderships reserved for the rest of the topic, so a
/// broker about to lead is not also handed followers now. Candidates are
/// scanned in the topic's rotation order; see `LoadTracker::least_loaded` for
/// the tie-breaks. Every pick is recorded so later positions and partitions
/// see it.
pub struct LoadAwareAssigner<'a> {
    cluster: &'a ClusterModel,
    candidates: Vec<BrokerId>,
}

impl<'a> LoadAwareAssigner<'a> {
    pub fn new(
        cluster: &'a ClusterModel,
        targets: &[BrokerId],
        start_bias: usize,
    ) -> Result<Self, MigrationError> {
        let rotation = BrokerRotation::new(targets, start_bias)?;
        Ok(Self {
            cluster,
            candidates: rotation.iter().collect(),
        })
    }
}

impl ReplicaAssigner for LoadAwareAssigner<'_> {
    fn name(&self) -> &str {
        "load-aware"
    }

    fn assign_followers(
        &mut self,
        partition: &Partition,
        replicas: &mut Vec<BrokerId>,
        factor: usize,
        tracker: &mut LoadTracker,
    ) -> Result<(), MigrationError> {
        while replicas.len() < factor {
            let candidates = self
                .candidates
                .iter()
                .map(|&id| (id, self.cluster.rack_of(id)));

            // Everything already placed is excluded, the leader included
            let chosen = tracker
                .least_loaded(candidates, replicas.as_slice())
                .ok_or_else(|| not_enough_replicas(partition, factor, self.candidates.len()))?;

            tracker.record_replica_assignment(chosen, self.cluster.rack_of(chosen));
            trace!(
                topic = %partition.topic,
                partition = partition.id,
                position = replicas.len(),
                broker = chosen,
                load = tracker.broker_load(chosen),
                "Placed follower"
            );
            replicas.push(chosen);
        }

        Ok(())
    }
}
