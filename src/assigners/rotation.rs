use super::{not_enough_replicas, ReplicaAssigner};
use crate::load::LoadTracker;
use crate::models::{BrokerId, ClusterModel, Partition};
use crate::rotation::BrokerRotation;
use crate::MigrationError;
use tracing::trace;

/// Places followers by strict round robin over a topic-wide rotation.
///
/// The follower rotation starts one step past the leader rotation. When the
/// next broker in line already holds the partition (the leader), it is set
/// aside and the following broker is used instead. The lent broker goes back
/// to the front once the partition is complete, so it is first in line for the
/// next partition.
pub struct RotationAssigner<'a> {
    cluster: &'a ClusterModel,
    rotation: BrokerRotation,
}

impl<'a> RotationAssigner<'a> {
    pub fn new(
        cluster: &'a ClusterModel,
        targets: &[BrokerId],
        start_bias: usize,
    ) -> Result<Self, MigrationError> {
        let mut rotation = BrokerRotation::new(targets, start_bias)?;
        rotation.advance(1);
        Ok(Self { cluster, rotation })
    }

    fn take(&mut self, partition: &Partition, factor: usize) -> Result<BrokerId, MigrationError> {
        let available = self.rotation.len();
        self.rotation
            .pop_front()
            .ok_or_else(|| not_enough_replicas(partition, factor, available))
    }
}

impl ReplicaAssigner for RotationAssigner<'_> {
    fn name(&self) -> &str {
        "rotation"
    }

    fn assign_followers(
        &mut self,
        partition: &Partition,
        replicas: &mut Vec<BrokerId>,
        factor: usize,
        tracker: &mut LoadTracker,
    ) -> Result<(), MigrationError> {
        let mut lent: Option<BrokerId> = None;
        // Lending shrinks the rotation, so size the error on the full set
        let available = self.rotation.len();

        while replicas.len() < factor {
            let mut candidate = self.take(partition, factor)?;
            if replicas.contains(&candidate) {
                if lent.is_some() {
                    return Err(not_enough_replicas(partition, factor, available));
                }
                lent = Some(candidate);
                candidate = self.take(partition, factor)?;
                if replicas.contains(&candidate) {
                    return Err(not_enough_replicas(partition, factor, available));
                }
            }

            self.rotation.push_back(candidate);
            tracker.record_replica_assignment(candidate, self.cluster.rack_of(candidate));
            trace!(
                topic = %partition.topic,
                partition = partition.id,
                position = replicas.len(),
                broker = candidate,
                "Placed follower"
            );
            replicas.push(candidate);
        }

        if let Some(broker) = lent {
            self.rotation.push_front(broker);
        }

        Ok(())
    }
}
