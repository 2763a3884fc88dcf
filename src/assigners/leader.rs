use crate::load::LoadTracker;
use crate::models::{BrokerId, ClusterModel};
use crate::rotation::BrokerRotation;
use crate::MigrationError;

/// Hands out partition leaders round robin over the target brokers
pub struct LeaderAssigner<'a> {
    cluster: &'a ClusterModel,
    rotation: BrokerRotation,
}

impl<'a> LeaderAssigner<'a> {
    pub fn new(
        cluster: &'a ClusterModel,
        targets: &[BrokerId],
        start_bias: usize,
    ) -> Result<Self, MigrationError> {
        Ok(Self {
            cluster,
            rotation: BrokerRotation::new(targets, start_bias)?,
        })
    }

    /// Reserve the leaders of the next `partitions` partitions in the tracker
    /// without advancing the rotation
    pub fn reserve_upcoming(&self, partitions: usize, tracker: &mut LoadTracker) {
        for leader in self.rotation.iter().cycle().take(partitions) {
            tracker.reserve_leader(leader);
        }
    }

    /// Leader for the next partition in partition-number order
    pub fn next_leader(&mut self, tracker: &mut LoadTracker) -> Result<BrokerId, MigrationError> {
        let leader = self.rotation.next().ok_or_else(|| {
            MigrationError::InvalidConfiguration("leader rotation is empty".to_string())
        })?;
        tracker.record_leader_assignment(leader, self.cluster.rack_of(leader));
        Ok(leader)
    }
}
