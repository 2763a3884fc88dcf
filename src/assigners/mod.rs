use crate::load::LoadTracker;
use crate::models::{BrokerId, ClusterModel, Partition};
use crate::MigrationError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Chooses the non-leader replicas of a partition
pub trait ReplicaAssigner {
    /// Name of this strategy
    fn name(&self) -> &str;

    /// Extend `replicas`, which already holds the leader, until it has
    /// `factor` distinct brokers.
    fn assign_followers(
        &mut self,
        partition: &Partition,
        replicas: &mut Vec<BrokerId>,
        factor: usize,
        tracker: &mut LoadTracker,
    ) -> Result<(), MigrationError>;
}

/// Strategy used to place non-leader replicas
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PlacementStrategy {
    /// Greedy least-loaded broker with rack tie-break
    #[default]
    LoadAware,

    /// Strict round robin that lends out the leader on collision
    Rotation,
}

impl PlacementStrategy {
    /// Build the topic-scoped replica assigner for this strategy
    pub fn replica_assigner<'a>(
        &self,
        cluster: &'a ClusterModel,
        targets: &[BrokerId],
        start_bias: usize,
    ) -> Result<Box<dyn ReplicaAssigner + 'a>, MigrationError> {
        Ok(match self {
            PlacementStrategy::LoadAware => {
                Box::new(LoadAwareAssigner::new(cluster, targets, start_bias)?)
            }
            PlacementStrategy::Rotation => {
                Box::new(RotationAssigner::new(cluster, targets, start_bias)?)
            }
        })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PlacementStrategy::LoadAware => "load-aware",
            PlacementStrategy::Rotation => "rotation",
        }
    }
}

impl fmt::Display for PlacementStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlacementStrategy {
    type Err = MigrationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "load-aware" => Ok(PlacementStrategy::LoadAware),
            "rotation" => Ok(PlacementStrategy::Rotation),
            other => Err(MigrationError::InvalidConfiguration(format!(
                "unknown placement strategy '{}' (expected 'load-aware' or 'rotation')",
                other
            ))),
        }
    }
}

pub(crate) fn not_enough_replicas(
    partition: &Partition,
    factor: usize,
    available: usize,
) -> MigrationError {
    MigrationError::NotEnoughReplicas {
        topic: partition.topic.clone(),
        partition: partition.id,
        required: factor,
        available,
    }
}

// Module declarations
mod leader;
mod load_aware;
mod rotation;

// Re-exports
pub use leader::LeaderAssigner;
pub use load_aware::LoadAwareAssigner;
pub use rotation::RotationAssigner;
