// Kafka Broker Migration Planner
// Moves partitions off decommissioned brokers with deterministic, balanced placement

pub mod models;
pub mod hash;
pub mod rotation;
pub mod load;
pub mod assigners;
pub mod config;
pub mod plan;
pub mod planner;

pub use models::{Broker, ClusterModel, Partition, Topic};
pub use assigners::{PlacementStrategy, ReplicaAssigner};
pub use config::MigrationConfig;
pub use plan::{PartitionAssignment, PlanSummary, ReassignmentPlan};
pub use planner::ReassignmentPlanGenerator;

/// Main entry point for planning a broker decommission
pub struct Migrator {
    generator: ReassignmentPlanGenerator,
}

impl Migrator {
    pub fn new(config: MigrationConfig) -> Self {
        Self {
            generator: ReassignmentPlanGenerator::new(config),
        }
    }

    /// Generate a reassignment plan for the given cluster state
    pub fn generate_plan(&self, cluster: &ClusterModel) -> Result<ReassignmentPlan, MigrationError> {
        self.generator.generate(cluster)
    }

    /// Plan and apply to a copy of the cluster, leaving `cluster` untouched
    pub fn migrate(
        &self,
        cluster: &ClusterModel,
    ) -> Result<(ClusterModel, ReassignmentPlan), MigrationError> {
        let plan = self.generator.generate(cluster)?;
        let mut migrated = cluster.clone();
        plan.apply(&mut migrated)?;
        Ok((migrated, plan))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum MigrationError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Not enough replicas for {topic}/{partition}: need {required} distinct brokers, {available} available")]
    NotEnoughReplicas {
        topic: String,
        partition: models::PartitionId,
        required: usize,
        available: usize,
    },

    #[error("Invalid cluster state: {0}")]
    InvalidClusterState(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
