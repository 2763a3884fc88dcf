use crate::assigners::LeaderAssigner;
use crate::config::MigrationConfig;
use crate::hash::topic_start_bias;
use crate::load::LoadTracker;
use crate::models::{BrokerId, ClusterModel, Partition, Topic};
use crate::plan::{PartitionAssignment, PlanMetadata, ReassignmentPlan};
use crate::MigrationError;
use tracing::{debug, info, warn};

/// Builds a reassignment plan that moves partitions off the source brokers
pub struct ReassignmentPlanGenerator {
    config: MigrationConfig,
}

impl ReassignmentPlanGenerator {
    pub fn new(config: MigrationConfig) -> Self {
        Self { config }
    }

    /// Generate a plan for every selected topic.
    ///
    /// The cluster is only read. Any error aborts the whole run and no plan is
    /// returned.
    pub fn generate(&self, cluster: &ClusterModel) -> Result<ReassignmentPlan, MigrationError> {
        let targets = self.config.resolve_targets(cluster)?;

        let mut source_brokers: Vec<BrokerId> = self.config.source_brokers.iter().copied().collect();
        source_brokers.sort_unstable();

        info!(
            source_brokers = ?source_brokers,
            target_brokers = ?targets,
            strategy = %self.config.strategy,
            replication_factor = ?self.config.replication_factor,
            "Generating migration plan"
        );

        if let Some(topics) = &self.config.topics {
            let mut missing: Vec<&str> = topics
                .iter()
                .map(String::as_str)
                .filter(|t| !cluster.topics.contains_key(*t))
                .collect();
            missing.sort_unstable();
            if !missing.is_empty() {
                warn!(topics = ?missing, "Requested topics are not in the cluster");
            }
        }

        let mut assignments = Vec::new();
        let mut planned_topics = Vec::new();

        for name in cluster.topic_names() {
            if !self.config.can_migrate_topic(name) {
                debug!(topic = name, "Skipping topic");
                continue;
            }

            let topic = &cluster.topics[name];
            assignments.extend(self.plan_topic(cluster, topic, &targets)?);
            planned_topics.push(name.to_string());
        }

        let metadata = PlanMetadata {
            strategy: self.config.strategy.to_string(),
            source_brokers,
            target_brokers: targets,
            topics: planned_topics,
            ..Default::default()
        };
        let plan = ReassignmentPlan::new(assignments, metadata);

        info!(summary = %plan.summary(), "Migration plan ready");
        Ok(plan)
    }

    fn plan_topic(
        &self,
        cluster: &ClusterModel,
        topic: &Topic,
        targets: &[BrokerId],
    ) -> Result<Vec<PartitionAssignment>, MigrationError> {
        let start_bias = topic_start_bias(&topic.name, targets.len())?;
        let mut tracker = LoadTracker::new();
        let mut leaders = LeaderAssigner::new(cluster, targets, start_bias)?;
        let mut followers = self.config.strategy.replica_assigner(cluster, targets, start_bias)?;
        leaders.reserve_upcoming(topic.partitions.len(), &mut tracker);

        debug!(
            topic = %topic.name,
            start_bias,
            partitions = topic.partitions.len(),
            strategy = followers.name(),
            "Planning topic"
        );

        let mut assignments = Vec::with_capacity(topic.partitions.len());
        for partition in topic.sorted_partitions() {
            let factor = self.replication_factor(partition)?;
            if factor > targets.len() {
                return Err(MigrationError::NotEnoughReplicas {
                    topic: partition.topic.clone(),
                    partition: partition.id,
                    required: factor,
                    available: targets.len(),
                });
            }

            let mut replicas = Vec::with_capacity(factor);
            replicas.push(leaders.next_leader(&mut tracker)?);
            followers.assign_followers(partition, &mut replicas, factor, &mut tracker)?;

            assignments.push(PartitionAssignment::new(partition, replicas));
        }

        debug!(
            topic = %topic.name,
            broker_loads = ?tracker.broker_loads(),
            leader_loads = ?tracker.leader_loads(),
            "Topic planned"
        );

        Ok(assignments)
    }

    /// Replica count for a partition: the forced factor, or its current count
    fn replication_factor(&self, partition: &Partition) -> Result<usize, MigrationError> {
        match self.config.replication_factor {
            Some(factor) => Ok(factor),
            None if partition.replicas.is_empty() => Err(MigrationError::InvalidClusterState(
                format!(
                    "partition {}/{} has no replicas and no replication factor was forced",
                    partition.topic, partition.id
                ),
            )),
            None => Ok(partition.replication_factor()),
        }
    }
}
