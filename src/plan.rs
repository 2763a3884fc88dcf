use crate::models::*;
use crate::MigrationError;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// New replica list proposed for one partition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitionAssignment {
    pub topic: TopicName,
    pub partition: PartitionId,
    /// Replicas before the migration
    pub previous: Vec<BrokerId>,
    /// Replicas after the migration, leader first
    pub replicas: Vec<BrokerId>,
}

impl PartitionAssignment {
    pub fn new(partition: &Partition, replicas: Vec<BrokerId>) -> Self {
        Self {
            topic: partition.topic.clone(),
            partition: partition.id,
            previous: partition.replicas.clone(),
            replicas,
        }
    }

    pub fn leader(&self) -> Option<BrokerId> {
        self.replicas.first().copied()
    }

    pub fn is_changed(&self) -> bool {
        self.previous != self.replicas
    }

    pub fn leader_changed(&self) -> bool {
        self.previous.first() != self.replicas.first()
    }

    /// Brokers that receive a new copy of the partition
    pub fn added_brokers(&self) -> Vec<BrokerId> {
        self.replicas
            .iter()
            .copied()
            .filter(|b| !self.previous.contains(b))
            .collect()
    }

    /// Brokers that drop their copy of the partition
    pub fn removed_brokers(&self) -> Vec<BrokerId> {
        self.previous
            .iter()
            .copied()
            .filter(|b| !self.replicas.contains(b))
            .collect()
    }

    /// Get a human-readable description
    pub fn description(&self) -> String {
        format!(
            "{}/{}: {:?} -> {:?}",
            self.topic, self.partition, self.previous, self.replicas
        )
    }
}

/// A complete migration plan, one entry per planned partition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReassignmentPlan {
    pub assignments: Vec<PartitionAssignment>,
    pub metadata: PlanMetadata,
}

impl ReassignmentPlan {
    pub fn new(assignments: Vec<PartitionAssignment>, metadata: PlanMetadata) -> Self {
        Self {
            assignments,
            metadata,
        }
    }

    /// Check if this plan is empty
    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    /// Assignments whose replica list differs from the current one
    pub fn changed(&self) -> impl Iterator<Item = &PartitionAssignment> {
        self.assignments.iter().filter(|a| a.is_changed())
    }

    /// Every assignment, or only the changed ones
    pub fn selected(&self, only_changed: bool) -> impl Iterator<Item = &PartitionAssignment> {
        self.assignments
            .iter()
            .filter(move |a| !only_changed || a.is_changed())
    }

    /// Write the planned replica lists into a cluster model.
    ///
    /// Every partition is looked up before anything is modified, so a plan
    /// that does not match the cluster leaves it untouched.
    pub fn apply(&self, cluster: &mut ClusterModel) -> Result<(), MigrationError> {
        if let Some(missing) = self
            .assignments
            .iter()
            .find(|a| cluster.get_partition(&a.topic, a.partition).is_none())
        {
            return Err(MigrationError::InvalidClusterState(format!(
                "partition {}/{} does not exist in the cluster",
                missing.topic, missing.partition
            )));
        }

        for assignment in &self.assignments {
            if let Some(partition) = cluster.get_partition_mut(&assignment.topic, assignment.partition) {
                partition.remove_all_replicas();
                for (pos, &broker) in assignment.replicas.iter().enumerate() {
                    partition.add_replica(broker, pos);
                }
            }
        }

        Ok(())
    }

    /// Render the plan in the `kafka-reassign-partitions` input format
    pub fn to_reassignment(&self, only_changed: bool) -> ReassignmentDocument {
        ReassignmentDocument::from_assignments(self.selected(only_changed))
    }

    pub fn to_json(&self, only_changed: bool) -> Result<String, MigrationError> {
        Ok(serde_json::to_string_pretty(&self.to_reassignment(only_changed))?)
    }

    /// Group partitions into batches of at most `max_partitions` that can be
    /// submitted one after another. Zero puts everything in one batch.
    pub fn batches(&self, max_partitions: usize, only_changed: bool) -> Vec<Vec<&PartitionAssignment>> {
        let selected: Vec<&PartitionAssignment> = self.selected(only_changed).collect();
        if max_partitions == 0 {
            return vec![selected];
        }
        selected
            .chunks(max_partitions)
            .map(|chunk| chunk.to_vec())
            .collect()
    }

    /// Leader and total replica counts per broker after the migration
    pub fn broker_loads(&self) -> BTreeMap<BrokerId, BrokerLoad> {
        let mut loads: BTreeMap<BrokerId, BrokerLoad> = BTreeMap::new();
        for assignment in &self.assignments {
            for (pos, &broker) in assignment.replicas.iter().enumerate() {
                let load = loads.entry(broker).or_default();
                load.replicas += 1;
                if pos == 0 {
                    load.leaders += 1;
                }
            }
        }
        loads
    }

    /// Get summary statistics
    pub fn summary(&self) -> PlanSummary {
        let topics: HashSet<&str> = self.assignments.iter().map(|a| a.topic.as_str()).collect();

        PlanSummary {
            topic_count: topics.len(),
            partition_count: self.assignments.len(),
            changed_partitions: self.changed().count(),
            replica_moves: self.assignments.iter().map(|a| a.added_brokers().len()).sum(),
            leader_changes: self.assignments.iter().filter(|a| a.leader_changed()).count(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrokerLoad {
    pub leaders: usize,
    pub replicas: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanMetadata {
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    pub strategy: String,
    pub source_brokers: Vec<BrokerId>,
    pub target_brokers: Vec<BrokerId>,
    pub topics: Vec<TopicName>,
}

impl Default for PlanMetadata {
    fn default() -> Self {
        Self {
            created_at: Some(chrono::Utc::now()),
            strategy: String::new(),
            source_brokers: Vec::new(),
            target_brokers: Vec::new(),
            topics: Vec::new(),
        }
    }
}

/// Document accepted by `kafka-reassign-partitions --reassignment-json-file`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReassignmentDocument {
    pub version: u32,
    pub partitions: Vec<ReassignmentEntry>,
}

impl ReassignmentDocument {
    pub fn from_assignments<'a>(
        assignments: impl IntoIterator<Item = &'a PartitionAssignment>,
    ) -> Self {
        let partitions = assignments
            .into_iter()
            .map(|a| ReassignmentEntry {
                topic: a.topic.clone(),
                partition: a.partition,
                replicas: a.replicas.clone(),
            })
            .collect();

        Self {
            version: 1,
            partitions,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReassignmentEntry {
    pub topic: TopicName,
    pub partition: PartitionId,
    pub replicas: Vec<BrokerId>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanSummary {
    pub topic_count: usize,
    pub partition_count: usize,
    pub changed_partitions: usize,
    pub replica_moves: usize,
    pub leader_changes: usize,
}

impl std::fmt::Display for PlanSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Topics: {}, Partitions: {} ({} changed), Replica Moves: {}, Leader Changes: {}",
            self.topic_count,
            self.partition_count,
            self.changed_partitions,
            self.replica_moves,
            self.leader_changes
        )
    }
}
