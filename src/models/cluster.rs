use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use super::{BrokerId, TopicName, PartitionId, Broker, Topic, Partition};
use crate::MigrationError;

/// Represents the current state of a Kafka cluster
#[derive(Debug, Clone, Default)]
pub struct ClusterModel {
    pub brokers: HashMap<BrokerId, Broker>,
    pub topics: HashMap<TopicName, Topic>,
    pub rack_mapping: HashMap<String, Vec<BrokerId>>,
}

impl ClusterModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_broker(&mut self, broker: Broker) {
        let rack = broker.rack.clone();
        let broker_id = broker.id;
        self.brokers.insert(broker_id, broker);

        // Update rack mapping
        if let Some(rack_name) = rack {
            self.rack_mapping
                .entry(rack_name)
                .or_insert_with(Vec::new)
                .push(broker_id);
        }
    }

    pub fn add_topic(&mut self, topic: Topic) {
        self.topics.insert(topic.name.clone(), topic);
    }

    pub fn get_broker(&self, id: BrokerId) -> Option<&Broker> {
        self.brokers.get(&id)
    }

    pub fn rack_of(&self, id: BrokerId) -> Option<&str> {
        self.brokers.get(&id).and_then(|b| b.rack())
    }

    /// Broker ids in ascending order
    pub fn broker_ids(&self) -> Vec<BrokerId> {
        let mut ids: Vec<BrokerId> = self.brokers.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Topic names in lexical order
    pub fn topic_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.topics.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn get_partition(&self, topic: &str, partition: PartitionId) -> Option<&Partition> {
        self.topics.get(topic)?.partitions.get(&partition)
    }

    pub fn get_partition_mut(
        &mut self,
        topic: &str,
        partition: PartitionId,
    ) -> Option<&mut Partition> {
        self.topics.get_mut(topic)?.partitions.get_mut(&partition)
    }

    /// Get all partitions across all topics
    pub fn all_partitions(&self) -> impl Iterator<Item = &Partition> + '_ {
        self.topics.values().flat_map(|t| t.partitions.values())
    }

    /// Get partitions that have a replica on a specific broker
    pub fn partitions_on_broker(&self, broker_id: BrokerId) -> Vec<&Partition> {
        self.all_partitions()
            .filter(|p| p.has_replica_on(broker_id))
            .collect()
    }

    /// Build a cluster model from a topology snapshot
    pub fn from_snapshot(snapshot: ClusterSnapshot) -> Result<Self, MigrationError> {
        let mut cluster = ClusterModel::new();
        for broker in snapshot.brokers {
            if cluster.brokers.contains_key(&broker.id) {
                return Err(MigrationError::InvalidClusterState(format!(
                    "broker {} is listed more than once",
                    broker.id
                )));
            }
            cluster.add_broker(broker);
        }

        for topic_snapshot in snapshot.topics {
            let mut topic = Topic::new(topic_snapshot.name);
            for partition in topic_snapshot.partitions {
                if topic.partitions.contains_key(&partition.id) {
                    return Err(MigrationError::InvalidClusterState(format!(
                        "partition {}/{} is listed more than once",
                        topic.name, partition.id
                    )));
                }
                topic.add_partition(partition.id, partition.replicas);
            }
            cluster.add_topic(topic);
        }

        Ok(cluster)
    }

    pub fn from_json(json: &str) -> Result<Self, MigrationError> {
        let snapshot: ClusterSnapshot = serde_json::from_str(json)?;
        Self::from_snapshot(snapshot)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, MigrationError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    /// Capture the model as a serializable snapshot with stable ordering
    pub fn snapshot(&self) -> ClusterSnapshot {
        let brokers = self
            .broker_ids()
            .into_iter()
            .filter_map(|id| self.brokers.get(&id).cloned())
            .collect();

        let topics = self
            .topic_names()
            .into_iter()
            .filter_map(|name| self.topics.get(name))
            .map(|topic| TopicSnapshot {
                name: topic.name.clone(),
                partitions: topic
                    .sorted_partitions()
                    .into_iter()
                    .map(|p| PartitionSnapshot {
                        id: p.id,
                        replicas: p.replicas.clone(),
                    })
                    .collect(),
            })
            .collect();

        ClusterSnapshot { brokers, topics }
    }
}

/// On-disk topology description consumed by the planner
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClusterSnapshot {
    pub brokers: Vec<Broker>,
    #[serde(default)]
    pub topics: Vec<TopicSnapshot>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopicSnapshot {
    pub name: TopicName,
    #[serde(default)]
    pub partitions: Vec<PartitionSnapshot>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartitionSnapshot {
    pub id: PartitionId,
    pub replicas: Vec<BrokerId>,
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOPOLOGY: &str = r#"{
        "brokers": [
            {"id": 2, "rack": "A"},
            {"id": 1, "rack": "A"},
            {"id": 3}
        ],
        "topics": [
            {"name": "orders", "partitions": [
                {"id": 1, "replicas": [2, 3]},
                {"id": 0, "replicas": [1, 2]}
            ]}
        ]
    }"#;

    #[test]
    fn test_load_from_json() {
        let cluster = ClusterModel::from_json(TOPOLOGY).unwrap();

        assert_eq!(cluster.broker_ids(), vec![1, 2, 3]);
        assert_eq!(cluster.rack_of(1), Some("A"));
        assert_eq!(cluster.rack_of(3), None);
        assert_eq!(cluster.rack_mapping["A"].len(), 2);
        assert_eq!(cluster.get_partition("orders", 1).unwrap().replicas, vec![2, 3]);
        assert_eq!(cluster.partitions_on_broker(2).len(), 2);
    }

    #[test]
    fn test_snapshot_is_ordered() {
        let cluster = ClusterModel::from_json(TOPOLOGY).unwrap();
        let snapshot = cluster.snapshot();

        let ids: Vec<BrokerId> = snapshot.brokers.iter().map(|b| b.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        let partitions: Vec<PartitionId> =
            snapshot.topics[0].partitions.iter().map(|p| p.id).collect();
        assert_eq!(partitions, vec![0, 1]);
    }

    #[test]
    fn test_duplicate_broker_rejected() {
        let json = r#"{"brokers": [{"id": 1}, {"id": 1}]}"#;
        let result = ClusterModel::from_json(json);
        assert!(matches!(result, Err(MigrationError::InvalidClusterState(_))));
    }

    #[test]
    fn test_malformed_json_rejected() {
        let result = ClusterModel::from_json("{\"brokers\": 7}");
        assert!(matches!(result, Err(MigrationError::Serialization(_))));
    }
}
