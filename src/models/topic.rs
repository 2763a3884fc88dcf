use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use super::{TopicName, PartitionId, BrokerId};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Topic {
    pub name: TopicName,
    pub partitions: HashMap<PartitionId, Partition>,
}

impl Topic {
    pub fn new(name: impl Into<TopicName>) -> Self {
        Self {
            name: name.into(),
            partitions: HashMap::new(),
        }
    }

    /// Add a partition with the given replica list (index 0 is the leader)
    pub fn add_partition(&mut self, id: PartitionId, replicas: Vec<BrokerId>) {
        self.partitions.insert(
            id,
            Partition {
                topic: self.name.clone(),
                id,
                replicas,
            },
        );
    }

    /// Partitions ordered by partition number
    pub fn sorted_partitions(&self) -> Vec<&Partition> {
        let mut partitions: Vec<&Partition> = self.partitions.values().collect();
        partitions.sort_by_key(|p| p.id);
        partitions
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Partition {
    pub topic: TopicName,
    pub id: PartitionId,
    pub replicas: Vec<BrokerId>,
}

impl Partition {
    pub fn leader(&self) -> Option<BrokerId> {
        self.replicas.first().copied()
    }

    pub fn replication_factor(&self) -> usize {
        self.replicas.len()
    }

    pub fn remove_all_replicas(&mut self) {
        self.replicas.clear();
    }

    /// Insert a replica at `pos`, appending when `pos` is past the end
    pub fn add_replica(&mut self, broker_id: BrokerId, pos: usize) {
        let pos = pos.min(self.replicas.len());
        self.replicas.insert(pos, broker_id);
    }

    pub fn has_replica_on(&self, broker_id: BrokerId) -> bool {
        self.replicas.contains(&broker_id)
    }
}
