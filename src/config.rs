use crate::assigners::PlacementStrategy;
use crate::models::{BrokerId, ClusterModel};
use crate::MigrationError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Settings that control a broker migration plan
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MigrationConfig {
    /// Brokers being decommissioned (all replicas must be moved off)
    pub source_brokers: HashSet<BrokerId>,

    /// Brokers receiving the partitions, in rotation order.
    /// Empty means every cluster broker that is not a source broker.
    pub target_brokers: Vec<BrokerId>,

    /// Topics to include; `None` includes every topic
    pub topics: Option<HashSet<String>>,

    /// Topics to leave untouched
    pub excluded_topics: HashSet<String>,

    /// Replica count to force on every planned partition
    pub replication_factor: Option<usize>,

    /// How non-leader replicas are chosen
    pub strategy: PlacementStrategy,
}

impl MigrationConfig {
    /// Create a config that moves every partition off the given brokers
    pub fn for_decommission(broker_ids: impl IntoIterator<Item = BrokerId>) -> Self {
        Self {
            source_brokers: broker_ids.into_iter().collect(),
            ..Default::default()
        }
    }

    pub fn with_target_brokers(mut self, broker_ids: impl IntoIterator<Item = BrokerId>) -> Self {
        self.target_brokers = broker_ids.into_iter().collect();
        self
    }

    pub fn with_topics<S: Into<String>>(mut self, topics: impl IntoIterator<Item = S>) -> Self {
        self.topics = Some(topics.into_iter().map(Into::into).collect());
        self
    }

    pub fn excluding_topics<S: Into<String>>(
        mut self,
        topics: impl IntoIterator<Item = S>,
    ) -> Self {
        self.excluded_topics.extend(topics.into_iter().map(Into::into));
        self
    }

    pub fn with_replication_factor(mut self, factor: usize) -> Self {
        self.replication_factor = Some(factor);
        self
    }

    pub fn with_strategy(mut self, strategy: PlacementStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn from_json(json: &str) -> Result<Self, MigrationError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Check if a topic is selected for migration
    pub fn can_migrate_topic(&self, topic: &str) -> bool {
        let included = self
            .topics
            .as_ref()
            .map(|topics| topics.contains(topic))
            .unwrap_or(true);

        included && !self.excluded_topics.contains(topic)
    }

    /// Validate the config against a cluster and return the ordered target
    /// broker list.
    pub fn resolve_targets(&self, cluster: &ClusterModel) -> Result<Vec<BrokerId>, MigrationError> {
        if self.source_brokers.is_empty() {
            return Err(MigrationError::InvalidConfiguration(
                "no brokers to remove were specified".to_string(),
            ));
        }

        if self.replication_factor == Some(0) {
            return Err(MigrationError::InvalidConfiguration(
                "replication factor must be at least 1".to_string(),
            ));
        }

        let unknown_sources = sorted(
            self.source_brokers
                .iter()
                .copied()
                .filter(|id| cluster.get_broker(*id).is_none()),
        );
        if !unknown_sources.is_empty() {
            return Err(MigrationError::InvalidConfiguration(format!(
                "brokers to remove are not in this cluster: {:?}",
                unknown_sources
            )));
        }

        let overlap = sorted(
            self.target_brokers
                .iter()
                .copied()
                .filter(|id| self.source_brokers.contains(id)),
        );
        if !overlap.is_empty() {
            return Err(MigrationError::InvalidConfiguration(format!(
                "brokers to remove were specified in the target broker list as well: {:?}",
                overlap
            )));
        }

        let unknown_targets = sorted(
            self.target_brokers
                .iter()
                .copied()
                .filter(|id| cluster.get_broker(*id).is_none()),
        );
        if !unknown_targets.is_empty() {
            return Err(MigrationError::InvalidConfiguration(format!(
                "target brokers are not in this cluster: {:?}",
                unknown_targets
            )));
        }

        let mut seen = HashSet::new();
        if let Some(duplicate) = self.target_brokers.iter().find(|id| !seen.insert(**id)) {
            return Err(MigrationError::InvalidConfiguration(format!(
                "target broker {} is listed more than once",
                duplicate
            )));
        }

        let targets: Vec<BrokerId> = if self.target_brokers.is_empty() {
            cluster
                .broker_ids()
                .into_iter()
                .filter(|id| !self.source_brokers.contains(id))
                .collect()
        } else {
            self.target_brokers.clone()
        };

        if targets.is_empty() {
            return Err(MigrationError::InvalidConfiguration(
                "no target brokers remain to receive partitions".to_string(),
            ));
        }

        Ok(targets)
    }
}

fn sorted(ids: impl Iterator<Item = BrokerId>) -> Vec<BrokerId> {
    let mut ids: Vec<BrokerId> = ids.collect();
    ids.sort_unstable();
    ids
}
