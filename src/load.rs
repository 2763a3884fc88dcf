use crate::models::BrokerId;
use std::cmp::Reverse;
use std::collections::{BTreeMap, HashMap};

/// Failure domain a broker is counted against.
///
/// Brokers without a rack form a domain of their own.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RackKey {
    Named(String),
    Unracked(BrokerId),
}

impl RackKey {
    pub fn for_broker(broker_id: BrokerId, rack: Option<&str>) -> Self {
        match rack {
            Some(name) => RackKey::Named(name.to_string()),
            None => RackKey::Unracked(broker_id),
        }
    }
}

/// Topic-scoped assignment counters that drive load and rack aware placement
#[derive(Debug, Clone, Default)]
pub struct LoadTracker {
    broker_counts: HashMap<BrokerId, usize>,
    leader_counts: HashMap<BrokerId, usize>,
    rack_counts: HashMap<RackKey, usize>,
    pending_leaders: HashMap<BrokerId, usize>,
}

impl LoadTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Book a leadership the broker will take later in the topic.
    ///
    /// Reserved leaderships count towards the broker's load when picking
    /// followers, until `record_leader_assignment` turns them into real ones.
    pub fn reserve_leader(&mut self, broker_id: BrokerId) {
        *self.pending_leaders.entry(broker_id).or_insert(0) += 1;
    }

    pub fn record_leader_assignment(&mut self, broker_id: BrokerId, rack: Option<&str>) {
        if let Some(pending) = self.pending_leaders.get_mut(&broker_id) {
            *pending = pending.saturating_sub(1);
        }
        *self.leader_counts.entry(broker_id).or_insert(0) += 1;
        self.record(broker_id, rack);
    }

    pub fn record_replica_assignment(&mut self, broker_id: BrokerId, rack: Option<&str>) {
        self.record(broker_id, rack);
    }

    fn record(&mut self, broker_id: BrokerId, rack: Option<&str>) {
        *self.broker_counts.entry(broker_id).or_insert(0) += 1;
        *self
            .rack_counts
            .entry(RackKey::for_broker(broker_id, rack))
            .or_insert(0) += 1;
    }

    /// Total replicas (leader included) assigned to a broker
    pub fn broker_load(&self, broker_id: BrokerId) -> usize {
        self.broker_counts.get(&broker_id).copied().unwrap_or(0)
    }

    pub fn pending_leaders(&self, broker_id: BrokerId) -> usize {
        self.pending_leaders.get(&broker_id).copied().unwrap_or(0)
    }

    /// Assigned load plus the leaderships still reserved for the broker
    pub fn projected_load(&self, broker_id: BrokerId) -> usize {
        self.broker_load(broker_id) + self.pending_leaders(broker_id)
    }

    pub fn leader_load(&self, broker_id: BrokerId) -> usize {
        self.leader_counts.get(&broker_id).copied().unwrap_or(0)
    }

    pub fn rack_load(&self, broker_id: BrokerId, rack: Option<&str>) -> usize {
        self.rack_counts
            .get(&RackKey::for_broker(broker_id, rack))
            .copied()
            .unwrap_or(0)
    }

    /// Pick the candidate with the lowest projected load.
    ///
    /// Ties go to the broker with more reserved leaderships, since it will be
    /// unavailable as a follower for those partitions. Remaining ties go to the
    /// broker whose rack has fewer assignments, then to the first candidate in
    /// iteration order. Brokers in `excluding` are never returned.
    pub fn least_loaded<'a, I>(&self, candidates: I, excluding: &[BrokerId]) -> Option<BrokerId>
    where
        I: IntoIterator<Item = (BrokerId, Option<&'a str>)>,
    {
        let mut best: Option<(BrokerId, (usize, Reverse<usize>, usize))> = None;

        for (broker_id, rack) in candidates {
            if excluding.contains(&broker_id) {
                continue;
            }

            let key = (
                self.projected_load(broker_id),
                Reverse(self.pending_leaders(broker_id)),
                self.rack_load(broker_id, rack),
            );
            let better = match &best {
                None => true,
                Some((_, best_key)) => key < *best_key,
            };

            if better {
                best = Some((broker_id, key));
            }
        }

        best.map(|(broker_id, _)| broker_id)
    }

    /// Per-broker assignment counts, ordered by broker id
    pub fn broker_loads(&self) -> BTreeMap<BrokerId, usize> {
        self.broker_counts.iter().map(|(&id, &count)| (id, count)).collect()
    }

    pub fn leader_loads(&self) -> BTreeMap<BrokerId, usize> {
        self.leader_counts.iter().map(|(&id, &count)| (id, count)).collect()
    }
}
