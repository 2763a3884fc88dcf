use kafka_migrator::hash::topic_start_bias;
use kafka_migrator::models::BrokerId;
use kafka_migrator::*;
use proptest::prelude::*;
use std::collections::{BTreeMap, HashSet};

const RACKS: [Option<&str>; 4] = [Some("rack-a"), Some("rack-b"), Some("rack-c"), None];

fn build_cluster(
    broker_count: u32,
    racks: &[usize],
    partition_counts: &[u32],
    replication_factor: usize,
) -> ClusterModel {
    let mut cluster = ClusterModel::new();
    for id in 1..=broker_count {
        let rack = RACKS[racks[(id - 1) as usize % racks.len()] % RACKS.len()];
        cluster.add_broker(Broker::new(id, rack.map(str::to_string)));
    }

    for (i, &partitions) in partition_counts.iter().enumerate() {
        let mut topic = Topic::new(format!("topic-{}", i));
        for p in 0..partitions {
            let replicas = (0..replication_factor as u32)
                .map(|k| (p + k) % broker_count + 1)
                .collect();
            topic.add_partition(p, replicas);
        }
        cluster.add_topic(topic);
    }

    cluster
}

fn topic_loads(plan: &ReassignmentPlan, topic: &str) -> BTreeMap<BrokerId, usize> {
    let mut loads = BTreeMap::new();
    for assignment in plan.assignments.iter().filter(|a| a.topic == topic) {
        for &broker in &assignment.replicas {
            *loads.entry(broker).or_insert(0) += 1;
        }
    }
    loads
}

fn unracked_cluster(broker_count: u32, partitions: u32, replication_factor: usize) -> ClusterModel {
    build_cluster(broker_count, &[3], &[partitions], replication_factor)
}

#[test]
fn test_orders_scenario_defaults_targets() {
    let mut cluster = ClusterModel::new();
    for (id, rack) in [(1, "A"), (2, "A"), (3, "B"), (4, "B"), (5, "C")] {
        cluster.add_broker(Broker::in_rack(id, rack));
    }
    let mut orders = Topic::new("orders");
    orders.add_partition(0, vec![1, 2]);
    orders.add_partition(1, vec![2, 1]);
    orders.add_partition(2, vec![1, 3]);
    cluster.add_topic(orders);

    let migrator = Migrator::new(MigrationConfig::for_decommission([1, 2]));
    let (migrated, plan) = migrator.migrate(&cluster).unwrap();

    assert_eq!(plan.metadata.target_brokers, vec![3, 4, 5]);
    let bias = topic_start_bias("orders", 3).unwrap();
    let expected_leaders: Vec<BrokerId> = (0..3).map(|i| [3, 4, 5][(bias + i) % 3]).collect();
    let leaders: Vec<BrokerId> = plan.assignments.iter().filter_map(|a| a.leader()).collect();
    assert_eq!(leaders, expected_leaders);

    for assignment in &plan.assignments {
        assert_eq!(assignment.replicas.len(), 2);
        let distinct: HashSet<BrokerId> = assignment.replicas.iter().copied().collect();
        assert_eq!(distinct.len(), 2);
        assert!(assignment.replicas.iter().all(|b| [3, 4, 5].contains(b)));
    }

    // The input snapshot is left alone; the copy carries the plan
    assert_eq!(cluster.get_partition("orders", 0).unwrap().replicas, vec![1, 2]);
    for assignment in &plan.assignments {
        let partition = migrated.get_partition(&assignment.topic, assignment.partition).unwrap();
        assert_eq!(partition.replicas, assignment.replicas);
    }
}

#[test]
fn test_forced_factor_three_to_two() {
    let cluster = unracked_cluster(5, 6, 3);
    let config = MigrationConfig::for_decommission([1]).with_replication_factor(2);
    let plan = Migrator::new(config).generate_plan(&cluster).unwrap();

    assert_eq!(plan.len(), 6);
    for assignment in &plan.assignments {
        assert_eq!(assignment.previous.len(), 3);
        assert_eq!(assignment.replicas.len(), 2);
    }
}

#[test]
fn test_impossible_factor_produces_no_plan() {
    let cluster = unracked_cluster(4, 2, 3);
    let config = MigrationConfig::for_decommission([1, 2]);

    let result = Migrator::new(config).migrate(&cluster);
    assert!(matches!(
        result,
        Err(MigrationError::NotEnoughReplicas { required: 3, available: 2, .. })
    ));
    assert_eq!(cluster.get_partition("topic-0", 0).unwrap().replicas, vec![1, 2, 3]);
}

#[test]
fn test_even_load_when_partitions_divide_evenly() {
    for (partitions, factor, expected) in [(4, 2, 2), (8, 2, 4), (4, 3, 3)] {
        let cluster = unracked_cluster(5, partitions, factor);
        let plan = Migrator::new(MigrationConfig::for_decommission([5]))
            .generate_plan(&cluster)
            .unwrap();

        let loads = plan.broker_loads();
        assert_eq!(loads.len(), 4);
        for load in loads.values() {
            assert_eq!(load.replicas, expected, "partitions={} factor={}", partitions, factor);
            assert_eq!(load.leaders as u32, partitions / 4);
        }
    }
}

#[test]
fn test_racked_topic_stays_balanced() {
    let mut cluster = ClusterModel::new();
    for (id, rack) in [(1, "b"), (2, "a"), (3, "a"), (4, "a")] {
        cluster.add_broker(Broker::in_rack(id, rack));
    }
    let mut orders = Topic::new("orders");
    for (p, follower) in [(0, 1), (1, 2), (2, 3)] {
        orders.add_partition(p, vec![4, follower]);
    }
    cluster.add_topic(orders);

    let plan = Migrator::new(MigrationConfig::for_decommission([4]))
        .generate_plan(&cluster)
        .unwrap();

    // Broker 1 is alone in rack b but also leads the last partition, so it only
    // takes one follower
    let replicas: Vec<Vec<BrokerId>> = plan.assignments.iter().map(|a| a.replicas.clone()).collect();
    assert_eq!(replicas, vec![vec![2, 1], vec![3, 2], vec![1, 3]]);
    assert!(topic_loads(&plan, "orders").values().all(|&load| load == 2));
}

#[test]
fn test_rotation_strategy_balance_is_best_effort() {
    let mut cluster = ClusterModel::new();
    for id in 1..=6 {
        cluster.add_broker(Broker::new(id, None));
    }
    let mut orders = Topic::new("orders");
    for p in 0..5 {
        orders.add_partition(p, vec![6, 1, 2, 3]);
    }
    cluster.add_topic(orders);

    let config = MigrationConfig::for_decommission([6]).with_strategy(PlacementStrategy::Rotation);
    let plan = Migrator::new(config).generate_plan(&cluster).unwrap();

    let replicas: Vec<Vec<BrokerId>> = plan.assignments.iter().map(|a| a.replicas.clone()).collect();
    assert_eq!(
        replicas,
        vec![
            vec![1, 2, 3, 4],
            vec![2, 5, 1, 3],
            vec![3, 2, 4, 5],
            vec![4, 1, 3, 2],
            vec![5, 4, 1, 3],
        ]
    );

    // Lending the leader's slot skews strict round robin by two
    let loads = topic_loads(&plan, "orders");
    assert_eq!(loads.values().copied().collect::<Vec<_>>(), vec![4, 4, 5, 4, 3]);

    // The same topic placed by load is even
    let plan = Migrator::new(MigrationConfig::for_decommission([6]))
        .generate_plan(&cluster)
        .unwrap();
    assert!(topic_loads(&plan, "orders").values().all(|&load| load == 4));
}

#[test]
fn test_allow_list_limits_topics() {
    let cluster = build_cluster(5, &[0, 1, 2], &[3, 3, 3], 2);
    let config = MigrationConfig::for_decommission([1]).with_topics(["topic-1", "missing"]);
    let plan = Migrator::new(config).generate_plan(&cluster).unwrap();

    assert_eq!(plan.metadata.topics, vec!["topic-1".to_string()]);
    assert!(plan.assignments.iter().all(|a| a.topic == "topic-1"));
}

proptest! {
    #[test]
    fn prop_plans_are_valid_and_deterministic(
        broker_count in 4u32..9,
        source_count in 1u32..3,
        racks in prop::collection::vec(0usize..4, 1..9),
        partition_counts in prop::collection::vec(1u32..10, 1..4),
        factor_seed in 0usize..8,
        rotation in any::<bool>(),
    ) {
        let replication_factor = 1 + factor_seed % (broker_count - source_count) as usize;
        let cluster = build_cluster(broker_count, &racks, &partition_counts, replication_factor);
        let sources: Vec<BrokerId> = (1..=source_count).collect();
        let strategy = if rotation { PlacementStrategy::Rotation } else { PlacementStrategy::LoadAware };
        let config = MigrationConfig::for_decommission(sources.clone()).with_strategy(strategy);

        let first = Migrator::new(config.clone()).generate_plan(&cluster).unwrap();
        let second = Migrator::new(config).generate_plan(&cluster).unwrap();
        prop_assert_eq!(&first.assignments, &second.assignments);

        let targets = first.metadata.target_brokers.clone();
        for assignment in &first.assignments {
            prop_assert_eq!(assignment.replicas.len(), replication_factor);
            let distinct: HashSet<BrokerId> = assignment.replicas.iter().copied().collect();
            prop_assert_eq!(distinct.len(), assignment.replicas.len());
            prop_assert!(assignment.replicas.iter().all(|b| !sources.contains(b)));
            prop_assert!(assignment.replicas.iter().all(|b| targets.contains(b)));
        }

        for topic in cluster.topic_names() {
            let bias = topic_start_bias(topic, targets.len()).unwrap();
            let leaders: Vec<BrokerId> = first
                .assignments
                .iter()
                .filter(|a| a.topic == topic)
                .filter_map(|a| a.leader())
                .collect();
            for (i, leader) in leaders.iter().enumerate() {
                prop_assert_eq!(*leader, targets[(bias + i) % targets.len()]);
            }
        }
    }

    #[test]
    fn prop_load_aware_balances_racked_topics(
        broker_count in 4u32..9,
        source_count in 1u32..3,
        racks in prop::collection::vec(0usize..4, 1..9),
        partitions_per_target in 1u32..4,
        topic_count in 1usize..4,
        factor_seed in 0usize..8,
    ) {
        let target_count = broker_count - source_count;
        let replication_factor = 1 + factor_seed % target_count as usize;
        let partition_counts = vec![partitions_per_target * target_count; topic_count];
        let cluster = build_cluster(broker_count, &racks, &partition_counts, replication_factor);
        let sources: Vec<BrokerId> = (1..=source_count).collect();

        let plan = Migrator::new(MigrationConfig::for_decommission(sources))
            .generate_plan(&cluster)
            .unwrap();

        for topic in cluster.topic_names() {
            let loads = topic_loads(&plan, topic);
            prop_assert_eq!(loads.len(), target_count as usize);
            let max = loads.values().max().copied().unwrap_or(0);
            let min = loads.values().min().copied().unwrap_or(0);
            prop_assert!(max - min <= 1, "topic={} loads={:?}", topic, loads);
        }
    }
}
