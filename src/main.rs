use clap::{Parser, ValueEnum};
use kafka_migrator::plan::ReassignmentDocument;
use kafka_migrator::{ClusterModel, MigrationConfig, MigrationError, Migrator, PlacementStrategy};
use std::path::PathBuf;
use tracing::{error, info};

#[derive(Debug, Parser)]
#[command(name = "kafka-migrator")]
#[command(about = "Move partitions off Kafka brokers being decommissioned, keeping leaders and replicas balanced", long_about = None)]
struct Cli {
    #[arg(short, long, help = "Cluster topology snapshot (JSON)")]
    cluster: PathBuf,

    #[arg(short, long, required = true, num_args = 1.., value_delimiter = ',', help = "Broker IDs to remove")]
    brokers: Vec<u32>,

    #[arg(long = "to-brokers", num_args = 1.., value_delimiter = ',', help = "Broker IDs to move partitions to (defaults to the rest of the cluster)")]
    to_brokers: Vec<u32>,

    #[arg(short, long, num_args = 1.., value_delimiter = ',', help = "Topics to include (defaults to all topics)")]
    topics: Option<Vec<String>>,

    #[arg(short = 'e', long = "exclude-topics", num_args = 1.., value_delimiter = ',', help = "Topics to leave untouched")]
    exclude_topics: Vec<String>,

    #[arg(short = 'r', long = "replication-factor", value_parser = clap::value_parser!(u32).range(1..), help = "Force this replica count on every planned partition")]
    replication_factor: Option<u32>,

    #[arg(long, default_value = "load-aware", help = "Follower placement strategy: load-aware or rotation")]
    strategy: PlacementStrategy,

    #[arg(short, long, value_enum, default_value_t = OutputFormat::Json, help = "Output format")]
    output: OutputFormat,

    #[arg(long, default_value_t = false, help = "Include partitions whose replicas do not change")]
    all_partitions: bool,

    #[arg(long, default_value_t = 0, help = "Split the JSON output into batches of this many partitions (0 = one document)")]
    batch_size: usize,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Json,
    Summary,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        error!(error = %e, "Migration planning failed");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), MigrationError> {
    let cluster = ClusterModel::from_file(&cli.cluster)?;
    info!(
        brokers = cluster.brokers.len(),
        topics = cluster.topics.len(),
        path = %cli.cluster.display(),
        "Loaded cluster topology"
    );

    let mut config = MigrationConfig::for_decommission(cli.brokers)
        .with_target_brokers(cli.to_brokers)
        .excluding_topics(cli.exclude_topics)
        .with_strategy(cli.strategy);
    if let Some(topics) = cli.topics {
        config = config.with_topics(topics);
    }
    if let Some(factor) = cli.replication_factor {
        config = config.with_replication_factor(factor as usize);
    }

    let plan = Migrator::new(config).generate_plan(&cluster)?;
    let only_changed = !cli.all_partitions;

    match cli.output {
        OutputFormat::Json if cli.batch_size > 0 => {
            for (i, batch) in plan.batches(cli.batch_size, only_changed).iter().enumerate() {
                let document = ReassignmentDocument::from_assignments(batch.iter().copied());
                info!(batch = i + 1, partitions = batch.len(), "Writing batch");
                println!("{}", serde_json::to_string_pretty(&document)?);
            }
        }
        OutputFormat::Json => println!("{}", plan.to_json(only_changed)?),
        OutputFormat::Summary => {
            println!("{}\n", plan.summary());
            for assignment in plan.selected(only_changed) {
                println!("  {}", assignment.description());
            }
            println!("\nBroker loads after migration:");
            for (broker, load) in plan.broker_loads() {
                println!("  broker {}: {} leaders, {} replicas", broker, load.leaders, load.replicas);
            }
        }
    }

    Ok(())
}
