//! CLI entry point for the kinship-engine relationship calculator.
//!
//! Designed for subprocess invocation from the web tier: reads a
//! `TreeSnapshot` JSON from stdin, writes a JSON result to stdout.

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};
use uuid::Uuid;

use kinship_core::{PersonId, TreeSnapshot};
use kinship_engine::classifier::{ClassifierConfig, RelationshipClassifier};
use kinship_engine::graph::KinshipGraph;
use kinship_engine::types::{ClassifyResult, MarriageCheck, RelationshipEntry, RelationshipListing};
use kinship_engine::blood;

#[derive(Parser)]
#[command(name = "kinship-engine")]
#[command(about = "Relationship classification engine for the Kinship family graph")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Config file prefix (default: kinship).
    #[arg(short, long, default_value = "kinship", global = true)]
    config: String,
}

#[derive(Subcommand)]
enum Command {
    /// Classify one person's relationship to a root (snapshot on stdin).
    Classify {
        /// Root person ID (the perspective).
        #[arg(long)]
        root: String,
        /// Target person ID to classify.
        #[arg(long)]
        target: String,
    },
    /// List every person's relationship to a root (snapshot on stdin).
    Relationships {
        /// Root person ID (the perspective).
        #[arg(long)]
        root: String,
    },
    /// Check the marriage gate between two people (snapshot on stdin).
    CanMarry {
        #[arg(long)]
        person_a: String,
        #[arg(long)]
        person_b: String,
    },
}

fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    let cli = Cli::parse();
    let config = load_classifier_config(&cli.config);

    let input = std::io::read_to_string(std::io::stdin())?;
    let snapshot: TreeSnapshot = serde_json::from_str(&input)?;
    let graph = KinshipGraph::from_snapshot(&snapshot);

    match cli.command {
        Command::Classify { ref root, ref target } => {
            let root = parse_person_id(root)?;
            let target = parse_person_id(target)?;
            let classifier = RelationshipClassifier::with_config(&graph, config);
            let relation = classifier.classify(target, root);
            let result = ClassifyResult {
                root_id: root,
                target_id: target,
                relation,
                label: classifier.classify_label(target, root),
            };
            println!("{}", serde_json::to_string(&result)?);
        }
        Command::Relationships { ref root } => {
            let root = parse_person_id(root)?;
            let classifier = RelationshipClassifier::with_config(&graph, config);
            let relationships = classifier
                .relationships_to(root)
                .into_iter()
                .map(|(person_id, relation)| RelationshipEntry {
                    person_id,
                    relation,
                    label: classifier.classify_label(person_id, root),
                })
                .collect();
            let result = RelationshipListing {
                root_id: root,
                snapshot_version: snapshot.version,
                relationships,
            };
            println!("{}", serde_json::to_string(&result)?);
        }
        Command::CanMarry {
            ref person_a,
            ref person_b,
        } => {
            let a = parse_person_id(person_a)?;
            let b = parse_person_id(person_b)?;
            let blocked = blood::relationship_description(&graph, a, b);
            let result = MarriageCheck {
                person_a: a,
                person_b: b,
                can_marry: blocked.is_none(),
                blood_relationship: blocked.map(str::to_string),
            };
            println!("{}", serde_json::to_string(&result)?);
        }
    }

    Ok(())
}

fn parse_person_id(raw: &str) -> anyhow::Result<PersonId> {
    Ok(PersonId(Uuid::parse_str(raw)?))
}

fn load_classifier_config(file_prefix: &str) -> ClassifierConfig {
    let cfg = config::Config::builder()
        .add_source(config::File::with_name(file_prefix).required(false))
        .add_source(
            config::Environment::with_prefix("KINSHIP")
                .separator("__")
                .try_parsing(true),
        )
        .build();

    match cfg {
        Ok(c) => ClassifierConfig {
            max_generations: c
                .get_int("classifier.max_generations")
                .map(|v| v.clamp(2, 6) as usize)
                .unwrap_or(ClassifierConfig::default().max_generations),
        },
        Err(_) => ClassifierConfig::default(),
    }
}
