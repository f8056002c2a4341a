use clap::Parser;
use rand::Rng;
use rand::rngs::ThreadRng;
use rand::seq::IndexedRandom;
use serde_json::json;
use std::collections::BTreeMap;
use std::fs;
use topospec::topology::TopologyDocument;
use topospec::topology::document::{DocumentNode, DocumentPolicy, DocumentRelationship};

const NODE_TYPES: &[&str] = &[
    "tosca.nodes.WebServer",
    "tosca.nodes.WebApplication",
    "tosca.nodes.Database",
    "tosca.nodes.DBMS",
    "tosca.nodes.Compute",
    "tosca.nodes.LoadBalancer",
];

const POLICY_TYPES: &[&str] = &["ha.policy", "scaling.policy", "placement.policy"];

/// A CLI tool to generate synthetic topology documents for topospec
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// The path to write the generated JSON file to
    #[arg(short, long, default_value = "generated_topology.json")]
    output: String,

    /// Name of the generated topology
    #[arg(long, default_value = "generated")]
    name: String,

    /// Number of nodes to generate
    #[arg(long, default_value_t = 10)]
    nodes: usize,

    /// Number of policies to generate
    #[arg(long, default_value_t = 3)]
    policies: usize,

    /// The maximum number of members a single policy targets (0 targets the application)
    #[arg(long, default_value_t = 3)]
    max_members: usize,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let mut rng = rand::rng();

    if cli.nodes == 0 {
        eprintln!("Error: --nodes must be at least 1");
        std::process::exit(1);
    }

    println!(
        "Generating topology '{}' ({} nodes, {} policies)...",
        cli.name, cli.nodes, cli.policies
    );

    let nodes = generate_nodes(&mut rng, cli.nodes);
    let relationships = generate_relationships(&mut rng, &nodes);
    let policies = generate_policies(&mut rng, &nodes, cli.policies, cli.max_members);

    let document = TopologyDocument {
        name: cli.name,
        version: "1.0.0".to_string(),
        nodes,
        relationships,
        policies,
    };

    let json_output = serde_json::to_string_pretty(&document)?;
    fs::write(&cli.output, json_output)?;

    println!(
        "Successfully generated and saved topology to '{}'",
        cli.output
    );

    Ok(())
}

fn generate_nodes(rng: &mut ThreadRng, count: usize) -> Vec<DocumentNode> {
    let nodes: Vec<DocumentNode> = (0..count)
        .map(|i| {
            let node_type = NODE_TYPES.choose(rng).copied().unwrap_or("tosca.nodes.Compute");
            let mut properties = BTreeMap::new();
            properties.insert("port".to_string(), json!(rng.random_range(1024..65535)));
            properties.insert(
                "memory_mb".to_string(),
                json!(rng.random_range(1..=16) * 256),
            );

            let mut attributes = BTreeMap::new();
            attributes.insert(
                "endpoint".to_string(),
                json!({ "concat": ["http://node-", i.to_string(), ":", { "get_property": ["SELF", "port"] }] }),
            );

            DocumentNode {
                id: format!("n{}", i + 1),
                name: Some(format!("node_{}", i + 1)),
                node_type: node_type.to_string(),
                properties,
                attributes,
            }
        })
        .collect();
    println!("-> Generated {} node(s).", nodes.len());
    nodes
}

/// Links each node after the first to a random earlier one.
fn generate_relationships(rng: &mut ThreadRng, nodes: &[DocumentNode]) -> Vec<DocumentRelationship> {
    let relationships: Vec<DocumentRelationship> = (1..nodes.len())
        .map(|i| DocumentRelationship {
            source: nodes[i].id.clone(),
            target: nodes[rng.random_range(0..i)].id.clone(),
            relationship_type: "tosca.relationships.DependsOn".to_string(),
        })
        .collect();
    if !relationships.is_empty() {
        println!("-> Generated {} relationship(s).", relationships.len());
    }
    relationships
}

fn generate_policies(
    rng: &mut ThreadRng,
    nodes: &[DocumentNode],
    count: usize,
    max_members: usize,
) -> Vec<DocumentPolicy> {
    let policies: Vec<DocumentPolicy> = (0..count)
        .map(|i| {
            let member_count = rng.random_range(0..=max_members.min(nodes.len()));
            let targets = nodes
                .choose_multiple(rng, member_count)
                .map(|n| n.id.clone())
                .collect();
            let policy_type = POLICY_TYPES.choose(rng).copied().unwrap_or("ha.policy");

            let mut properties = BTreeMap::new();
            properties.insert("threshold".to_string(), json!(rng.random_range(1..=5)));

            DocumentPolicy {
                name: format!("policy_{}", i + 1),
                policy_type: Some(policy_type.to_string()),
                properties,
                targets,
            }
        })
        .collect();
    println!("-> Generated {} policy(ies).", policies.len());
    policies
}
