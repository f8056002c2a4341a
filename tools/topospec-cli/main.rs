use clap::{Parser, ValueEnum};
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use topospec::prelude::*;
use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Pretty-printed JSON spec tree
    Json,
    /// Binary blueprint that can be reloaded later
    Blueprint,
}

/// Transforms a topology document into a deployable entity-spec tree
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to the topology JSON document
    topology_path: PathBuf,

    /// Additional type archives (file or directory) to load before the topology
    #[arg(short, long = "types")]
    types: Vec<PathBuf>,

    /// Type bundles whose child directories are each loaded as a separate archive
    #[arg(short, long = "bundle")]
    bundles: Vec<PathBuf>,

    /// Map a node type onto an entity type, as `node.type=entity.type`
    #[arg(short, long = "map", value_parser = parse_mapping)]
    mappings: Vec<(String, String)>,

    /// What to produce
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
    format: OutputFormat,

    /// Where to write the result; JSON goes to stdout when omitted
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Name recorded as the acting user
    #[arg(long, default_value = "cli")]
    actor: String,

    /// Log at debug level (overridden by RUST_LOG)
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(if cli.verbose { Level::DEBUG } else { Level::WARN });

    let total_start = Instant::now();
    let actor = ActingIdentity::admin(cli.actor.as_str());

    // --- 1. Platform Setup ---
    let catalog = Arc::new(InMemoryCatalog::new());
    let mut platform = Platform::new(
        catalog.clone(),
        catalog,
        Arc::new(DeclaredAttributeResolver),
    )
    .unwrap_or_else(|e| exit_with_error(&format!("Failed to set up platform: {}", e)));
    for (node_type, entity_type) in &cli.mappings {
        platform = platform.with_type_mapping(node_type, entity_type);
    }

    // --- 2. Archive Upload ---
    let upload_start = Instant::now();
    for types in &cli.types {
        platform
            .load_types_from_path(&actor, types)
            .unwrap_or_else(|e| exit_with_error(&e.to_string()));
    }

    for bundle in &cli.bundles {
        let members = platform
            .load_type_bundle(&actor, bundle)
            .unwrap_or_else(|e| exit_with_error(&e.to_string()));
        for member in members.iter().filter(|m| m.result.is_err()) {
            eprintln!("Skipped type archive '{}' of '{}'", member.name, bundle.display());
        }
    }

    let document = File::open(&cli.topology_path).unwrap_or_else(|e| {
        exit_with_error(&format!(
            "Failed to read topology file '{}': {}",
            cli.topology_path.display(),
            e
        ))
    });
    let result = platform
        .upload_single_document(&actor, document, &file_name(&cli.topology_path))
        .unwrap_or_else(|e| exit_with_error(&e.to_string()));
    let topology_name = result
        .topology
        .unwrap_or_else(|| exit_with_error("The document did not register a topology."));
    for diagnostic in result
        .diagnostics
        .iter()
        .filter(|d| d.level == ParseLevel::Warning)
    {
        eprintln!("{}", diagnostic);
    }
    let upload_duration = upload_start.elapsed();

    // --- 3. Transformation ---
    let transform_start = Instant::now();
    let app = platform
        .transform(&actor, &topology_name)
        .unwrap_or_else(|e| exit_with_error(&format!("Transformation failed: {}", e)));
    let transform_duration = transform_start.elapsed();

    // --- 4. Output ---
    let stats = app.stats;
    match cli.format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&app.root.to_json())
                .unwrap_or_else(|e| exit_with_error(&format!("Failed to render JSON: {}", e)));
            match &cli.output {
                Some(path) => fs::write(path, json).unwrap_or_else(|e| {
                    exit_with_error(&format!("Failed to write '{}': {}", path.display(), e))
                }),
                None => println!("{}", json),
            }
        }
        OutputFormat::Blueprint => {
            let path = cli
                .output
                .clone()
                .unwrap_or_else(|| PathBuf::from(format!("{}.blueprint", topology_name)));
            app.into_blueprint()
                .save(&path.to_string_lossy())
                .unwrap_or_else(|e| exit_with_error(&format!("Failed to save blueprint: {}", e)));
            eprintln!("Blueprint written to '{}'", path.display());
        }
    }

    eprintln!("\n--- Transformation Summary ---");
    eprintln!("Topology:        {}", topology_name);
    eprintln!("Entity Specs:    {}", stats.specs);
    eprintln!("Initializers:    {}", stats.initializers);
    eprintln!("Decorations:     {}", stats.decorations);
    eprintln!("Upload:          {:?}", upload_duration);
    eprintln!("Transformation:  {:?}", transform_duration);
    eprintln!("Total:           {:?}", total_start.elapsed());
}

fn init_tracing(level: Level) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .try_init()
        .ok();
}

fn parse_mapping(raw: &str) -> std::result::Result<(String, String), String> {
    match raw.split_once('=') {
        Some((from, to)) if !from.is_empty() && !to.is_empty() => {
            Ok((from.to_string(), to.to_string()))
        }
        _ => Err(format!("expected `node.type=entity.type`, got '{}'", raw)),
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "topology.json".to_string())
}

fn exit_with_error(message: &str) -> ! {
    eprintln!("\nError: {}", message);
    std::process::exit(1);
}
