//! flow-synth CLI entry point.
//!
//! Every subcommand reads one input (file or stdin) and writes JSON.

use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use flow_synth::{EdgeSpec, Engine, EngineConfig, FlowGraph, Lookups, ModelRef, NodeSpec, ToolDescriptor, ToolLookup};

/// Flowchart-to-workflow synthesis, validation and layout.
#[derive(Parser, Debug)]
#[command(name = "flow-synth", version = env!("FLOW_SYNTH_VERSION"))]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Engine configuration (JSON EngineConfig)
    #[arg(short = 'c', long = "config", global = true)]
    config: Option<PathBuf>,

    /// Tool catalog (JSON array of tool descriptors)
    #[arg(short = 't', long = "tools", global = true)]
    tools: Option<PathBuf>,

    /// Model that replaces generated model blocks, as provider/name
    #[arg(short = 'm', long = "model", global = true, value_parser = parse_model)]
    model: Option<ModelRef>,

    /// Write output to this file instead of stdout
    #[arg(short = 'o', long = "output", global = true)]
    output: Option<PathBuf>,

    /// Raise log verbosity (-v debug, -vv trace)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse flowchart text into a draft graph
    Parse {
        /// Input file (reads from stdin if not provided)
        input: Option<PathBuf>,
    },
    /// Synthesize a positioned workflow graph
    Synth {
        input: Option<PathBuf>,

        /// Graph the result is appended to (JSON FlowGraph)
        #[arg(short = 'e', long = "existing")]
        existing: Option<PathBuf>,

        /// Input is JSON `{nodes, edges}` specs instead of flowchart text
        #[arg(long = "specs")]
        specs: bool,
    },
    /// Check connectivity and convergence; exits 1 when invalid
    Validate { input: Option<PathBuf> },
    /// Recompute positions for every node of a graph
    Layout { input: Option<PathBuf> },
}

#[derive(Debug, Deserialize)]
struct SpecBundle {
    #[serde(default)]
    nodes: Vec<NodeSpec>,
    #[serde(default)]
    edges: Vec<EdgeSpec>,
}

fn parse_model(raw: &str) -> Result<ModelRef, String> {
    match raw.split_once('/') {
        Some((provider, name)) if !provider.trim().is_empty() && !name.trim().is_empty() => Ok(ModelRef {
            provider: provider.trim().to_string(),
            name: name.trim().to_string(),
        }),
        _ => Err(format!("expected provider/name, got '{raw}'")),
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level)),
        )
        .with_writer(io::stderr)
        .init();
}

fn read_input(path: Option<&PathBuf>) -> flow_synth::Result<String> {
    match path {
        Some(path) => Ok(fs::read_to_string(path)?),
        None => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
    }
}

fn read_json<T: DeserializeOwned>(path: &PathBuf) -> flow_synth::Result<T> {
    Ok(serde_json::from_str(&fs::read_to_string(path)?)?)
}

fn build_engine(cli: &Cli) -> flow_synth::Result<Engine> {
    let config: EngineConfig = match &cli.config {
        Some(path) => read_json(path)?,
        None => EngineConfig::default(),
    };
    let mut lookups = Lookups::builtin();
    if let Some(path) = &cli.tools {
        let tools: Vec<ToolDescriptor> = read_json(path)?;
        lookups = lookups.with_tools(ToolLookup::from_tools(tools));
    }
    if let Some(model) = &cli.model {
        lookups = lookups.with_default_model(model.clone());
    }
    Ok(Engine::new(lookups, config))
}

/// Returns the JSON document to emit and whether the run succeeded.
fn run(cli: &Cli) -> flow_synth::Result<(String, bool)> {
    let engine = build_engine(cli)?;
    match &cli.command {
        Command::Parse { input } => {
            let draft = engine.parse(&read_input(input.as_ref())?)?;
            Ok((serde_json::to_string_pretty(&draft)?, true))
        }
        Command::Synth { input, existing, specs } => {
            let existing: FlowGraph = match existing {
                Some(path) => read_json(path)?,
                None => FlowGraph::default(),
            };
            let text = read_input(input.as_ref())?;
            let graph = if *specs {
                let bundle: SpecBundle = serde_json::from_str(&text)?;
                engine.synthesize_specs(&bundle.nodes, &bundle.edges, &existing)?
            } else {
                engine.synthesize_flowchart(&text, &existing)?
            };
            Ok((serde_json::to_string_pretty(&graph)?, true))
        }
        Command::Validate { input } => {
            let graph: FlowGraph = serde_json::from_str(&read_input(input.as_ref())?)?;
            let report = engine.validate(&graph);
            Ok((serde_json::to_string_pretty(&report)?, report.is_valid()))
        }
        Command::Layout { input } => {
            let graph: FlowGraph = serde_json::from_str(&read_input(input.as_ref())?)?;
            Ok((serde_json::to_string_pretty(&engine.relayout(&graph))?, true))
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let (rendered, ok) = match run(&cli) {
        Ok(out) => out,
        Err(e) => {
            eprintln!("error: {}", e);
            process::exit(2);
        }
    };

    // Write output to file or stdout
    if let Some(ref path) = cli.output {
        if let Err(e) = fs::write(path, &rendered) {
            eprintln!("error: cannot write '{}': {}", path.display(), e);
            process::exit(2);
        }
    } else {
        println!("{}", rendered);
        if let Err(e) = io::stdout().flush() {
            eprintln!("error: cannot flush stdout: {}", e);
            process::exit(2);
        }
    }

    if !ok {
        process::exit(1);
    }
}
