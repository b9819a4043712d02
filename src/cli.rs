use crate::config::{LayoutConfig, is_json5, load_config, parse_document};
use crate::ir::FlowDocument;
use crate::layout::{EdgeParams, compute_layout, route_edges};
use crate::layout_dump::write_layout_dump_to;
use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "flowlayout",
    version,
    about = "Auto-layout and edge handles for attack flow diagrams"
)]
pub struct Cli {
    /// Log debug output to stderr
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Arrange every node and assign edge handles
    Layout {
        #[command(flatten)]
        paths: IoArgs,

        /// Write the layout dump instead of the updated document
        #[arg(long = "dump")]
        dump: bool,
    },
    /// Assign edge handles and anchor points at the current node positions
    Route {
        #[command(flatten)]
        paths: IoArgs,
    },
}

#[derive(Args, Debug)]
pub struct IoArgs {
    /// Input document (.json/.json5) or '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Output file. Defaults to stdout if omitted.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Layout config file (JSON or JSON5)
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RoutedEdge {
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    source: String,
    target: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    params: Option<EdgeParams>,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Layout { paths, dump } => {
            let (config, document) = load_inputs(&paths)?;
            let layout = compute_layout(&document.nodes, &document.edges, &config);
            info!(
                nodes = layout.nodes.len(),
                routed = layout.edges.iter().filter(|e| e.params.is_some()).count(),
                "layout complete"
            );
            let mut writer = open_output(paths.output.as_deref())?;
            if dump {
                write_layout_dump_to(&mut writer, &layout, &config)?;
            } else {
                let mut laid_out = layout.into_document();
                laid_out.extra = document.extra;
                serde_json::to_writer_pretty(&mut writer, &laid_out)?;
            }
            finish(writer)
        }
        Command::Route { paths } => {
            let (config, document) = load_inputs(&paths)?;
            let routed: Vec<RoutedEdge> =
                route_edges(&document.nodes, &document.edges, config.node_size)
                    .into_iter()
                    .map(|layout| RoutedEdge {
                        id: layout.edge.id,
                        source: layout.edge.source,
                        target: layout.edge.target,
                        params: layout.params,
                    })
                    .collect();
            let mut writer = open_output(paths.output.as_deref())?;
            serde_json::to_writer_pretty(&mut writer, &routed)?;
            finish(writer)
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

fn load_inputs(paths: &IoArgs) -> Result<(LayoutConfig, FlowDocument)> {
    let config = load_config(paths.config.as_deref()).context("loading layout config")?;
    let document = read_document(paths.input.as_deref())?;
    Ok((config, document))
}

fn read_document(path: Option<&Path>) -> Result<FlowDocument> {
    let (contents, json5) = read_input(path)?;
    let document = parse_document(&contents, json5).context("parsing diagram document")?;
    Ok(document)
}

fn read_input(path: Option<&Path>) -> Result<(String, bool)> {
    if let Some(path) = path {
        if path != Path::new("-") {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            return Ok((content, is_json5(path)));
        }
    }

    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    Ok((buf, false))
}

fn open_output(path: Option<&Path>) -> Result<Box<dyn Write>> {
    match path {
        Some(path) => {
            let file = std::fs::File::create(path)
                .with_context(|| format!("creating {}", path.display()))?;
            Ok(Box::new(BufWriter::new(file)))
        }
        None => Ok(Box::new(BufWriter::new(io::stdout().lock()))),
    }
}

fn finish(mut writer: Box<dyn Write>) -> Result<()> {
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_layout_flags() {
        let cli = Cli::try_parse_from([
            "flowlayout", "layout", "-i", "flow.json", "-c", "cfg.json5", "--dump", "-v",
        ])
        .unwrap();
        assert!(cli.verbose);
        match cli.command {
            Command::Layout { paths, dump } => {
                assert!(dump);
                assert_eq!(paths.input.as_deref(), Some(Path::new("flow.json")));
                assert_eq!(paths.config.as_deref(), Some(Path::new("cfg.json5")));
                assert!(paths.output.is_none());
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn reads_json5_documents() {
        let path =
            std::env::temp_dir().join(format!("flow-layout-doc-{}.json5", std::process::id()));
        std::fs::write(
            &path,
            "{ nodes: [{ id: 'a', position: { x: 0, y: 0 }, type: 'attack-action' }], edges: [] }",
        )
        .unwrap();
        let document = read_document(Some(&path));
        let _ = std::fs::remove_file(&path);
        let document = document.unwrap();
        assert_eq!(document.nodes.len(), 1);
        assert!(document.nodes[0].is_backbone());
    }
}
