//! pack-standalone - standalone ROM packer
//!
//! Run from the directory holding `rom/`, `debug/` and `bios.lua` to produce
//! `fs_standalone.cpp` for standalone builds.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use pack_standalone::{EscapeStyle, Node, PackConfig};

#[derive(Parser)]
#[command(name = "pack-standalone")]
#[command(about = "Embed a ROM directory into a C++ source file for standalone builds")]
#[command(version)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate the standalone source file
    Generate(PackArgs),

    /// Check that the generated file is up to date
    Check(PackArgs),

    /// Print the trees embedded in a generated file
    Inspect {
        /// Generated source file
        #[arg(default_value = "fs_standalone.cpp")]
        artifact: PathBuf,

        /// Also print file contents
        #[arg(long)]
        contents: bool,
    },
}

/// Inputs shared by generate and check
#[derive(Args)]
struct PackArgs {
    /// Directory containing rom/, debug/ and bios.lua
    #[arg(short = 'C', long = "dir", default_value = ".")]
    dir: PathBuf,

    /// Config file (default: <dir>/standalone.toml if present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output file (overrides config)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Literal escaping style (overrides config)
    #[arg(long, value_enum)]
    style: Option<EscapeStyle>,

    /// Sort entries by name for reproducible output
    #[arg(long)]
    sort: bool,

    /// Do not inject the IO API or any configured payload
    #[arg(long)]
    no_inject: bool,
}

impl PackArgs {
    fn into_config(self) -> Result<PackConfig> {
        let mut config = PackConfig::load(&self.dir, self.config.as_deref())
            .with_context(|| format!("Failed to load config for {}", self.dir.display()))?;
        if let Some(output) = self.output {
            config.output = output;
        }
        if let Some(style) = self.style {
            config.style = style;
        }
        if self.sort {
            config.scan.sort = true;
        }
        if self.no_inject {
            config.scan.injections.clear();
        }
        Ok(config)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    match cli.command {
        Commands::Generate(args) => {
            let config = args.into_config()?;
            pack_standalone::generate(&config)
                .with_context(|| format!("Failed to generate {}", config.output.display()))?;
        }
        Commands::Check(args) => {
            let config = args.into_config()?;
            let in_sync = pack_standalone::check(&config)
                .with_context(|| format!("Failed to check {}", config.output.display()))?;
            if !in_sync {
                anyhow::bail!(
                    "{} is out of date. Run 'pack-standalone generate' to regenerate.",
                    config.output.display()
                );
            }
        }
        Commands::Inspect { artifact, contents } => inspect(&artifact, contents)?,
    }

    Ok(())
}

fn inspect(path: &Path, show_contents: bool) -> Result<()> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let artifact = pack_standalone::parse_artifact(&source)
        .with_context(|| format!("Failed to parse {}", path.display()))?;

    for include in &artifact.includes {
        println!("#include {}", include);
    }
    for decl in &artifact.declarations {
        match &decl.value {
            pack_standalone::parse::Value::Tree(children) => {
                let stats = Node::dir(decl.symbol.as_str(), children.clone()).stats();
                println!(
                    "{} {}: {} dirs, {} files, {} bytes",
                    decl.ty,
                    decl.symbol,
                    stats.dirs - 1,
                    stats.files,
                    stats.bytes
                );
                for child in children {
                    print_node(child, 1, show_contents);
                }
            }
            pack_standalone::parse::Value::Text(text) => {
                println!("{} {}: {} bytes", decl.ty, decl.symbol, text.len());
                if show_contents {
                    print_contents(text, 1);
                }
            }
        }
    }
    Ok(())
}

fn print_node(node: &Node, depth: usize, show_contents: bool) {
    let pad = "  ".repeat(depth);
    match node {
        Node::Dir { name, children } => {
            println!("{}{}/", pad, name);
            for child in children {
                print_node(child, depth + 1, show_contents);
            }
        }
        Node::File { name, contents } => {
            println!("{}{} ({} bytes)", pad, name, contents.len());
            if show_contents {
                print_contents(contents, depth + 1);
            }
        }
    }
}

fn print_contents(text: &str, depth: usize) {
    let pad = "  ".repeat(depth);
    for line in text.lines() {
        println!("{}| {}", pad, line);
    }
}
