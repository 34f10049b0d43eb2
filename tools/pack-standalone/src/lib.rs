//! Standalone ROM packer
//!
//! Embeds a ROM tree, a debug tree and the BIOS script into one C++ source
//! file so a standalone build needs no ROM on disk. The generated file
//! declares two `FileEntry` trees and one `std::string`.

pub mod config;
pub mod emit;
pub mod error;
pub mod escape;
pub mod node;
pub mod parse;
pub mod payload;
pub mod scan;

use std::io::{BufWriter, Write};
use std::path::Path;

pub use config::PackConfig;
pub use error::{PackError, Result};
pub use escape::{escape_text_literal, EscapeStyle};
pub use node::{Node, TreeStats};
pub use parse::{parse_artifact, unescape_literal, Artifact};

use emit::Emitter;
use scan::Scanner;

/// What one run embedded
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PackSummary {
    pub rom: TreeStats,
    pub debug: TreeStats,
    pub bios_bytes: usize,
    pub injected: usize,
}

/// Write the complete artifact for `config` into `out`.
///
/// Phases run strictly in order: ROM tree, debug tree, BIOS script. The
/// first failure stops the run with whatever was written so far left in
/// `out`.
pub fn render<W: Write>(config: &PackConfig, out: W) -> Result<(W, PackSummary)> {
    let mut emitter = Emitter::new(out, config.style);
    let mut scanner = Scanner::new(&config.scan);
    let mut summary = PackSummary::default();

    emitter.write_prelude(&config.include)?;

    let rom = scanner.scan(&config.rom)?;
    summary.rom = rom.stats();
    emitter.write_tree_decl(&config.symbols.rom, &rom)?;
    drop(rom);

    let debug = scanner.scan(&config.debug)?;
    summary.debug = debug.stats();
    emitter.write_tree_decl(&config.symbols.debug, &debug)?;
    drop(debug);

    for inj in scanner.unmatched_injections() {
        tracing::warn!(
            "Injection target {} not found, {} was not added",
            inj.target.display(),
            inj.name
        );
    }
    summary.injected = config.scan.injections.len() - scanner.unmatched_injections().count();

    tracing::info!("Reading BIOS {}", config.bios.display());
    let bios = payload::read_text(&config.bios)?;
    summary.bios_bytes = bios.len();
    emitter.write_text_decl(&config.symbols.bios, &bios)?;

    Ok((emitter.finish()?, summary))
}

/// Generate the artifact at `config.output`.
///
/// Output goes to a temporary file beside the target and is moved into
/// place only after every phase succeeded, so a failed run never leaves a
/// truncated artifact behind.
pub fn generate(config: &PackConfig) -> Result<PackSummary> {
    let dir = config
        .output
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));

    let tmp = tempfile::Builder::new()
        .prefix(".pack-standalone")
        .suffix(".tmp")
        .tempfile_in(dir)?;

    let (writer, summary) = render(config, BufWriter::new(tmp))?;
    let tmp = writer
        .into_inner()
        .map_err(|e| PackError::Write(e.into_error()))?;
    tmp.persist(&config.output)
        .map_err(|e| PackError::Persist {
            path: config.output.clone(),
            source: e.error,
        })?;

    let total = summary.rom + summary.debug;
    tracing::info!(
        "Wrote {}: {} dirs, {} files ({} bytes), {} injected",
        config.output.display(),
        total.dirs,
        total.files,
        total.bytes + summary.bios_bytes,
        summary.injected
    );
    Ok(summary)
}

/// Check that `config.output` matches what [`generate`] would write now
pub fn check(config: &PackConfig) -> Result<bool> {
    let (fresh, _) = render(config, Vec::new())?;
    let existing = std::fs::read(&config.output).map_err(|source| PackError::Read {
        path: config.output.clone(),
        source,
    })?;

    let in_sync = fresh == existing;
    if in_sync {
        tracing::info!("{} is up to date", config.output.display());
    } else {
        tracing::warn!("{} is out of date", config.output.display());
    }
    Ok(in_sync)
}
