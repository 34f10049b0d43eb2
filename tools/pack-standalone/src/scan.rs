//! Directory walk producing [`Node`] trees
//!
//! Entries are visited in the order the platform lists them unless sorting
//! is requested. Nothing is skipped on error: an unreadable entry, one that
//! disappears mid-walk or a file that is not NUL-free UTF-8 aborts the scan.

use std::collections::BTreeSet;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use walkdir::{DirEntry, WalkDir};

use crate::error::{PackError, Result};
use crate::node::Node;
use crate::payload::{read_text, Injection};

/// Names that are never packed regardless of configuration
pub const ALWAYS_EXCLUDED: [&str; 2] = [".", ".."];

/// OS and editor artifacts, plus the legacy packer script
pub const DEFAULT_EXCLUDED: [&str; 3] = [".DS_Store", "desktop.ini", "packStandaloneROM.js"];

/// Walk settings shared by every tree in one run
#[derive(Debug, Clone, Default)]
pub struct ScanOptions {
    /// Entry names skipped at any depth, in addition to [`ALWAYS_EXCLUDED`]
    pub exclude: BTreeSet<String>,
    /// Sort siblings by file name instead of listing order
    pub sort: bool,
    pub injections: Vec<Injection>,
}

impl ScanOptions {
    pub fn is_excluded(&self, name: &OsStr) -> bool {
        match name.to_str() {
            Some(name) => ALWAYS_EXCLUDED.contains(&name) || self.exclude.contains(name),
            None => false,
        }
    }
}

/// A directory still being filled
struct Frame {
    path: PathBuf,
    name: String,
    children: Vec<Node>,
}

/// Builds trees and remembers which injections were applied
pub struct Scanner<'a> {
    options: &'a ScanOptions,
    injected: Vec<PathBuf>,
}

impl<'a> Scanner<'a> {
    pub fn new(options: &'a ScanOptions) -> Self {
        Self {
            options,
            injected: Vec::new(),
        }
    }

    /// Read the directory at `root` into a tree named after its last
    /// path component.
    pub fn scan(&mut self, root: &Path) -> Result<Node> {
        let meta = std::fs::metadata(root).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                PackError::MissingRoot(root.to_path_buf())
            } else {
                PackError::Read {
                    path: root.to_path_buf(),
                    source,
                }
            }
        })?;
        if !meta.is_dir() {
            return Err(PackError::NotADirectory(root.to_path_buf()));
        }

        tracing::info!("Reading directory {}", root.display());

        let mut walker = WalkDir::new(root).follow_links(false).min_depth(1);
        if self.options.sort {
            walker = walker.sort_by_file_name();
        }

        let options = self.options;
        let entries = walker
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !options.is_excluded(e.file_name()));

        let mut root_frame = Frame {
            path: root.to_path_buf(),
            name: root
                .file_name()
                .and_then(OsStr::to_str)
                .unwrap_or_default()
                .to_string(),
            children: Vec::new(),
        };
        // Open directories below the root; an entry at depth d belongs to
        // the frame at index d - 2, or to the root when d == 1
        let mut open: Vec<Frame> = Vec::new();

        for entry in entries {
            let entry = entry?;
            while open.len() >= entry.depth() {
                self.close_innermost(&mut open, &mut root_frame)?;
            }

            let name = entry_name(&entry)?;
            if entry.file_type().is_dir() {
                tracing::info!("Reading directory {}", entry.path().display());
                open.push(Frame {
                    path: entry.path().to_path_buf(),
                    name,
                    children: Vec::new(),
                });
            } else {
                tracing::info!("Reading file {}", entry.path().display());
                let contents = read_text(entry.path())?;
                open.last_mut()
                    .unwrap_or(&mut root_frame)
                    .children
                    .push(Node::file(name, contents));
            }
        }

        while !open.is_empty() {
            self.close_innermost(&mut open, &mut root_frame)?;
        }
        self.finish(root_frame)
    }

    /// Injections whose target directory was never visited
    pub fn unmatched_injections(&self) -> impl Iterator<Item = &Injection> + '_ {
        self.options
            .injections
            .iter()
            .filter(|inj| !self.injected.contains(&inj.target))
    }

    fn close_innermost(&mut self, open: &mut Vec<Frame>, root: &mut Frame) -> Result<()> {
        if let Some(frame) = open.pop() {
            let node = self.finish(frame)?;
            open.last_mut().unwrap_or(root).children.push(node);
        }
        Ok(())
    }

    /// Append matching injections after the real entries and seal the frame
    fn finish(&mut self, mut frame: Frame) -> Result<Node> {
        for inj in &self.options.injections {
            if inj.target == frame.path {
                tracing::info!(
                    "Injecting {} into {}",
                    inj.name,
                    frame.path.display()
                );
                frame
                    .children
                    .push(Node::file(inj.name.clone(), inj.source.load()?));
                self.injected.push(frame.path.clone());
            }
        }
        Ok(Node::dir(frame.name, frame.children))
    }
}

/// Scan a single tree with the given options
pub fn scan_tree(root: &Path, options: &ScanOptions) -> Result<Node> {
    Scanner::new(options).scan(root)
}

fn entry_name(entry: &DirEntry) -> Result<String> {
    entry
        .file_name()
        .to_str()
        .map(str::to_string)
        .ok_or_else(|| PackError::InvalidName {
            path: entry.path().to_path_buf(),
        })
}
