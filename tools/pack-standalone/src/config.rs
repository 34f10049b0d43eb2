//! standalone.toml configuration
//!
//! Every field is optional; an absent file or section reproduces the
//! classic layout: `rom/`, `debug/` and `bios.lua` in the base directory,
//! packed into `fs_standalone.cpp` with the IO API injected into
//! `rom/apis`.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::{PackError, Result};
use crate::escape::EscapeStyle;
use crate::payload::{self, Injection, PayloadSource};
use crate::scan::{ScanOptions, DEFAULT_EXCLUDED};

/// Config file looked up in the base directory
pub const CONFIG_FILE: &str = "standalone.toml";

/// Raw file contents
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    pub inputs: InputsSection,
    pub output: OutputSection,
    pub scan: ScanSection,
    /// `None` keeps the default IO API injection; an empty list disables it
    pub inject: Option<Vec<InjectEntry>>,
}

/// Input locations, relative to the base directory
#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InputsSection {
    pub rom: PathBuf,
    pub debug: PathBuf,
    pub bios: PathBuf,
}

impl Default for InputsSection {
    fn default() -> Self {
        Self {
            rom: PathBuf::from("rom"),
            debug: PathBuf::from("debug"),
            bios: PathBuf::from("bios.lua"),
        }
    }
}

/// Generated file settings
#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputSection {
    pub path: PathBuf,
    /// Header declaring `FileEntry`. Written verbatim when it starts with
    /// `<`, quoted otherwise.
    pub include: String,
    pub rom_symbol: String,
    pub debug_symbol: String,
    pub bios_symbol: String,
    pub escape: EscapeStyle,
}

impl Default for OutputSection {
    fn default() -> Self {
        Self {
            path: PathBuf::from("fs_standalone.cpp"),
            include: "fs_standalone.hpp".to_string(),
            rom_symbol: "standaloneROM".to_string(),
            debug_symbol: "standaloneDebug".to_string(),
            bios_symbol: "standaloneBIOS".to_string(),
            escape: EscapeStyle::default(),
        }
    }
}

/// Walk settings
#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScanSection {
    pub exclude: Vec<String>,
    /// Sort entries by name. Off by default: listing order is whatever the
    /// platform returns.
    pub sort: bool,
}

impl Default for ScanSection {
    fn default() -> Self {
        Self {
            exclude: DEFAULT_EXCLUDED.iter().map(|s| s.to_string()).collect(),
            sort: false,
        }
    }
}

/// `[[inject]]` table
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InjectEntry {
    /// Target directory, relative to the base directory
    pub path: PathBuf,
    pub name: String,
    /// Payload file; the built-in IO API when omitted
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl ConfigFile {
    pub fn from_toml(text: &str, path: &Path) -> Result<Self> {
        toml::from_str(text).map_err(|e| PackError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }
}

/// Symbol names declared in the generated file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbols {
    pub rom: String,
    pub debug: String,
    pub bios: String,
}

/// Fully resolved settings for one run
#[derive(Debug, Clone)]
pub struct PackConfig {
    pub rom: PathBuf,
    pub debug: PathBuf,
    pub bios: PathBuf,
    pub output: PathBuf,
    pub include: String,
    pub symbols: Symbols,
    pub style: EscapeStyle,
    pub scan: ScanOptions,
}

impl PackConfig {
    /// Load settings for `base_dir`.
    ///
    /// An explicit `config` path must exist. Without one,
    /// `<base_dir>/standalone.toml` is used when present and defaults
    /// otherwise.
    pub fn load(base_dir: &Path, config: Option<&Path>) -> Result<Self> {
        let path = match config {
            Some(path) => Some(path.to_path_buf()),
            None => Some(base_dir.join(CONFIG_FILE)).filter(|p| p.is_file()),
        };

        let file = match path {
            Some(path) => {
                tracing::info!("Loading config {}", path.display());
                let text = std::fs::read_to_string(&path).map_err(|source| PackError::Read {
                    path: path.clone(),
                    source,
                })?;
                ConfigFile::from_toml(&text, &path)?
            }
            None => ConfigFile::default(),
        };

        Ok(Self::resolve(base_dir, file))
    }

    /// Resolve every relative path in `file` against `base_dir`
    pub fn resolve(base_dir: &Path, file: ConfigFile) -> Self {
        let injections = match file.inject {
            None => vec![Injection::io_api(base_dir)],
            Some(entries) => entries
                .into_iter()
                .map(|entry| Injection {
                    target: base_dir.join(entry.path),
                    name: entry.name,
                    source: match entry.file {
                        Some(file) => PayloadSource::File(base_dir.join(file)),
                        None => PayloadSource::Embedded(payload::IO_API),
                    },
                })
                .collect(),
        };

        Self {
            rom: base_dir.join(file.inputs.rom),
            debug: base_dir.join(file.inputs.debug),
            bios: base_dir.join(file.inputs.bios),
            output: base_dir.join(file.output.path),
            include: file.output.include,
            symbols: Symbols {
                rom: file.output.rom_symbol,
                debug: file.output.debug_symbol,
                bios: file.output.bios_symbol,
            },
            style: file.output.escape,
            scan: ScanOptions {
                exclude: file.scan.exclude.into_iter().collect(),
                sort: file.scan.sort,
                injections,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_classic_layout() {
        let config = PackConfig::resolve(Path::new("work"), ConfigFile::default());
        assert_eq!(config.rom, Path::new("work/rom"));
        assert_eq!(config.debug, Path::new("work/debug"));
        assert_eq!(config.bios, Path::new("work/bios.lua"));
        assert_eq!(config.output, Path::new("work/fs_standalone.cpp"));
        assert_eq!(config.include, "fs_standalone.hpp");
        assert_eq!(config.symbols.rom, "standaloneROM");
        assert_eq!(config.style, EscapeStyle::Continuation);
        assert!(!config.scan.sort);
        assert!(config.scan.exclude.contains("desktop.ini"));
        assert_eq!(config.scan.injections, vec![Injection::io_api(Path::new("work"))]);
    }

    #[test]
    fn test_parse_full_file() {
        let text = r#"
            [inputs]
            rom = "assets/rom"

            [output]
            path = "gen/rom.cpp"
            include = "<FileEntry.hpp>"
            escape = "concatenation"

            [scan]
            exclude = ["Thumbs.db"]
            sort = true

            [[inject]]
            path = "assets/rom/apis"
            name = "io.lua"
            file = "vendor/io.lua"
        "#;
        let file = ConfigFile::from_toml(text, Path::new(CONFIG_FILE)).unwrap();
        let config = PackConfig::resolve(Path::new("."), file);

        assert_eq!(config.rom, Path::new("./assets/rom"));
        assert_eq!(config.debug, Path::new("./debug"));
        assert_eq!(config.include, "<FileEntry.hpp>");
        assert_eq!(config.style, EscapeStyle::Concatenation);
        assert!(config.scan.sort);
        assert_eq!(
            config.scan.exclude.iter().collect::<Vec<_>>(),
            ["Thumbs.db"]
        );
        assert_eq!(
            config.scan.injections,
            vec![Injection {
                target: PathBuf::from("./assets/rom/apis"),
                name: "io.lua".to_string(),
                source: PayloadSource::File(PathBuf::from("./vendor/io.lua")),
            }]
        );
    }

    #[test]
    fn test_empty_inject_list_disables_injection() {
        let file = ConfigFile::from_toml("inject = []", Path::new(CONFIG_FILE)).unwrap();
        let config = PackConfig::resolve(Path::new("."), file);
        assert!(config.scan.injections.is_empty());
    }

    #[test]
    fn test_unknown_key_rejected() {
        let err = ConfigFile::from_toml("[output]\nstyle = \"x\"", Path::new(CONFIG_FILE))
            .unwrap_err();
        assert!(matches!(err, PackError::Config { .. }));
    }

    #[test]
    fn test_load_missing_explicit_config() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(matches!(
            PackConfig::load(dir.path(), Some(&missing)),
            Err(PackError::Read { .. })
        ));
    }

    #[test]
    fn test_load_picks_up_base_config() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "[scan]\nsort = true\n").unwrap();
        let config = PackConfig::load(dir.path(), None).unwrap();
        assert!(config.scan.sort);
    }
}
