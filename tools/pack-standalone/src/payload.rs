//! Synthetic entries injected into the ROM tree
//!
//! Standalone builds have no on-disk ROM to fall back on, so the IO API is
//! shipped with the packer and appended to `rom/apis` unless configured
//! otherwise.

use std::path::{Path, PathBuf};

use crate::error::{PackError, Result};

/// IO API script appended to the ROM's API directory
pub const IO_API: &str = include_str!("payload/io.lua");

/// Default injection target, relative to the base directory
pub const DEFAULT_TARGET: &str = "rom/apis";

/// Default injected entry name
pub const DEFAULT_NAME: &str = "io.lua";

/// Where injected content comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PayloadSource {
    /// Built into the packer
    Embedded(&'static str),
    /// Read from disk when the tree is scanned
    File(PathBuf),
}

impl PayloadSource {
    /// Load the payload text.
    ///
    /// A missing or non-UTF-8 payload file is fatal, the same as any other
    /// unreadable input.
    pub fn load(&self) -> Result<String> {
        match self {
            PayloadSource::Embedded(text) => Ok((*text).to_string()),
            PayloadSource::File(path) => read_text(path),
        }
    }
}

/// A leaf appended to one directory after its real entries
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Injection {
    /// Directory receiving the entry, resolved against the base directory
    pub target: PathBuf,
    pub name: String,
    pub source: PayloadSource,
}

impl Injection {
    /// The IO API injected into `<base>/rom/apis`
    pub fn io_api(base: &Path) -> Self {
        Self {
            target: base.join(DEFAULT_TARGET),
            name: DEFAULT_NAME.to_string(),
            source: PayloadSource::Embedded(IO_API),
        }
    }
}

/// Read a whole file as UTF-8 text.
///
/// Files are rebuilt from `const char *` literals at runtime, so a NUL
/// byte would truncate them and is rejected here.
pub(crate) fn read_text(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path).map_err(|source| PackError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    if bytes.contains(&0) {
        return Err(PackError::UnsupportedText {
            path: path.to_path_buf(),
        });
    }
    String::from_utf8(bytes).map_err(|_| PackError::InvalidUtf8 {
        path: path.to_path_buf(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_io_api_defines_handles() {
        assert!(IO_API.starts_with("-- Definition for the IO API"));
        assert!(IO_API.contains("function open( _sPath, _sMode )"));
        assert!(IO_API.ends_with("end\n"));
    }

    #[test]
    fn test_missing_payload_file_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let source = PayloadSource::File(dir.path().join("io.lua"));
        assert!(matches!(source.load(), Err(PackError::Read { .. })));
    }

    #[test]
    fn test_file_payload_rejects_binary() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("io.lua");
        std::fs::write(&path, [0xff, 0xfe, 0x00]).unwrap();
        let source = PayloadSource::File(path);
        assert!(matches!(source.load(), Err(PackError::InvalidUtf8 { .. })));
    }

    #[test]
    fn test_file_payload_rejects_nul() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("io.lua");
        std::fs::write(&path, b"-- io\0api\n").unwrap();
        let source = PayloadSource::File(path);
        assert!(matches!(
            source.load(),
            Err(PackError::UnsupportedText { .. })
        ));
    }

    #[test]
    fn test_io_api_target() {
        let inj = Injection::io_api(Path::new("base"));
        assert_eq!(inj.target, Path::new("base").join("rom").join("apis"));
        assert_eq!(inj.name, "io.lua");
    }
}
