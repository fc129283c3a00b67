use anyhow::{Context, Result, bail};
use sha2::{Digest, Sha256};
use std::{
    fs::{self, OpenOptions},
    io::{ErrorKind, Write},
    path::{Path, PathBuf},
};

use crate::health::diagnose::repaired_file_name;
use crate::health::model::HealthReport;
use crate::report::model::{ArtifactHash, ArtifactInfo};

/// A file read for diagnosis.
///
/// Holds the exact bytes diagnosed and a fingerprint identifying them.
#[derive(Debug, Clone)]
pub struct ArtifactContext {
    /// Optional source path (informational only).
    pub path: Option<String>,

    /// Extension as found on the file name, without the dot.
    pub declared_extension: String,

    pub bytes: Vec<u8>,

    pub size_bytes: u64,

    pub hash_alg: String,

    /// Hex-encoded hash of the file bytes.
    pub hash_hex: String,
}

impl ArtifactContext {
    /// Report-facing metadata for this file; the bytes are not carried over.
    pub fn to_artifact(&self) -> ArtifactInfo {
        ArtifactInfo {
            path: self.path.clone(),
            size_bytes: self.size_bytes,
            hash: ArtifactHash {
                algorithm: self.hash_alg.clone(),
                value: self.hash_hex.clone(),
            },
        }
    }
}

/// Read a file and fingerprint its content.
///
/// The fingerprint depends only on the bytes, so a repaired copy can be
/// told apart from its source regardless of file names or timestamps.
pub fn read_artifact(path: &Path) -> Result<ArtifactContext> {
    let bytes =
        fs::read(path).with_context(|| format!("failed to read file: {}", path.display()))?;

    let declared_extension = path
        .extension()
        .map(|e| e.to_string_lossy().into_owned())
        .unwrap_or_default();

    Ok(ArtifactContext {
        path: Some(path.display().to_string()),
        declared_extension,
        size_bytes: bytes.len() as u64,
        hash_alg: "sha256".to_string(),
        hash_hex: sha256_hex(&bytes),
        bytes,
    })
}

/// Upper bound on `-N` suffixes tried when a repaired name is taken.
const MAX_NAME_ATTEMPTS: usize = 1000;

/// Write the repaired content of `original_name` into `dir`.
///
/// Existing files are never overwritten: when the repaired name is taken,
/// `-1`, `-2`, ... is appended to the stem. Returns the written path, or
/// `None` when the report carries no repair.
pub fn write_repaired(
    dir: &Path,
    original_name: &str,
    report: &HealthReport,
) -> Result<Option<PathBuf>> {
    let (Some(bytes), Some(name)) = (
        report.repaired_bytes.as_deref(),
        repaired_file_name(original_name, report),
    ) else {
        return Ok(None);
    };

    fs::create_dir_all(dir)
        .with_context(|| format!("failed to create repair directory: {}", dir.display()))?;

    let (stem, ext) = name.rsplit_once('.').unwrap_or((name.as_str(), ""));

    for attempt in 0..MAX_NAME_ATTEMPTS {
        let candidate = match (attempt, ext) {
            (0, _) => name.clone(),
            (n, "") => format!("{stem}-{n}"),
            (n, ext) => format!("{stem}-{n}.{ext}"),
        };
        let out = dir.join(candidate);

        let mut file = match OpenOptions::new().write(true).create_new(true).open(&out) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
            Err(e) => {
                return Err(anyhow::Error::new(e)
                    .context(format!("failed to create repaired file: {}", out.display())));
            }
        };

        file.write_all(bytes)
            .with_context(|| format!("failed to write repaired file: {}", out.display()))?;

        return Ok(Some(out));
    }

    bail!(
        "no free name for repaired copy of {original_name} in {}",
        dir.display()
    )
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{Builder, NamedTempFile};

    fn temp_file(suffix: &str, data: &[u8]) -> NamedTempFile {
        let mut file = Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(data).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn reads_bytes_and_computes_stable_hash() {
        let file = temp_file(".bin", b"mutscan-test");

        let ctx = read_artifact(file.path()).expect("read succeeds");

        assert_eq!(ctx.bytes, b"mutscan-test");
        assert_eq!(ctx.size_bytes, 12);
        assert_eq!(ctx.hash_alg, "sha256");
        assert_eq!(ctx.declared_extension, "bin");

        // echo -n "mutscan-test" | sha256sum
        assert_eq!(
            ctx.hash_hex,
            "5bc5b298edcd140e397f0b6a9de55888d7077b066d4bd5c357e79744775c14f6"
        );
    }

    #[test]
    fn different_inputs_produce_different_hashes() {
        let a = read_artifact(temp_file(".jpg", b"data-a").path()).unwrap();
        let b = read_artifact(temp_file(".jpg", b"data-b").path()).unwrap();

        assert_ne!(a.hash_hex, b.hash_hex);
    }

    #[test]
    fn missing_file_returns_error() {
        assert!(read_artifact(Path::new("non_existent.jpg")).is_err());
    }

    #[test]
    fn file_without_extension_has_empty_declared_extension() {
        let file = temp_file("", b"x");
        let ctx = read_artifact(file.path()).unwrap();
        // Temp files are named `.tmpXXXXXX`, a dotfile with no extension.
        assert_eq!(ctx.declared_extension, "");
    }

    #[test]
    fn writes_repaired_copy_under_detected_extension() {
        use crate::health::diagnose::diagnose;

        let dir = tempfile::tempdir().unwrap();
        let png = [0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];
        let report = diagnose(&png, "jpg");

        let out = write_repaired(&dir.path().join("fixed"), "scan.jpg", &report)
            .unwrap()
            .expect("mislabeled file has a repair");

        assert_eq!(out.file_name().unwrap(), "scan.png");
        assert_eq!(fs::read(out).unwrap(), png);
    }

    #[test]
    fn colliding_repaired_names_get_a_suffix() {
        use crate::health::diagnose::diagnose;

        let dir = tempfile::tempdir().unwrap();
        let first = [0x89, b'P', b'N', b'G', 0x01];
        let second = [0x89, b'P', b'N', b'G', 0x02];

        // `.jpg` and `.jpeg` both map to `scan_01.png`.
        let a = write_repaired(dir.path(), "scan_01.jpg", &diagnose(&first, "jpg"))
            .unwrap()
            .unwrap();
        let b = write_repaired(dir.path(), "scan_01.jpeg", &diagnose(&second, "jpeg"))
            .unwrap()
            .unwrap();

        assert_eq!(a.file_name().unwrap(), "scan_01.png");
        assert_eq!(b.file_name().unwrap(), "scan_01-1.png");
        assert_eq!(fs::read(a).unwrap(), first);
        assert_eq!(fs::read(b).unwrap(), second);
    }

    #[test]
    fn healthy_file_writes_nothing() {
        use crate::health::diagnose::diagnose;

        let dir = tempfile::tempdir().unwrap();
        let report = diagnose(&[0xff, 0xd8, 0xff, 0xd9], "jpg");

        assert!(write_repaired(dir.path(), "ok.jpg", &report).unwrap().is_none());
    }

    #[test]
    fn converts_to_report_artifact() {
        let ctx = ArtifactContext {
            path: Some("scan.jpg".into()),
            declared_extension: "jpg".into(),
            bytes: vec![0xff, 0xd8, 0xff],
            size_bytes: 3,
            hash_alg: "sha256".into(),
            hash_hex: "abcd".into(),
        };

        let artifact = ctx.to_artifact();
        assert_eq!(artifact.path, Some("scan.jpg".into()));
        assert_eq!(artifact.hash.value, "abcd");
    }
}
