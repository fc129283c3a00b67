//! Byte-signature diagnosis of image files.
//!
//! Classification depends only on four signals:
//!
//! - whether a known signature occurs in the scanned window
//! - the byte offset of that occurrence
//! - whether the signature's extension agrees with the declared one
//! - the format's trailer check (JPEG only)
//!
//! The result is a pure function of the bytes and the declared extension.

use tracing::debug;

use crate::config::DiagnoseConfig;
use crate::health::model::{HealthReport, HealthStatus};
use crate::health::signatures::{DECODED, JPEG_EOI, SignatureEntry, normalize_extension};

/// `detected_format` when no signature is found.
pub const UNKNOWN_FORMAT: &str = "Unknown/Garbage";

/// Diagnose `bytes` declared as `declared_extension` with default settings.
pub fn diagnose(bytes: &[u8], declared_extension: &str) -> HealthReport {
    diagnose_with(bytes, declared_extension, &DiagnoseConfig::default())
}

pub fn diagnose_with(
    bytes: &[u8],
    declared_extension: &str,
    config: &DiagnoseConfig,
) -> HealthReport {
    let declared = normalize_extension(declared_extension);
    let window = &bytes[..bytes.len().min(config.scan_window_bytes)];

    let Some((sig, offset)) = find_signature(window) else {
        debug!(declared = %declared, "no known signature in scan window");
        return HealthReport {
            status: HealthStatus::Corrupt,
            detected_format: UNKNOWN_FORMAT.to_string(),
            original_format: declared,
            detected_mime: None,
            offset: None,
            fixable: false,
            suggested_action: "Header is unrecognizable; the file cannot be repaired automatically."
                .to_string(),
            repaired_bytes: None,
        };
    };

    let mut report = HealthReport {
        status: HealthStatus::Healthy,
        detected_format: sig.extension.to_string(),
        original_format: declared,
        detected_mime: Some(sig.mime_type.to_string()),
        offset: Some(offset),
        fixable: false,
        suggested_action: "No action needed.".to_string(),
        repaired_bytes: None,
    };

    if offset > 0 {
        report.status = HealthStatus::Corrupt;
        report.fixable = true;
        report.suggested_action = format!(
            "Found {offset} garbage bytes before the {} header. Recovery possible by stripping them.",
            sig.extension.to_uppercase()
        );
        report.repaired_bytes = Some(bytes[offset..].to_vec());
    } else if sig.extension != report.original_format {
        report.status = HealthStatus::Mislabeled;
        report.fixable = true;
        report.suggested_action = format!(
            "File is labeled .{} but contains {} data. Rename it to .{}.",
            report.original_format,
            sig.extension.to_uppercase(),
            sig.extension
        );
        report.repaired_bytes = Some(bytes.to_vec());
    } else if !trailer_intact(&sig, bytes) {
        report.status = HealthStatus::Corrupt;
        report.suggested_action =
            "File appears truncated: the end-of-image marker is missing.".to_string();
    }

    report
}

/// First table signature occurring in `window`, with its byte offset.
///
/// Matching over bytes keeps every candidate aligned on a byte boundary.
fn find_signature(window: &[u8]) -> Option<(SignatureEntry, usize)> {
    DECODED.iter().find_map(|(sig, magic)| {
        window
            .windows(magic.len())
            .position(|w| w == magic.as_slice())
            .map(|offset| (*sig, offset))
    })
}

fn trailer_intact(sig: &SignatureEntry, bytes: &[u8]) -> bool {
    match sig.extension {
        "jpg" => bytes.ends_with(&JPEG_EOI),
        _ => true,
    }
}

/// Output file name for the repaired content of `original`, if the report
/// carries a repair.
pub fn repaired_file_name(original: &str, report: &HealthReport) -> Option<String> {
    report.repaired_bytes.as_ref()?;

    let stem = match original.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => original,
    };

    Some(match report.status {
        HealthStatus::Mislabeled => format!("{stem}.{}", report.detected_format),
        _ => format!("{stem}_repaired.{}", report.detected_format),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jpeg(trailer: bool) -> Vec<u8> {
        let mut bytes = vec![0xff, 0xd8, 0xff, 0xe0, 0x00, 0x10, b'J', b'F', b'I', b'F'];
        bytes.extend_from_slice(&[0x11; 32]);
        if trailer {
            bytes.extend_from_slice(&JPEG_EOI);
        }
        bytes
    }

    fn png() -> Vec<u8> {
        let mut bytes = vec![0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];
        bytes.extend_from_slice(&[0x22; 24]);
        bytes
    }

    #[test]
    fn intact_jpeg_is_healthy() {
        let r = diagnose(&jpeg(true), "jpg");
        assert_eq!(r.status, HealthStatus::Healthy);
        assert!(!r.fixable);
        assert_eq!(r.offset, Some(0));
        assert_eq!(r.detected_mime.as_deref(), Some("image/jpeg"));
        assert!(r.repaired_bytes.is_none());
    }

    #[test]
    fn jpeg_without_eoi_is_truncated() {
        let r = diagnose(&jpeg(false), "jpg");
        assert_eq!(r.status, HealthStatus::Corrupt);
        assert!(!r.fixable);
        assert!(r.suggested_action.contains("truncated"));
    }

    #[test]
    fn jpeg_alias_extension_is_accepted() {
        let r = diagnose(&jpeg(true), ".JPEG");
        assert_eq!(r.status, HealthStatus::Healthy);
        assert_eq!(r.original_format, "jpg");
    }

    #[test]
    fn png_declared_as_jpg_is_mislabeled() {
        let bytes = png();
        let r = diagnose(&bytes, "jpg");
        assert_eq!(r.status, HealthStatus::Mislabeled);
        assert!(r.fixable);
        assert_eq!(r.detected_format, "png");
        assert_eq!(r.repaired_bytes.as_deref(), Some(bytes.as_slice()));
        assert!(r.suggested_action.contains(".jpg"));
        assert!(r.suggested_action.contains(".png"));
    }

    #[test]
    fn garbage_prefix_is_stripped() {
        let payload = png();
        let mut bytes = vec![0x00; 20];
        bytes.extend_from_slice(&payload);

        let r = diagnose(&bytes, "png");
        assert_eq!(r.status, HealthStatus::Corrupt);
        assert!(r.fixable);
        assert_eq!(r.offset, Some(20));
        assert_eq!(r.repaired_bytes.as_deref(), Some(&bytes[20..]));
        assert!(r.suggested_action.contains("20 garbage bytes"));
    }

    #[test]
    fn unknown_content_is_unfixable() {
        let r = diagnose(b"just some plain text, nothing to see", "jpg");
        assert_eq!(r.status, HealthStatus::Corrupt);
        assert!(!r.fixable);
        assert_eq!(r.detected_format, UNKNOWN_FORMAT);
        assert!(r.offset.is_none());
    }

    #[test]
    fn empty_file_is_unknown() {
        let r = diagnose(&[], "png");
        assert_eq!(r.detected_format, UNKNOWN_FORMAT);
        assert!(!r.fixable);
    }

    #[test]
    fn signature_beyond_window_is_not_found() {
        let mut bytes = vec![0x00; 64];
        bytes.extend_from_slice(&png());

        let config = DiagnoseConfig {
            scan_window_bytes: 32,
        };
        let r = diagnose_with(&bytes, "png", &config);
        assert_eq!(r.detected_format, UNKNOWN_FORMAT);
    }

    #[test]
    fn only_byte_aligned_matches_count() {
        // Nibbles "4" "24d" spell "424d" in hex only across a byte boundary.
        let bytes = [0x04, 0x24, 0xd0, 0x00];
        let r = diagnose(&bytes, "bmp");
        assert_eq!(r.detected_format, UNKNOWN_FORMAT);
    }

    #[test]
    fn table_order_decides_between_candidates() {
        // Both a PNG and a BMP prefix appear; PNG is listed first.
        let mut bytes = b"BM".to_vec();
        bytes.extend_from_slice(&png());
        let r = diagnose(&bytes, "bmp");
        assert_eq!(r.detected_format, "png");
        assert_eq!(r.offset, Some(2));
    }

    #[test]
    fn repaired_names_follow_status() {
        let r = diagnose(&png(), "jpg");
        assert_eq!(
            repaired_file_name("scan_01.jpg", &r).as_deref(),
            Some("scan_01.png")
        );

        let mut bytes = vec![0xaa; 3];
        bytes.extend_from_slice(&png());
        let r = diagnose(&bytes, "png");
        assert_eq!(
            repaired_file_name("scan_02.png", &r).as_deref(),
            Some("scan_02_repaired.png")
        );

        let r = diagnose(&jpeg(true), "jpg");
        assert!(repaired_file_name("ok.jpg", &r).is_none());
    }
}
