//! Known file signatures.
//!
//! The table is static configuration: rows are searched in definition
//! order and new formats are supported by adding rows, never by changing
//! the search.

use once_cell::sync::Lazy;
use serde::Serialize;

/// One row of the signature table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignatureEntry {
    /// Hex-encoded byte prefix.
    pub magic_hex: &'static str,
    pub extension: &'static str,
    pub mime_type: &'static str,
}

pub const SIGNATURES: &[SignatureEntry] = &[
    SignatureEntry {
        magic_hex: "ffd8ff",
        extension: "jpg",
        mime_type: "image/jpeg",
    },
    SignatureEntry {
        magic_hex: "89504e47",
        extension: "png",
        mime_type: "image/png",
    },
    SignatureEntry {
        magic_hex: "47494638",
        extension: "gif",
        mime_type: "image/gif",
    },
    SignatureEntry {
        magic_hex: "25504446",
        extension: "pdf",
        mime_type: "application/pdf",
    },
    SignatureEntry {
        magic_hex: "49492a00",
        extension: "tiff",
        mime_type: "image/tiff",
    },
    SignatureEntry {
        magic_hex: "4d4d002a",
        extension: "tiff",
        mime_type: "image/tiff",
    },
    SignatureEntry {
        magic_hex: "424d",
        extension: "bmp",
        mime_type: "image/bmp",
    },
    SignatureEntry {
        magic_hex: "52494646",
        extension: "webp",
        mime_type: "image/webp",
    },
];

/// JPEG end-of-image marker.
pub const JPEG_EOI: [u8; 2] = [0xff, 0xd9];

/// Signature table with the magic prefixes decoded to bytes.
pub(crate) static DECODED: Lazy<Vec<(SignatureEntry, Vec<u8>)>> = Lazy::new(|| {
    SIGNATURES
        .iter()
        .map(|sig| {
            let magic = hex::decode(sig.magic_hex).expect("signature table is valid hex");
            (*sig, magic)
        })
        .collect()
});

/// Canonical form of a declared extension: no leading dot, lowercase,
/// common aliases folded onto the table's spelling.
pub fn normalize_extension(ext: &str) -> String {
    let ext = ext.trim().trim_start_matches('.').to_ascii_lowercase();
    match ext.as_str() {
        "jpeg" | "jpe" => "jpg".to_string(),
        "tif" => "tiff".to_string(),
        _ => ext,
    }
}

/// First table row for `ext`, if the format is known.
pub fn lookup_extension(ext: &str) -> Option<&'static SignatureEntry> {
    let ext = normalize_extension(ext);
    SIGNATURES.iter().find(|sig| sig.extension == ext)
}
