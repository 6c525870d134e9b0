use std::path::Path;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as B64;

use crate::core::errors::{CdocError, Result};

/// First three bytes of a base64-armored DER certificate (`30 82 ..`).
const ARMOR_SIGNATURE: &[u8] = b"MII";

/// Lines this short are blank or noise.
const MIN_LINE_LEN: usize = 3;

/// Read every certificate held by `path`.
///
/// The file is either one raw certificate or a bundle of base64 lines,
/// one certificate per line:
/// ```text
/// MIIDdzCCAl+gAwIBAgIE...
/// MIIFazCCA1OgAwIBAgIR...
/// ```
/// A file starting with `MII` is treated as a bundle; anything else is
/// returned unchanged as a single certificate. An empty file yields one
/// empty certificate, which the validator rejects.
pub fn load_certificates(path: &Path) -> Result<Vec<Vec<u8>>> {
    let content = std::fs::read(path).map_err(|source| CdocError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    parse_bundle(path, content)
}

/// Split already-read file content into certificates.
fn parse_bundle(path: &Path, content: Vec<u8>) -> Result<Vec<Vec<u8>>> {
    if !is_armored_bundle(&content) {
        return Ok(vec![content]);
    }

    let mut certs = Vec::new();
    for (idx, raw) in content.split(|&b| b == b'\n').enumerate() {
        let line = raw.strip_suffix(b"\r").unwrap_or(raw);
        if line.len() <= MIN_LINE_LEN {
            continue;
        }
        let der = B64.decode(line).map_err(|e| CdocError::MalformedBundle {
            path: path.to_path_buf(),
            line: idx + 1,
            reason: e.to_string(),
        })?;
        certs.push(der);
    }
    Ok(certs)
}

fn is_armored_bundle(content: &[u8]) -> bool {
    content.len() > MIN_LINE_LEN && content.starts_with(ARMOR_SIGNATURE)
}
