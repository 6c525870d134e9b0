use sha2::{Digest, Sha256};

use crate::core::models::recipient::{RecipientDescriptor, RecipientKind};

/// Machine-readable label format version.
const LABEL_VERSION: u32 = 1;

/// Build a label for a recipient that has none.
///
/// Format: `data:v=1&type=<kind>[&key=value...]`. Values are
/// percent-encoded so `&` and `=` inside file names stay unambiguous.
pub fn synthesize(rcpt: &RecipientDescriptor) -> String {
    let mut label = format!("data:v={LABEL_VERSION}&type={}", rcpt.kind.name());

    match &rcpt.kind {
        RecipientKind::Certificate { der } => {
            if let Some(file) = &rcpt.source_file_name {
                label.push_str("&file=");
                label.push_str(&percent_encode(file));
            }
            let digest = hex::encode(Sha256::digest(der));
            label.push_str("&fp=");
            label.push_str(&digest[..16]);
        }
        RecipientKind::SecretKey { key } => {
            label.push_str(&format!("&len={}", key.len()));
        }
        RecipientKind::Password { .. } => {}
        RecipientKind::Pkcs11 { slot, .. } => {
            label.push_str(&format!("&slot={slot}"));
        }
    }

    label
}

/// Fill every empty label in place.
pub fn fill_missing(recipients: &mut [RecipientDescriptor]) {
    for rcpt in recipients.iter_mut().filter(|r| !r.has_label()) {
        rcpt.label = synthesize(rcpt);
    }
}

fn percent_encode(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for b in value.bytes() {
        if b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.' | b'~') {
            out.push(b as char);
        } else {
            out.push_str(&format!("%{b:02X}"));
        }
    }
    out
}
