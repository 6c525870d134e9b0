use std::path::Path;

use sha2::{Digest, Sha256};

use crate::cli::output::Console;
use crate::core::errors::{CdocError, Result};
use crate::core::models::draft::RequestDraft;
use crate::core::models::recipient::{Pkcs11Mode, RecipientDescriptor, RecipientKind};
use crate::core::traits::arg_parser::{ArgParser, Step};

const CERT_MARKER: &str = ":cert:";
const KEY_MARKER: &str = ":key:";
const PASSWORD_MARKER: &str = ":pw:";
const P11_SECRET_MARKER: &str = ":p11sk:";
const P11_PUBLIC_MARKER: &str = ":p11pk:";

/// Parses `--rcpt VALUE` into a [`RecipientDescriptor`].
///
/// Accepted values:
/// ```text
/// /path/recipient.cer
/// LABEL:cert:/path/recipient.cer
/// LABEL:key:SECRET_KEY_HEX
/// LABEL:pw:PASSWORD
/// LABEL:p11sk:SLOT:[PIN]:[ID]:[KEYLABEL]
/// LABEL:p11pk:SLOT:[PIN]:[ID]:[KEYLABEL]
/// ```
pub struct RecipientParser {
    console: Console,
}

impl RecipientParser {
    pub fn new(console: Console) -> Self {
        Self { console }
    }

    /// Turn one `--rcpt` value into a recipient.
    pub fn parse_value(&self, value: &str) -> Result<RecipientDescriptor> {
        if let Some((label, path)) = value.split_once(CERT_MARKER) {
            return self.certificate(label, path);
        }
        match split_extended(value) {
            Some((label, KEY_MARKER, hex_key)) => secret_key(value, label, hex_key),
            Some((label, PASSWORD_MARKER, password)) => {
                if password.is_empty() {
                    return Err(invalid(value, "password is empty"));
                }
                Ok(RecipientDescriptor::with_kind(
                    label,
                    RecipientKind::Password {
                        password: password.to_string(),
                    },
                ))
            }
            Some((label, P11_SECRET_MARKER, rest)) => {
                pkcs11(value, label, rest, Pkcs11Mode::SecretKey)
            }
            Some((label, _, rest)) => pkcs11(value, label, rest, Pkcs11Mode::PublicKey),
            None => self.certificate("", value),
        }
    }

    fn certificate(&self, label: &str, path: &str) -> Result<RecipientDescriptor> {
        if path.is_empty() {
            return Err(CdocError::EmptyCertificatePath);
        }
        let path = Path::new(path);
        let der = std::fs::read(path).map_err(|source| CdocError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        let rcpt = RecipientDescriptor::certificate(label, der, path)?;

        if let Some(der) = rcpt.certificate_bytes() {
            self.console.debug(&format!(
                "Certificate {} sha256={}",
                path.display(),
                hex::encode(Sha256::digest(der))
            ));
        }
        Ok(rcpt)
    }
}

impl ArgParser for RecipientParser {
    fn name(&self) -> &str {
        "recipient"
    }

    fn parse(&self, args: &[String], idx: usize, draft: &mut RequestDraft) -> Result<Step> {
        if args[idx] != "--rcpt" || idx + 1 >= args.len() {
            return Ok(Step::NotMatched);
        }

        let rcpt = self.parse_value(&args[idx + 1])?;
        self.console.info(&format!("Recipient: {rcpt}"));
        draft.recipients.push(rcpt);
        Ok(Step::Consumed(2))
    }
}

fn secret_key(value: &str, label: &str, hex_key: &str) -> Result<RecipientDescriptor> {
    let key = hex::decode(hex_key).map_err(|e| invalid(value, &format!("bad key hex: {e}")))?;
    if key.is_empty() {
        return Err(invalid(value, "secret key is empty"));
    }
    Ok(RecipientDescriptor::with_kind(
        label,
        RecipientKind::SecretKey { key },
    ))
}

/// `SLOT:[PIN]:[ID]:[KEYLABEL]`; the key label takes the rest of the value.
fn pkcs11(value: &str, label: &str, rest: &str, mode: Pkcs11Mode) -> Result<RecipientDescriptor> {
    let mut fields = rest.splitn(4, ':');

    let slot = fields
        .next()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| invalid(value, "PKCS11 slot is missing"))?
        .parse::<u64>()
        .map_err(|e| invalid(value, &format!("bad PKCS11 slot: {e}")))?;

    let pin = non_empty(fields.next()).map(str::to_string);
    let key_id = non_empty(fields.next())
        .map(hex::decode)
        .transpose()
        .map_err(|e| invalid(value, &format!("bad PKCS11 key id hex: {e}")))?;
    let key_label = non_empty(fields.next()).map(str::to_string);

    Ok(RecipientDescriptor::with_kind(
        label,
        RecipientKind::Pkcs11 {
            mode,
            slot,
            pin,
            key_id,
            key_label,
        },
    ))
}

fn non_empty(field: Option<&str>) -> Option<&str> {
    field.filter(|s| !s.is_empty())
}

fn invalid(value: &str, detail: &str) -> CdocError {
    CdocError::InvalidRecipient {
        value: redact(value),
        detail: detail.to_string(),
    }
}

/// Hide secrets (passwords, PINs, keys) before a value ends up in an error.
fn redact(value: &str) -> String {
    match split_extended(value) {
        Some((label, marker, _)) => format!("{label}{marker}…"),
        None => value.to_string(),
    }
}

/// Split on whichever non-certificate marker occurs first in `value`.
///
/// Returns `(label, marker, rest)`; the rest may itself contain markers.
fn split_extended(value: &str) -> Option<(&str, &'static str, &str)> {
    [KEY_MARKER, PASSWORD_MARKER, P11_SECRET_MARKER, P11_PUBLIC_MARKER]
        .into_iter()
        .filter_map(|marker| value.find(marker).map(|pos| (pos, marker)))
        .min_by_key(|&(pos, _)| pos)
        .map(|(pos, marker)| (&value[..pos], marker, &value[pos + marker.len()..]))
}
