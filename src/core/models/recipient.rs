use std::fmt;
use std::path::{Path, PathBuf};

use crate::core::errors::{CdocError, Result};

/// Which half of a PKCS11 key pair a token recipient refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pkcs11Mode {
    SecretKey,
    PublicKey,
}

/// Key material addressing one recipient.
#[derive(Clone, PartialEq, Eq)]
pub enum RecipientKind {
    /// X.509 certificate, DER or whatever the file held.
    Certificate { der: Vec<u8> },
    /// Raw symmetric key.
    SecretKey { key: Vec<u8> },
    /// Password-derived key.
    Password { password: String },
    /// Key held on a hardware token.
    Pkcs11 {
        mode: Pkcs11Mode,
        slot: u64,
        pin: Option<String>,
        key_id: Option<Vec<u8>>,
        key_label: Option<String>,
    },
}

impl RecipientKind {
    /// Short name used in logs and synthesized labels.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Certificate { .. } => "cert",
            Self::SecretKey { .. } => "secret",
            Self::Password { .. } => "pw",
            Self::Pkcs11 {
                mode: Pkcs11Mode::SecretKey,
                ..
            } => "p11sk",
            Self::Pkcs11 {
                mode: Pkcs11Mode::PublicKey,
                ..
            } => "p11pk",
        }
    }

    pub fn is_certificate(&self) -> bool {
        matches!(self, Self::Certificate { .. })
    }

    /// Token recipients need the cryptographic provider module.
    pub fn needs_library(&self) -> bool {
        matches!(self, Self::Pkcs11 { .. })
    }
}

// Secrets stay out of Debug output.
impl fmt::Debug for RecipientKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Certificate { der } => f
                .debug_struct("Certificate")
                .field("len", &der.len())
                .finish(),
            Self::SecretKey { key } => f
                .debug_struct("SecretKey")
                .field("len", &key.len())
                .finish_non_exhaustive(),
            Self::Password { .. } => f.debug_struct("Password").finish_non_exhaustive(),
            Self::Pkcs11 {
                mode,
                slot,
                key_id,
                key_label,
                ..
            } => f
                .debug_struct("Pkcs11")
                .field("mode", mode)
                .field("slot", slot)
                .field("key_id", &key_id.as_ref().map(hex::encode))
                .field("key_label", key_label)
                .finish_non_exhaustive(),
        }
    }
}

/// One intended decryption party.
///
/// An empty `label` means "no label"; whether one gets synthesized is
/// decided later by the request's `generate_label` flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipientDescriptor {
    pub label: String,
    pub kind: RecipientKind,
    /// Final path component of the certificate file, if any.
    pub source_file_name: Option<String>,
}

impl RecipientDescriptor {
    /// Build a certificate recipient read from `path`.
    ///
    /// Fails when the certificate bytes are empty.
    pub fn certificate(label: impl Into<String>, der: Vec<u8>, path: &Path) -> Result<Self> {
        if der.is_empty() {
            return Err(CdocError::EmptyCertificate {
                path: PathBuf::from(path),
            });
        }
        Ok(Self {
            label: label.into(),
            kind: RecipientKind::Certificate { der },
            source_file_name: path.file_name().map(|n| n.to_string_lossy().into_owned()),
        })
    }

    /// Build a non-certificate recipient.
    pub fn with_kind(label: impl Into<String>, kind: RecipientKind) -> Self {
        Self {
            label: label.into(),
            kind,
            source_file_name: None,
        }
    }

    /// Certificate bytes, for certificate recipients.
    pub fn certificate_bytes(&self) -> Option<&[u8]> {
        match &self.kind {
            RecipientKind::Certificate { der } => Some(der),
            _ => None,
        }
    }

    pub fn has_label(&self) -> bool {
        !self.label.is_empty()
    }
}

impl fmt::Display for RecipientDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = if self.label.is_empty() {
            "<no label>"
        } else {
            &self.label
        };
        match &self.source_file_name {
            Some(file) => write!(f, "{label} ({}, {file})", self.kind.name()),
            None => write!(f, "{label} ({})", self.kind.name()),
        }
    }
}
