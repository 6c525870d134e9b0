use std::path::PathBuf;

/// Broad category of a fault, used to pick the exit code and to decide
/// whether usage text should follow the error message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultClass {
    /// Missing or malformed arguments.
    Usage,
    /// Syntactically fine but semantically invalid request.
    Configuration,
    /// A file could not be read or decoded.
    Io,
    /// Anything else (empty certificate, engine failure).
    General,
}

/// All domain errors for cdoc-tool.
///
/// Each variant provides enough context to diagnose the issue
/// without needing a debugger.
#[derive(Debug, thiserror::Error)]
pub enum CdocError {
    #[error("No recipients")]
    NoRecipients,

    #[error(
        "Label not provided\n\n  \
         Either give the recipient a label (LABEL:cert:PATH) or pass --genlabel."
    )]
    LabelNotProvided,

    #[error(
        "Not all recipients have a label\n\n  \
         Either label every recipient (LABEL:cert:PATH) or pass --genlabel."
    )]
    NotAllRecipientsLabeled,

    #[error("Unknown argument: {arg}")]
    UnknownArgument { arg: String },

    #[error("Argument is not valid UTF-8: {arg}")]
    NonUtf8Argument { arg: String },

    #[error("Recipient certificate path is empty")]
    EmptyCertificatePath,

    #[error("Invalid recipient '{value}': {detail}")]
    InvalidRecipient { value: String, detail: String },

    #[error("No files specified")]
    NoFiles,

    #[error("No output specified")]
    NoOutput,

    #[error(
        "Cryptographic library is required\n\n  \
         PKCS11 recipients need the provider module: --library /path/to/pkcs11.so"
    )]
    LibraryRequired,

    #[error(
        "CDOC version 1 container can be used for encryption with certificate only.\n\n  \
         Use -v2 for key, password or PKCS11 recipients."
    )]
    VersionMismatch,

    #[error("Accepted certificate #{index} is empty")]
    EmptyAcceptedCertificate { index: usize },

    #[error("Invalid configuration: {detail}")]
    InvalidConfig { detail: String },

    #[error("Cannot read {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Certificate file {path} is empty")]
    EmptyCertificate { path: PathBuf },

    #[error("Malformed certificate bundle {path} at line {line}: {reason}")]
    MalformedBundle {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    #[error(
        "Encryption engine failed: {reason}\n\n  \
         Check that the engine is installed or point CDOC_ENGINE at it."
    )]
    EngineFailed { reason: String },

}

impl CdocError {
    /// Fault class of this error.
    pub fn class(&self) -> FaultClass {
        match self {
            Self::NoRecipients
            | Self::LabelNotProvided
            | Self::NotAllRecipientsLabeled
            | Self::UnknownArgument { .. }
            | Self::NonUtf8Argument { .. }
            | Self::EmptyCertificatePath
            | Self::InvalidRecipient { .. } => FaultClass::Usage,
            Self::NoFiles
            | Self::NoOutput
            | Self::LibraryRequired
            | Self::VersionMismatch
            | Self::EmptyAcceptedCertificate { .. }
            | Self::InvalidConfig { .. } => FaultClass::Configuration,
            Self::FileRead { .. } | Self::MalformedBundle { .. } => FaultClass::Io,
            Self::EmptyCertificate { .. } | Self::EngineFailed { .. } => FaultClass::General,
        }
    }

    /// Process exit code for this error.
    ///
    /// Incomplete requests (no files, no output, missing library) share
    /// code 2 with usage faults so the usage text is shown for them too.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::NoFiles | Self::NoOutput | Self::LibraryRequired => EXIT_USAGE,
            _ if self.class() == FaultClass::Usage => EXIT_USAGE,
            _ => EXIT_ERROR,
        }
    }
}

pub const EXIT_OK: i32 = 0;
pub const EXIT_ERROR: i32 = 1;
pub const EXIT_USAGE: i32 = 2;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, CdocError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn usage_faults_exit_with_two() {
        assert_eq!(CdocError::NoRecipients.exit_code(), 2);
        assert_eq!(
            CdocError::UnknownArgument { arg: "-x".into() }.exit_code(),
            2
        );
        assert_eq!(
            CdocError::NonUtf8Argument { arg: "a\u{fffd}".into() }.exit_code(),
            2
        );
    }

    #[test]
    fn incomplete_request_is_configuration_but_shows_usage() {
        assert_eq!(CdocError::NoFiles.class(), FaultClass::Configuration);
        assert_eq!(CdocError::NoFiles.exit_code(), 2);
        assert_eq!(CdocError::LibraryRequired.exit_code(), 2);
    }

    #[test]
    fn version_mismatch_and_io_exit_with_one() {
        assert_eq!(CdocError::VersionMismatch.exit_code(), 1);
        let err = CdocError::MalformedBundle {
            path: "bundle.txt".into(),
            line: 3,
            reason: "bad".into(),
        };
        assert_eq!(err.class(), FaultClass::Io);
        assert_eq!(err.exit_code(), 1);
        assert!(err.to_string().contains("line 3"));
    }
}
