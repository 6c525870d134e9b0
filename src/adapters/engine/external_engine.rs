use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};

use base64::Engine;
use base64::engine::general_purpose::STANDARD as B64;
use serde::Serialize;

use crate::cli::output::Console;
use crate::core::errors::{CdocError, EXIT_ERROR, EXIT_OK, Result};
use crate::core::models::recipient::{Pkcs11Mode, RecipientDescriptor, RecipientKind};
use crate::core::models::request::EncryptionRequest;
use crate::core::services::label_service;
use crate::core::services::validator::ValidatedRequest;
use crate::core::traits::encryptor::ContainerEncryptor;

/// Default engine program, looked up in `PATH`.
pub const DEFAULT_ENGINE: &str = "cdoc-engine";

/// Container engine that runs an external program.
///
/// The validated request is written to the program's stdin as a single
/// JSON document and its exit status becomes the result code. The
/// program is invoked as `<engine> encrypt --job -`.
pub struct ExternalEngine {
    program: PathBuf,
    console: Console,
}

impl ExternalEngine {
    pub fn new(program: PathBuf, console: Console) -> Self {
        Self { program, console }
    }

    /// Build the JSON job document for `job`.
    pub fn job_document(job: ValidatedRequest) -> Result<Vec<u8>> {
        let (request, mut recipients) = job.into_parts();
        if request.generate_label {
            label_service::fill_missing(&mut recipients);
        }
        let doc = EngineJob::new(&request, &recipients);
        serde_json::to_vec_pretty(&doc).map_err(|e| CdocError::EngineFailed {
            reason: format!("Failed to serialize job: {e}"),
        })
    }

    fn run(&self, document: &[u8]) -> Result<i32> {
        let (stdout, stderr) = if self.console.is_verbose() {
            (Stdio::inherit(), Stdio::inherit())
        } else {
            (Stdio::null(), Stdio::null())
        };

        let mut child = Command::new(&self.program)
            .args(["encrypt", "--job", "-"])
            .stdin(Stdio::piped())
            .stdout(stdout)
            .stderr(stderr)
            .spawn()
            .map_err(|e| CdocError::EngineFailed {
                reason: format!("Failed to run {}: {e}", self.program.display()),
            })?;

        if let Some(mut stdin) = child.stdin.take() {
            match stdin.write_all(document) {
                // The engine quit without reading; its exit status says why.
                Err(e) if e.kind() == std::io::ErrorKind::BrokenPipe => {}
                Err(e) => {
                    return Err(CdocError::EngineFailed {
                        reason: format!("Failed to write job to engine stdin: {e}"),
                    });
                }
                Ok(()) => {}
            }
        }

        let status = child.wait().map_err(|e| CdocError::EngineFailed {
            reason: format!("Engine process failed: {e}"),
        })?;

        // Killed by a signal: no code to pass through.
        Ok(status.code().unwrap_or(EXIT_ERROR))
    }
}

impl ContainerEncryptor for ExternalEngine {
    fn name(&self) -> &str {
        "external"
    }

    fn encrypt(&self, job: ValidatedRequest) -> Result<i32> {
        let summary = format!(
            "Encrypting {} file(s) as {} for {} recipient(s)...",
            job.request().input_files.len(),
            job.request().container_version,
            job.recipients().len()
        );
        let document = Self::job_document(job)?;

        self.console
            .debug(&format!("Engine: {}", self.program.display()));
        let sp = self.console.spinner(&summary);
        let code = match self.run(&document) {
            Ok(code) => code,
            Err(e) => {
                if let Some(sp) = sp {
                    sp.finish_and_clear();
                }
                return Err(e);
            }
        };

        if code == EXIT_OK {
            self.console.finish_spinner(sp, "Container written");
        } else {
            if let Some(sp) = sp {
                sp.finish_and_clear();
            }
            self.console
                .error(&format!("Engine exited with code {code}"));
        }
        Ok(code)
    }
}

/// Wire form of a validated request.
#[derive(Debug, Serialize)]
struct EngineJob<'a> {
    version: u8,
    generate_label: bool,
    library: Option<&'a PathBuf>,
    servers: Vec<EngineServer<'a>>,
    accept_certs: Vec<String>,
    input_files: &'a [PathBuf],
    output: Option<&'a PathBuf>,
    recipients: Vec<EngineRecipient<'a>>,
}

#[derive(Debug, Serialize)]
struct EngineServer<'a> {
    id: &'a str,
    url: &'a str,
}

#[derive(Debug, Serialize)]
struct EngineRecipient<'a> {
    label: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    file: Option<&'a str>,
    #[serde(flatten)]
    key: EngineKey<'a>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum EngineKey<'a> {
    Cert {
        cert: String,
    },
    Key {
        key: String,
    },
    Password {
        password: &'a str,
    },
    Pkcs11 {
        public: bool,
        slot: u64,
        pin: Option<&'a str>,
        key_id: Option<String>,
        key_label: Option<&'a str>,
    },
}

impl<'a> EngineJob<'a> {
    fn new(request: &'a EncryptionRequest, recipients: &'a [RecipientDescriptor]) -> Self {
        Self {
            version: request.container_version.number(),
            generate_label: request.generate_label,
            library: request.library(),
            servers: request
                .servers
                .iter()
                .map(|s| EngineServer {
                    id: &s.id,
                    url: &s.url,
                })
                .collect(),
            accept_certs: request.accept_certs.iter().map(|c| B64.encode(c)).collect(),
            input_files: &request.input_files,
            output: request.output_path(),
            recipients: recipients.iter().map(EngineRecipient::new).collect(),
        }
    }
}

impl<'a> EngineRecipient<'a> {
    fn new(rcpt: &'a RecipientDescriptor) -> Self {
        let key = match &rcpt.kind {
            RecipientKind::Certificate { der } => EngineKey::Cert {
                cert: B64.encode(der),
            },
            RecipientKind::SecretKey { key } => EngineKey::Key {
                key: hex::encode(key),
            },
            RecipientKind::Password { password } => EngineKey::Password { password },
            RecipientKind::Pkcs11 {
                mode,
                slot,
                pin,
                key_id,
                key_label,
            } => EngineKey::Pkcs11 {
                public: *mode == Pkcs11Mode::PublicKey,
                slot: *slot,
                pin: pin.as_deref(),
                key_id: key_id.as_ref().map(hex::encode),
                key_label: key_label.as_deref(),
            },
        };
        Self {
            label: &rcpt.label,
            file: rcpt.source_file_name.as_deref(),
            key,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;
    use crate::core::models::draft::RequestDraft;
    use crate::core::models::request::ContainerVersion;

    fn job(generate_label: bool) -> ValidatedRequest {
        let draft = RequestDraft {
            request: EncryptionRequest {
                container_version: ContainerVersion::V2,
                generate_label,
                library: Some(PathBuf::from("p11.so")),
                input_files: vec![PathBuf::from("a.txt")],
                output_path: Some(PathBuf::from("out.cdoc")),
                accept_certs: vec![vec![0x30, 0x82]],
                ..Default::default()
            },
            recipients: vec![
                RecipientDescriptor::certificate("bob", vec![1, 2, 3], Path::new("bob.cer"))
                    .unwrap(),
                RecipientDescriptor::with_kind(
                    "card",
                    RecipientKind::Pkcs11 {
                        mode: Pkcs11Mode::PublicKey,
                        slot: 2,
                        pin: None,
                        key_id: Some(vec![0xab]),
                        key_label: None,
                    },
                ),
            ],
        };
        ValidatedRequest::new(draft).unwrap()
    }

    fn document(job: ValidatedRequest) -> serde_json::Value {
        let bytes = ExternalEngine::job_document(job).unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn document_carries_request_fields() {
        let doc = document(job(true));
        assert_eq!(doc["version"], 2);
        assert_eq!(doc["library"], "p11.so");
        assert_eq!(doc["output"], "out.cdoc");
        assert_eq!(doc["input_files"][0], "a.txt");
        assert_eq!(doc["accept_certs"][0], "MII=");
    }

    #[test]
    fn document_encodes_recipients() {
        let doc = document(job(true));
        let cert = &doc["recipients"][0];
        assert_eq!(cert["type"], "cert");
        assert_eq!(cert["label"], "bob");
        assert_eq!(cert["file"], "bob.cer");
        assert_eq!(cert["cert"], "AQID");

        let token = &doc["recipients"][1];
        assert_eq!(token["type"], "pkcs11");
        assert_eq!(token["public"], true);
        assert_eq!(token["slot"], 2);
        assert_eq!(token["key_id"], "ab");
    }

    #[test]
    fn missing_program_is_engine_failure() {
        let engine = ExternalEngine::new(
            PathBuf::from("/definitely/not/an/engine"),
            Console::silent(),
        );
        let err = engine.encrypt(job(true)).unwrap_err();
        assert!(matches!(err, CdocError::EngineFailed { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn exit_status_is_passed_through() {
        let engine = ExternalEngine::new(PathBuf::from("false"), Console::silent());
        assert_eq!(engine.encrypt(job(true)).unwrap(), 1);
    }
}
