use crate::core::errors::{CdocError, Result};
use crate::core::models::draft::RequestDraft;
use crate::core::models::recipient::RecipientDescriptor;
use crate::core::models::request::{ContainerVersion, EncryptionRequest};

/// A request that passed [`validate`]; the only thing an encryptor accepts.
#[derive(Debug)]
pub struct ValidatedRequest {
    request: EncryptionRequest,
    recipients: Vec<RecipientDescriptor>,
}

impl ValidatedRequest {
    /// Validate `draft` and seal it.
    pub fn new(draft: RequestDraft) -> Result<Self> {
        validate(&draft.request, &draft.recipients)?;
        Ok(Self {
            request: draft.request,
            recipients: draft.recipients,
        })
    }

    pub fn request(&self) -> &EncryptionRequest {
        &self.request
    }

    pub fn recipients(&self) -> &[RecipientDescriptor] {
        &self.recipients
    }

    pub fn into_parts(self) -> (EncryptionRequest, Vec<RecipientDescriptor>) {
        (self.request, self.recipients)
    }
}

/// Check that the request is complete and consistent.
///
/// Checks run in a fixed order and the first failure wins.
pub fn validate(request: &EncryptionRequest, recipients: &[RecipientDescriptor]) -> Result<()> {
    if recipients.is_empty() {
        return Err(CdocError::NoRecipients);
    }

    if !request.generate_label && recipients.iter().any(|r| !r.has_label()) {
        return Err(if recipients.len() > 1 {
            CdocError::NotAllRecipientsLabeled
        } else {
            CdocError::LabelNotProvided
        });
    }

    if request.input_files.is_empty() {
        return Err(CdocError::NoFiles);
    }
    if request.output_path().is_none() {
        return Err(CdocError::NoOutput);
    }

    let library_required = recipients.iter().any(|r| r.kind.needs_library());
    if library_required && request.library().is_none() {
        return Err(CdocError::LibraryRequired);
    }

    // CDOC1 is supported only for encryption with certificate.
    if request.container_version == ContainerVersion::V1
        && recipients.iter().any(|r| !r.kind.is_certificate())
    {
        return Err(CdocError::VersionMismatch);
    }

    if let Some(index) = request.accept_certs.iter().position(Vec::is_empty) {
        return Err(CdocError::EmptyAcceptedCertificate { index });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};

    use super::*;
    use crate::core::errors::FaultClass;
    use crate::core::models::recipient::{Pkcs11Mode, RecipientKind};

    fn cert(label: &str) -> RecipientDescriptor {
        RecipientDescriptor::certificate(label, vec![0x30, 0x82], Path::new("r.cer")).unwrap()
    }

    fn password(label: &str) -> RecipientDescriptor {
        RecipientDescriptor::with_kind(
            label,
            RecipientKind::Password {
                password: "secret".into(),
            },
        )
    }

    fn token() -> RecipientDescriptor {
        RecipientDescriptor::with_kind(
            "card",
            RecipientKind::Pkcs11 {
                mode: Pkcs11Mode::PublicKey,
                slot: 0,
                pin: None,
                key_id: None,
                key_label: None,
            },
        )
    }

    fn complete_request() -> EncryptionRequest {
        EncryptionRequest {
            input_files: vec![PathBuf::from("a.txt")],
            output_path: Some(PathBuf::from("out.cdoc")),
            ..Default::default()
        }
    }

    #[test]
    fn complete_request_passes() {
        assert!(validate(&complete_request(), &[cert("")]).is_ok());
    }

    #[test]
    fn no_recipients() {
        let err = validate(&complete_request(), &[]).unwrap_err();
        assert!(matches!(err, CdocError::NoRecipients));
        assert_eq!(err.class(), FaultClass::Usage);
    }

    #[test]
    fn missing_label_single_recipient() {
        let req = EncryptionRequest {
            generate_label: false,
            ..complete_request()
        };
        let err = validate(&req, &[cert("")]).unwrap_err();
        assert!(matches!(err, CdocError::LabelNotProvided));
    }

    #[test]
    fn missing_label_among_several_recipients() {
        let req = EncryptionRequest {
            generate_label: false,
            ..complete_request()
        };
        let err = validate(&req, &[cert("alice"), cert("")]).unwrap_err();
        assert!(matches!(err, CdocError::NotAllRecipientsLabeled));
        assert_eq!(err.class(), FaultClass::Usage);
    }

    #[test]
    fn labels_not_needed_when_generated() {
        assert!(validate(&complete_request(), &[cert(""), cert("")]).is_ok());
    }

    #[test]
    fn no_files_regardless_of_labels() {
        let req = EncryptionRequest {
            input_files: Vec::new(),
            ..complete_request()
        };
        let err = validate(&req, &[cert("alice")]).unwrap_err();
        assert!(matches!(err, CdocError::NoFiles));

        let err = validate(&req, &[cert("")]).unwrap_err();
        assert!(matches!(err, CdocError::NoFiles));
    }

    #[test]
    fn no_output() {
        let req = EncryptionRequest {
            output_path: None,
            ..complete_request()
        };
        let err = validate(&req, &[cert("")]).unwrap_err();
        assert!(matches!(err, CdocError::NoOutput));
        assert_eq!(err.class(), FaultClass::Configuration);
    }

    #[test]
    fn token_recipient_requires_library() {
        let req = EncryptionRequest {
            container_version: ContainerVersion::V2,
            ..complete_request()
        };
        let err = validate(&req, &[token()]).unwrap_err();
        assert!(matches!(err, CdocError::LibraryRequired));

        let req = EncryptionRequest {
            library: Some(PathBuf::from("p11.so")),
            ..req
        };
        assert!(validate(&req, &[token()]).is_ok());
    }

    #[test]
    fn v1_rejects_non_certificate_recipient() {
        let err = validate(&complete_request(), &[cert("a"), password("b")]).unwrap_err();
        assert!(matches!(err, CdocError::VersionMismatch));
        assert_eq!(err.class(), FaultClass::Configuration);
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn v2_accepts_non_certificate_recipient() {
        let req = EncryptionRequest {
            container_version: ContainerVersion::V2,
            ..complete_request()
        };
        assert!(validate(&req, &[cert("a"), password("b")]).is_ok());
    }

    #[test]
    fn empty_accepted_certificate() {
        let req = EncryptionRequest {
            accept_certs: vec![vec![0x30], Vec::new()],
            ..complete_request()
        };
        let err = validate(&req, &[cert("")]).unwrap_err();
        assert!(matches!(err, CdocError::EmptyAcceptedCertificate { index: 1 }));
    }

    #[test]
    fn new_seals_valid_draft() {
        let draft = RequestDraft {
            request: complete_request(),
            recipients: vec![cert("bob")],
        };
        let job = ValidatedRequest::new(draft).unwrap();
        assert_eq!(job.recipients().len(), 1);
        let (request, recipients) = job.into_parts();
        assert_eq!(request.input_files.len(), 1);
        assert_eq!(recipients[0].label, "bob");
    }
}
