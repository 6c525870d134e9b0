use crate::core::models::recipient::RecipientDescriptor;
use crate::core::models::request::EncryptionRequest;

/// Accumulator filled by the argument parsers during the single pass
/// over the command line.
#[derive(Debug, Default)]
pub struct RequestDraft {
    pub request: EncryptionRequest,
    pub recipients: Vec<RecipientDescriptor>,
}

impl RequestDraft {
    pub fn new() -> Self {
        Self::default()
    }
}
