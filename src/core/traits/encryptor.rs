use crate::core::errors::Result;
use crate::core::services::validator::ValidatedRequest;

/// Port for the engine that writes the encrypted container.
///
/// The core layer only hands over a request that went through the
/// validator; key wrapping and container serialization happen behind
/// this trait (see `adapters::engine`).
pub trait ContainerEncryptor {
    /// Human-readable name of this engine.
    fn name(&self) -> &str;

    /// Encrypt the request's input files into its output container.
    ///
    /// Returns the engine's result code, used as the process exit code.
    fn encrypt(&self, job: ValidatedRequest) -> Result<i32>;
}
