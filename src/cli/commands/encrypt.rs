use std::path::Path;

use crate::adapters::engine::external_engine::ExternalEngine;
use crate::cli::output::Console;
use crate::core::errors::Result;
use crate::core::services::request_builder::RequestBuilder;
use crate::core::services::validator::ValidatedRequest;
use crate::core::traits::encryptor::ContainerEncryptor;

/// Execute the `cdoc-tool encrypt` command.
///
/// Returns the process exit code: the engine's result on dispatch,
/// otherwise the fault's exit code.
pub fn execute(args: &[String], engine: &Path, console: Console) -> i32 {
    console.info("Encrypting");

    let encryptor = ExternalEngine::new(engine.to_path_buf(), console);
    match run(args, &encryptor, console) {
        Ok(code) => code,
        Err(e) => {
            console.error(&format!("Error: {e}"));
            e.exit_code()
        }
    }
}

/// Parse, validate and dispatch to `encryptor`.
///
/// Nothing reaches the encryptor unless the whole argument list parsed
/// and the request validated.
pub fn run<E: ContainerEncryptor>(args: &[String], encryptor: &E, console: Console) -> Result<i32> {
    let draft = RequestBuilder::new(console).build(args)?;
    let job = ValidatedRequest::new(draft)?;

    let request = job.request();
    console.debug(&format!(
        "{} recipient(s), {} file(s), {} accepted certificate(s), {} server(s)",
        job.recipients().len(),
        request.input_files.len(),
        request.accept_certs.len(),
        request.servers.len()
    ));
    if let Some(out) = request.output_path() {
        console.debug(&format!("Output: {}", out.display()));
    }

    console.trace(&format!("Dispatching to {} engine", encryptor.name()));
    encryptor.encrypt(job)
}
