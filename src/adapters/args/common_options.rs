use std::path::{Path, PathBuf};

use crate::adapters::certs::bundle_loader;
use crate::cli::output::Console;
use crate::config::tool_config;
use crate::core::errors::Result;
use crate::core::models::draft::RequestDraft;
use crate::core::models::request::ServerData;
use crate::core::traits::arg_parser::{ArgParser, Step};

/// Options shared by every command: `--library`, `--server`, `--accept`
/// and `--conf`.
///
/// A flag without all of its values is not matched, so the request-flag
/// parser later rejects it as an unknown argument.
pub struct CommonOptionParser {
    console: Console,
}

impl CommonOptionParser {
    pub fn new(console: Console) -> Self {
        Self { console }
    }
}

impl ArgParser for CommonOptionParser {
    fn name(&self) -> &str {
        "common"
    }

    fn parse(&self, args: &[String], idx: usize, draft: &mut RequestDraft) -> Result<Step> {
        let has = |n: usize| idx + n < args.len();

        match args[idx].as_str() {
            "--library" if has(1) => {
                draft.request.library = Some(PathBuf::from(&args[idx + 1]));
                self.console
                    .debug(&format!("Cryptographic library: {}", args[idx + 1]));
                Ok(Step::Consumed(2))
            }
            "--server" if has(2) => {
                let server = ServerData {
                    id: args[idx + 1].clone(),
                    url: args[idx + 2].clone(),
                };
                self.console
                    .debug(&format!("Key server {}: {}", server.id, server.url));
                draft.request.servers.push(server);
                Ok(Step::Consumed(3))
            }
            "--accept" if has(1) => {
                let path = Path::new(&args[idx + 1]);
                let certs = bundle_loader::load_certificates(path)?;
                if certs.is_empty() {
                    self.console
                        .warning(&format!("No certificates found in {}", path.display()));
                }
                self.console.debug(&format!(
                    "Accepting {} certificate(s) from {}",
                    certs.len(),
                    path.display()
                ));
                draft.request.accept_certs.extend(certs);
                Ok(Step::Consumed(2))
            }
            "--conf" if has(1) => {
                let path = Path::new(&args[idx + 1]);
                tool_config::apply_file(path, &mut draft.request)?;
                self.console
                    .debug(&format!("Applied configuration {}", path.display()));
                Ok(Step::Consumed(2))
            }
            _ => Ok(Step::NotMatched),
        }
    }
}
