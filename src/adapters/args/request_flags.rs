use std::path::PathBuf;

use crate::cli::output::Console;
use crate::core::errors::{CdocError, Result};
use crate::core::models::draft::RequestDraft;
use crate::core::models::request::ContainerVersion;
use crate::core::traits::arg_parser::{ArgParser, Step};

/// Last link of the chain: encrypt-specific flags and positional files.
///
/// Always matches. Unknown `-` tokens are rejected here; any other bare
/// token is an input file.
pub struct RequestFlagParser {
    console: Console,
}

impl RequestFlagParser {
    pub fn new(console: Console) -> Self {
        Self { console }
    }
}

impl ArgParser for RequestFlagParser {
    fn name(&self) -> &str {
        "request"
    }

    fn parse(&self, args: &[String], idx: usize, draft: &mut RequestDraft) -> Result<Step> {
        let arg = args[idx].as_str();
        let has_value = idx + 1 < args.len();
        let request = &mut draft.request;

        match arg {
            "--out" if has_value => {
                request.output_path = Some(PathBuf::from(&args[idx + 1]));
                Ok(Step::Consumed(2))
            }
            "--in" if has_value => {
                request.input_files.push(PathBuf::from(&args[idx + 1]));
                Ok(Step::Consumed(2))
            }
            "-v1" => {
                request.container_version = ContainerVersion::V1;
                Ok(Step::Consumed(1))
            }
            "-v2" => {
                request.container_version = ContainerVersion::V2;
                Ok(Step::Consumed(1))
            }
            "--genlabel" => {
                request.generate_label = true;
                Ok(Step::Consumed(1))
            }
            _ if arg.starts_with('-') => {
                self.console.error(&format!("Unknown argument: {arg}"));
                Err(CdocError::UnknownArgument {
                    arg: arg.to_string(),
                })
            }
            _ => {
                request.input_files.push(PathBuf::from(arg));
                Ok(Step::Consumed(1))
            }
        }
    }
}
