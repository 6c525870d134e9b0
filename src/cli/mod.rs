pub mod commands;
pub mod output;

use std::ffi::OsString;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::adapters::engine::external_engine::DEFAULT_ENGINE;
use crate::core::errors::{CdocError, Result};

/// Encrypt files into a CDOC container for one or more recipients.
#[derive(Parser, Debug)]
#[command(
    name = "cdoc-tool",
    version,
    about,
    long_about = None,
    disable_help_subcommand = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Container engine program
    #[arg(long, env = "CDOC_ENGINE", default_value = DEFAULT_ENGINE, hide = true)]
    pub engine: PathBuf,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Encrypt files for one or more recipients
    #[command(disable_help_flag = true)]
    Encrypt {
        /// Recipients, options and input files, parsed in order
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
}

/// Usage text printed after usage faults.
pub fn usage() -> String {
    format!(
        "cdoc-tool version: {version}\n\
         cdoc-tool [encrypt] --rcpt RECIPIENT [--rcpt...] --out OUTPUTFILE [--in] FILE [FILE...]\n  \
         Encrypt files for one or more recipients\n\n  \
         RECIPIENT is one of:\n    \
         CERT_PATH | LABEL:cert:CERT_PATH\n    \
         LABEL:key:SECRET_KEY_HEX\n    \
         LABEL:pw:PASSWORD\n    \
         LABEL:p11sk:SLOT:[PIN]:[ID]:[KEYLABEL]\n    \
         LABEL:p11pk:SLOT:[PIN]:[ID]:[KEYLABEL]\n\n  \
         Options:\n    \
         --library PATH    cryptographic library (needed for PKCS11 recipients)\n    \
         --server ID URL   key server\n    \
         --accept CERTFILE accepted issuer certificate(s)\n    \
         --conf CONFFILE   TOML configuration file\n    \
         -v1 | -v2         container version (default 1)\n    \
         --genlabel        generate labels for unlabelled recipients (default)\n    \
         --verbose         print diagnostics",
        version = env!("CARGO_PKG_VERSION")
    )
}

/// Whether `--verbose` appears anywhere after the program name.
pub fn wants_verbose(raw: &[OsString]) -> bool {
    raw.iter().skip(1).any(|a| a == "--verbose")
}

/// Strip every `--verbose` and insert the `encrypt` command when omitted.
///
/// Top-level options (`--engine`) may precede the command; `--help` and
/// `--version` are left for clap. Arguments must be valid UTF-8.
pub fn prepare_args(raw: Vec<OsString>) -> Result<Vec<String>> {
    let mut raw = raw.into_iter();
    let mut argv: Vec<String> = raw
        .next()
        .map(|prog| prog.to_string_lossy().into_owned())
        .into_iter()
        .collect();

    let rest = raw
        .filter(|a| a != "--verbose")
        .map(|a| {
            a.into_string().map_err(|a| CdocError::NonUtf8Argument {
                arg: a.to_string_lossy().into_owned(),
            })
        })
        .collect::<Result<Vec<String>>>()?;

    let mut pos = 0;
    while pos < rest.len() {
        if rest[pos] == "--engine" && pos + 1 < rest.len() {
            pos += 2;
        } else if rest[pos].starts_with("--engine=") {
            pos += 1;
        } else {
            break;
        }
    }

    let has_command = matches!(
        rest.get(pos).map(String::as_str),
        Some("encrypt" | "-h" | "--help" | "-V" | "--version")
    );

    argv.extend_from_slice(&rest[..pos]);
    if !has_command {
        argv.push("encrypt".to_string());
    }
    argv.extend_from_slice(&rest[pos..]);

    Ok(argv)
}
