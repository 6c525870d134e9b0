use crate::adapters::args::common_options::CommonOptionParser;
use crate::adapters::args::recipient_parser::RecipientParser;
use crate::adapters::args::request_flags::RequestFlagParser;
use crate::cli::output::Console;
use crate::core::errors::{CdocError, Result};
use crate::core::models::draft::RequestDraft;
use crate::core::traits::arg_parser::{ArgParser, Step};

/// Walks the encrypt arguments once, left to right, through an ordered
/// chain of [`ArgParser`]s.
///
/// Each position goes to the first parser that matches it and the walk
/// advances by exactly the number of slots that parser consumed.
pub struct RequestBuilder {
    parsers: Vec<Box<dyn ArgParser>>,
    console: Console,
}

impl RequestBuilder {
    /// Default chain: common options, then `--rcpt`, then the
    /// encrypt flags and positional files.
    pub fn new(console: Console) -> Self {
        let parsers: Vec<Box<dyn ArgParser>> = vec![
            Box::new(CommonOptionParser::new(console)),
            Box::new(RecipientParser::new(console)),
            Box::new(RequestFlagParser::new(console)),
        ];
        Self::with_parsers(console, parsers)
    }

    pub fn with_parsers(console: Console, parsers: Vec<Box<dyn ArgParser>>) -> Self {
        Self { parsers, console }
    }

    /// Parse every argument into a fresh draft.
    pub fn build(&self, args: &[String]) -> Result<RequestDraft> {
        let mut draft = RequestDraft::new();
        let mut idx = 0;

        'walk: while idx < args.len() {
            for parser in &self.parsers {
                if let Step::Consumed(n) = parser.parse(args, idx, &mut draft)? {
                    debug_assert!(n > 0, "parser {} consumed nothing", parser.name());
                    // Only the flag: values may carry passwords or PINs.
                    self.console
                        .trace(&format!("{}: {}", parser.name(), args[idx]));
                    idx += n.max(1);
                    continue 'walk;
                }
            }

            self.console
                .error(&format!("Unknown argument: {}", args[idx]));
            return Err(CdocError::UnknownArgument {
                arg: args[idx].clone(),
            });
        }

        Ok(draft)
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::core::models::request::ContainerVersion;

    fn strings(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn end_to_end_single_recipient() {
        let dir = tempfile::tempdir().unwrap();
        let cert = dir.path().join("bob.cer");
        std::fs::write(&cert, b"\x30\x82\x01\x00").unwrap();
        let rcpt = format!("bob:cert:{}", cert.display());

        let args = strings(&[
            "--rcpt",
            &rcpt,
            "--out",
            "out.cdoc",
            "--in",
            "file1.txt",
            "--in",
            "file2.txt",
        ]);
        let draft = RequestBuilder::new(Console::silent()).build(&args).unwrap();

        assert_eq!(draft.recipients.len(), 1);
        assert_eq!(draft.recipients[0].label, "bob");
        assert_eq!(
            draft.request.input_files,
            vec![PathBuf::from("file1.txt"), PathBuf::from("file2.txt")]
        );
        assert_eq!(draft.request.output_path, Some(PathBuf::from("out.cdoc")));
        assert_eq!(draft.request.container_version, ContainerVersion::V1);
        assert!(draft.request.generate_label);
    }

    #[test]
    fn mixed_options_in_any_order() {
        let args = strings(&[
            "a.txt",
            "--server",
            "ks",
            "https://ks",
            "--rcpt",
            "k:key:0011",
            "-v2",
            "--library",
            "p11.so",
            "b.txt",
        ]);
        let draft = RequestBuilder::new(Console::silent()).build(&args).unwrap();

        assert_eq!(draft.request.input_files.len(), 2);
        assert_eq!(draft.request.servers.len(), 1);
        assert_eq!(draft.request.library, Some(PathBuf::from("p11.so")));
        assert_eq!(draft.request.container_version, ContainerVersion::V2);
        assert_eq!(draft.recipients.len(), 1);
    }

    #[test]
    fn unknown_flag_stops_the_walk() {
        let args = strings(&["--in", "a.txt", "--bogus", "--rcpt", "/nope.cer"]);
        let err = RequestBuilder::new(Console::silent())
            .build(&args)
            .unwrap_err();
        assert!(matches!(err, CdocError::UnknownArgument { ref arg } if arg == "--bogus"));
    }

    #[test]
    fn rcpt_without_value_is_unknown_argument() {
        let args = strings(&["--in", "a.txt", "--rcpt"]);
        let err = RequestBuilder::new(Console::silent())
            .build(&args)
            .unwrap_err();
        assert!(matches!(err, CdocError::UnknownArgument { ref arg } if arg == "--rcpt"));
    }

    #[test]
    fn empty_chain_rejects_everything() {
        let builder = RequestBuilder::with_parsers(Console::silent(), Vec::new());
        let err = builder.build(&strings(&["a.txt"])).unwrap_err();
        assert!(matches!(err, CdocError::UnknownArgument { .. }));
    }

    #[test]
    fn no_arguments_gives_empty_draft() {
        let draft = RequestBuilder::new(Console::silent()).build(&[]).unwrap();
        assert!(draft.recipients.is_empty());
        assert!(draft.request.input_files.is_empty());
    }
}
