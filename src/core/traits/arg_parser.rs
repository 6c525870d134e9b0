use crate::core::errors::Result;
use crate::core::models::draft::RequestDraft;

/// Outcome of offering one argument position to a parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// The parser took this many slots, starting at the offered one.
    Consumed(usize),
    /// Not this parser's token; offer it to the next one.
    NotMatched,
}

/// One link in the argument parsing chain.
///
/// Implementations live in `adapters::args`. The request builder offers
/// every position to each parser in order and advances by whatever the
/// first matching parser reports. `Consumed(0)` is never returned.
pub trait ArgParser {
    /// Human-readable name, used in trace output.
    fn name(&self) -> &str;

    /// Try to parse `args[idx..]` into `draft`.
    fn parse(&self, args: &[String], idx: usize, draft: &mut RequestDraft) -> Result<Step>;
}
