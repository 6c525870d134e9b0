use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

/// Log severity, lowest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

/// Console output settings, built once in `main` and passed by reference
/// to everything that prints.
///
/// When `enabled` is false nothing reaches stdout or stderr, whatever
/// the severity.
#[derive(Debug, Clone, Copy)]
pub struct Console {
    enabled: bool,
    min_level: Level,
}

impl Console {
    /// Console for `--verbose` (everything from trace up) or silence.
    pub fn new(verbose: bool) -> Self {
        Self {
            enabled: verbose,
            min_level: Level::Trace,
        }
    }

    /// A console that prints nothing.
    pub fn silent() -> Self {
        Self::new(false)
    }

    pub fn is_verbose(&self) -> bool {
        self.enabled
    }

    pub fn enabled(&self, level: Level) -> bool {
        self.enabled && level >= self.min_level
    }

    pub fn trace(&self, msg: &str) {
        if self.enabled(Level::Trace) {
            eprintln!("  {} {}", "·".dimmed(), msg.dimmed());
        }
    }

    pub fn debug(&self, msg: &str) {
        if self.enabled(Level::Debug) {
            eprintln!("  {} {}", "›".cyan(), msg);
        }
    }

    pub fn info(&self, msg: &str) {
        if self.enabled(Level::Info) {
            println!("  {msg}");
        }
    }

    /// Print a success message.
    pub fn success(&self, msg: &str) {
        if self.enabled(Level::Info) {
            println!("  {} {}", "✓".green(), msg);
        }
    }

    /// Print a warning message.
    pub fn warning(&self, msg: &str) {
        if self.enabled(Level::Warn) {
            println!("  {} {}", "⚠".yellow(), msg);
        }
    }

    /// Print an error message.
    pub fn error(&self, msg: &str) {
        if self.enabled(Level::Error) {
            eprintln!("  {} {}", "✗".red(), msg);
        }
    }

    /// Print usage text to stdout.
    pub fn usage(&self, text: &str) {
        if self.enabled {
            println!("{text}");
        }
    }

    /// Start a spinner, or nothing when output is off.
    pub fn spinner(&self, msg: &str) -> Option<ProgressBar> {
        if !self.enabled(Level::Info) {
            return None;
        }
        let sp = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("  {spinner:.cyan} {msg}") {
            sp.set_style(style);
        }
        sp.set_message(msg.to_string());
        sp.enable_steady_tick(std::time::Duration::from_millis(80));
        Some(sp)
    }

    /// Stop a spinner started by [`Console::spinner`] and print `msg`.
    pub fn finish_spinner(&self, sp: Option<ProgressBar>, msg: &str) {
        if let Some(sp) = sp {
            sp.finish_and_clear();
        }
        self.success(msg);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn silent_console_disables_every_level() {
        let console = Console::silent();
        assert!(!console.enabled(Level::Error));
        assert!(console.spinner("x").is_none());
    }

    #[test]
    fn threshold_filters_lower_levels() {
        let console = Console {
            enabled: true,
            min_level: Level::Warn,
        };
        assert!(!console.enabled(Level::Debug));
        assert!(console.enabled(Level::Warn));
        assert!(console.enabled(Level::Error));
    }
}
