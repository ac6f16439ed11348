//! Line protocol between the watcher process and the host
//!
//! One `clipboard-changed` line per detected change. Anything else on stdout
//! is diagnostic text and never touches the history.

use crate::config::SIGNAL_TOKEN;
use std::io::{self, Write};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind<'a> {
    Signal,
    Blank,
    Diagnostic(&'a str),
}

pub fn parse_line(line: &str) -> LineKind<'_> {
    match line.trim() {
        "" => LineKind::Blank,
        SIGNAL_TOKEN => LineKind::Signal,
        other => LineKind::Diagnostic(other),
    }
}

/// Write one signal line and flush so the host sees it immediately
pub fn write_signal<W: Write>(out: &mut W) -> io::Result<()> {
    writeln!(out, "{}", SIGNAL_TOKEN)?;
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_signal_with_whitespace() {
        assert_eq!(parse_line("clipboard-changed"), LineKind::Signal);
        assert_eq!(parse_line("  clipboard-changed\r"), LineKind::Signal);
    }

    #[test]
    fn test_parse_other_lines() {
        assert_eq!(parse_line(""), LineKind::Blank);
        assert_eq!(parse_line("   "), LineKind::Blank);
        assert_eq!(
            parse_line("clipboard-changed twice"),
            LineKind::Diagnostic("clipboard-changed twice")
        );
        assert_eq!(parse_line("CLIPBOARD-CHANGED"), LineKind::Diagnostic("CLIPBOARD-CHANGED"));
    }

    #[test]
    fn test_write_signal() {
        let mut out = Vec::new();
        write_signal(&mut out).unwrap();
        write_signal(&mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "clipboard-changed\nclipboard-changed\n");
    }
}
