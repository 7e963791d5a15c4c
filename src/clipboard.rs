use std::fmt;
use std::io;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use crossterm::{execute, Command};

/// Somewhere finished text can be copied to
pub trait Clipboard {
    fn copy(&self, text: &str) -> io::Result<()>;
}

/// OSC 52 "set clipboard" sequence; the terminal does the copying,
/// which also works over ssh
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyToClipboard<'a>(pub &'a str);

impl Command for CopyToClipboard<'_> {
    fn write_ansi(&self, f: &mut impl fmt::Write) -> fmt::Result {
        write!(f, "\x1b]52;c;{}\x07", STANDARD.encode(self.0))
    }

    #[cfg(windows)]
    fn execute_winapi(&self) -> io::Result<()> {
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            "OSC 52 needs an ANSI terminal",
        ))
    }
}

/// Copies through the controlling terminal
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalClipboard;

impl Clipboard for TerminalClipboard {
    fn copy(&self, text: &str) -> io::Result<()> {
        execute!(io::stdout(), CopyToClipboard(text))
    }
}
