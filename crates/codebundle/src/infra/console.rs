//! Colored console output.

use std::env;
use std::fmt::Display;
use std::io::{self, IsTerminal, Write};

use crossterm::style::{Color, Stylize, style};

/// Color role of a console line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Plain,
    Info,
    Success,
    Error,
}

impl Tone {
    fn color(self) -> Option<Color> {
        match self {
            Tone::Plain => None,
            Tone::Info => Some(Color::Blue),
            Tone::Success => Some(Color::Green),
            Tone::Error => Some(Color::Red),
        }
    }
}

/// Line-oriented writer that colors output when the sink is a terminal.
pub struct Console<W> {
    out: W,
    color: bool,
}

impl Console<io::Stdout> {
    pub fn stdout() -> Self {
        let out = io::stdout();
        let color = wants_color(out.is_terminal());
        Self { out, color }
    }
}

impl Console<io::Stderr> {
    pub fn stderr() -> Self {
        let out = io::stderr();
        let color = wants_color(out.is_terminal());
        Self { out, color }
    }
}

impl<W: Write> Console<W> {
    pub fn new(out: W, color: bool) -> Self {
        Self { out, color }
    }

    /// Write `message` followed by a newline.
    pub fn line(&mut self, tone: Tone, message: impl Display) -> io::Result<()> {
        self.write(tone, message)?;
        writeln!(self.out)
    }

    /// Write `message` without a trailing newline.
    pub fn write(&mut self, tone: Tone, message: impl Display) -> io::Result<()> {
        match tone.color().filter(|_| self.color) {
            Some(color) => write!(self.out, "{}", style(message).with(color)),
            None => write!(self.out, "{message}"),
        }
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }

    pub fn get_ref(&self) -> &W {
        &self.out
    }
}

fn wants_color(is_terminal: bool) -> bool {
    is_terminal && env::var_os("NO_COLOR").is_none()
}
