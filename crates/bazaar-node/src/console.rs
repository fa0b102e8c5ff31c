//! Console I/O for the interaction loop.

use async_trait::async_trait;
use std::io::{self, Write};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

/// Line-oriented console used by [`InteractionLoop`](crate::InteractionLoop).
#[async_trait]
pub trait Console: Send {
    /// Prints `prompt` and reads one line, trimmed.
    ///
    /// Returns `None` once input is exhausted.
    async fn ask(&mut self, prompt: &str) -> io::Result<Option<String>>;

    /// Prints a line of output.
    fn say(&mut self, line: &str);
}

/// Console over the process's stdin and stdout.
pub struct StdConsole {
    lines: Lines<BufReader<Stdin>>,
}

impl StdConsole {
    /// Creates a console reading from stdin.
    pub fn new() -> Self {
        Self {
            lines: BufReader::new(tokio::io::stdin()).lines(),
        }
    }
}

impl Default for StdConsole {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Console for StdConsole {
    async fn ask(&mut self, prompt: &str) -> io::Result<Option<String>> {
        {
            let mut stdout = io::stdout().lock();
            stdout.write_all(prompt.as_bytes())?;
            stdout.flush()?;
        }
        let line = self.lines.next_line().await?;
        Ok(line.map(|line| line.trim().to_string()))
    }

    fn say(&mut self, line: &str) {
        println!("{line}");
    }
}
