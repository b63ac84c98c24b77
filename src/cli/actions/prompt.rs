//! Line-oriented input for interactive commands.

use anyhow::{Context, Result};
use secrecy::SecretString;
use std::io::Write;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines, Stdin};

pub struct Prompt<R> {
    lines: Lines<R>,
}

impl Prompt<BufReader<Stdin>> {
    #[must_use]
    pub fn stdin() -> Self {
        Self::new(BufReader::new(tokio::io::stdin()))
    }
}

impl<R: AsyncBufRead + Unpin> Prompt<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
        }
    }

    /// Shows `label` on stderr and reads one line without its line ending.
    /// `None` once the input is exhausted.
    ///
    /// # Errors
    /// Returns an error if the input cannot be read.
    pub async fn line(&mut self, label: &str) -> Result<Option<String>> {
        let mut stderr = std::io::stderr();
        write!(stderr, "{label}: ").context("failed to write prompt")?;
        stderr.flush().context("failed to write prompt")?;

        let line = self.lines.next_line().await.context("failed to read input")?;
        Ok(line.map(|line| line.trim_end_matches('\r').to_string()))
    }

    /// Like [`Prompt::line`] for values that must not be copied around.
    ///
    /// # Errors
    /// Returns an error if the input cannot be read.
    pub async fn secret(&mut self, label: &str) -> Result<Option<SecretString>> {
        Ok(self.line(label).await?.map(SecretString::from))
    }
}
