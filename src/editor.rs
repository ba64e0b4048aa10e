/*!
 * Human-in-the-loop transcript correction.
 *
 * The editor replaces caption text under reviewer control while copying
 * every timing field verbatim; timing is never user-editable. The
 * interaction mechanism is pluggable: a terminal prompt, a batch file of
 * corrections, or a no-op passthrough all implement `CorrectionSource`.
 */

use std::collections::VecDeque;
use std::fmt::Debug;
use std::path::Path;
use std::sync::Mutex;
use anyhow::{Result, anyhow, Context};
use async_trait::async_trait;
use log::debug;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use crate::transcript::{FilteredTranscript, TranscriptLine};

/// Reviewer-corrected transcript, positionally 1:1 with its filtered input
#[derive(Debug, Clone, PartialEq)]
pub struct EditedTranscript {
    /// Corrected lines; timing identical to the filtered input
    pub lines: Vec<TranscriptLine>,
}

impl EditedTranscript {
    /// Number of lines (always equals the filtered input length)
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// True when the filtered input was empty
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Apply a positionally-aligned batch of corrections.
    ///
    /// `corrections` must have exactly one entry per filtered line; a
    /// `None` or empty entry keeps the original text. Timing fields are
    /// copied from the source line untouched.
    pub fn apply(filtered: &FilteredTranscript, corrections: &[Option<String>]) -> Result<Self> {
        if corrections.len() != filtered.len() {
            return Err(anyhow!(
                "Corrections length {} does not match transcript length {}",
                corrections.len(),
                filtered.len()
            ));
        }

        let lines = filtered
            .lines
            .iter()
            .zip(corrections.iter())
            .map(|(line, correction)| substitute(line, correction.as_deref()))
            .collect();

        Ok(EditedTranscript { lines })
    }
}

/// Replace the text of one line when a non-empty correction is given
fn substitute(line: &TranscriptLine, correction: Option<&str>) -> TranscriptLine {
    match correction {
        Some(text) if !text.trim().is_empty() => TranscriptLine {
            text: text.to_string(),
            start: line.start,
            duration: line.duration,
        },
        _ => line.clone(),
    }
}

/// Capability that supplies an optional corrected text per caption line
///
/// Returning `Ok(None)` keeps the original text. Implementations must not
/// see or touch timing; the editor owns that invariant.
#[async_trait]
pub trait CorrectionSource: Send + Sync + Debug {
    /// Ask for a correction of one caption's text
    ///
    /// # Arguments
    /// * `original` - The text as fetched from the transcript service
    ///
    /// # Returns
    /// * `Result<Option<String>>` - The replacement text, or None to keep
    async fn correct(&self, original: &str) -> Result<Option<String>>;
}

/// Run the correction pass over a filtered transcript.
///
/// Exactly one output line is produced per input line, so the length
/// invariant holds structurally whatever the source does.
pub async fn edit_with_source(
    filtered: &FilteredTranscript,
    source: &dyn CorrectionSource,
) -> Result<EditedTranscript> {
    let mut lines = Vec::with_capacity(filtered.len());

    for line in &filtered.lines {
        let correction = source.correct(&line.text).await?;
        lines.push(substitute(line, correction.as_deref()));
    }

    debug!("Correction pass complete: {} lines", lines.len());

    Ok(EditedTranscript { lines })
}

/// Passthrough source: every line keeps its original text
#[derive(Debug, Default)]
pub struct NoCorrections;

#[async_trait]
impl CorrectionSource for NoCorrections {
    async fn correct(&self, _original: &str) -> Result<Option<String>> {
        Ok(None)
    }
}

/// Corrections read up-front from a batch, consumed positionally.
///
/// One entry per caption line in filter order; a missing or blank entry
/// keeps the original text. When the batch runs out before the transcript
/// does, the remaining lines are kept unchanged.
#[derive(Debug)]
pub struct BatchCorrections {
    queue: Mutex<VecDeque<Option<String>>>,
}

impl BatchCorrections {
    /// Build from an in-memory list of corrections
    pub fn from_entries(entries: Vec<Option<String>>) -> Self {
        BatchCorrections {
            queue: Mutex::new(entries.into()),
        }
    }

    /// Load a corrections file: one line per caption, blank line = keep
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read corrections file: {}", path.display()))?;

        let entries = content
            .lines()
            .map(|line| {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    Some(trimmed.to_string())
                }
            })
            .collect();

        Ok(Self::from_entries(entries))
    }

    /// Entries still waiting to be consumed
    pub fn remaining(&self) -> usize {
        self.queue.lock().expect("corrections queue poisoned").len()
    }
}

#[async_trait]
impl CorrectionSource for BatchCorrections {
    async fn correct(&self, _original: &str) -> Result<Option<String>> {
        let mut queue = self.queue.lock().expect("corrections queue poisoned");
        Ok(queue.pop_front().flatten())
    }
}

/// Interactive terminal prompt, one caption at a time.
///
/// Shows the original text with its on-screen timing and reads a
/// replacement from stdin; an empty reply keeps the original.
#[derive(Debug, Default)]
pub struct PromptCorrections;

#[async_trait]
impl CorrectionSource for PromptCorrections {
    async fn correct(&self, original: &str) -> Result<Option<String>> {
        let mut stdout = tokio::io::stdout();
        stdout
            .write_all(format!("Original: {}\nCorrection (empty keeps): ", original).as_bytes())
            .await?;
        stdout.flush().await?;

        let mut reader = BufReader::new(tokio::io::stdin());
        let mut reply = String::new();
        reader
            .read_line(&mut reply)
            .await
            .context("Failed to read correction from stdin")?;

        let trimmed = reply.trim();
        if trimmed.is_empty() {
            Ok(None)
        } else {
            Ok(Some(trimmed.to_string()))
        }
    }
}
