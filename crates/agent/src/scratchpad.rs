//! Think/act/observe history for one iterative run

use std::fmt;

use crate::parser::{ACTION_MARKER, OBSERVATION_MARKER, THOUGHT_MARKER};

/// One completed cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScratchpadEntry {
    pub thought: Option<String>,
    /// The fenced action block the model emitted
    pub action: Option<String>,
    pub observation: String,
}

impl ScratchpadEntry {
    pub fn new(
        thought: Option<String>,
        action: Option<String>,
        observation: impl Into<String>,
    ) -> Self {
        Self {
            thought,
            action,
            observation: observation.into(),
        }
    }
}

impl fmt::Display for ScratchpadEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(thought) = &self.thought {
            writeln!(f, "{} {}", THOUGHT_MARKER, thought)?;
        }
        if let Some(action) = &self.action {
            writeln!(f, "{}\n{}", ACTION_MARKER, action)?;
        }
        writeln!(f, "{} {}", OBSERVATION_MARKER, self.observation)
    }
}

/// Append-only sequence of entries. Owned by exactly one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Scratchpad {
    entries: Vec<ScratchpadEntry>,
}

impl Scratchpad {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: ScratchpadEntry) {
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[ScratchpadEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Concatenated rendering re-fed into the next prompt
    pub fn transcript(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Scratchpad {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for entry in &self.entries {
            write!(f, "{}", entry)?;
        }
        Ok(())
    }
}
