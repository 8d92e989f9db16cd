// Token source rotation

use anyhow::Result;

/// Ordered token sources with a circular cursor
///
/// The cursor always points at a valid source. A fetch cycle starts at the
/// cursor; failures move it forward, successes leave it in place, so a
/// persistently failing source is skipped on later cycles.
#[derive(Debug, Clone)]
pub struct SourceList {
    sources: Vec<String>,
    cursor: usize,
}

impl SourceList {
    /// Create a source list, rejecting an empty one
    pub fn new(sources: Vec<String>) -> Result<Self> {
        if sources.is_empty() {
            anyhow::bail!("At least one token source is required");
        }

        Ok(Self { sources, cursor: 0 })
    }

    /// Index and URL of the source the next attempt should use
    pub fn current(&self) -> (usize, &str) {
        (self.cursor, &self.sources[self.cursor])
    }

    /// Move past a failed source
    ///
    /// Only advances when the cursor still points at `failed`, so concurrent
    /// fetch cycles failing on the same source rotate once.
    pub fn advance_past(&mut self, failed: usize) {
        if self.cursor == failed {
            self.cursor = (self.cursor + 1) % self.sources.len();
        }
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}
