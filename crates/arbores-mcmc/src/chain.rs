use arbores_core::errors::{ArgError, ErrorInfo};

use crate::diagnostics::ChainEntry;

/// Fixed-capacity, append-only record of the chain. The entry index is the
/// iteration number.
#[derive(Debug, Clone)]
pub struct ChainRecorder {
    capacity: usize,
    entries: Vec<ChainEntry>,
}

impl ChainRecorder {
    /// Reserves room for exactly `capacity` entries up front.
    pub fn with_capacity(capacity: usize) -> Result<Self, ArgError> {
        let mut entries = Vec::new();
        entries.try_reserve_exact(capacity).map_err(|err| {
            ArgError::Config(
                ErrorInfo::new("chain-allocation", err.to_string())
                    .with_context("chain_length", capacity.to_string())
                    .with_hint("reduce the chain length"),
            )
        })?;
        Ok(Self { capacity, entries })
    }

    /// Maximum number of entries.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Current iteration, i.e. the number of recorded entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been recorded yet.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether no further entry fits.
    pub fn is_full(&self) -> bool {
        self.entries.len() >= self.capacity
    }

    /// Appends an entry. Writing past the capacity is refused.
    pub fn push(&mut self, entry: ChainEntry) -> Result<usize, ArgError> {
        if self.is_full() {
            return Err(ArgError::Invariant(
                ErrorInfo::new("chain-overflow", "entry recorded past the chain capacity")
                    .with_context("capacity", self.capacity.to_string()),
            ));
        }
        self.entries.push(entry);
        Ok(self.entries.len())
    }

    /// Most recent entry.
    pub fn last(&self) -> Option<&ChainEntry> {
        self.entries.last()
    }

    /// All entries in iteration order.
    pub fn entries(&self) -> &[ChainEntry] {
        &self.entries
    }
}
