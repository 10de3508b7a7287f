//! Memory budget for one resolution run.
//!
//! Every sizeable allocation made while resolving (file contents, expansion
//! output, emitted arguments) is charged against a single [`Arena`]. When the
//! budget runs out the run fails with [`Error::OutOfMemory`] instead of
//! growing without bound, which keeps pathological inputs such as
//! exponentially nested variables from exhausting the host.
//!
//! Scratch work can be bracketed with [`Arena::mark`] and [`Arena::restore`]
//! so that temporary charges are released in bulk.

use crate::error::{Error, Result};

/// A byte budget with checkpoint/rollback.
#[derive(Debug, Clone)]
pub struct Arena {
    capacity: usize,
    used: usize,
}

/// A checkpoint returned by [`Arena::mark`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mark(usize);

impl Arena {
    /// Create an arena with the given capacity in bytes.
    pub fn new(capacity: usize) -> Self {
        Self { capacity, used: 0 }
    }

    /// Charge `len` bytes against the budget.
    pub fn alloc(&mut self, len: usize) -> Result<()> {
        match self.used.checked_add(len) {
            Some(used) if used <= self.capacity => {
                self.used = used;
                Ok(())
            }
            _ => {
                log::debug!(
                    "arena exhausted: {} of {} bytes used, {} requested",
                    self.used,
                    self.capacity,
                    len
                );
                Err(Error::OutOfMemory)
            }
        }
    }

    /// Append `s` to `out`, charging its length first.
    pub fn append(&mut self, out: &mut String, s: &str) -> Result<()> {
        self.alloc(s.len())?;
        out.push_str(s);
        Ok(())
    }

    /// Append a single character to `out`, charging its length first.
    pub fn push(&mut self, out: &mut String, c: char) -> Result<()> {
        self.alloc(c.len_utf8())?;
        out.push(c);
        Ok(())
    }

    /// Record the current usage.
    pub fn mark(&self) -> Mark {
        Mark(self.used)
    }

    /// Release everything charged since `mark` was taken.
    pub fn restore(&mut self, mark: Mark) {
        self.used = self.used.min(mark.0);
    }

    pub fn used(&self) -> usize {
        self.used
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn remaining(&self) -> usize {
        self.capacity - self.used
    }
}

impl Default for Arena {
    fn default() -> Self {
        Self::new(crate::DEFAULT_ARENA_CAPACITY)
    }
}
