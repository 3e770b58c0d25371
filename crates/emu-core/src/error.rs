//! Errors raised by the interpreter cores.
//!
//! Decode errors are fatal to a run: the dispatch loop returns them and the
//! driver stops. Memory errors are configuration mistakes and surface while
//! the address space is being built, before the first instruction executes.

use thiserror::Error;

/// An opcode byte that is not part of the instruction catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("unrecognised opcode {opcode:#04x}{}", table_suffix(.table))]
pub struct DecodeError {
    /// The offending byte as fetched (for prefixed tables, the byte after the prefix).
    pub opcode: u8,
    /// The prefixed sub-table the byte was dispatched against, if any.
    pub table: Option<&'static str>,
}

impl DecodeError {
    #[must_use]
    pub const fn new(opcode: u8) -> Self {
        Self {
            opcode,
            table: None,
        }
    }

    #[must_use]
    pub const fn in_table(opcode: u8, table: &'static str) -> Self {
        Self {
            opcode,
            table: Some(table),
        }
    }
}

fn table_suffix(table: &Option<&'static str>) -> String {
    table.map_or_else(String::new, |t| format!(" in {t} table"))
}

/// Address-space configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MemoryError {
    #[error("address space is frozen; no more blocks can be appended")]
    Frozen,

    #[error("appending {added} bytes to {size} would exceed the 64 KiB address space")]
    Overflow { size: usize, added: usize },

    #[error("invalid link [{from:#06x}, {to:#06x}) for an address space of {size} bytes")]
    InvalidLink { from: usize, to: usize, size: usize },

    #[error("mapper range [{start:#06x}, {end:#06x}] overlaps an existing mapper")]
    OverlappingMapper { start: u16, end: u16 },

    #[error("empty address range")]
    EmptyRange,
}
