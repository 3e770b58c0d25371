//! Read-only state queries for debuggers.
//!
//! Register panes, flag panes and interrupt status in a debugger UI all go
//! through [`Observable`]. Queries never affect emulation state.

use std::fmt;

/// A dynamically-typed value for state queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Value {
    Bool(bool),
    U8(u8),
    U16(u16),
}

impl Value {
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Numeric values widened to `u32`.
    #[must_use]
    pub const fn as_u32(&self) -> Option<u32> {
        match self {
            Self::U8(v) => Some(*v as u32),
            Self::U16(v) => Some(*v as u32),
            Self::Bool(_) => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(v) => write!(f, "{}", u8::from(*v)),
            Value::U8(v) => write!(f, "{v:02x}"),
            Value::U16(v) => write!(f, "{v:04x}"),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<u8> for Value {
    fn from(v: u8) -> Self {
        Value::U8(v)
    }
}

impl From<u16> for Value {
    fn from(v: u16) -> Self {
        Value::U16(v)
    }
}

/// A component whose state can be inspected.
pub trait Observable {
    /// Query a specific property by path.
    ///
    /// Paths are flat register names (`a`, `hl`, `sp`, `pc`) or dotted flag
    /// names (`flags.z`, `flags.c`). Returns `None` for unknown paths.
    fn query(&self, path: &str) -> Option<Value>;

    /// List all available query paths.
    fn query_paths(&self) -> &'static [&'static str];

    /// Every path with its current value, in `query_paths` order.
    fn dump(&self) -> Vec<(&'static str, Value)> {
        self.query_paths()
            .iter()
            .filter_map(|&path| self.query(path).map(|value| (path, value)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Pair {
        hi: u8,
        lo: u8,
    }

    impl Observable for Pair {
        fn query(&self, path: &str) -> Option<Value> {
            match path {
                "hi" => Some(self.hi.into()),
                "lo" => Some(self.lo.into()),
                "zero" => Some((self.hi == 0 && self.lo == 0).into()),
                _ => None,
            }
        }

        fn query_paths(&self) -> &'static [&'static str] {
            &["hi", "lo", "zero"]
        }
    }

    #[test]
    fn dump_lists_every_path() {
        let pair = Pair { hi: 0x12, lo: 0 };
        let dump = pair.dump();
        assert_eq!(
            dump,
            [
                ("hi", Value::U8(0x12)),
                ("lo", Value::U8(0)),
                ("zero", Value::Bool(false)),
            ]
        );
        assert_eq!(pair.query("bogus"), None);
    }

    #[test]
    fn values_print_as_debugger_hex() {
        assert_eq!(Value::U8(0x0F).to_string(), "0f");
        assert_eq!(Value::U16(0x1F).to_string(), "001f");
        assert_eq!(Value::Bool(true).to_string(), "1");
        assert_eq!(Value::U16(0xBEEF).as_u32(), Some(0xBEEF));
        assert_eq!(Value::U8(0x80).as_u32(), Some(0x80));
        assert_eq!(Value::Bool(true).as_u32(), None);
        assert_eq!(Value::Bool(true).as_bool(), Some(true));
    }
}
