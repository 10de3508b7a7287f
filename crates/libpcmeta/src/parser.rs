//! Parser for `.pc` (pkg-config) files.
//!
//! The file format consists of:
//!
//! - **Variable definitions**: `name = value`
//! - **Field declarations**: `Name: value` (keyword followed by `:`)
//! - **Comments**: `#` at the start of a line, or an unescaped `#` inside a
//!   value, which runs to the end of the line
//! - **Continuations**: a backslash before a line break joins the next line
//!
//! Parsing is strict: a variable or field assigned twice is an error rather
//! than a silent override. Unknown fields are skipped. Lines that contain
//! neither `=` nor `:` are ignored. Values are stored raw; `${...}`
//! references are expanded later, once the whole file has been read.

use std::collections::HashMap;

use crate::env::Env;
use crate::error::{Error, Result};
use crate::quote::is_whitespace_byte;

/// All known keyword fields in a `.pc` file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    Name,
    Description,
    URL,
    Version,
    Requires,
    RequiresPrivate,
    Conflicts,
    Libs,
    LibsPrivate,
    Cflags,
    CflagsPrivate,
}

impl Keyword {
    /// Every keyword, in canonical order.
    pub const ALL: [Keyword; 11] = [
        Self::Name,
        Self::Description,
        Self::URL,
        Self::Version,
        Self::Requires,
        Self::RequiresPrivate,
        Self::Conflicts,
        Self::Libs,
        Self::LibsPrivate,
        Self::Cflags,
        Self::CflagsPrivate,
    ];

    /// Fields every package must declare, in the order they are checked.
    pub const REQUIRED: [Keyword; 3] = [Self::Name, Self::Version, Self::Description];

    /// Try to parse a keyword from a field name (case-sensitive).
    pub fn from_name(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == s)
    }

    /// Return the canonical string representation of this keyword.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Name => "Name",
            Self::Description => "Description",
            Self::URL => "URL",
            Self::Version => "Version",
            Self::Requires => "Requires",
            Self::RequiresPrivate => "Requires.private",
            Self::Conflicts => "Conflicts",
            Self::Libs => "Libs",
            Self::LibsPrivate => "Libs.private",
            Self::Cflags => "Cflags",
            Self::CflagsPrivate => "Cflags.private",
        }
    }
}

impl std::fmt::Display for Keyword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parsed, unexpanded `.pc` file.
#[derive(Debug, Clone, Default)]
pub struct PcFile {
    /// Variables defined by the file.
    pub variables: Env,

    /// Raw field values, keyed by keyword. A field present with an empty
    /// value is distinct from an absent field.
    pub fields: HashMap<Keyword, String>,
}

/// Where the value of the line being parsed goes.
enum Target<'a> {
    Variable(&'a str),
    Field(Keyword),
    Skip,
}

impl PcFile {
    /// Parse `.pc` source text. `path` is used in error messages.
    pub fn parse(src: &str, path: &str) -> Result<Self> {
        let b = src.as_bytes();
        let e = b.len();
        let mut p = 0;
        let mut pc = Self::default();

        while p < e {
            while p < e && is_whitespace_byte(b[p]) {
                p += 1;
            }
            if p < e && b[p] == b'#' {
                p = skip_line(b, p);
                continue;
            }

            let beg = p;
            let mut end = p;
            let mut sep = None;
            while p < e {
                let c = b[p];
                p += 1;
                if matches!(c, b'\n' | b'=' | b':') {
                    sep = Some(c);
                    break;
                }
                if !is_whitespace_byte(c) {
                    end = p;
                }
            }
            let name = &src[beg..end];

            let target = match sep {
                Some(b'=') => {
                    if pc.variables.contains(name) {
                        return Err(Error::DuplicateVariable {
                            name: name.to_string(),
                            path: path.to_string(),
                        });
                    }
                    Target::Variable(name)
                }
                Some(b':') => match Keyword::from_name(name) {
                    Some(kw) if pc.fields.contains_key(&kw) => {
                        return Err(Error::DuplicateField {
                            name: name.to_string(),
                            path: path.to_string(),
                        });
                    }
                    Some(kw) => Target::Field(kw),
                    None => Target::Skip,
                },
                _ => continue,
            };

            // Skip leading whitespace, including escaped line breaks, but
            // stop at a bare newline so an empty value stays empty.
            while p < e {
                if b[p] == b'\\' {
                    match escaped(&b[p..]) {
                        0 => break,
                        n => p += n,
                    }
                } else if b[p] == b'\n' || !is_whitespace_byte(b[p]) {
                    break;
                } else {
                    p += 1;
                }
            }

            let mut cleanup = false;
            let beg = p;
            let mut end = p;
            while p < e && b[p] != b'\n' {
                match b[p] {
                    b'#' => {
                        p = skip_line(b, p);
                        break;
                    }
                    b'\\' => {
                        if p + 1 < e && b[p + 1] == b'#' {
                            p += 1;
                            end = p + 1;
                            cleanup = true;
                        }
                        let n = escaped(&b[p..]);
                        if n > 0 {
                            p += n - 1;
                            cleanup = true;
                        }
                    }
                    c if !is_whitespace_byte(c) => end = p + 1,
                    _ => {}
                }
                p += 1;
            }

            let raw = &src[beg..end];
            let value = if cleanup {
                strip_escapes(raw)
            } else {
                raw.to_string()
            };

            match target {
                Target::Variable(name) => {
                    pc.variables.define(name, value);
                }
                Target::Field(kw) => {
                    pc.fields.insert(kw, value);
                }
                Target::Skip => {}
            }
        }

        Ok(pc)
    }

    /// Look up a raw field value by keyword.
    pub fn field(&self, keyword: Keyword) -> Option<&str> {
        self.fields.get(&keyword).map(String::as_str)
    }

    /// The first required field that is absent, if any.
    pub fn missing_field(&self) -> Option<Keyword> {
        Keyword::REQUIRED
            .into_iter()
            .find(|kw| !self.fields.contains_key(kw))
    }
}

/// Advance past the end of the current line.
fn skip_line(b: &[u8], mut p: usize) -> usize {
    while p < b.len() {
        p += 1;
        if b[p - 1] == b'\n' {
            break;
        }
    }
    p
}

/// Number of bytes in an escaped line break at the start of `s`, or 0.
fn escaped(s: &[u8]) -> usize {
    if s.starts_with(b"\\\n") {
        2
    } else if s.starts_with(b"\\\r\n") {
        3
    } else {
        0
    }
}

/// Remove escaped line breaks and the backslash of `\#`.
fn strip_escapes(s: &str) -> String {
    let b = s.as_bytes();
    let mut out = String::with_capacity(s.len());
    let mut last = 0;
    let mut i = 0;
    while i < b.len() {
        if b[i] == b'\\' {
            let n = escaped(&b[i..]);
            if n > 0 {
                out.push_str(&s[last..i]);
                i += n;
                last = i;
                continue;
            }
            if i + 1 < b.len() && b[i + 1] == b'#' {
                out.push_str(&s[last..i]);
                i += 1;
                last = i;
                continue;
            }
        }
        i += 1;
    }
    out.push_str(&s[last..]);
    out
}
