//! Shell dequoting of flag fields and path encoding.
//!
//! Flags fields are split into arguments the way a POSIX shell would see
//! them, and each argument is re-escaped so it can be pasted back into a
//! shell command line unchanged. Quotes are removed; spaces and shell
//! metacharacters that end up inside an argument are backslash-escaped.
//!
//! Paths that come from the environment rather than from `.pc` text
//! (`pcfiledir`, a computed `prefix`, a custom `pc_top_builddir`, the
//! system directory lists) are *encoded* before they enter variable
//! expansion. Each character that would otherwise split the argument or be
//! interpreted by a shell maps to a private-use code point, so the path is
//! treated as one literal run by [`dequote`] and escaped on output no
//! matter how the `.pc` file quotes it.

use crate::arena::Arena;
use crate::error::Result;

/// First code point of the private-use range used for encoded characters.
const ENCODED_BASE: u32 = 0xE000;

/// Whitespace as understood by the `.pc` grammar and the dequoter.
pub fn is_whitespace(c: char) -> bool {
    matches!(c, '\t' | '\n' | '\x08' | '\x0c' | '\r' | ' ')
}

/// Byte flavor of [`is_whitespace`].
pub fn is_whitespace_byte(c: u8) -> bool {
    matches!(c, b'\t' | b'\n' | b'\x08' | b'\x0c' | b'\r' | b' ')
}

/// Shell metacharacters that are escaped when they appear in an argument.
///
/// `$`, `(` and `)` are deliberately absent so that make-style references
/// such as `$(top_builddir)` pass through untouched.
pub fn is_shell_meta(c: char) -> bool {
    matches!(
        c,
        '"' | '!' | '#' | '%' | '&' | '\'' | '*' | '<' | '>' | '?' | '[' | '\\' | ']' | '`'
            | '{' | '|' | '}'
    )
}

fn needs_encoding(c: char) -> bool {
    is_whitespace(c) || is_shell_meta(c) || matches!(c, '$' | '(' | ')')
}

/// Encode a filesystem path so it survives expansion and dequoting as a
/// single literal argument fragment.
///
/// ```
/// use libpcmeta::quote::{decode_path, encode_path};
///
/// let raw = "C:/Program Files (x86)/lib";
/// let encoded = encode_path(raw);
/// assert!(!encoded.contains(' '));
/// assert_eq!(decode_path(&encoded), raw);
/// ```
pub fn encode_path(path: &str) -> String {
    path.chars()
        .map(|c| {
            if needs_encoding(c) {
                char::from_u32(ENCODED_BASE + c as u32).unwrap_or(c)
            } else {
                c
            }
        })
        .collect()
}

/// Reverse [`encode_path`], for text printed verbatim (variables, versions).
pub fn decode_path(s: &str) -> String {
    s.chars().map(|c| decode_char(c).unwrap_or(c)).collect()
}

fn decode_char(c: char) -> Option<char> {
    let offset = (c as u32).checked_sub(ENCODED_BASE)?;
    let original = char::from_u32(offset).filter(|&o| o.is_ascii() && needs_encoding(o))?;
    Some(original)
}

/// One argument split off the front of a field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dequoted<'a> {
    /// The re-escaped argument.
    pub arg: String,
    /// The unprocessed remainder of the input, starting at the delimiter.
    pub rest: &'a str,
}

/// Split the first shell-like argument off `s`.
///
/// Leading whitespace is skipped. Returns `Ok(None)` when the input ends
/// inside a quoted string; any output charged to `arena` is released in
/// that case.
///
/// ```
/// use libpcmeta::arena::Arena;
/// use libpcmeta::quote::dequote;
///
/// let mut arena = Arena::default();
/// let d = dequote(&mut arena, "  -I\"/opt/my dir\" -lfoo").unwrap().unwrap();
/// assert_eq!(d.arg, "-I/opt/my\\ dir");
/// assert_eq!(d.rest, " -lfoo");
///
/// assert!(dequote(&mut arena, "'open").unwrap().is_none());
/// ```
pub fn dequote<'a>(arena: &mut Arena, s: &'a str) -> Result<Option<Dequoted<'a>>> {
    let mark = arena.mark();
    let s = s.trim_start_matches(is_whitespace);
    let mut arg = String::new();
    let mut quote: Option<char> = None;
    let mut end = s.len();

    for (i, c) in s.char_indices() {
        if let Some(original) = decode_char(c) {
            arena.push(&mut arg, '\\')?;
            arena.push(&mut arg, original)?;
            continue;
        }
        let c = if is_whitespace(c) { ' ' } else { c };

        match quote {
            // A backslash is itself a metacharacter, so it never escapes the
            // closing quote.
            Some(q) if c == q => quote = None,
            Some(_) => push_escaped(arena, &mut arg, c)?,
            None if c == '\'' || c == '"' => quote = Some(c),
            None if c == ' ' => {
                end = i;
                break;
            }
            None => push_escaped(arena, &mut arg, c)?,
        }
    }

    if quote.is_some() {
        arena.restore(mark);
        return Ok(None);
    }
    Ok(Some(Dequoted {
        arg,
        rest: &s[end..],
    }))
}

/// Push `c`, preceded by a backslash if it is a space or metacharacter.
fn push_escaped(arena: &mut Arena, out: &mut String, c: char) -> Result<()> {
    if c == ' ' || is_shell_meta(c) {
        arena.push(out, '\\')?;
    }
    arena.push(out, c)
}
