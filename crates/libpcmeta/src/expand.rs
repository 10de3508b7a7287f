//! `${name}` variable expansion.
//!
//! Expansion is iterative: pending input fragments live on a fixed-depth
//! stack instead of the call stack, so hostile nesting fails with a
//! diagnostic rather than overflowing. Output is charged to the run's
//! [`Arena`], which bounds exponential blow-up such as a chain of variables
//! each referencing the previous one ten times.

use crate::arena::Arena;
use crate::env::{self, Env};
use crate::error::{Error, Result};

/// Maximum number of pending fragments during one expansion.
pub const MAX_EXPANSION_DEPTH: usize = 128;

/// Expand every `${name}` reference in `input`.
///
/// Names are looked up in `global` first, then in `local`. A `${` with no
/// closing brace takes the rest of the input as its name. `$$` produces a
/// literal `$` and prevents the following `{` from starting a reference.
/// `path` is only used in diagnostics.
///
/// ```
/// use libpcmeta::arena::Arena;
/// use libpcmeta::env::Env;
/// use libpcmeta::expand::expand;
///
/// let global = Env::new();
/// let mut local = Env::new();
/// local.set("prefix", "/usr");
/// local.set("libdir", "${prefix}/lib");
///
/// let mut arena = Arena::default();
/// let out = expand(&mut arena, &global, &local, "x.pc", "-L${libdir} $${x}").unwrap();
/// assert_eq!(out, "-L/usr/lib ${x}");
/// ```
pub fn expand<'a>(
    arena: &mut Arena,
    global: &'a Env,
    local: &'a Env,
    path: &str,
    input: &'a str,
) -> Result<String> {
    let mut out = String::new();
    let mut stack: Vec<&'a str> = Vec::with_capacity(MAX_EXPANSION_DEPTH);
    stack.push(input);

    while let Some(s) = stack.pop() {
        let b = s.as_bytes();
        let mut rest = s;
        let mut i = 0;
        while i + 1 < b.len() {
            if b[i] != b'$' {
                i += 1;
                continue;
            }
            if b[i + 1] == b'{' {
                if stack.len() + 2 > MAX_EXPANSION_DEPTH {
                    return Err(Error::ExpansionDepthExceeded {
                        path: path.to_string(),
                    });
                }
                arena.append(&mut out, &s[..i])?;
                let start = i + 2;
                let end = s[start..].find('}').map_or(s.len(), |n| start + n);
                let name = &s[start..end];
                stack.push(&s[(end + 1).min(s.len())..]);
                let value =
                    env::lookup(global, local, name).ok_or_else(|| Error::UndefinedVariable {
                        name: name.to_string(),
                        path: path.to_string(),
                    })?;
                stack.push(value);
                rest = "";
                break;
            }
            if b[i + 1] == b'$' {
                arena.append(&mut out, &s[..=i])?;
                stack.push(&s[i + 2..]);
                rest = "";
                break;
            }
            i += 1;
        }
        arena.append(&mut out, rest)?;
    }

    Ok(out)
}
