//! Compiler and linker flag emission.
//!
//! The flag fields of every resolved package are split into shell-like
//! arguments (see [`crate::quote`]), passed through a [`Filter`], and
//! collected into an [`ArgList`] that de-duplicates on output.
//!
//! De-duplication only applies to flag-class arguments (`-D`, `-I`, `-L`,
//! `-f`, `-l`, `-m` and `-pthread`). Each of those has one canonical
//! position in the list: the first occurrence, except for `-l` arguments
//! which move to their last occurrence so that a shared library is listed
//! after everything that links against it. Anything else prints every
//! time it appears.
//!
//! System include and library directories are seeded as *excluded*
//! arguments, so `-I/usr/include` and friends never print unless the
//! client asks to keep them.

use std::borrow::Cow;
use std::collections::HashMap;
use std::collections::hash_map::Entry;

use crate::arena::Arena;
use crate::cache::Cache;
use crate::client::{Client, ClientFlags};
use crate::error::{Error, Result};
use crate::parser::Keyword;
use crate::pkg::Package;
use crate::quote::{dequote, encode_path};

/// Which arguments of a flags field are kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Filter {
    /// Every argument (`--cflags`, `--libs`).
    #[default]
    Any,
    /// Only `-I` arguments (`--cflags-only-I`).
    IncludeDirs,
    /// Only `-L` arguments (`--libs-only-L`).
    LibDirs,
    /// Only `-l` arguments (`--libs-only-l`).
    LibNames,
    /// Everything except `-I` (`--cflags-only-other`).
    OtherCflags,
    /// Everything except `-L` and `-l` (`--libs-only-other`).
    OtherLibs,
}

impl Filter {
    /// Whether `arg` passes this filter.
    pub fn accepts(self, arg: &str) -> bool {
        match self {
            Filter::Any => true,
            Filter::IncludeDirs => arg.starts_with("-I"),
            Filter::LibDirs => arg.starts_with("-L"),
            Filter::LibNames => arg.starts_with("-l"),
            Filter::OtherCflags => !arg.starts_with("-I"),
            Filter::OtherLibs => !arg.starts_with("-L") && !arg.starts_with("-l"),
        }
    }
}

/// Whether `arg` takes part in position-based de-duplication.
///
/// A bare `-I` or `-L` whose directory is a separate argument is not
/// counted.
pub fn is_dedupable(arg: &str) -> bool {
    let bytes = arg.as_bytes();
    if bytes.len() < 3 || bytes[0] != b'-' {
        return false;
    }
    arg == "-pthread" || b"DILflm".contains(&bytes[1])
}

/// Rewrite a GCC-style argument in MSVC syntax.
///
/// - `-L<dir>` → `/libpath:<dir>`
/// - `-I<dir>` → `/I<dir>`
/// - `-l<name>` → `<name>.lib`
/// - `-D<def>` → `/D<def>`
/// - `-mwindows` / `-mconsole` → `/subsystem:windows` / `/subsystem:console`
///
/// Anything else is returned unchanged.
pub fn msvcize(arg: &str) -> Cow<'_, str> {
    if let Some(dir) = arg.strip_prefix("-L") {
        Cow::Owned(format!("/libpath:{dir}"))
    } else if let Some(dir) = arg.strip_prefix("-I") {
        Cow::Owned(format!("/I{dir}"))
    } else if let Some(name) = arg.strip_prefix("-l") {
        Cow::Owned(format!("{name}.lib"))
    } else if let Some(def) = arg.strip_prefix("-D") {
        Cow::Owned(format!("/D{def}"))
    } else if arg == "-mwindows" {
        Cow::Borrowed("/subsystem:windows")
    } else if arg == "-mconsole" {
        Cow::Borrowed("/subsystem:console")
    } else {
        Cow::Borrowed(arg)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Excluded,
    At(usize),
}

/// An ordered list of arguments with canonical positions for the
/// de-duplicated ones.
#[derive(Debug, Clone, Default)]
pub struct ArgList {
    args: Vec<String>,
    slots: HashMap<String, Slot>,
}

impl ArgList {
    /// Create an empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one argument.
    pub fn push(&mut self, arg: impl Into<String>) {
        let arg = arg.into();
        let position = self.args.len();
        if is_dedupable(&arg) {
            let moves = arg.starts_with("-l");
            match self.slots.entry(arg.clone()) {
                Entry::Occupied(mut slot) => {
                    if moves {
                        slot.insert(Slot::At(position));
                    }
                }
                Entry::Vacant(slot) => {
                    slot.insert(Slot::At(position));
                }
            }
        }
        self.args.push(arg);
    }

    /// Suppress every occurrence of `arg`, past and future.
    pub fn exclude(&mut self, arg: impl Into<String>) {
        self.slots.insert(arg.into(), Slot::Excluded);
    }

    /// Whether `arg` has been excluded.
    pub fn is_excluded(&self, arg: &str) -> bool {
        self.slots.get(arg) == Some(&Slot::Excluded)
    }

    /// Exclude `-<flag><dir>` for each directory of a delimited list, as it
    /// would appear after dequoting.
    pub fn exclude_system_dirs(
        &mut self,
        arena: &mut Arena,
        dirs: &str,
        delimiter: char,
        flag: char,
    ) -> Result<()> {
        for dir in dirs.split(delimiter).filter(|d| !d.is_empty()) {
            let raw = format!("-{flag}{}", encode_path(dir));
            arena.alloc(raw.len())?;
            // Only a single-token path can ever match an argument.
            if let Some(d) = dequote(arena, &raw)? {
                if d.rest.is_empty() {
                    log::trace!("excluding system path '{}'", d.arg);
                    self.exclude(d.arg);
                }
            }
        }
        Ok(())
    }

    /// Split `field` of `pkg` into arguments and record those accepted by
    /// `filter`.
    pub fn append_field(
        &mut self,
        arena: &mut Arena,
        pkg: &Package,
        field: Keyword,
        filter: Filter,
    ) -> Result<()> {
        let mut rest = pkg.field(field);
        while !rest.is_empty() {
            let Some(d) = dequote(arena, rest)? else {
                return Err(Error::UnmatchedQuote {
                    package: pkg.realname.clone(),
                });
            };
            if !d.arg.is_empty() && filter.accepts(&d.arg) {
                self.push(d.arg);
            }
            rest = d.rest;
        }
        Ok(())
    }

    /// The arguments that survive de-duplication and exclusion, in order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.args
            .iter()
            .enumerate()
            .filter(|(i, arg)| self.in_position(arg, *i))
            .map(|(_, arg)| arg.as_str())
    }

    /// Number of recorded arguments, including suppressed duplicates.
    pub fn len(&self) -> usize {
        self.args.len()
    }

    /// Whether no argument was recorded.
    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }

    fn in_position(&self, arg: &str, position: usize) -> bool {
        match self.slots.get(arg) {
            None => true,
            Some(Slot::At(p)) => *p == position,
            Some(Slot::Excluded) => false,
        }
    }

    /// Append the surviving arguments to `out`.
    ///
    /// `count` is the number of arguments already written to `out`, so that
    /// consecutive lists share one delimiter sequence.
    pub fn render_into(&self, out: &mut String, count: &mut usize, delimiter: char, msvc: bool) {
        for arg in self.iter() {
            if *count > 0 {
                out.push(delimiter);
            }
            *count += 1;
            if msvc {
                out.push_str(&msvcize(arg));
            } else {
                out.push_str(arg);
            }
        }
    }

    /// Render the surviving arguments joined by `delimiter`.
    pub fn render(&self, delimiter: char, msvc: bool) -> String {
        let mut out = String::new();
        let mut count = 0;
        self.render_into(&mut out, &mut count, delimiter, msvc);
        out
    }
}

/// Collect the compiler flags of every resolved package.
///
/// `Cflags.private` is included only in static mode.
pub fn collect_cflags(
    client: &Client,
    arena: &mut Arena,
    packages: &Cache,
    filter: Filter,
) -> Result<ArgList> {
    let mut list = ArgList::new();
    if !client.keep_system_cflags() {
        list.exclude_system_dirs(arena, client.system_include_path(), client.delimiter(), 'I')?;
    }
    let is_static = client.flags().contains(ClientFlags::STATIC);
    for pkg in packages.iter() {
        list.append_field(arena, pkg, Keyword::Cflags, filter)?;
        if is_static {
            list.append_field(arena, pkg, Keyword::CflagsPrivate, filter)?;
        }
    }
    Ok(list)
}

/// Collect the linker flags of the resolved packages.
///
/// In static mode every package contributes `Libs` and `Libs.private`;
/// otherwise only public packages contribute, and only `Libs`.
pub fn collect_libs(
    client: &Client,
    arena: &mut Arena,
    packages: &Cache,
    filter: Filter,
) -> Result<ArgList> {
    let mut list = ArgList::new();
    if !client.keep_system_libs() {
        list.exclude_system_dirs(arena, client.system_library_path(), client.delimiter(), 'L')?;
    }
    let is_static = client.flags().contains(ClientFlags::STATIC);
    for pkg in packages.iter() {
        if is_static {
            list.append_field(arena, pkg, Keyword::Libs, filter)?;
            list.append_field(arena, pkg, Keyword::LibsPrivate, filter)?;
        } else if pkg.is_public() {
            list.append_field(arena, pkg, Keyword::Libs, filter)?;
        }
    }
    Ok(list)
}
