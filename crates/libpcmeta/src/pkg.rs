//! Package representation and loading.
//!
//! The [`Package`] struct is the fully-resolved representation of a `.pc`
//! file: its variables (including the synthesized `pcfiledir` and, when
//! enabled, a relocated `prefix`) and its fields with every `${...}`
//! reference already expanded.
//!
//! # Loading
//!
//! Packages are loaded via [`Package::find()`], which accepts either a
//! package name to look up on the client's search path or a path to a
//! `.pc` file. The name `pkg-config` is answered by a builtin package
//! describing this implementation, without touching the search path
//! contents.

use std::collections::{BTreeMap, HashMap, HashSet};

use crate::arena::Arena;
use crate::client::Client;
use crate::env::{self, Env};
use crate::error::{Error, Result};
use crate::expand::expand;
use crate::parser::{Keyword, PcFile};
use crate::path;
use crate::quote::encode_path;
use crate::version::Comparator;

/// Realname of the builtin package describing this implementation.
pub const BUILTIN_NAME: &str = "pkg-config";

/// How a package was reached during resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PackageFlags(u8);

impl PackageFlags {
    /// No flags set.
    pub const NONE: Self = Self(0);

    /// Named directly on the command line.
    pub const DIRECT: Self = Self(1 << 0);

    /// Reachable through public `Requires` edges only, so its `Libs` are
    /// part of a shared link.
    pub const PUBLIC: Self = Self(1 << 1);

    /// Check if a specific flag is set.
    pub fn contains(self, flag: Self) -> bool {
        (self.0 & flag.0) == flag.0
    }

    /// Set a flag, returning the new flags value.
    pub fn set(self, flag: Self) -> Self {
        Self(self.0 | flag.0)
    }

    /// Unset a flag, returning the new flags value.
    pub fn clear(self, flag: Self) -> Self {
        Self(self.0 & !flag.0)
    }

    /// Check if no flags are set.
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

/// A loaded package with expanded fields.
#[derive(Debug, Clone)]
pub struct Package {
    /// Name used to request the package (file name without `.pc`).
    pub realname: String,

    /// Path the package was loaded from.
    pub path: String,

    /// The package's own variables.
    pub env: Env,

    /// Resolution flags, accumulated as the package is reached.
    pub flags: PackageFlags,

    fields: HashMap<Keyword, String>,
}

impl Package {
    /// Locate and load a package.
    ///
    /// A token ending in `.pc` is first tried as a path. Otherwise (or if
    /// that file does not exist) each search directory is tried in order
    /// for `{token}.pc`. The first file found wins; a file that exists but
    /// cannot be read is an error rather than a reason to keep searching.
    pub fn find(client: &Client, arena: &mut Arena, token: &str) -> Result<Self> {
        let realname = path::realname(token);

        if path::is_pc_path(token) {
            if let Some(src) = read_package(client, arena, token, token)? {
                return Self::from_source(client, arena, realname, token, &src);
            }
        }

        let search_path = client.search_path();
        if token == BUILTIN_NAME {
            let path = search_path
                .candidates(token)
                .next()
                .unwrap_or_else(|| format!("{BUILTIN_NAME}.pc"));
            return Self::from_source(client, arena, realname, &path, &builtin_source());
        }

        for candidate in search_path.candidates(token) {
            log::trace!("trying '{candidate}'");
            if let Some(src) = read_package(client, arena, token, &candidate)? {
                return Self::from_source(client, arena, realname, &candidate, &src);
            }
        }

        Err(Error::PackageNotFound {
            name: token.to_string(),
        })
    }

    /// Build a package from `.pc` source text loaded from `path`.
    pub fn from_source(
        client: &Client,
        arena: &mut Arena,
        realname: &str,
        path: &str,
        src: &str,
    ) -> Result<Self> {
        let pc = PcFile::parse(src, path)?;
        if let Some(kw) = pc.missing_field() {
            return Err(Error::MissingField {
                field: kw.as_str(),
                path: path.to_string(),
            });
        }
        let PcFile {
            variables: mut env,
            fields: raw,
        } = pc;

        env.set("pcfiledir", encode_path(path::dirname(path)));

        if client.define_prefix() {
            if let Some(prefix) = relocated_prefix(path) {
                log::debug!("redefining prefix of '{realname}' as '{prefix}'");
                env.set("prefix", encode_path(prefix));
            }
        }

        let mut fields = HashMap::with_capacity(raw.len());
        for (kw, value) in &raw {
            let expanded = expand(arena, client.globals(), &env, path, value)?;
            fields.insert(*kw, expanded);
        }

        log::debug!("loaded '{realname}' from '{path}'");
        Ok(Self {
            realname: realname.to_string(),
            path: path.to_string(),
            env,
            flags: PackageFlags::NONE,
            fields,
        })
    }

    /// An expanded field value; absent fields read as empty.
    pub fn field(&self, keyword: Keyword) -> &str {
        self.fields.get(&keyword).map_or("", String::as_str)
    }

    /// Get the `Name` field.
    pub fn name(&self) -> &str {
        self.field(Keyword::Name)
    }

    /// Get the `Version` field.
    pub fn version(&self) -> &str {
        self.field(Keyword::Version)
    }

    /// Get the `Description` field.
    pub fn description(&self) -> &str {
        self.field(Keyword::Description)
    }

    /// Get the `Requires` field.
    pub fn requires(&self) -> &str {
        self.field(Keyword::Requires)
    }

    /// Get the `Requires.private` field.
    pub fn requires_private(&self) -> &str {
        self.field(Keyword::RequiresPrivate)
    }

    pub fn is_direct(&self) -> bool {
        self.flags.contains(PackageFlags::DIRECT)
    }

    pub fn is_public(&self) -> bool {
        self.flags.contains(PackageFlags::PUBLIC)
    }

    /// Check `self.version() <op> wanted`.
    pub fn check_version(&self, op: Comparator, wanted: &str) -> Result<()> {
        if op.eval(self.version(), wanted) {
            return Ok(());
        }
        Err(Error::VersionMismatch {
            name: self.realname.clone(),
            op,
            wanted: wanted.to_string(),
            found: self.version().to_string(),
        })
    }

    /// Expand the variable `name` as seen by this package.
    ///
    /// Global bindings shadow the package's own. Returns `Ok(None)` if the
    /// variable is not defined at all.
    pub fn variable(&self, client: &Client, arena: &mut Arena, name: &str) -> Result<Option<String>> {
        let Some(value) = env::lookup(client.globals(), &self.env, name) else {
            return Ok(None);
        };
        expand(arena, client.globals(), &self.env, &self.path, value).map(Some)
    }

    /// Load every package visible on the client's search path.
    ///
    /// Packages are keyed by realname; when several directories contain the
    /// same file, the first directory wins even if its copy fails to load.
    /// Files that fail to load are skipped and logged.
    pub fn scan_all(client: &Client) -> BTreeMap<String, Self> {
        let mut seen = HashSet::new();
        let mut found = BTreeMap::new();
        for dir in client.search_path().iter() {
            for file in client.loader().list(dir) {
                let realname = path::realname(&file);
                if !seen.insert(realname.to_string()) {
                    continue;
                }
                let full = path::pc_file_path(dir, realname);
                let mut arena = client.new_arena();
                let loaded = match read_package(client, &mut arena, realname, &full) {
                    Ok(Some(src)) => Self::from_source(client, &mut arena, realname, &full, &src),
                    Ok(None) => continue,
                    Err(e) => Err(e),
                };
                match loaded {
                    Ok(pkg) => {
                        found.insert(realname.to_string(), pkg);
                    }
                    Err(e) => log::warn!("skipping '{full}': {e}"),
                }
            }
        }
        found
    }
}

impl std::fmt::Display for Package {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.realname)?;
        if !self.version().is_empty() {
            write!(f, " {}", self.version())?;
        }
        Ok(())
    }
}

// ── Helper functions ────────────────────────────────────────────────────

/// Source text of the builtin `pkg-config` package.
pub fn builtin_source() -> String {
    format!("Name: pcmeta\nVersion: {}\nDescription:\n", crate::VERSION)
}

/// Read a `.pc` file through the client's loader, charging its size.
fn read_package(
    client: &Client,
    arena: &mut Arena,
    name: &str,
    path: &str,
) -> Result<Option<String>> {
    match client.loader().load(path) {
        Ok(Some(src)) => {
            arena.alloc(src.len())?;
            Ok(Some(src))
        }
        Ok(None) => Ok(None),
        Err(source) => Err(Error::PackageReadError {
            name: name.to_string(),
            path: path.to_string(),
            source,
        }),
    }
}

/// The install prefix implied by a `.pc` file living in
/// `{prefix}/{libdir}/pkgconfig/`.
fn relocated_prefix(pc_path: &str) -> Option<&str> {
    let parent = path::dirname(pc_path);
    if path::basename(parent) == "pkgconfig" {
        Some(path::dirname(path::dirname(parent)))
    } else {
        None
    }
}
