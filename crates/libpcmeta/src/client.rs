//! Run configuration.
//!
//! The [`Client`] struct carries everything one resolution run needs to
//! know about its surroundings:
//!
//! - The `.pc` search path (`--with-path`, `PKG_CONFIG_PATH`, then the
//!   fixed path or `PKG_CONFIG_LIBDIR`)
//! - The path delimiter (`:`, or `;` on Windows)
//! - System include and library directories, and whether to keep them
//! - Global variable bindings (`pc_path`, `pc_top_builddir`, ... and
//!   `--define-variable` overrides)
//! - Behaviour flags, traversal depth limit and memory budget
//! - The [`Loader`] used to read files
//!
//! # Example
//!
//! ```rust
//! use libpcmeta::client::{Client, ClientFlags};
//!
//! let client = Client::builder()
//!     .skip_env(true)
//!     .fixed_path("/opt/pc")
//!     .with_path("/first")
//!     .define_variable("prefix", "/opt/custom")
//!     .flags(ClientFlags::STATIC)
//!     .build();
//!
//! assert_eq!(client.search_path().dirs(), ["/first", "/opt/pc"]);
//! assert_eq!(client.globals().get("prefix"), Some("/opt/custom"));
//! assert_eq!(client.globals().get("pc_path"), Some("/opt/pc"));
//! ```

use std::sync::Arc;

use crate::arena::Arena;
use crate::env::Env;
use crate::error::{Error, Result};
use crate::loader::{Loader, OsLoader};
use crate::path::{PATH_SEPARATOR, SearchPath};
use crate::quote::encode_path;

/// Client flags controlling resolution and output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ClientFlags(u32);

impl ClientFlags {
    /// No flags set.
    pub const NONE: Self = Self(0);

    /// Redefine `prefix` from the `.pc` file location.
    pub const DEFINE_PREFIX: Self = Self(1 << 0);

    /// Do not suppress system include directories from cflags.
    pub const KEEP_SYSTEM_CFLAGS: Self = Self(1 << 1);

    /// Do not suppress system library directories from libs.
    pub const KEEP_SYSTEM_LIBS: Self = Self(1 << 2);

    /// Static linking: include private flags and private packages' libs.
    pub const STATIC: Self = Self(1 << 3);

    /// Render flags in MSVC syntax.
    pub const MSVC_SYNTAX: Self = Self(1 << 4);

    /// Load only the packages named on the command line.
    pub const SKIP_REQUIRES: Self = Self(1 << 5);

    /// Do not check inline version constraints.
    pub const IGNORE_VERSIONS: Self = Self(1 << 6);

    /// Check if no flags are set.
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Set a flag.
    pub fn set(self, flag: Self) -> Self {
        Self(self.0 | flag.0)
    }

    /// Clear a flag.
    pub fn clear(self, flag: Self) -> Self {
        Self(self.0 & !flag.0)
    }

    /// Set or clear a flag.
    pub fn toggle(self, flag: Self, on: bool) -> Self {
        if on { self.set(flag) } else { self.clear(flag) }
    }

    /// Check whether a specific flag is set.
    pub fn contains(self, flag: Self) -> bool {
        (self.0 & flag.0) == flag.0
    }

    /// Get the raw bits.
    pub fn bits(self) -> u32 {
        self.0
    }
}

/// Configuration shared by every step of a run.
///
/// Use [`Client::from_env()`] for the configuration a command-line run
/// sees, or [`Client::builder()`] for fine-grained control.
#[derive(Debug, Clone)]
pub struct Client {
    /// Directories to search for `.pc` files, in priority order.
    search_path: SearchPath,

    /// Separator of every directory list.
    delimiter: char,

    /// System include directories, delimited.
    system_include_path: String,

    /// System library directories, delimited.
    system_library_path: String,

    /// Bindings visible from every package, checked before its own.
    globals: Env,

    flags: ClientFlags,

    /// Maximum depth for dependency graph traversal.
    max_traversal_depth: usize,

    /// Memory budget of one run, in bytes.
    arena_capacity: usize,

    loader: Arc<dyn Loader>,
}

impl Client {
    /// Create a client configured from the process environment.
    pub fn from_env() -> Self {
        ClientBuilder::new().build()
    }

    /// Create a builder for configuring a client.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    // ── Getters ─────────────────────────────────────────────────────

    /// Get the search path list.
    pub fn search_path(&self) -> &SearchPath {
        &self.search_path
    }

    /// Get the directory list delimiter.
    pub fn delimiter(&self) -> char {
        self.delimiter
    }

    /// Get the delimited system include directories.
    pub fn system_include_path(&self) -> &str {
        &self.system_include_path
    }

    /// Get the delimited system library directories.
    pub fn system_library_path(&self) -> &str {
        &self.system_library_path
    }

    /// Get the global variable bindings.
    pub fn globals(&self) -> &Env {
        &self.globals
    }

    /// Get the client flags.
    pub fn flags(&self) -> ClientFlags {
        self.flags
    }

    /// Get the maximum traversal depth.
    pub fn max_traversal_depth(&self) -> usize {
        self.max_traversal_depth
    }

    /// Get the per-run memory budget.
    pub fn arena_capacity(&self) -> usize {
        self.arena_capacity
    }

    /// Get the file loader.
    pub fn loader(&self) -> &dyn Loader {
        self.loader.as_ref()
    }

    /// Whether `prefix` is redefined from the `.pc` file location.
    pub fn define_prefix(&self) -> bool {
        self.flags.contains(ClientFlags::DEFINE_PREFIX)
    }

    /// Whether to keep system cflags (not filter them).
    pub fn keep_system_cflags(&self) -> bool {
        self.flags.contains(ClientFlags::KEEP_SYSTEM_CFLAGS)
    }

    /// Whether to keep system libs (not filter them).
    pub fn keep_system_libs(&self) -> bool {
        self.flags.contains(ClientFlags::KEEP_SYSTEM_LIBS)
    }

    /// Whether static mode is enabled.
    pub fn is_static(&self) -> bool {
        self.flags.contains(ClientFlags::STATIC)
    }

    /// Start a fresh memory budget for one run.
    pub fn new_arena(&self) -> Arena {
        Arena::new(self.arena_capacity)
    }

    // ── Setters ─────────────────────────────────────────────────────

    /// Add a flag.
    pub fn add_flag(&mut self, flag: ClientFlags) {
        self.flags = self.flags.set(flag);
    }

    /// Remove a flag.
    pub fn remove_flag(&mut self, flag: ClientFlags) {
        self.flags = self.flags.clear(flag);
    }
}

impl Default for Client {
    fn default() -> Self {
        Self::from_env()
    }
}

/// The fixed search path used when `PKG_CONFIG_LIBDIR` is unset.
#[cfg(not(windows))]
pub fn default_fixed_path() -> String {
    crate::DEFAULT_PKGCONFIG_PATH.to_string()
}

/// The fixed search path used when `PKG_CONFIG_LIBDIR` is unset.
///
/// Relative to the installation root, taken as the parent of the directory
/// holding the executable.
#[cfg(windows)]
pub fn default_fixed_path() -> String {
    let root = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent()?.parent().map(|p| p.to_string_lossy().replace('\\', "/")));
    match root {
        Some(root) => format!("{root}/lib/pkgconfig;{root}/share/pkgconfig"),
        None => String::new(),
    }
}

/// Split a `--define-variable` argument into name and value.
///
/// ```
/// use libpcmeta::client::parse_definition;
///
/// assert_eq!(parse_definition("prefix=/opt").unwrap(), ("prefix", "/opt"));
/// assert!(parse_definition("prefix").is_err());
/// ```
pub fn parse_definition(definition: &str) -> Result<(&str, &str)> {
    definition
        .split_once('=')
        .ok_or_else(|| Error::InvalidDefinition {
            definition: definition.to_string(),
        })
}

/// Builder for constructing a [`Client`] with specific configuration.
///
/// Options left unset fall back to the environment variables of
/// [`crate`]'s `ENV_*` constants (unless [`skip_env`](Self::skip_env) is
/// set), then to the compiled-in defaults.
///
/// # Example
///
/// ```rust
/// use libpcmeta::client::Client;
///
/// let client = Client::builder()
///     .skip_env(true)
///     .keep_system_cflags(true)
///     .max_traversal_depth(2)
///     .build();
///
/// assert_eq!(client.max_traversal_depth(), 2);
/// assert!(client.keep_system_cflags());
/// assert!(!client.keep_system_libs());
/// ```
#[derive(Debug, Clone, Default)]
pub struct ClientBuilder {
    with_paths: Vec<String>,
    env_path: Option<String>,
    fixed_path: Option<String>,
    system_include_path: Option<String>,
    system_library_path: Option<String>,
    top_builddir: Option<String>,
    sysroot_dir: Option<String>,
    delimiter: Option<char>,
    definitions: Vec<(String, String)>,
    flags: ClientFlags,
    define_prefix: Option<bool>,
    keep_system_cflags: Option<bool>,
    keep_system_libs: Option<bool>,
    max_traversal_depth: Option<usize>,
    arena_capacity: Option<usize>,
    loader: Option<Arc<dyn Loader>>,
    skip_env: bool,
}

impl ClientBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add delimited search directories ahead of all others (like
    /// `--with-path`).
    ///
    /// The value added last is searched first; directories within one value
    /// keep their order.
    pub fn with_path(mut self, dir: &str) -> Self {
        self.with_paths.push(dir.to_string());
        self
    }

    /// Set the delimited environment search path (`PKG_CONFIG_PATH`).
    pub fn env_path(mut self, path: &str) -> Self {
        self.env_path = Some(path.to_string());
        self
    }

    /// Set the delimited fixed search path (`PKG_CONFIG_LIBDIR`).
    pub fn fixed_path(mut self, path: &str) -> Self {
        self.fixed_path = Some(path.to_string());
        self
    }

    /// Set the delimited system include directories.
    pub fn system_include_path(mut self, path: &str) -> Self {
        self.system_include_path = Some(path.to_string());
        self
    }

    /// Set the delimited system library directories.
    pub fn system_library_path(mut self, path: &str) -> Self {
        self.system_library_path = Some(path.to_string());
        self
    }

    /// Set the value of `pc_top_builddir`.
    pub fn top_builddir(mut self, dir: &str) -> Self {
        self.top_builddir = Some(dir.to_string());
        self
    }

    /// Set the value of `pc_sysrootdir`.
    pub fn sysroot_dir(mut self, dir: &str) -> Self {
        self.sysroot_dir = Some(dir.to_string());
        self
    }

    /// Set the directory list delimiter.
    pub fn delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = Some(delimiter);
        self
    }

    /// Define a global variable override.
    ///
    /// Later definitions of the same name win.
    pub fn define_variable(mut self, key: &str, value: &str) -> Self {
        self.definitions.push((key.to_string(), value.to_string()));
        self
    }

    /// Set all client flags at once.
    pub fn flags(mut self, flags: ClientFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Set a single client flag.
    pub fn flag(mut self, flag: ClientFlags) -> Self {
        self.flags = self.flags.set(flag);
        self
    }

    /// Set whether `prefix` is redefined from the `.pc` file location.
    pub fn define_prefix(mut self, on: bool) -> Self {
        self.define_prefix = Some(on);
        self
    }

    /// Set whether to keep system cflags in output.
    pub fn keep_system_cflags(mut self, keep: bool) -> Self {
        self.keep_system_cflags = Some(keep);
        self
    }

    /// Set whether to keep system libs in output.
    pub fn keep_system_libs(mut self, keep: bool) -> Self {
        self.keep_system_libs = Some(keep);
        self
    }

    /// Set the maximum traversal depth.
    pub fn max_traversal_depth(mut self, depth: usize) -> Self {
        self.max_traversal_depth = Some(depth);
        self
    }

    /// Set the per-run memory budget in bytes.
    pub fn arena_capacity(mut self, bytes: usize) -> Self {
        self.arena_capacity = Some(bytes);
        self
    }

    /// Set the file loader.
    pub fn loader(mut self, loader: impl Loader + 'static) -> Self {
        self.loader = Some(Arc::new(loader));
        self
    }

    /// Skip reading environment variables during construction.
    ///
    /// Useful for testing.
    pub fn skip_env(mut self, skip: bool) -> Self {
        self.skip_env = skip;
        self
    }

    /// Build the client.
    pub fn build(self) -> Client {
        if self.skip_env {
            self.build_from(|_| None)
        } else {
            self.build_from(|name| std::env::var(name).ok())
        }
    }

    /// Build the client, reading environment variables through `getenv`.
    fn build_from(self, getenv: impl Fn(&str) -> Option<String>) -> Client {
        let delimiter = self.delimiter.unwrap_or(PATH_SEPARATOR);

        let env_path = self
            .env_path
            .or_else(|| getenv(crate::ENV_PKG_CONFIG_PATH))
            .unwrap_or_default();
        // An empty PKG_CONFIG_LIBDIR still replaces the default.
        let fixed_path = self
            .fixed_path
            .or_else(|| getenv(crate::ENV_PKG_CONFIG_LIBDIR))
            .unwrap_or_else(default_fixed_path);
        let system_include_path = self
            .system_include_path
            .or_else(|| getenv(crate::ENV_PKG_CONFIG_SYSTEM_INCLUDE_PATH))
            .unwrap_or_else(|| crate::DEFAULT_SYSTEM_INCLUDE_PATH.to_string());
        let system_library_path = self
            .system_library_path
            .or_else(|| getenv(crate::ENV_PKG_CONFIG_SYSTEM_LIBRARY_PATH))
            .unwrap_or_else(|| crate::DEFAULT_SYSTEM_LIBRARY_PATH.to_string());
        let top_builddir = self
            .top_builddir
            .or_else(|| getenv(crate::ENV_PKG_CONFIG_TOP_BUILD_DIR))
            .map(|dir| encode_path(&dir))
            .unwrap_or_else(|| crate::DEFAULT_TOP_BUILDDIR.to_string());
        let sysroot_dir = self
            .sysroot_dir
            .or_else(|| getenv(crate::ENV_PKG_CONFIG_SYSROOT_DIR))
            .unwrap_or_else(|| crate::DEFAULT_SYSROOT_DIR.to_string());

        // Presence alone counts, even with an empty value.
        let keep_system_cflags = self
            .keep_system_cflags
            .unwrap_or_else(|| getenv(crate::ENV_PKG_CONFIG_ALLOW_SYSTEM_CFLAGS).is_some());
        let keep_system_libs = self
            .keep_system_libs
            .unwrap_or_else(|| getenv(crate::ENV_PKG_CONFIG_ALLOW_SYSTEM_LIBS).is_some());
        let define_prefix = self
            .define_prefix
            .unwrap_or(self.flags.contains(ClientFlags::DEFINE_PREFIX) || cfg!(windows));

        let flags = self
            .flags
            .toggle(ClientFlags::DEFINE_PREFIX, define_prefix)
            .toggle(ClientFlags::KEEP_SYSTEM_CFLAGS, keep_system_cflags)
            .toggle(ClientFlags::KEEP_SYSTEM_LIBS, keep_system_libs);

        let mut search_path = SearchPath::new();
        for dirs in &self.with_paths {
            search_path.prepend_delimited(dirs, delimiter);
        }
        search_path.add_delimited(&env_path, delimiter);
        search_path.add_delimited(&fixed_path, delimiter);
        log::debug!("search path: {}", search_path.to_delimited(delimiter));

        let mut globals = Env::new();
        globals.set("pc_path", fixed_path);
        globals.set("pc_system_includedirs", system_include_path.clone());
        globals.set("pc_system_libdirs", system_library_path.clone());
        globals.set("pc_sysrootdir", sysroot_dir);
        globals.set("pc_top_builddir", top_builddir);
        for (key, value) in self.definitions {
            globals.set(&key, value);
        }

        Client {
            search_path,
            delimiter,
            system_include_path,
            system_library_path,
            globals,
            flags,
            max_traversal_depth: self
                .max_traversal_depth
                .unwrap_or(crate::DEFAULT_MAX_TRAVERSAL_DEPTH),
            arena_capacity: self.arena_capacity.unwrap_or(crate::DEFAULT_ARENA_CAPACITY),
            loader: self.loader.unwrap_or_else(|| Arc::new(OsLoader)),
        }
    }
}
