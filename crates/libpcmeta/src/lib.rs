//! `libpcmeta` — a strict, bounded resolver for pkg-config `.pc` metadata.
//!
//! Given package names (or paths to `.pc` files), this crate locates the
//! metadata files on a search path, parses them, walks their `Requires` and
//! `Requires.private` graph, expands `${variable}` references and produces
//! the merged compiler and linker flag lists with pkg-config's ordering and
//! de-duplication rules.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - [`error`] — Error types and result aliases
//! - [`arena`] — Memory budget shared by one resolution run
//! - [`loader`] — File loading and directory listing collaborators
//! - [`path`] — Search path construction and path/realname helpers
//! - [`parser`] — `.pc` line grammar, field table and duplicate detection
//! - [`env`] — Variable bindings and two-tier lookup
//! - [`expand`] — Stack-based `${name}` expansion
//! - [`quote`] — Shell dequote/requote transform and path encoding
//! - [`version`] — Version ordering and constraint operators
//! - [`pkg`] — Loaded packages and package discovery
//! - [`cache`] — The insertion-ordered set of resolved packages
//! - [`queue`] — Dependency graph traversal
//! - [`fragment`] — Flag filtering, de-duplication and rendering
//! - [`client`] — Run configuration, environment handling
//!
//! # Example
//!
//! ```rust
//! use libpcmeta::client::Client;
//! use libpcmeta::fragment::{self, Filter};
//! use libpcmeta::loader::MemoryLoader;
//! use libpcmeta::queue::Queue;
//!
//! let mut files = MemoryLoader::new();
//! files.insert(
//!     "/usr/lib/pkgconfig/zlib.pc",
//!     "prefix=/opt/zlib\nName: zlib\nVersion: 1.3\nDescription: compression\n\
//!      Cflags: -I${prefix}/include\nLibs: -L${prefix}/lib -lz\n",
//! );
//! let client = Client::builder()
//!     .skip_env(true)
//!     .fixed_path("/usr/lib/pkgconfig")
//!     .loader(files)
//!     .build();
//!
//! let mut arena = client.new_arena();
//! let mut queue = Queue::new(&client);
//! queue.push(&mut arena, "zlib >= 1.2").unwrap();
//! let packages = queue.finish().unwrap();
//!
//! let libs = fragment::collect_libs(&client, &mut arena, &packages, Filter::Any).unwrap();
//! assert_eq!(libs.render(' ', false), "-L/opt/zlib/lib -lz");
//! ```

pub mod arena;
pub mod cache;
pub mod client;
pub mod env;
pub mod error;
pub mod expand;
pub mod fragment;
pub mod loader;
pub mod parser;
pub mod path;
pub mod pkg;
pub mod queue;
pub mod quote;
pub mod version;

pub use error::{Error, Result};

/// The version of this library, also reported by the builtin `pkg-config` package.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Tag prefixed to every diagnostic printed by the command-line driver.
pub const PROGRAM_NAME: &str = "pkg-config";

/// Default fixed `.pc` search path, used when `PKG_CONFIG_LIBDIR` is unset.
#[cfg(not(windows))]
pub const DEFAULT_PKGCONFIG_PATH: &str =
    "/usr/local/lib/pkgconfig:/usr/local/share/pkgconfig:/usr/lib/pkgconfig:/usr/share/pkgconfig";

/// Default fixed `.pc` search path, used when `PKG_CONFIG_LIBDIR` is unset.
///
/// On Windows the real default is derived from the executable location; see
/// [`client::default_fixed_path`].
#[cfg(windows)]
pub const DEFAULT_PKGCONFIG_PATH: &str = "";

/// System include directories whose `-I` flags are suppressed by default.
#[cfg(not(windows))]
pub const DEFAULT_SYSTEM_INCLUDE_PATH: &str = "/usr/include";

#[cfg(windows)]
pub const DEFAULT_SYSTEM_INCLUDE_PATH: &str = "";

/// System library directories whose `-L` flags are suppressed by default.
#[cfg(not(windows))]
pub const DEFAULT_SYSTEM_LIBRARY_PATH: &str = "/lib:/usr/lib";

#[cfg(windows)]
pub const DEFAULT_SYSTEM_LIBRARY_PATH: &str = "";

/// Value of `pc_top_builddir` when `PKG_CONFIG_TOP_BUILD_DIR` is unset.
pub const DEFAULT_TOP_BUILDDIR: &str = "$(top_builddir)";

/// Value of `pc_sysrootdir` when `PKG_CONFIG_SYSROOT_DIR` is unset.
pub const DEFAULT_SYSROOT_DIR: &str = "/";

/// Default dependency traversal depth (effectively unbounded).
pub const DEFAULT_MAX_TRAVERSAL_DEPTH: usize = i32::MAX as usize;

/// Largest value accepted by `--maximum-traverse-depth`.
pub const MAX_TRAVERSAL_DEPTH_LIMIT: usize = 1000;

/// Default memory budget of one resolution run, in bytes.
pub const DEFAULT_ARENA_CAPACITY: usize = 1 << 24;

/// The `PKG_CONFIG_PATH` environment variable name.
pub const ENV_PKG_CONFIG_PATH: &str = "PKG_CONFIG_PATH";

/// The `PKG_CONFIG_LIBDIR` environment variable name.
///
/// When set, this *replaces* the fixed search path, even when empty.
pub const ENV_PKG_CONFIG_LIBDIR: &str = "PKG_CONFIG_LIBDIR";

/// The `PKG_CONFIG_TOP_BUILD_DIR` environment variable name.
pub const ENV_PKG_CONFIG_TOP_BUILD_DIR: &str = "PKG_CONFIG_TOP_BUILD_DIR";

/// The `PKG_CONFIG_SYSTEM_INCLUDE_PATH` environment variable name.
pub const ENV_PKG_CONFIG_SYSTEM_INCLUDE_PATH: &str = "PKG_CONFIG_SYSTEM_INCLUDE_PATH";

/// The `PKG_CONFIG_SYSTEM_LIBRARY_PATH` environment variable name.
pub const ENV_PKG_CONFIG_SYSTEM_LIBRARY_PATH: &str = "PKG_CONFIG_SYSTEM_LIBRARY_PATH";

/// The `PKG_CONFIG_ALLOW_SYSTEM_CFLAGS` environment variable name.
pub const ENV_PKG_CONFIG_ALLOW_SYSTEM_CFLAGS: &str = "PKG_CONFIG_ALLOW_SYSTEM_CFLAGS";

/// The `PKG_CONFIG_ALLOW_SYSTEM_LIBS` environment variable name.
pub const ENV_PKG_CONFIG_ALLOW_SYSTEM_LIBS: &str = "PKG_CONFIG_ALLOW_SYSTEM_LIBS";

/// The `PKG_CONFIG_SYSROOT_DIR` environment variable name.
pub const ENV_PKG_CONFIG_SYSROOT_DIR: &str = "PKG_CONFIG_SYSROOT_DIR";

/// The `PKG_CONFIG_DEBUG_SPEW` environment variable name.
pub const ENV_PKG_CONFIG_DEBUG_SPEW: &str = "PKG_CONFIG_DEBUG_SPEW";
