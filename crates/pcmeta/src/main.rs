//! `pkg-config` — a strict, bounded drop-in replacement for pkg-config.
//!
//! This binary provides the pkg-config command-line interface on top of
//! `libpcmeta`: it resolves the packages named on the command line and
//! prints their versions, variables, or compiler and linker flags.

use std::fmt::Write as _;
use std::io::{self, Write as _};
use std::process::ExitCode;

use anyhow::{Result, anyhow};
use clap::Parser;
use clap::error::{ContextKind, ContextValue, ErrorKind};

use libpcmeta::client::{Client, ClientFlags, parse_definition};
use libpcmeta::fragment::{self, Filter};
use libpcmeta::pkg::Package;
use libpcmeta::queue::{Queue, parse_depth};
use libpcmeta::quote::decode_path;
use libpcmeta::version::Comparator;
use libpcmeta::{Error, MAX_TRAVERSAL_DEPTH_LIMIT, PROGRAM_NAME, VERSION};

/// Environment variable holding an `env_logger` filter.
const LOG_ENV: &str = "PCMETA_LOG";

/// Return metainformation about installed libraries.
#[derive(Parser, Debug)]
#[command(
    name = "pkg-config",
    disable_help_flag = true,
    disable_version_flag = true,
    args_override_self = true
)]
struct Cli {
    // ── Basic options ────────────────────────────────────────────────
    /// Print usage and exit.
    #[arg(short = 'h', long)]
    help: bool,

    /// Print the program version and exit.
    #[arg(long)]
    version: bool,

    /// Succeed unconditionally.
    #[arg(long = "atleast-pkgconfig-version", value_name = "VERSION")]
    atleast_pkgconfig_version: Option<String>,

    /// Print errors on stdout instead of stderr.
    #[arg(long = "errors-to-stdout")]
    errors_to_stdout: bool,

    /// Accepted for compatibility.
    #[arg(long = "print-errors")]
    print_errors: bool,

    /// Accepted for compatibility.
    #[arg(long = "short-errors")]
    short_errors: bool,

    /// Accepted for compatibility.
    #[arg(long)]
    uninstalled: bool,

    /// Do not print errors.
    #[arg(long = "silence-errors")]
    silence_errors: bool,

    /// Raise log verbosity.
    #[arg(long)]
    debug: bool,

    /// List every package on the search path with its description.
    #[arg(long = "list-all")]
    list_all: bool,

    /// List every package name on the search path.
    #[arg(long = "list-package-names")]
    list_package_names: bool,

    // ── Search ──────────────────────────────────────────────────────
    /// Search a directory before all others.
    #[arg(long = "with-path", value_name = "PATH")]
    with_path: Vec<String>,

    /// Guess `prefix` from the .pc file location.
    #[arg(long = "define-prefix", overrides_with = "dont_define_prefix")]
    define_prefix: bool,

    /// Never guess `prefix`.
    #[arg(long = "dont-define-prefix", overrides_with = "define_prefix")]
    dont_define_prefix: bool,

    /// Limit how deep requirements are followed.
    #[arg(long = "maximum-traverse-depth", value_name = "N")]
    maximum_traverse_depth: Option<String>,

    // ── Version checking ────────────────────────────────────────────
    /// Require at least this version of every package.
    #[arg(
        long = "atleast-version",
        value_name = "VERSION",
        overrides_with_all = ["exact_version", "max_version"]
    )]
    atleast_version: Option<String>,

    /// Require exactly this version of every package.
    #[arg(
        long = "exact-version",
        value_name = "VERSION",
        overrides_with_all = ["atleast_version", "max_version"]
    )]
    exact_version: Option<String>,

    /// Require at most this version of every package.
    #[arg(
        long = "max-version",
        value_name = "VERSION",
        overrides_with_all = ["atleast_version", "exact_version"]
    )]
    max_version: Option<String>,

    /// Check that the packages exist.
    #[arg(long)]
    exists: bool,

    /// Check that the packages parse.
    #[arg(long)]
    validate: bool,

    // ── Querying ────────────────────────────────────────────────────
    /// Print the version of each package.
    #[arg(long)]
    modversion: bool,

    /// Define a global variable.
    #[arg(long = "define-variable", value_name = "NAME=VALUE")]
    define_variable: Vec<String>,

    /// Print a variable of each package.
    #[arg(long, value_name = "NAME")]
    variable: Option<String>,

    /// Print compiler flags.
    #[arg(long, overrides_with_all = ["cflags_only_i", "cflags_only_other"])]
    cflags: bool,

    /// Print `-I` compiler flags only.
    #[arg(long = "cflags-only-I", overrides_with_all = ["cflags", "cflags_only_other"])]
    cflags_only_i: bool,

    /// Print compiler flags other than `-I`.
    #[arg(long = "cflags-only-other", overrides_with_all = ["cflags", "cflags_only_i"])]
    cflags_only_other: bool,

    /// Print linker flags.
    #[arg(long, overrides_with_all = ["libs_only_l_upper", "libs_only_l_lower", "libs_only_other"])]
    libs: bool,

    /// Print `-L` linker flags only.
    #[arg(long = "libs-only-L", overrides_with_all = ["libs", "libs_only_l_lower", "libs_only_other"])]
    libs_only_l_upper: bool,

    /// Print `-l` linker flags only.
    #[arg(long = "libs-only-l", overrides_with_all = ["libs", "libs_only_l_upper", "libs_only_other"])]
    libs_only_l_lower: bool,

    /// Print linker flags other than `-L` and `-l`.
    #[arg(long = "libs-only-other", overrides_with_all = ["libs", "libs_only_l_upper", "libs_only_l_lower"])]
    libs_only_other: bool,

    /// Include private flags and private requirements' libraries.
    #[arg(long = "static")]
    r#static: bool,

    /// Keep system include directories in compiler flags.
    #[arg(long = "keep-system-cflags")]
    keep_system_cflags: bool,

    /// Keep system library directories in linker flags.
    #[arg(long = "keep-system-libs")]
    keep_system_libs: bool,

    // ── Output ──────────────────────────────────────────────────────
    /// Print flags in MSVC syntax.
    #[arg(long = "msvc-syntax")]
    msvc_syntax: bool,

    /// Separate flags with newlines instead of spaces.
    #[arg(long)]
    newlines: bool,

    // ── Positional ──────────────────────────────────────────────────
    /// Package names, .pc paths and version constraints.
    packages: Vec<String>,
}

impl Cli {
    /// Whether diagnostics are suppressed.
    fn quiet(&self) -> bool {
        self.silence_errors || self.exists || self.validate || self.version_override().is_some()
    }

    /// The `--{atleast,exact,max}-version` check, if any.
    fn version_override(&self) -> Option<(Comparator, &str)> {
        if let Some(v) = &self.atleast_version {
            Some((Comparator::GreaterThanEqual, v.as_str()))
        } else if let Some(v) = &self.exact_version {
            Some((Comparator::Equal, v.as_str()))
        } else {
            self.max_version
                .as_deref()
                .map(|v| (Comparator::LessThanEqual, v))
        }
    }

    fn cflags_filter(&self) -> Option<Filter> {
        if self.cflags_only_i {
            Some(Filter::IncludeDirs)
        } else if self.cflags_only_other {
            Some(Filter::OtherCflags)
        } else if self.cflags {
            Some(Filter::Any)
        } else {
            None
        }
    }

    fn libs_filter(&self) -> Option<Filter> {
        if self.libs_only_l_upper {
            Some(Filter::LibDirs)
        } else if self.libs_only_l_lower {
            Some(Filter::LibNames)
        } else if self.libs_only_other {
            Some(Filter::OtherLibs)
        } else if self.libs {
            Some(Filter::Any)
        } else {
            None
        }
    }
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            eprintln!("{PROGRAM_NAME}: {}", option_error(&e));
            return ExitCode::FAILURE;
        }
    };

    init_logging(cli.debug);

    let mut out = String::new();
    match run(&cli, &mut out) {
        Ok(()) => {
            let mut stdout = io::stdout().lock();
            if stdout.write_all(out.as_bytes()).and_then(|()| stdout.flush()).is_err() {
                return ExitCode::FAILURE;
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::debug!("run failed: {e:?}");
            if !cli.quiet() {
                if cli.errors_to_stdout {
                    println!("{PROGRAM_NAME}: {e:#}");
                } else {
                    eprintln!("{PROGRAM_NAME}: {e:#}");
                }
            }
            ExitCode::FAILURE
        }
    }
}

/// Translate a command-line parse failure into a one-line diagnostic.
fn option_error(e: &clap::Error) -> anyhow::Error {
    let invalid_arg = match e.get(ContextKind::InvalidArg) {
        Some(ContextValue::String(s)) => s.as_str(),
        _ => "",
    };
    // clap reports options as "--name <VALUE>".
    let option = invalid_arg.split_whitespace().next().unwrap_or_default();
    match e.kind() {
        ErrorKind::UnknownArgument => Error::UnknownOption {
            option: option.to_string(),
        }
        .into(),
        ErrorKind::InvalidValue | ErrorKind::NoEquals => Error::MissingArgument {
            option: option.to_string(),
        }
        .into(),
        _ => {
            let rendered = e.to_string();
            let line = rendered.lines().next().unwrap_or_default();
            anyhow!("{}", line.trim_start_matches("error: "))
        }
    }
}

/// Send library log records to stderr.
///
/// The level is `warn` unless `--debug` or `PKG_CONFIG_DEBUG_SPEW` asks for
/// more; `PCMETA_LOG` overrides both.
fn init_logging(debug: bool) {
    let spew = std::env::var_os(libpcmeta::ENV_PKG_CONFIG_DEBUG_SPEW).is_some();
    let level = if debug || spew { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::new().filter_or(LOG_ENV, level))
        .format_timestamp(None)
        .target(env_logger::Target::Stderr)
        .init();
}

/// Build a [`Client`] from CLI arguments and the environment.
fn build_client(cli: &Cli) -> Result<Client> {
    let mut builder = Client::builder();

    for dir in &cli.with_path {
        builder = builder.with_path(dir);
    }

    for definition in &cli.define_variable {
        let (name, value) = parse_definition(definition)?;
        builder = builder.define_variable(name, value);
    }

    if cli.define_prefix {
        builder = builder.define_prefix(true);
    } else if cli.dont_define_prefix {
        builder = builder.define_prefix(false);
    }

    // Command-line flags only ever add to the environment's choice.
    if cli.keep_system_cflags {
        builder = builder.keep_system_cflags(true);
    }
    if cli.keep_system_libs {
        builder = builder.keep_system_libs(true);
    }

    if let Some(depth) = &cli.maximum_traverse_depth {
        builder = builder.max_traversal_depth(parse_depth(depth, MAX_TRAVERSAL_DEPTH_LIMIT));
    }

    if cli.r#static {
        builder = builder.flag(ClientFlags::STATIC);
    }
    if cli.msvc_syntax {
        builder = builder.flag(ClientFlags::MSVC_SYNTAX);
    }
    if cli.validate {
        builder = builder.flag(ClientFlags::SKIP_REQUIRES);
    }
    if cli.version_override().is_some() {
        builder = builder
            .flag(ClientFlags::SKIP_REQUIRES)
            .flag(ClientFlags::IGNORE_VERSIONS);
    }

    Ok(builder.build())
}

fn run(cli: &Cli, out: &mut String) -> Result<()> {
    if cli.help {
        out.push_str(&usage());
        return Ok(());
    }

    if cli.version {
        writeln!(out, "{VERSION}")?;
        return Ok(());
    }

    if cli.atleast_pkgconfig_version.is_some() {
        return Ok(());
    }

    let client = build_client(cli)?;

    if cli.list_all || cli.list_package_names {
        list_packages(&client, cli.list_all, out)?;
        return Ok(());
    }

    let mut arena = client.new_arena();
    let mut queue = Queue::new(&client);
    for spec in &cli.packages {
        queue.push(&mut arena, spec)?;
    }
    let packages = queue.finish()?;
    log::debug!("resolved {} package(s)", packages.len());

    if let Some((op, wanted)) = cli.version_override() {
        for pkg in packages.direct() {
            pkg.check_version(op, wanted)?;
        }
    }

    if cli.modversion {
        for pkg in packages.direct() {
            writeln!(out, "{}", decode_path(pkg.version()))?;
        }
    }

    if let Some(name) = &cli.variable {
        for pkg in packages.direct() {
            if let Some(value) = pkg.variable(&client, &mut arena, name)? {
                writeln!(out, "{}", decode_path(&value))?;
            }
        }
    }

    let cflags = cli.cflags_filter();
    let libs = cli.libs_filter();
    let delimiter = if cli.newlines { '\n' } else { ' ' };
    let msvc = client.flags().contains(ClientFlags::MSVC_SYNTAX);
    let mut count = 0;

    if let Some(filter) = cflags {
        let mark = arena.mark();
        let list = fragment::collect_cflags(&client, &mut arena, &packages, filter)?;
        list.render_into(out, &mut count, delimiter, msvc);
        arena.restore(mark);
    }

    if let Some(filter) = libs {
        let mark = arena.mark();
        let list = fragment::collect_libs(&client, &mut arena, &packages, filter)?;
        list.render_into(out, &mut count, delimiter, msvc);
        arena.restore(mark);
    }

    if cflags.is_some() || libs.is_some() {
        out.push('\n');
    }

    Ok(())
}

/// `--list-all` and `--list-package-names`.
fn list_packages(client: &Client, describe: bool, out: &mut String) -> Result<()> {
    let all = Package::scan_all(client);
    let width = all.keys().map(String::len).max().unwrap_or(0);
    for (realname, pkg) in &all {
        if describe {
            writeln!(
                out,
                "{realname:<width$} {} - {}",
                decode_path(pkg.name()),
                decode_path(pkg.description())
            )?;
        } else {
            writeln!(out, "{realname}")?;
        }
    }
    Ok(())
}

fn usage() -> String {
    format!(
        "{PROGRAM_NAME} {VERSION}\n\
         usage: pkg-config [OPTIONS...] [PACKAGES...]\n\
         \x20 --cflags, --cflags-only-I, --cflags-only-other\n\
         \x20 --define-prefix, --dont-define-prefix\n\
         \x20 --define-variable=NAME=VALUE, --variable=NAME\n\
         \x20 --exists, --validate, --{{atleast,exact,max}}-version=VERSION\n\
         \x20 --errors-to-stdout, --silence-errors\n\
         \x20 --keep-system-cflags, --keep-system-libs\n\
         \x20 --libs, --libs-only-L, --libs-only-l, --libs-only-other\n\
         \x20 --list-all, --list-package-names\n\
         \x20 --maximum-traverse-depth=N\n\
         \x20 --modversion\n\
         \x20 --msvc-syntax\n\
         \x20 --newlines\n\
         \x20 --static\n\
         \x20 --with-path=PATH\n\
         \x20 --debug\n\
         \x20 -h, --help, --version\n\
         environment:\n\
         \x20 PKG_CONFIG_PATH\n\
         \x20 PKG_CONFIG_LIBDIR\n\
         \x20 PKG_CONFIG_TOP_BUILD_DIR\n\
         \x20 PKG_CONFIG_SYSTEM_INCLUDE_PATH\n\
         \x20 PKG_CONFIG_SYSTEM_LIBRARY_PATH\n\
         \x20 PKG_CONFIG_ALLOW_SYSTEM_CFLAGS\n\
         \x20 PKG_CONFIG_ALLOW_SYSTEM_LIBS\n\
         \x20 PKG_CONFIG_SYSROOT_DIR\n\
         \x20 {LOG_ENV}\n"
    )
}
