//! Integration tests for the `pkg-config` binary.
//!
//! These tests exercise the CLI end-to-end against `.pc` files written into
//! a temporary directory:
//!
//! - Basic queries (cflags, libs, modversion, variable, exists)
//! - Version constraints on the command line and in `Requires`
//! - Dependency resolution and traversal depth
//! - Flag ordering, de-duplication and system directory filtering
//! - Static linking
//! - Error messages and exit codes
//! - Environment variable handling

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// A scratch package directory.
struct Fixture {
    dir: TempDir,
}

impl Fixture {
    fn new() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write `{name}.pc` with the given contents.
    fn pc(&self, name: &str, contents: &str) -> &Self {
        fs::write(self.path().join(format!("{name}.pc")), contents).unwrap();
        self
    }

    /// A `pkg-config` command searching only this directory.
    fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("pkg-config").unwrap();
        cmd.env("PKG_CONFIG_LIBDIR", self.path());
        cmd.env_remove("PKG_CONFIG_PATH");
        cmd.env_remove("PKG_CONFIG_SYSROOT_DIR");
        cmd.env_remove("PKG_CONFIG_TOP_BUILD_DIR");
        cmd.env_remove("PKG_CONFIG_SYSTEM_INCLUDE_PATH");
        cmd.env_remove("PKG_CONFIG_SYSTEM_LIBRARY_PATH");
        cmd.env_remove("PKG_CONFIG_ALLOW_SYSTEM_CFLAGS");
        cmd.env_remove("PKG_CONFIG_ALLOW_SYSTEM_LIBS");
        cmd.env_remove("PKG_CONFIG_DEBUG_SPEW");
        cmd.env_remove("PCMETA_LOG");
        cmd
    }
}

/// A minimal package with the given extra lines.
fn package(name: &str, version: &str, extra: &str) -> String {
    format!("Name: {name}\nVersion: {version}\nDescription: the {name} package\n{extra}")
}

// ============================================================================
// Basic queries
// ============================================================================

#[test]
fn cflags_and_libs() {
    let fx = Fixture::new();
    fx.pc(
        "zlib",
        &format!(
            "prefix=/opt/zlib\n{}",
            package(
                "zlib",
                "1.3",
                "Cflags: -I${prefix}/include -DZ\nLibs: -L${prefix}/lib -lz\n"
            )
        ),
    );

    fx.cmd()
        .args(["--cflags", "zlib"])
        .assert()
        .success()
        .stdout("-I/opt/zlib/include -DZ\n");

    fx.cmd()
        .args(["--libs", "zlib"])
        .assert()
        .success()
        .stdout("-L/opt/zlib/lib -lz\n");

    fx.cmd()
        .args(["--cflags", "--libs", "zlib"])
        .assert()
        .success()
        .stdout("-I/opt/zlib/include -DZ -L/opt/zlib/lib -lz\n");
}

#[test]
fn only_filters() {
    let fx = Fixture::new();
    fx.pc(
        "f",
        &package(
            "f",
            "1",
            "Cflags: -I/opt/f/include -DF -pthread\nLibs: -L/opt/f/lib -lf -pthread -Wl,--as-needed\n",
        ),
    );

    fx.cmd()
        .args(["--cflags-only-I", "f"])
        .assert()
        .success()
        .stdout("-I/opt/f/include\n");
    fx.cmd()
        .args(["--cflags-only-other", "f"])
        .assert()
        .success()
        .stdout("-DF -pthread\n");
    fx.cmd()
        .args(["--libs-only-L", "f"])
        .assert()
        .success()
        .stdout("-L/opt/f/lib\n");
    fx.cmd()
        .args(["--libs-only-l", "f"])
        .assert()
        .success()
        .stdout("-lf\n");
    fx.cmd()
        .args(["--libs-only-other", "f"])
        .assert()
        .success()
        .stdout("-pthread -Wl,--as-needed\n");
}

#[test]
fn newlines_delimiter() {
    let fx = Fixture::new();
    fx.pc("n", &package("n", "1", "Cflags: -DA -DB\nLibs: -ln\n"));

    fx.cmd()
        .args(["--newlines", "--cflags", "--libs", "n"])
        .assert()
        .success()
        .stdout("-DA\n-DB\n-ln\n");
}

#[test]
fn empty_flags_still_print_newline() {
    let fx = Fixture::new();
    fx.pc("empty", &package("empty", "1", ""));

    fx.cmd()
        .args(["--cflags", "--libs", "empty"])
        .assert()
        .success()
        .stdout("\n");
}

#[test]
fn exists_is_silent() {
    let fx = Fixture::new();
    fx.pc("here", &package("here", "1", ""));

    fx.cmd()
        .args(["--exists", "here"])
        .assert()
        .success()
        .stdout("")
        .stderr("");
    fx.cmd()
        .args(["--exists", "nonexistingpkg"])
        .assert()
        .failure()
        .stdout("")
        .stderr("");
}

#[test]
fn modversion() {
    let fx = Fixture::new();
    let share = tempfile::tempdir().unwrap();
    fx.pc("direct", &package("direct", "1.2.3", "Requires: req\n"));
    fx.pc("req", &package("req", "9", ""));
    fs::write(
        share.path().join("indirect.pc"),
        "major=12\nminor=345\npatch=6789\n\
         Name: indirect\nVersion: ${major}.${minor}.${patch}\nDescription:\n",
    )
    .unwrap();

    fx.cmd()
        .env("PKG_CONFIG_PATH", share.path())
        .args(["--modversion", "direct", "indirect"])
        .assert()
        .success()
        .stdout("1.2.3\n12.345.6789\n");

    fx.cmd()
        .args(["--modversion", "direct"])
        .assert()
        .success()
        .stdout("1.2.3\n");
}

#[test]
fn modversion_in_command_line_order() {
    let fx = Fixture::new();
    fx.pc("a", &package("a", "1", "Requires: c b\n"));
    fx.pc("b", &package("b", "2", ""));
    fx.pc("c", &package("c", "3", ""));

    fx.cmd()
        .args(["--modversion", "a", "b", "c"])
        .assert()
        .success()
        .stdout("1\n2\n3\n");
}

#[test]
fn variable_query() {
    let fx = Fixture::new();
    fx.pc(
        "v",
        &format!(
            "prefix=/opt/v\nlibdir=${{prefix}}/lib\n{}",
            package("v", "1", "")
        ),
    );

    fx.cmd()
        .args(["--variable=libdir", "v"])
        .assert()
        .success()
        .stdout("/opt/v/lib\n");

    fx.cmd()
        .args(["--variable", "nosuchvar", "v"])
        .assert()
        .success()
        .stdout("");

    fx.cmd()
        .args(["--define-variable=prefix=/elsewhere", "--variable=libdir", "v"])
        .assert()
        .success()
        .stdout("/elsewhere/lib\n");
}

#[test]
fn pcfiledir_variable() {
    let fx = Fixture::new();
    fx.pc("here", &package("here", "1", ""));

    let expected = format!("{}\n", fx.path().display());
    fx.cmd()
        .args(["--variable=pcfiledir", "here"])
        .assert()
        .success()
        .stdout(expected);
}

#[test]
fn builtin_package() {
    let fx = Fixture::new();
    fx.cmd()
        .args(["--modversion", "pkg-config"])
        .assert()
        .success()
        .stdout(format!("{}\n", env!("CARGO_PKG_VERSION")));

    fx.cmd()
        .args(["--variable=pc_path", "pkg-config"])
        .assert()
        .success()
        .stdout(format!("{}\n", fx.path().display()));
}

#[test]
fn pc_file_path_argument() {
    let fx = Fixture::new();
    let elsewhere = tempfile::tempdir().unwrap();
    let file = elsewhere.path().join("loose.pc");
    fs::write(&file, package("loose", "4.5", "Cflags: -DLOOSE\n")).unwrap();

    fx.cmd()
        .arg("--cflags")
        .arg(&file)
        .assert()
        .success()
        .stdout("-DLOOSE\n");
}

#[test]
fn list_all() {
    let fx = Fixture::new();
    fx.pc("beta", "Name: Beta\nVersion: 2\nDescription: second\n");
    fx.pc("alpha", "Name: Alpha\nVersion: 1\nDescription: first\n");
    fx.pc("broken", "Name: broken\n");

    fx.cmd()
        .arg("--list-all")
        .assert()
        .success()
        .stdout("alpha Alpha - first\nbeta  Beta - second\n");

    fx.cmd()
        .arg("--list-package-names")
        .assert()
        .success()
        .stdout("alpha\nbeta\n");
}

#[test]
fn help_and_version() {
    let fx = Fixture::new();
    fx.cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(format!("{}\n", env!("CARGO_PKG_VERSION")));

    fx.cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("usage: pkg-config"))
        .stdout(predicate::str::contains("PKG_CONFIG_PATH"));

    fx.cmd()
        .arg("--atleast-pkgconfig-version=99")
        .assert()
        .success()
        .stdout("");
}

// ============================================================================
// Version constraints
// ============================================================================

#[test]
fn versioncheck_passes_however_split() {
    let fx = Fixture::new();
    fx.pc("test", &package("test", "1.2.3", ""));

    for args in [
        &["test = 1.2.3"][..],
        &["test ", "= 1.2.3"],
        &["test ", "=", " 1.2.3"],
        &["test =", "1.2.3"],
        &["test", ">=", "1.2"],
    ] {
        fx.cmd()
            .arg("--modversion")
            .args(args)
            .assert()
            .success()
            .stdout("1.2.3\n");
    }
}

#[test]
fn versioncheck_failures() {
    let fx = Fixture::new();
    fx.pc("test", &package("test", "1.2.3", ""));

    for args in [
        &["test < 1.2.3"][..],
        &["test <= 1.2.2"],
        &["test > 1.2.3"],
        &["test >= 1.2.4"],
        &["test", "!=", "1.2.3"],
    ] {
        fx.cmd().arg("--exists").args(args).assert().failure();
    }

    fx.cmd()
        .args(["--modversion", "test ="])
        .assert()
        .failure()
        .stderr(predicate::str::contains("expected version following operator"));

    fx.cmd()
        .args(["--modversion", "test", "="])
        .assert()
        .failure()
        .stderr(predicate::str::contains("expected version following operator"));
}

#[test]
fn version_mismatch_message() {
    let fx = Fixture::new();
    fx.pc("versionedpkg", &package("versionedpkg", "2", ""));

    fx.cmd()
        .args(["--cflags", "versionedpkg = 1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("'1'"))
        .stderr(predicate::str::contains("'2'"));
}

#[test]
fn version_overrides() {
    let fx = Fixture::new();
    fx.pc("t", &package("t", "1", "Requires: missing-dependency\n"));

    fx.cmd()
        .args(["--atleast-version=0", "t > 1"])
        .assert()
        .success();
    fx.cmd()
        .args(["--exact-version=1", "t > 1"])
        .assert()
        .success();
    fx.cmd()
        .args(["--max-version=2", "t > 1"])
        .assert()
        .success();

    for (flag, args) in [
        ("--atleast-version=2", &["t = 1"][..]),
        ("--exact-version=2", &["t = 1"]),
        ("--max-version=0", &["t = 1"]),
        ("--atleast-version=2", &["t"]),
        ("--exact-version=2", &["t"]),
        ("--max-version=0", &["t"]),
    ] {
        fx.cmd()
            .arg(flag)
            .args(args)
            .assert()
            .failure()
            .stdout("")
            .stderr("");
    }
}

#[test]
fn override_on_missing_package_is_silent() {
    let fx = Fixture::new();
    fx.cmd()
        .args(["--atleast-version", "9", "nonexistingpkg"])
        .assert()
        .failure()
        .stderr("");
}

// ============================================================================
// Dependency resolution
// ============================================================================

#[test]
fn requires_chain() {
    let fx = Fixture::new();
    fx.pc("a", &package("a", "1", "Requires: b >= 1\nCflags: -Da\nLibs: -la\n"));
    fx.pc("b", &package("b", "1", "Requires: c\nCflags: -Db\nLibs: -lb\n"));
    fx.pc("c", &package("c", "1", "Cflags: -Dc\nLibs: -lc\n"));

    fx.cmd()
        .args(["--cflags", "--libs", "a"])
        .assert()
        .success()
        .stdout("-Da -Db -Dc -la -lb -lc\n");
}

#[test]
fn maximum_traverse_depth() {
    let fx = Fixture::new();
    fx.pc("a", &package("a", "1", "Requires: b\nCflags: -Da\n"));
    fx.pc("b", &package("b", "1", "Requires: c\nCflags: -Db\n"));
    fx.pc("c", &package("c", "1", "Cflags: -Dc\n"));

    for (depth, expected) in [
        ("1", "-Da\n"),
        ("2", "-Da -Db\n"),
        ("3", "-Da -Db -Dc\n"),
    ] {
        fx.cmd()
            .args(["--cflags", "--maximum-traverse-depth", depth, "a"])
            .assert()
            .success()
            .stdout(expected);
    }
}

#[test]
fn private_requires_only_for_static_libs() {
    let fx = Fixture::new();
    fx.pc(
        "app",
        &package(
            "app",
            "1",
            "Requires.private: priv\nCflags: -Dapp\nLibs: -lapp\nLibs.private: -lm\n",
        ),
    );
    fx.pc("priv", &package("priv", "1", "Cflags: -Dpriv\nLibs: -lpriv\n"));

    fx.cmd()
        .args(["--libs", "app"])
        .assert()
        .success()
        .stdout("-lapp\n");

    fx.cmd()
        .args(["--libs", "--static", "app"])
        .assert()
        .success()
        .stdout("-lapp -lm -lpriv\n");

    fx.cmd()
        .args(["--cflags", "app"])
        .assert()
        .success()
        .stdout("-Dapp -Dpriv\n");
}

#[test]
fn dashdash_ends_options() {
    let fx = Fixture::new();
    fx.pc("--foo", &package("foo", "1", "Cflags: -Dfoo\n"));
    fx.pc("--", &package("dashdash", "1", "Cflags: -Ddashdash\n"));

    fx.cmd()
        .args(["--cflags", "--", "--foo", "--"])
        .assert()
        .success()
        .stdout("-Dfoo -Ddashdash\n");
}

#[test]
fn with_path_searched_first() {
    let fx = Fixture::new();
    let first = tempfile::tempdir().unwrap();
    fx.pc("dup", &package("dup", "1", "Cflags: -Dlibdir\n"));
    fs::write(
        first.path().join("dup.pc"),
        package("dup", "2", "Cflags: -Dwithpath\n"),
    )
    .unwrap();

    fx.cmd()
        .arg("--with-path")
        .arg(first.path())
        .args(["--cflags", "dup"])
        .assert()
        .success()
        .stdout("-Dwithpath\n");
}

#[test]
fn with_path_accepts_delimited_list() {
    let fx = Fixture::new();
    let first = tempfile::tempdir().unwrap();
    let second = tempfile::tempdir().unwrap();
    fx.pc("dup", &package("dup", "1", "Cflags: -Dlibdir\n"));
    fs::write(
        first.path().join("only-first.pc"),
        package("only-first", "1", "Cflags: -Dfirst\n"),
    )
    .unwrap();
    fs::write(
        second.path().join("dup.pc"),
        package("dup", "2", "Cflags: -Dsecond\n"),
    )
    .unwrap();

    let both = std::env::join_paths([first.path(), second.path()]).unwrap();
    fx.cmd()
        .arg("--with-path")
        .arg(&both)
        .args(["--cflags", "only-first", "dup"])
        .assert()
        .success()
        .stdout("-Dfirst -Dsecond\n");
}

// ============================================================================
// System directories and syntax
// ============================================================================

#[test]
fn system_directories_filtered() {
    let fx = Fixture::new();
    fx.pc(
        "sys",
        &package(
            "sys",
            "1",
            "Cflags: -I/usr/include -I/opt/sys/include\nLibs: -L/usr/lib -L/opt/sys/lib -lsys\n",
        ),
    );

    fx.cmd()
        .args(["--cflags", "--libs", "sys"])
        .assert()
        .success()
        .stdout("-I/opt/sys/include -L/opt/sys/lib -lsys\n");

    fx.cmd()
        .args(["--keep-system-cflags", "--keep-system-libs", "--cflags", "--libs", "sys"])
        .assert()
        .success()
        .stdout("-I/usr/include -I/opt/sys/include -L/usr/lib -L/opt/sys/lib -lsys\n");

    fx.cmd()
        .env("PKG_CONFIG_ALLOW_SYSTEM_CFLAGS", "")
        .args(["--cflags", "sys"])
        .assert()
        .success()
        .stdout("-I/usr/include -I/opt/sys/include\n");
}

#[test]
fn custom_system_paths() {
    let fx = Fixture::new();
    fx.pc("c", &package("c", "1", "Cflags: -I/usr/include -I/sys/inc\n"));

    fx.cmd()
        .env("PKG_CONFIG_SYSTEM_INCLUDE_PATH", "/sys/inc")
        .args(["--cflags", "c"])
        .assert()
        .success()
        .stdout("-I/usr/include\n");
}

#[test]
fn msvc_syntax() {
    let fx = Fixture::new();
    fx.pc(
        "m",
        &package("m", "1", "Cflags: -I/opt/m -DM\nLibs: -L/opt/m/lib -lm -pthread\n"),
    );

    fx.cmd()
        .args(["--msvc-syntax", "--cflags", "--libs", "m"])
        .assert()
        .success()
        .stdout("/I/opt/m /DM /libpath:/opt/m/lib m.lib -pthread\n");
}

#[test]
fn quoted_arguments_round_trip() {
    let fx = Fixture::new();
    fx.pc(
        "q",
        &package("q", "1", "Cflags: -I\"/opt/my dir/include\" '-DNAME=\"x\"'\n"),
    );

    fx.cmd()
        .args(["--cflags", "q"])
        .assert()
        .success()
        .stdout("-I/opt/my\\ dir/include -DNAME=\\\"x\\\"\n");
}

#[test]
fn empty_quoted_arguments_are_dropped() {
    let fx = Fixture::new();
    fx.pc("e", &package("e", "1", "Cflags: -DA '' \"\" -DB\nLibs: '' -le\n"));

    fx.cmd()
        .args(["--cflags", "--libs", "e"])
        .assert()
        .success()
        .stdout("-DA -DB -le\n");
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn missing_package_named_in_error() {
    let fx = Fixture::new();
    fx.cmd()
        .args(["--cflags", "nonexistingpkg"])
        .assert()
        .failure()
        .stdout("")
        .stderr(predicate::str::contains("nonexistingpkg"));
}

#[test]
fn silence_errors() {
    let fx = Fixture::new();
    fx.cmd()
        .args(["--silence-errors", "--cflags", "nonexistingpkg"])
        .assert()
        .failure()
        .stderr("");
}

#[test]
fn errors_to_stdout() {
    let fx = Fixture::new();
    fx.cmd()
        .args(["--errors-to-stdout", "--cflags", "nonexistingpkg"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("nonexistingpkg"))
        .stderr("");
}

#[test]
fn no_packages() {
    let fx = Fixture::new();
    fx.cmd()
        .arg("--cflags")
        .assert()
        .failure()
        .stderr(predicate::str::contains("requires at least one package name"));
}

#[test]
fn option_errors() {
    let fx = Fixture::new();
    fx.cmd()
        .arg("--bogus")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown option --bogus"));

    fx.cmd()
        .arg("--variable")
        .assert()
        .failure()
        .stderr(predicate::str::contains("argument missing for --variable"));

    fx.cmd()
        .args(["--define-variable=novalue", "--cflags", "x"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("novalue"));
}

#[test]
fn validate() {
    let fx = Fixture::new();
    fx.pc("good", &package("good", "1", "Requires: not-installed\n"));
    fx.pc("bad", "Name: bad\nVersion: 1\n");

    fx.cmd().args(["--validate", "good"]).assert().success();
    fx.cmd()
        .args(["--validate", "bad"])
        .assert()
        .failure()
        .stderr("");
}
