//! Error types for libpcmeta.
//!
//! Every variant's `Display` output is the complete diagnostic text; the
//! command-line driver only adds the program tag in front of it.

use std::io;

use crate::version::Comparator;

/// Result type alias for libpcmeta operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while resolving packages.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The run's memory budget was exhausted.
    #[error("out of memory")]
    OutOfMemory,

    /// A variable was assigned twice in one `.pc` file.
    #[error("duplicate variable '{name}' in '{path}'")]
    DuplicateVariable { name: String, path: String },

    /// A field was assigned twice in one `.pc` file.
    #[error("duplicate field '{name}' in '{path}'")]
    DuplicateField { name: String, path: String },

    /// One of `Name`, `Version` or `Description` is absent.
    #[error("missing field '{field}' in '{path}'")]
    MissingField { field: &'static str, path: String },

    /// A requested package was not found on the search path.
    #[error("could not find package '{name}'")]
    PackageNotFound { name: String },

    /// A `.pc` file exists but could not be read.
    #[error("could not read package '{name}' from '{path}'")]
    PackageReadError {
        name: String,
        path: String,
        #[source]
        source: io::Error,
    },

    /// A `${name}` reference has no binding.
    #[error("undefined variable '{name}' in '{path}'")]
    UndefinedVariable { name: String, path: String },

    /// Variable expansion nested too deeply.
    #[error("exceeded max recursion depth in '{path}'")]
    ExpansionDepthExceeded { path: String },

    /// The dependency traversal stack overflowed.
    #[error("exceeded max recursion depth on '{token}'")]
    TraversalDepthExceeded { token: String },

    /// A flags field ended inside a quoted string.
    #[error("unmatched quote in '{package}'")]
    UnmatchedQuote { package: String },

    /// A version constraint was not satisfied.
    #[error("requested '{name}' {op} '{wanted}' but got '{found}'")]
    VersionMismatch {
        name: String,
        op: Comparator,
        wanted: String,
        found: String,
    },

    /// A comparison operator appeared with no package before it.
    #[error("unexpected operator '{token}'")]
    UnexpectedOperator { token: String },

    /// A comparison operator was not followed by a version.
    #[error("expected version following operator {op}{}", in_package(.package))]
    MissingVersion { op: Comparator, package: Option<String> },

    /// An unrecognized command-line option.
    #[error("unknown option {option}")]
    UnknownOption { option: String },

    /// A command-line option that takes a value was given none.
    #[error("argument missing for {option}")]
    MissingArgument { option: String },

    /// A `--define-variable` argument without `=`.
    #[error("value missing in --define-variable for '{definition}'")]
    InvalidDefinition { definition: String },

    /// Nothing was resolved because no package was named.
    #[error("requires at least one package name")]
    NoPackages,
}

fn in_package(package: &Option<String>) -> String {
    match package {
        Some(name) => format!(" in package '{name}'"),
        None => String::new(),
    }
}
