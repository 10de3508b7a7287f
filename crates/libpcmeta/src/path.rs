//! Search path management and path helpers for `.pc` file discovery.
//!
//! This module provides the [`SearchPath`] type, an ordered list of
//! directories searched when resolving a package name to a `.pc` file, plus
//! the small string helpers the resolver uses on paths.
//!
//! Paths are kept as plain strings and never normalized: a candidate file is
//! always `dir + "/" + realname + ".pc"`, so the path reported in diagnostics
//! and exposed as `pcfiledir` is exactly what the user configured. Both `/`
//! and `\` are treated as directory separators on every platform.

/// The delimiter used in environment variables like `PKG_CONFIG_PATH`.
///
/// On Unix systems this is `:`, on Windows it is `;`.
#[cfg(not(windows))]
pub const PATH_SEPARATOR: char = ':';

#[cfg(windows)]
pub const PATH_SEPARATOR: char = ';';

/// An ordered list of directories to search for `.pc` files.
///
/// Directories are searched in order, and the first match wins.
///
/// # Examples
///
/// ```
/// use libpcmeta::path::SearchPath;
///
/// let mut sp = SearchPath::new();
/// sp.add("/usr/lib/pkgconfig");
/// sp.add("/usr/share/pkgconfig");
/// assert_eq!(sp.len(), 2);
///
/// // Parse from a colon-delimited string
/// let sp2 = SearchPath::from_delimited("/opt/lib/pkgconfig:/opt/share/pkgconfig", ':');
/// assert_eq!(sp2.len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchPath {
    dirs: Vec<String>,
}

impl SearchPath {
    /// Create an empty search path.
    pub fn new() -> Self {
        Self { dirs: Vec::new() }
    }

    /// Parse a search path from a delimited string.
    ///
    /// Empty segments are silently skipped.
    ///
    /// ```
    /// use libpcmeta::path::SearchPath;
    ///
    /// let sp = SearchPath::from_delimited("/a::/b:", ':');
    /// assert_eq!(sp.dirs(), ["/a", "/b"]);
    /// ```
    pub fn from_delimited(s: &str, delimiter: char) -> Self {
        let mut sp = Self::new();
        sp.add_delimited(s, delimiter);
        sp
    }

    /// Add a directory to the end of the search path.
    pub fn add(&mut self, dir: &str) {
        if !dir.is_empty() {
            self.dirs.push(dir.to_string());
        }
    }

    /// Split a delimited string and add all resulting directories.
    pub fn add_delimited(&mut self, s: &str, delimiter: char) {
        for segment in s.split(delimiter) {
            self.add(segment);
        }
    }

    /// Split a delimited string and prepend all resulting directories.
    ///
    /// The first segment in the string becomes the first entry in the path,
    /// preserving the relative ordering.
    pub fn prepend_delimited(&mut self, s: &str, delimiter: char) {
        let mut merged = Self::from_delimited(s, delimiter).dirs;
        merged.append(&mut self.dirs);
        self.dirs = merged;
    }

    pub fn dirs(&self) -> &[String] {
        &self.dirs
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.dirs.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.dirs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dirs.is_empty()
    }

    /// Candidate file paths for `realname`, in search order.
    pub fn candidates<'a>(&'a self, realname: &'a str) -> impl Iterator<Item = String> + 'a {
        self.iter().map(move |dir| pc_file_path(dir, realname))
    }

    /// Join the directories back into one delimited string.
    pub fn to_delimited(&self, delimiter: char) -> String {
        let mut out = String::new();
        for (i, dir) in self.dirs.iter().enumerate() {
            if i > 0 {
                out.push(delimiter);
            }
            out.push_str(dir);
        }
        out
    }
}

/// Whether `c` separates directory components.
pub fn is_separator(c: char) -> bool {
    c == '/' || c == '\\'
}

/// Everything before the last separator, or `""` if there is none.
///
/// ```
/// use libpcmeta::path::dirname;
///
/// assert_eq!(dirname("/usr/lib/pkgconfig/zlib.pc"), "/usr/lib/pkgconfig");
/// assert_eq!(dirname("C:\\lib\\x.pc"), "C:\\lib");
/// assert_eq!(dirname("zlib.pc"), "");
/// ```
pub fn dirname(path: &str) -> &str {
    match path.rfind(is_separator) {
        Some(i) => &path[..i],
        None => "",
    }
}

/// Everything after the last separator.
pub fn basename(path: &str) -> &str {
    match path.rfind(is_separator) {
        Some(i) => &path[i + 1..],
        None => path,
    }
}

/// Whether a token names a `.pc` file directly rather than a package.
pub fn is_pc_path(token: &str) -> bool {
    token.len() > 3 && token.ends_with(".pc")
}

/// The package realname a token refers to.
///
/// A token ending in `.pc` is a path and its realname is the basename
/// without the extension; any other token is already a realname.
///
/// ```
/// use libpcmeta::path::realname;
///
/// assert_eq!(realname("/tmp/foo/bar.pc"), "bar");
/// assert_eq!(realname("zlib"), "zlib");
/// assert_eq!(realname(".pc"), ".pc");
/// ```
pub fn realname(token: &str) -> &str {
    if is_pc_path(token) {
        let base = basename(token);
        &base[..base.len() - 3]
    } else {
        token
    }
}

/// Build the path of `realname`'s `.pc` file inside `dir`.
pub fn pc_file_path(dir: &str, realname: &str) -> String {
    format!("{dir}/{realname}.pc")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_delimited_skips_empty() {
        let sp = SearchPath::from_delimited(":/a::/b:", ':');
        assert_eq!(sp.dirs(), ["/a", "/b"]);
        assert!(SearchPath::from_delimited("", ':').is_empty());
    }

    #[test]
    fn test_semicolon_delimiter_keeps_drive_letters() {
        let sp = SearchPath::from_delimited("C:/Foo/lib/pkgconfig;D:/Bar", ';');
        assert_eq!(sp.dirs(), ["C:/Foo/lib/pkgconfig", "D:/Bar"]);
    }

    #[test]
    fn test_prepend_delimited_preserves_order() {
        let mut sp = SearchPath::from_delimited("/c", ':');
        sp.prepend_delimited("/a:/b", ':');
        assert_eq!(sp.dirs(), ["/a", "/b", "/c"]);
    }

    #[test]
    fn test_candidates() {
        let sp = SearchPath::from_delimited("/x:/y/", ':');
        let c: Vec<String> = sp.candidates("foo").collect();
        assert_eq!(c, ["/x/foo.pc", "/y//foo.pc"]);
    }

    #[test]
    fn test_to_delimited() {
        let sp = SearchPath::from_delimited("/a:/b", ':');
        assert_eq!(sp.to_delimited(';'), "/a;/b");
    }

    #[test]
    fn test_dirname_basename() {
        assert_eq!(dirname("/a/b/c"), "/a/b");
        assert_eq!(basename("/a/b/c"), "c");
        assert_eq!(dirname("/c"), "");
        assert_eq!(basename("c"), "c");
        assert_eq!(dirname("a\\b/c"), "a\\b");
        assert_eq!(basename("a/b\\c"), "c");
    }

    #[test]
    fn test_realname() {
        assert_eq!(realname("foo.pc"), "foo");
        assert_eq!(realname("C:\\pkg\\foo.pc"), "foo");
        assert_eq!(realname("foo"), "foo");
        assert_eq!(realname("foo.pcx"), "foo.pcx");
    }

    #[test]
    fn test_is_pc_path() {
        assert!(is_pc_path("a.pc"));
        assert!(!is_pc_path(".pc"));
        assert!(!is_pc_path("apc"));
    }
}
