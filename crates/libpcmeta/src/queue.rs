//! Dependency graph traversal.
//!
//! A [`Queue`] consumes requirement lists (command-line arguments, then each
//! package's `Requires` and `Requires.private`) and loads every package they
//! reach into a [`Cache`]. A requirement list is a sequence of package names,
//! each optionally followed by a comparison operator and a version:
//!
//! ```text
//! glib-2.0 >= 2.50, gio-2.0 zlib
//! ```
//!
//! Traversal uses an explicit, fixed-depth stack rather than recursion, so a
//! deep or cyclic requirement graph fails with a diagnostic instead of
//! overflowing. Each package is loaded once; reaching it again only merges
//! flags. A package first reached privately and later publicly is promoted,
//! and its public requirements are walked again so they are promoted too.
//!
//! # Example
//!
//! ```rust
//! use libpcmeta::client::Client;
//! use libpcmeta::loader::MemoryLoader;
//! use libpcmeta::queue::Queue;
//!
//! let loader = MemoryLoader::new()
//!     .with_file("/pc/a.pc", "Name: a\nVersion: 1\nDescription:\nRequires: b\n")
//!     .with_file("/pc/b.pc", "Name: b\nVersion: 2\nDescription:\n");
//! let client = Client::builder().skip_env(true).fixed_path("/pc").loader(loader).build();
//!
//! let mut arena = client.new_arena();
//! let mut queue = Queue::new(&client);
//! queue.push(&mut arena, "a").unwrap();
//! let packages = queue.finish().unwrap();
//! assert_eq!(packages.ids(), ["a", "b"]);
//! ```

use crate::arena::Arena;
use crate::cache::{Cache, PackageId};
use crate::client::{Client, ClientFlags};
use crate::error::{Error, Result};
use crate::path;
use crate::pkg::{Package, PackageFlags};
use crate::version::Comparator;

/// Maximum number of requirement lists being walked at once.
pub const MAX_TRAVERSAL_STACK: usize = 64;

/// Which text a frame is walking.
#[derive(Debug)]
enum Source {
    Arg(String),
    Requires(PackageId),
    RequiresPrivate(PackageId),
}

/// Progress through one requirement list.
#[derive(Debug)]
struct Frame {
    source: Source,
    pos: usize,
    /// The most recent package named in this list, target of an operator.
    last: Option<PackageId>,
    /// An operator waiting for its version token.
    op: Option<Comparator>,
    depth: usize,
    flags: PackageFlags,
}

impl Frame {
    fn new(source: Source, depth: usize, flags: PackageFlags) -> Self {
        Self {
            source,
            pos: 0,
            last: None,
            op: None,
            depth,
            flags,
        }
    }
}

/// Resolves requirement lists into a [`Cache`] of loaded packages.
#[derive(Debug)]
pub struct Queue<'c> {
    client: &'c Client,
    cache: Cache,
    /// Pending package and operator carried between command-line arguments,
    /// so `"a" ">=" "1"` passed as three arguments reads like `"a >= 1"`.
    last: Option<PackageId>,
    op: Option<Comparator>,
}

impl<'c> Queue<'c> {
    pub fn new(client: &'c Client) -> Self {
        Self {
            client,
            cache: Cache::new(),
            last: None,
            op: None,
        }
    }

    /// The packages resolved so far.
    pub fn cache(&self) -> &Cache {
        &self.cache
    }

    /// Resolve one command-line argument.
    ///
    /// Packages named directly are flagged [`PackageFlags::DIRECT`] and
    /// [`PackageFlags::PUBLIC`]; their requirements are then walked unless
    /// recursion is disabled or the depth limit is reached.
    pub fn push(&mut self, arena: &mut Arena, arg: &str) -> Result<()> {
        let client = self.client;
        let recursive = !client.flags().contains(ClientFlags::SKIP_REQUIRES);
        let check_versions = !client.flags().contains(ClientFlags::IGNORE_VERSIONS);
        let max_depth = client.max_traversal_depth();

        let mut root = Frame::new(
            Source::Arg(arg.to_string()),
            0,
            PackageFlags::DIRECT.set(PackageFlags::PUBLIC),
        );
        root.last = self.last;
        root.op = self.op;
        let mut stack = Vec::with_capacity(MAX_TRAVERSAL_STACK);
        stack.push(root);

        while let Some(top) = stack.len().checked_sub(1) {
            let frame = &stack[top];
            let text = match &frame.source {
                Source::Arg(s) => s.as_str(),
                Source::Requires(id) => self.cache.get(*id).requires(),
                Source::RequiresPrivate(id) => self.cache.get(*id).requires_private(),
            };

            let Some((start, end)) = next_token(text, frame.pos) else {
                let Some(done) = stack.pop() else { break };
                if top == 0 {
                    self.last = done.last;
                    self.op = done.op;
                } else if let Some(op) = done.op {
                    return Err(Error::MissingVersion {
                        op,
                        package: done.last.map(|id| self.cache.get(id).realname.clone()),
                    });
                }
                continue;
            };
            let tok = text[start..end].to_string();
            let frame = &mut stack[top];
            frame.pos = end;

            if let Some(op) = frame.op.take() {
                if let (true, Some(id)) = (check_versions, frame.last) {
                    self.cache.get(id).check_version(op, &tok)?;
                }
                frame.last = None;
                continue;
            }

            if let Some(op) = Comparator::from_token(&tok) {
                if frame.last.is_none() {
                    return Err(Error::UnexpectedOperator { token: tok });
                }
                frame.op = Some(op);
                continue;
            }

            let depth = frame.depth + 1;
            let flags = frame.flags;
            let public_flags = flags.clear(PackageFlags::DIRECT);
            let walk = recursive && depth < max_depth;

            let id = match self.cache.find(path::realname(&tok)) {
                Some(id) => {
                    frame.last = Some(id);
                    let pkg = self.cache.get_mut(id);
                    if flags.contains(PackageFlags::PUBLIC) && !pkg.is_public() {
                        log::debug!("promoting '{}' to public", pkg.realname);
                        pkg.flags = pkg.flags.set(PackageFlags::PUBLIC);
                        if walk {
                            if stack.len() >= MAX_TRAVERSAL_STACK {
                                return Err(Error::TraversalDepthExceeded { token: tok });
                            }
                            stack.push(Frame::new(Source::Requires(id), depth, public_flags));
                        }
                    }
                    id
                }
                None => {
                    let pkg = Package::find(client, arena, &tok)?;
                    let id = self.cache.insert(pkg);
                    frame.last = Some(id);
                    if walk {
                        if stack.len() + 2 > MAX_TRAVERSAL_STACK {
                            return Err(Error::TraversalDepthExceeded { token: tok });
                        }
                        stack.push(Frame::new(
                            Source::RequiresPrivate(id),
                            depth,
                            PackageFlags::NONE,
                        ));
                        stack.push(Frame::new(Source::Requires(id), depth, public_flags));
                    }
                    id
                }
            };

            self.cache.merge_flags(id, flags);
        }

        Ok(())
    }

    /// Finish resolution and hand over the resolved packages.
    ///
    /// Fails if the last argument ended with a dangling operator, or if no
    /// package was named at all.
    pub fn finish(self) -> Result<Cache> {
        if let Some(op) = self.op {
            return Err(Error::MissingVersion { op, package: None });
        }
        if self.cache.is_empty() {
            return Err(Error::NoPackages);
        }
        debug_assert!(self.cache.is_consistent());
        Ok(self.cache)
    }
}

/// Locate the next token in a requirement list at or after `pos`.
///
/// Tokens are separated by whitespace and commas.
fn next_token(text: &str, pos: usize) -> Option<(usize, usize)> {
    let b = text.as_bytes();
    let is_sep = |c: u8| c == b',' || crate::quote::is_whitespace_byte(c);
    let start = pos + b.get(pos..)?.iter().take_while(|&&c| is_sep(c)).count();
    if start >= b.len() {
        return None;
    }
    let end = start + b[start..].iter().take_while(|&&c| !is_sep(c)).count();
    Some((start, end))
}

/// Parse a traversal depth limit from the decimal digits of `s`,
/// saturating at `limit`.
///
/// Non-digits are skipped; no digits means 0.
pub fn parse_depth(s: &str, limit: usize) -> usize {
    let mut v: usize = 0;
    for c in s.bytes() {
        if !c.is_ascii_digit() {
            continue;
        }
        v = v * 10 + usize::from(c - b'0');
        if v >= limit {
            return limit;
        }
    }
    v
}
