//! The set of packages resolved during one run.
//!
//! The [`Cache`] maps realnames to loaded [`Package`]s and remembers the
//! order in which packages were first reached. That order is significant:
//! flags are emitted package by package in first-seen order, so the cache
//! is both the de-duplication index and the output schedule. Packages named
//! on the command line are additionally remembered in the order they were
//! named, for per-package queries such as `--modversion`.

use std::collections::HashMap;

use crate::pkg::{Package, PackageFlags};

/// Index of a package within a [`Cache`].
pub type PackageId = usize;

/// An insertion-ordered collection of resolved packages keyed by realname.
#[derive(Debug, Clone, Default)]
pub struct Cache {
    /// Realname → position in `packages`.
    index: HashMap<String, PackageId>,

    /// Packages in first-seen order.
    packages: Vec<Package>,

    /// Directly requested packages in command-line order.
    direct: Vec<PackageId>,
}

impl Cache {
    /// Create a new, empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Find a package by realname.
    pub fn find(&self, realname: &str) -> Option<PackageId> {
        self.index.get(realname).copied()
    }

    /// Look up a package by realname.
    pub fn lookup(&self, realname: &str) -> Option<&Package> {
        self.find(realname).map(|id| &self.packages[id])
    }

    /// Add a newly loaded package at the end of the order.
    ///
    /// The realname must not already be present; callers check with
    /// [`Cache::find`] first.
    pub fn insert(&mut self, pkg: Package) -> PackageId {
        debug_assert!(
            self.find(&pkg.realname).is_none(),
            "'{}' inserted twice",
            pkg.realname
        );
        let id = self.packages.len();
        self.index.insert(pkg.realname.clone(), id);
        self.packages.push(pkg);
        id
    }

    pub fn get(&self, id: PackageId) -> &Package {
        &self.packages[id]
    }

    pub fn get_mut(&mut self, id: PackageId) -> &mut Package {
        &mut self.packages[id]
    }

    /// Merge resolution flags into a package.
    pub fn merge_flags(&mut self, id: PackageId, flags: PackageFlags) {
        let pkg = &mut self.packages[id];
        if flags.contains(PackageFlags::DIRECT) && !pkg.is_direct() {
            self.direct.push(id);
        }
        pkg.flags = pkg.flags.set(flags);
    }

    pub fn contains(&self, realname: &str) -> bool {
        self.index.contains_key(realname)
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    /// Iterate over packages in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = &Package> {
        self.packages.iter()
    }

    /// Packages named directly on the command line, in the order named.
    pub fn direct(&self) -> impl Iterator<Item = &Package> {
        self.direct.iter().map(|&id| &self.packages[id])
    }

    /// Realnames in first-seen order.
    pub fn ids(&self) -> Vec<&str> {
        self.packages.iter().map(|p| p.realname.as_str()).collect()
    }

    /// Whether the index and the ordered list agree.
    pub(crate) fn is_consistent(&self) -> bool {
        self.index.len() == self.packages.len()
            && self.direct.iter().all(|&id| self.packages[id].is_direct())
            && self
                .index
                .iter()
                .all(|(name, &id)| self.packages.get(id).is_some_and(|p| &p.realname == name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::Client;
    use crate::loader::MemoryLoader;
    use crate::pkg::PackageFlags;

    fn package(name: &str, version: &str) -> Package {
        let client = Client::builder()
            .skip_env(true)
            .fixed_path("/p")
            .loader(MemoryLoader::new())
            .build();
        let mut arena = client.new_arena();
        let src = format!("Name: {name}\nVersion: {version}\nDescription:\n");
        Package::from_source(&client, &mut arena, name, &format!("/p/{name}.pc"), &src).unwrap()
    }

    #[test]
    fn new_cache_is_empty() {
        let cache = Cache::new();
        assert!(cache.is_empty());
        assert_eq!(cache.len(), 0);
        assert!(cache.is_consistent());
    }

    #[test]
    fn insert_and_lookup() {
        let mut cache = Cache::new();
        let id = cache.insert(package("zlib", "1.3"));
        assert_eq!(cache.find("zlib"), Some(id));
        assert_eq!(cache.lookup("zlib").unwrap().version(), "1.3");
        assert!(cache.lookup("missing").is_none());
        assert!(cache.contains("zlib"));
    }

    #[test]
    fn preserves_first_seen_order() {
        let mut cache = Cache::new();
        cache.insert(package("c", "1"));
        cache.insert(package("a", "1"));
        cache.insert(package("b", "1"));
        assert_eq!(cache.ids(), ["c", "a", "b"]);
        assert!(cache.is_consistent());
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "inserted twice")]
    fn duplicate_insert_is_rejected() {
        let mut cache = Cache::new();
        cache.insert(package("a", "1"));
        cache.insert(package("a", "2"));
    }

    #[test]
    fn direct_in_request_order() {
        let mut cache = Cache::new();
        let a = cache.insert(package("a", "1"));
        let b = cache.insert(package("b", "1"));
        let c = cache.insert(package("c", "1"));
        cache.merge_flags(a, PackageFlags::DIRECT.set(PackageFlags::PUBLIC));
        cache.merge_flags(c, PackageFlags::DIRECT);
        cache.merge_flags(b, PackageFlags::PUBLIC);
        cache.merge_flags(b, PackageFlags::DIRECT);
        cache.merge_flags(c, PackageFlags::DIRECT);
        let direct: Vec<&str> = cache.direct().map(|p| p.realname.as_str()).collect();
        assert_eq!(direct, ["a", "c", "b"]);
        assert!(cache.get(b).is_public());
        assert!(cache.is_consistent());
    }
}
