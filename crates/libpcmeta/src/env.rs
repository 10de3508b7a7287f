//! Variable bindings.
//!
//! Two tiers of bindings exist during a run: one global [`Env`] built from
//! the configuration and `--define-variable`, and one local `Env` per
//! package holding that file's own assignments. Lookups consult the global
//! tier first, so the command line can override anything a `.pc` file
//! defines.

use std::collections::HashMap;

/// A name → value map of variables.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Env {
    vars: HashMap<String, String>,
}

impl Env {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `name` only if it is not bound yet.
    ///
    /// Returns `false`, leaving the existing value untouched, when `name`
    /// was already bound.
    pub fn define(&mut self, name: &str, value: impl Into<String>) -> bool {
        if self.vars.contains_key(name) {
            return false;
        }
        self.vars.insert(name.to_string(), value.into());
        true
    }

    /// Bind `name`, replacing any previous value.
    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        self.vars.insert(name.to_string(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.vars.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// Variable names in sorted order.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.vars.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

/// Look `name` up in `global`, then in `local`.
pub fn lookup<'a>(global: &'a Env, local: &'a Env, name: &str) -> Option<&'a str> {
    global.get(name).or_else(|| local.get(name))
}
