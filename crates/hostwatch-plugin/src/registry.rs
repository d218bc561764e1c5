// SPDX-FileCopyrightText: 2026 Hostwatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Name-to-constructor registries, one per plugin kind.
//!
//! A [`Registries`] value is built once at startup and then only read, so
//! lookups need no synchronization. Every instantiation runs the constructor
//! again and yields an independent instance.

use std::collections::HashMap;

use hostwatch_core::{Executor, HostwatchError, PluginKind, Reader};
use hostwatch_writers::Writer;
use tracing::debug;

/// Builds a fresh, unconfigured plugin instance.
pub type Constructor<T> = Box<dyn Fn() -> Box<T> + Send + Sync>;

struct RegistryEntry<T: ?Sized> {
    description: String,
    constructor: Constructor<T>,
}

/// Registry of constructors for one plugin kind.
pub struct Registry<T: ?Sized> {
    kind: PluginKind,
    entries: HashMap<String, RegistryEntry<T>>,
}

impl<T: ?Sized> std::fmt::Debug for Registry<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("kind", &self.kind)
            .field("names", &self.names())
            .finish()
    }
}

impl<T: ?Sized> Registry<T> {
    /// Create a new empty registry.
    pub fn new(kind: PluginKind) -> Self {
        Self {
            kind,
            entries: HashMap::new(),
        }
    }

    pub fn kind(&self) -> PluginKind {
        self.kind
    }

    /// Register a constructor under `name`.
    pub fn register<F>(&mut self, name: impl Into<String>, constructor: F) -> Result<(), HostwatchError>
    where
        F: Fn() -> Box<T> + Send + Sync + 'static,
    {
        self.register_with_description(name, "", constructor)
    }

    /// Register a constructor together with a one-line description.
    ///
    /// Fails with [`HostwatchError::RegistryCollision`] if the name is taken;
    /// the existing entry is kept.
    pub fn register_with_description<F>(
        &mut self,
        name: impl Into<String>,
        description: impl Into<String>,
        constructor: F,
    ) -> Result<(), HostwatchError>
    where
        F: Fn() -> Box<T> + Send + Sync + 'static,
    {
        let name = name.into();
        if self.entries.contains_key(&name) {
            return Err(HostwatchError::RegistryCollision {
                kind: self.kind,
                name,
            });
        }
        debug!(kind = %self.kind, name = %name, "plugin registered");
        self.entries.insert(
            name,
            RegistryEntry {
                description: description.into(),
                constructor: Box::new(constructor),
            },
        );
        Ok(())
    }

    /// Build a new instance of the named plugin.
    pub fn instantiate(&self, name: &str) -> Result<Box<T>, HostwatchError> {
        self.entries
            .get(name)
            .map(|entry| (entry.constructor)())
            .ok_or_else(|| HostwatchError::PluginNotFound {
                kind: self.kind,
                name: name.to_string(),
            })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// `(name, description)` pairs, sorted by name.
    pub fn describe(&self) -> Vec<(&str, &str)> {
        let mut entries: Vec<(&str, &str)> = self
            .entries
            .iter()
            .map(|(name, entry)| (name.as_str(), entry.description.as_str()))
            .collect();
        entries.sort_unstable_by_key(|(name, _)| *name);
        entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The three per-kind registries the agent resolves plugin names against.
#[derive(Debug)]
pub struct Registries {
    pub readers: Registry<dyn Reader>,
    pub writers: Registry<dyn Writer>,
    pub executors: Registry<dyn Executor>,
}

impl Default for Registries {
    fn default() -> Self {
        Self::new()
    }
}

impl Registries {
    /// Empty registries.
    pub fn new() -> Self {
        Self {
            readers: Registry::new(PluginKind::Reader),
            writers: Registry::new(PluginKind::Writer),
            executors: Registry::new(PluginKind::Executor),
        }
    }

    /// Registries holding every compiled-in plugin.
    pub fn with_builtins() -> Result<Self, HostwatchError> {
        let mut registries = Self::new();
        crate::builtin::register_builtins(&mut registries)?;
        Ok(registries)
    }

    /// Sorted names registered for `kind`.
    pub fn names(&self, kind: PluginKind) -> Vec<&str> {
        match kind {
            PluginKind::Reader => self.readers.names(),
            PluginKind::Writer => self.writers.names(),
            PluginKind::Executor => self.executors.names(),
        }
    }

    /// Sorted `(name, description)` pairs registered for `kind`.
    pub fn describe(&self, kind: PluginKind) -> Vec<(&str, &str)> {
        match kind {
            PluginKind::Reader => self.readers.describe(),
            PluginKind::Writer => self.writers.describe(),
            PluginKind::Executor => self.executors.describe(),
        }
    }
}
