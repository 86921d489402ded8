//! PCache Cache Engine
//!
//! The addressable store: namespace -> structure -> structure instance ->
//! timeseries payload. Every identifier is checked against its grammar
//! before any lookup, and preconditions are checked in a fixed order
//! (namespace, then structure, then instance) so the first failing one is
//! the one reported.
//!
//! A single read-write lock guards the whole store. Mutations hold the
//! write lock across their entire precondition chain, so they either apply
//! completely or not at all.
//!
//! @version 0.1.0
//! @author AutomataNexus Development Team

use crate::identifier;
use crate::matcher;
use crate::structure::Structure;
use parking_lot::RwLock;
use pcache_common::{EngineConfig, PCacheError, Result, Subject, Violation};
use std::collections::HashMap;
use std::sync::Arc;

// =============================================================================
// Store Layout
// =============================================================================

struct StructureEntry<P> {
    structure: Structure,
    instances: HashMap<String, Arc<P>>,
}

struct Namespace<P> {
    structures: HashMap<String, StructureEntry<P>>,
}

impl<P> Namespace<P> {
    fn new() -> Self {
        Self {
            structures: HashMap::new(),
        }
    }

    fn resolve(&self, name: &str) -> Result<&StructureEntry<P>> {
        check_name(Subject::Structure, name)?;
        self.structures
            .get(name)
            .ok_or_else(|| reject(Subject::Structure, name, Violation::DoesNotExist))
    }

    fn resolve_mut(&mut self, name: &str) -> Result<&mut StructureEntry<P>> {
        check_name(Subject::Structure, name)?;
        self.structures
            .get_mut(name)
            .ok_or_else(|| reject(Subject::Structure, name, Violation::DoesNotExist))
    }
}

type NamespaceMap<P> = HashMap<String, Namespace<P>>;

fn reject(subject: Subject, name: &str, violation: Violation) -> PCacheError {
    tracing::warn!(%subject, name, %violation, "precondition failed");
    PCacheError::validation(subject, name, violation)
}

fn check_name(subject: Subject, name: &str) -> Result<()> {
    if identifier::is_valid_name(name) {
        Ok(())
    } else {
        Err(reject(subject, name, Violation::InvalidFormat))
    }
}

fn resolve_namespace<'a, P>(namespaces: &'a NamespaceMap<P>, name: &str) -> Result<&'a Namespace<P>> {
    check_name(Subject::Namespace, name)?;
    namespaces
        .get(name)
        .ok_or_else(|| reject(Subject::Namespace, name, Violation::DoesNotExist))
}

fn resolve_namespace_mut<'a, P>(
    namespaces: &'a mut NamespaceMap<P>,
    name: &str,
) -> Result<&'a mut Namespace<P>> {
    check_name(Subject::Namespace, name)?;
    namespaces
        .get_mut(name)
        .ok_or_else(|| reject(Subject::Namespace, name, Violation::DoesNotExist))
}

/// Grammar check, then canonical form used as the instance map key.
fn instance_key(instance: &str) -> Result<String> {
    if !identifier::is_valid_instance(instance) {
        return Err(reject(
            Subject::StructureInstance,
            instance,
            Violation::InvalidFormat,
        ));
    }
    matcher::canonicalize(instance)
}

// =============================================================================
// Cache Engine
// =============================================================================

/// In-memory store of timeseries payloads of type `P`.
pub struct CacheEngine<P> {
    config: EngineConfig,
    namespaces: RwLock<NamespaceMap<P>>,
    stats: RwLock<EngineStats>,
}

impl<P> CacheEngine<P> {
    /// Create an empty engine with default limits.
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    /// Create an empty engine with custom limits.
    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            config,
            namespaces: RwLock::new(HashMap::new()),
            stats: RwLock::new(EngineStats::default()),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Drop every namespace, structure and instance.
    pub fn reset(&self) {
        let mut namespaces = self.namespaces.write();
        let dropped = namespaces.len();
        namespaces.clear();
        tracing::info!(namespaces = dropped, "cache reset");
    }

    // -------------------------------------------------------------------------
    // Namespace Management
    // -------------------------------------------------------------------------

    /// Create an empty namespace.
    pub fn add_namespace(&self, name: &str) -> Result<()> {
        {
            let mut namespaces = self.namespaces.write();

            check_name(Subject::Namespace, name)?;
            if namespaces.contains_key(name) {
                return Err(reject(Subject::Namespace, name, Violation::AlreadyExists));
            }
            if namespaces.len() >= self.config.max_namespaces {
                return Err(PCacheError::ResourceExhausted(format!(
                    "namespace limit of {} reached",
                    self.config.max_namespaces
                )));
            }

            namespaces.insert(name.to_string(), Namespace::new());
        }

        self.stats.write().namespaces_created += 1;
        tracing::info!(namespace = name, "namespace created");
        Ok(())
    }

    /// Move every structure of `old` under `new`; `old` stops resolving.
    pub fn rename_namespace(&self, old: &str, new: &str) -> Result<()> {
        {
            let mut namespaces = self.namespaces.write();

            check_name(Subject::Namespace, old)?;
            if !namespaces.contains_key(old) {
                return Err(reject(Subject::Namespace, old, Violation::DoesNotExist));
            }
            check_name(Subject::Namespace, new)?;
            if namespaces.contains_key(new) {
                return Err(reject(Subject::Namespace, new, Violation::AlreadyExists));
            }

            if let Some(namespace) = namespaces.remove(old) {
                namespaces.insert(new.to_string(), namespace);
            }
        }

        self.stats.write().namespaces_renamed += 1;
        tracing::info!(from = old, to = new, "namespace renamed");
        Ok(())
    }

    /// Check if a namespace exists.
    pub fn namespace_exists(&self, name: &str) -> bool {
        self.namespaces.read().contains_key(name)
    }

    /// List namespace names in sorted order.
    pub fn list_namespaces(&self) -> Vec<String> {
        let mut names: Vec<String> = self.namespaces.read().keys().cloned().collect();
        names.sort();
        names
    }

    // -------------------------------------------------------------------------
    // Structure Management
    // -------------------------------------------------------------------------

    /// Define a structure in `namespace` from a comma-separated key list.
    pub fn add_structure(&self, namespace: &str, name: &str, definition: &str) -> Result<()> {
        let canonical = {
            let mut namespaces = self.namespaces.write();
            let ns = resolve_namespace_mut(&mut *namespaces, namespace)?;

            check_name(Subject::Structure, name)?;
            if ns.structures.contains_key(name) {
                return Err(reject(Subject::Structure, name, Violation::AlreadyExists));
            }
            if !identifier::is_valid_key_list(definition) {
                return Err(reject(
                    Subject::StructureDefinition,
                    definition,
                    Violation::InvalidFormat,
                ));
            }
            if ns.structures.len() >= self.config.max_structures_per_namespace {
                return Err(PCacheError::ResourceExhausted(format!(
                    "structure limit of {} reached in namespace '{}'",
                    self.config.max_structures_per_namespace, namespace
                )));
            }

            let structure = Structure::new(name, definition)?;
            let canonical = structure.definition();
            ns.structures.insert(
                name.to_string(),
                StructureEntry {
                    structure,
                    instances: HashMap::new(),
                },
            );
            canonical
        };

        self.stats.write().structures_created += 1;
        tracing::info!(namespace, structure = name, keys = %canonical, "structure created");
        Ok(())
    }

    /// Rename a structure; its keys and instances are kept.
    pub fn rename_structure(&self, namespace: &str, old: &str, new: &str) -> Result<()> {
        {
            let mut namespaces = self.namespaces.write();
            let ns = resolve_namespace_mut(&mut *namespaces, namespace)?;

            ns.resolve(old)?;
            check_name(Subject::Structure, new)?;
            if ns.structures.contains_key(new) {
                return Err(reject(Subject::Structure, new, Violation::AlreadyExists));
            }

            if let Some(mut entry) = ns.structures.remove(old) {
                entry.structure.rename(new);
                ns.structures.insert(new.to_string(), entry);
            }
        }

        self.stats.write().structures_renamed += 1;
        tracing::info!(namespace, from = old, to = new, "structure renamed");
        Ok(())
    }

    /// Get a structure definition.
    pub fn get_structure(&self, namespace: &str, name: &str) -> Result<Structure> {
        let namespaces = self.namespaces.read();
        let entry = resolve_namespace(&*namespaces, namespace)?.resolve(name)?;
        Ok(entry.structure.clone())
    }

    /// List structure names of a namespace in sorted order.
    pub fn list_structures(&self, namespace: &str) -> Result<Vec<String>> {
        let namespaces = self.namespaces.read();
        let ns = resolve_namespace(&*namespaces, namespace)?;
        let mut names: Vec<String> = ns.structures.keys().cloned().collect();
        names.sort();
        Ok(names)
    }

    // -------------------------------------------------------------------------
    // Structure Instances
    // -------------------------------------------------------------------------

    /// Store `payload` under the canonical form of `instance`. The instance
    /// must assign exactly the structure's keys.
    pub fn add_structure_instance(
        &self,
        namespace: &str,
        structure: &str,
        instance: &str,
        payload: P,
    ) -> Result<()> {
        let key = {
            let mut namespaces = self.namespaces.write();
            let entry = resolve_namespace_mut(&mut *namespaces, namespace)?.resolve_mut(structure)?;

            let key = instance_key(instance)?;
            if entry.instances.contains_key(&key) {
                return Err(reject(
                    Subject::StructureInstance,
                    instance,
                    Violation::AlreadyExists,
                ));
            }
            if !entry.structure.contains_instance(&key) {
                return Err(reject(
                    Subject::StructureInstance,
                    instance,
                    Violation::KeyMismatch,
                ));
            }
            if entry.instances.len() >= self.config.max_instances_per_structure {
                return Err(PCacheError::ResourceExhausted(format!(
                    "instance limit of {} reached in structure '{}'",
                    self.config.max_instances_per_structure, structure
                )));
            }

            entry.instances.insert(key.clone(), Arc::new(payload));
            key
        };

        self.stats.write().instances_added += 1;
        tracing::info!(namespace, structure, instance = %key, "structure instance added");
        Ok(())
    }

    /// Get the payload stored for an instance, in any key order.
    pub fn get_timeseries(&self, namespace: &str, structure: &str, instance: &str) -> Result<Arc<P>> {
        let result = self.lookup(namespace, structure, instance);

        let mut stats = self.stats.write();
        stats.lookups += 1;
        if matches!(result, Err(PCacheError::NotFound { .. })) {
            stats.lookup_misses += 1;
        }

        result
    }

    fn lookup(&self, namespace: &str, structure: &str, instance: &str) -> Result<Arc<P>> {
        let namespaces = self.namespaces.read();
        let entry = resolve_namespace(&*namespaces, namespace)?.resolve(structure)?;
        let key = instance_key(instance)?;

        tracing::debug!(namespace, structure, instance = %key, "timeseries lookup");
        entry
            .instances
            .get(&key)
            .cloned()
            .ok_or_else(|| PCacheError::not_found(Subject::StructureInstance, key))
    }

    /// Check if an instance is stored, in any key order.
    pub fn contains_instance(&self, namespace: &str, structure: &str, instance: &str) -> Result<bool> {
        match self.lookup(namespace, structure, instance) {
            Ok(_) => Ok(true),
            Err(PCacheError::NotFound { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// List canonical instance keys of a structure in sorted order.
    pub fn list_instances(&self, namespace: &str, structure: &str) -> Result<Vec<String>> {
        let namespaces = self.namespaces.read();
        let entry = resolve_namespace(&*namespaces, namespace)?.resolve(structure)?;
        let mut keys: Vec<String> = entry.instances.keys().cloned().collect();
        keys.sort();
        Ok(keys)
    }

    // -------------------------------------------------------------------------
    // Statistics
    // -------------------------------------------------------------------------

    /// Get engine statistics.
    pub fn stats(&self) -> EngineStats {
        self.stats.read().clone()
    }

    /// Reset statistics.
    pub fn reset_stats(&self) {
        *self.stats.write() = EngineStats::default();
    }
}

impl<P> Default for CacheEngine<P> {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Engine Statistics
// =============================================================================

/// Counters of successful mutations and of lookups.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EngineStats {
    pub namespaces_created: u64,
    pub namespaces_renamed: u64,
    pub structures_created: u64,
    pub structures_renamed: u64,
    pub instances_added: u64,
    pub lookups: u64,
    pub lookup_misses: u64,
}

// =============================================================================
// Tests
// =============================================================================
