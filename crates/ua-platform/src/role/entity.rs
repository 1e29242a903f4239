//! Role and Module Entities
//!
//! A role groups modules, each module holds a set of permission strings,
//! and a role may reference child roles by name. Merge helpers only ever
//! union into or subtract from the nested collections.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use utoipa::ToSchema;

/// Named permission bucket within a role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Module {
    pub name: String,

    /// Opaque capability identifiers
    #[serde(default)]
    pub permissions: BTreeSet<String>,
}

impl Module {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            permissions: BTreeSet::new(),
        }
    }

    pub fn with_permissions(mut self, permissions: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.grant(permissions);
        self
    }

    /// Union `permissions` into the module.
    pub fn grant(&mut self, permissions: impl IntoIterator<Item = impl Into<String>>) {
        self.permissions.extend(permissions.into_iter().map(Into::into));
    }

    /// Remove exact matches; absent permissions are ignored.
    pub fn revoke<S: AsRef<str>>(&mut self, permissions: &[S]) {
        for permission in permissions {
            self.permissions.remove(permission.as_ref());
        }
    }

    pub fn name_matches_ignore_case(&self, name: &str) -> bool {
        self.name.to_lowercase() == name.to_lowercase()
    }
}

/// Role definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    /// Unique key
    pub name: String,

    #[serde(default)]
    pub modules: Vec<Module>,

    /// Names of other roles this role includes
    #[serde(default)]
    pub child_roles: BTreeSet<String>,
}

impl Role {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            modules: Vec::new(),
            child_roles: BTreeSet::new(),
        }
    }

    pub fn with_module(mut self, module: Module) -> Self {
        self.add_module(module);
        self
    }

    pub fn add_child_roles(&mut self, names: impl IntoIterator<Item = impl Into<String>>) {
        self.child_roles.extend(names.into_iter().map(Into::into));
    }

    /// Append a module. Names are not checked for duplicates.
    pub fn add_module(&mut self, module: Module) {
        self.modules.push(module);
    }

    /// Remove every module whose name is in `names` (exact match).
    /// Returns how many were removed.
    pub fn remove_modules<S: AsRef<str>>(&mut self, names: &[S]) -> usize {
        let before = self.modules.len();
        self.modules
            .retain(|m| !names.iter().any(|n| n.as_ref() == m.name));
        before - self.modules.len()
    }

    /// First module whose name matches ignoring case.
    pub fn module_mut(&mut self, name: &str) -> Option<&mut Module> {
        self.modules.iter_mut().find(|m| m.name_matches_ignore_case(name))
    }

    pub fn module(&self, name: &str) -> Option<&Module> {
        self.modules.iter().find(|m| m.name_matches_ignore_case(name))
    }
}
