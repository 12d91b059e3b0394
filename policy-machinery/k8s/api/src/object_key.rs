use kube::{Resource, ResourceExt};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Identifies a resource by namespace and name.
///
/// Cluster-scoped resources have an empty namespace.
#[derive(Clone, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ResourceKey {
    pub namespace: String,
    pub name: String,
}

#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
#[error("invalid resource key {0:?}: expected <namespace>/<name>")]
pub struct InvalidResourceKey(String);

// === impl ResourceKey ===

impl ResourceKey {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    pub fn from_resource<T: Resource>(resource: &T) -> Self {
        Self {
            namespace: resource.namespace().unwrap_or_default(),
            name: resource.name_any(),
        }
    }
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

impl FromStr for ResourceKey {
    type Err = InvalidResourceKey;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('/') {
            Some((ns, name)) if !name.is_empty() && !name.contains('/') => {
                Ok(Self::new(ns, name))
            }
            _ => Err(InvalidResourceKey(s.to_string())),
        }
    }
}
