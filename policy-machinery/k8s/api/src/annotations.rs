//! Reads and writes individual annotations on a resource's metadata.
//!
//! Reads treat a missing annotation map as empty; writes create the map on
//! demand. Nothing here persists the resource.

use kube::{Resource, ResourceExt};
use std::collections::BTreeMap;

pub type Map = BTreeMap<String, String>;

pub fn get<'r, T: Resource>(resource: &'r T, name: &str) -> Option<&'r str> {
    resource.annotations().get(name).map(String::as_str)
}

/// Sets the annotation, returning the value it replaced.
pub fn set<T: Resource>(resource: &mut T, name: &str, value: impl Into<String>) -> Option<String> {
    resource
        .annotations_mut()
        .insert(name.to_string(), value.into())
}

/// Removes the annotation, returning its value if it was present.
pub fn remove<T: Resource>(resource: &mut T, name: &str) -> Option<String> {
    // Avoid materializing an empty map on objects that never had one.
    resource.meta_mut().annotations.as_mut()?.remove(name)
}
