//! Back-references from a gateway to the policies that affect it.
//!
//! Each policy kind owns one annotation on the gateway, named by
//! [`Referrer::back_reference_annotation_name`]. Its value is a JSON list of
//! policy keys in insertion order:
//!
//! ```text
//! kuadrant.io/ratelimitpolicies: [{"Namespace":"app-ns","Name":"policy-1"}]
//! ```
//!
//! The list is decoded on every call and never cached. Mutations only touch
//! the in-memory object; the caller persists it when a change is reported.

use crate::{Error, Result};
use policy_machinery_k8s_api::{annotations, Referrer, Resource, ResourceKey};

/// The policies recorded in a back-reference annotation.
///
/// Keys are unique and keep their insertion order so that encoding is stable
/// across add/remove cycles.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct PolicyRefs(Vec<ResourceKey>);

// === impl PolicyRefs ===

impl PolicyRefs {
    /// Decodes an annotation value. Repeated keys are collapsed onto their
    /// first occurrence.
    pub fn decode(value: &str) -> serde_json::Result<Self> {
        let keys = serde_json::from_str::<Vec<ResourceKey>>(value)?;
        Ok(keys.into_iter().collect())
    }

    pub fn encode(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.0)
    }

    pub fn contains(&self, key: &ResourceKey) -> bool {
        self.0.contains(key)
    }

    /// Appends `key`, returning false if it was already present.
    pub fn insert(&mut self, key: ResourceKey) -> bool {
        if self.contains(&key) {
            return false;
        }
        self.0.push(key);
        true
    }

    /// Removes `key`, returning false if it was not present.
    pub fn remove(&mut self, key: &ResourceKey) -> bool {
        match self.0.iter().position(|k| k == key) {
            Some(idx) => {
                self.0.remove(idx);
                true
            }
            None => false,
        }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ResourceKey> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<ResourceKey> for PolicyRefs {
    fn from_iter<T: IntoIterator<Item = ResourceKey>>(iter: T) -> Self {
        let mut refs = Self::default();
        for key in iter {
            refs.insert(key);
        }
        refs
    }
}

impl IntoIterator for PolicyRefs {
    type Item = ResourceKey;
    type IntoIter = std::vec::IntoIter<ResourceKey>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a PolicyRefs {
    type Item = &'a ResourceKey;
    type IntoIter = std::slice::Iter<'a, ResourceKey>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

// === Annotation operations ===

/// Lists the policies of the referrer's kind recorded on `resource`. A missing
/// annotation yields an empty list.
pub fn policy_refs<K, R>(resource: &K, referrer: &R) -> Result<PolicyRefs>
where
    K: Resource,
    R: Referrer + ?Sized,
{
    let annotation = referrer.back_reference_annotation_name();
    Ok(read(resource, &annotation)?.unwrap_or_default())
}

pub fn contains_policy<K, R>(resource: &K, referrer: &R, policy: &ResourceKey) -> Result<bool>
where
    K: Resource,
    R: Referrer + ?Sized,
{
    Ok(policy_refs(resource, referrer)?.contains(policy))
}

/// Records `policy` on `resource`, creating the annotation if needed.
///
/// Returns false, leaving the annotation untouched, if the policy is already
/// recorded.
pub fn add_policy<K, R>(resource: &mut K, referrer: &R, policy: &ResourceKey) -> Result<bool>
where
    K: Resource,
    R: Referrer + ?Sized,
{
    let annotation = referrer.back_reference_annotation_name();
    let mut refs = read(resource, &annotation)?.unwrap_or_default();
    if !refs.insert(policy.clone()) {
        return Ok(false);
    }
    write(resource, &annotation, &refs)?;
    Ok(true)
}

/// Removes `policy` from `resource`.
///
/// Returns false, leaving the annotation untouched, if the annotation is
/// missing or does not record the policy. Removing the last policy leaves an
/// empty list in place.
pub fn delete_policy<K, R>(resource: &mut K, referrer: &R, policy: &ResourceKey) -> Result<bool>
where
    K: Resource,
    R: Referrer + ?Sized,
{
    let annotation = referrer.back_reference_annotation_name();
    let Some(mut refs) = read(resource, &annotation)? else {
        return Ok(false);
    };
    if !refs.remove(policy) {
        return Ok(false);
    }
    write(resource, &annotation, &refs)?;
    Ok(true)
}

fn read<K: Resource>(resource: &K, annotation: &str) -> Result<Option<PolicyRefs>> {
    let Some(value) = annotations::get(resource, annotation) else {
        return Ok(None);
    };
    match PolicyRefs::decode(value) {
        Ok(refs) => Ok(Some(refs)),
        Err(source) => Err(Error::Decode {
            resource: ResourceKey::from_resource(resource),
            annotation: annotation.to_string(),
            source,
        }),
    }
}

fn write<K: Resource>(resource: &mut K, annotation: &str, refs: &PolicyRefs) -> Result<()> {
    let value = refs.encode().map_err(Error::Encode)?;
    annotations::set(resource, annotation, value);
    Ok(())
}
