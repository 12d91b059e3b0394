use crate::{ObjectClient, Result};
use parking_lot::Mutex;
use policy_machinery_k8s_api::{
    gateway::{Gateway, GatewaySpec, HTTPRoute, HTTPRouteSpec},
    ObjectMeta, PolicyKind, Resource, ResourceKey,
};
use std::collections::{BTreeMap, BTreeSet};


const BACK_REFS: &str = "kuadrant.io/testpolicies";
const DIRECT_REF: &str = "kuadrant.io/testpolicy";
const NO_ANNOTATIONS: [(&str, &str); 0] = [];

fn test_policy_kind() -> PolicyKind {
    PolicyKind::new("kuadrant.io", "TestPolicy")
}

fn policy(name: &str) -> ResourceKey {
    ResourceKey::new("app-ns", name)
}

fn meta<'a>(
    ns: &str,
    name: &str,
    annotations: impl IntoIterator<Item = (&'a str, &'a str)>,
) -> ObjectMeta {
    let annotations = annotations
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect::<BTreeMap<_, _>>();
    ObjectMeta {
        namespace: Some(ns.to_string()),
        name: Some(name.to_string()),
        resource_version: Some("1".to_string()),
        annotations: (!annotations.is_empty()).then_some(annotations),
        ..ObjectMeta::default()
    }
}

fn mk_gateway<'a>(
    name: &str,
    annotations: impl IntoIterator<Item = (&'a str, &'a str)>,
) -> Gateway {
    let mut gw = Gateway::new(name, GatewaySpec::default());
    gw.metadata = meta("gw-ns", name, annotations);
    gw
}

fn mk_route<'a>(
    name: &str,
    annotations: impl IntoIterator<Item = (&'a str, &'a str)>,
) -> HTTPRoute {
    let mut route = HTTPRoute::new(name, HTTPRouteSpec::default());
    route.metadata = meta("operator-unittest", name, annotations);
    route
}

fn annotation<K: Resource>(resource: &K, name: &str) -> Option<String> {
    policy_machinery_k8s_api::annotations::get(resource, name).map(str::to_string)
}

fn version_conflict(key: &ResourceKey) -> crate::Error {
    kube::Error::Api(kube::core::ErrorResponse {
        status: "Failure".to_string(),
        message: format!("the object {key} has been modified"),
        reason: "Conflict".to_string(),
        code: 409,
    })
    .into()
}

/// An in-memory object store that records every update it accepts.
///
/// Updates are version-checked against the stored object's resourceVersion,
/// which is bumped on every accepted write.
struct FakeClient<K> {
    objects: Mutex<BTreeMap<ResourceKey, K>>,
    updates: Mutex<Vec<K>>,
    failing: BTreeSet<ResourceKey>,
}

// === impl FakeClient ===

impl<K: Resource + Clone> FakeClient<K> {
    fn new(objects: impl IntoIterator<Item = K>) -> Self {
        let objects = objects
            .into_iter()
            .map(|obj| (ResourceKey::from_resource(&obj), obj))
            .collect();
        Self {
            objects: Mutex::new(objects),
            updates: Mutex::new(Vec::new()),
            failing: BTreeSet::new(),
        }
    }

    /// Fails every update of the given resource with a version conflict.
    fn failing(mut self, key: ResourceKey) -> Self {
        self.failing.insert(key);
        self
    }

    fn updates(&self) -> Vec<K> {
        self.updates.lock().clone()
    }

    fn updated_keys(&self) -> Vec<ResourceKey> {
        self.updates
            .lock()
            .iter()
            .map(ResourceKey::from_resource)
            .collect()
    }

    fn stored(&self, key: &ResourceKey) -> Option<K> {
        self.objects.lock().get(key).cloned()
    }
}

#[async_trait::async_trait]
impl<K> ObjectClient<K> for FakeClient<K>
where
    K: Resource + Clone + Send + Sync + 'static,
{
    async fn get(&self, key: &ResourceKey) -> Result<Option<K>> {
        Ok(self.stored(key))
    }

    async fn update(&self, resource: &K) -> Result<K> {
        let key = ResourceKey::from_resource(resource);
        if self.failing.contains(&key) {
            return Err(version_conflict(&key));
        }

        let mut objects = self.objects.lock();
        let version = match objects.get(&key) {
            Some(stored) if stored.meta().resource_version != resource.meta().resource_version => {
                return Err(version_conflict(&key));
            }
            Some(stored) => stored
                .meta()
                .resource_version
                .as_deref()
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(0),
            None => 0,
        };

        self.updates.lock().push(resource.clone());
        let mut stored = resource.clone();
        stored.meta_mut().resource_version = Some((version + 1).to_string());
        objects.insert(key, stored.clone());
        Ok(stored)
    }
}
