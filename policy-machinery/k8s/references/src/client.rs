use crate::{Error, Result};
use policy_machinery_k8s_api::{
    Api, Client, NamespaceResourceScope, PostParams, Resource, ResourceKey,
};
use std::fmt;
use tokio::time;

/// Reads and writes resources of kind `K`.
///
/// `update` must be version-checked: it fails when the resource changed since
/// it was read, leaving the stored object untouched.
#[async_trait::async_trait]
pub trait ObjectClient<K>: Send + Sync {
    async fn get(&self, key: &ResourceKey) -> Result<Option<K>>;

    /// Persists `resource`, returning the object as stored by the server.
    async fn update(&self, resource: &K) -> Result<K>;
}

/// An [`ObjectClient`] backed by the Kubernetes API.
#[derive(Clone)]
pub struct KubeClient {
    client: Client,
    field_manager: String,
    timeout: time::Duration,
}

// === impl KubeClient ===

impl KubeClient {
    pub fn new(client: Client, field_manager: impl ToString, timeout: time::Duration) -> Self {
        Self {
            client,
            field_manager: field_manager.to_string(),
            timeout,
        }
    }

    fn api<K>(&self, namespace: &str) -> Api<K>
    where
        K: Resource<Scope = NamespaceResourceScope>,
        K::DynamicType: Default,
    {
        Api::namespaced(self.client.clone(), namespace)
    }
}

impl fmt::Debug for KubeClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KubeClient")
            .field("field_manager", &self.field_manager)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

#[async_trait::async_trait]
impl<K> ObjectClient<K> for KubeClient
where
    K: Resource<Scope = NamespaceResourceScope, DynamicType = ()>,
    K: Clone + fmt::Debug + serde::de::DeserializeOwned + serde::Serialize,
    K: Send + Sync + 'static,
{
    async fn get(&self, key: &ResourceKey) -> Result<Option<K>> {
        let api = self.api::<K>(&key.namespace);
        Ok(api.get_opt(&key.name).await?)
    }

    async fn update(&self, resource: &K) -> Result<K> {
        let key = ResourceKey::from_resource(resource);
        let api = self.api::<K>(&key.namespace);
        let params = PostParams {
            field_manager: Some(self.field_manager.clone()),
            ..PostParams::default()
        };

        // `replace` sends the object's resourceVersion, so a concurrent
        // writer makes this fail with a 409 rather than being overwritten.
        match time::timeout(self.timeout, api.replace(&key.name, &params, resource)).await {
            Ok(res) => Ok(res?),
            Err(_) => Err(Error::Timeout {
                kind: K::kind(&()).to_string(),
                key,
            }),
        }
    }
}
