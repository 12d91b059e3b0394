use crate::{Error, ObjectClient, ReferenceMetrics, Result};
use policy_machinery_k8s_api::{annotations, Resource, ResourceKey};

/// Records policy references on the resources policies target, persisting
/// each change through an [`ObjectClient`].
///
/// Holds no state between calls. Every operation mutates the object it is
/// handed and issues at most one update per resource; failed updates are
/// returned without retrying.
#[derive(Clone, Debug)]
pub struct TargetRefReconciler<C> {
    client: C,
    metrics: ReferenceMetrics,
}

// === impl TargetRefReconciler ===

impl<C> TargetRefReconciler<C> {
    pub fn new(client: C) -> Self {
        Self {
            client,
            metrics: ReferenceMetrics::default(),
        }
    }

    pub fn with_metrics(self, metrics: ReferenceMetrics) -> Self {
        Self { metrics, ..self }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Links `target` to `policy` through the `annotation` forward reference.
    ///
    /// Only one policy may hold the annotation at a time. Linking a target
    /// already linked to `policy` is a no-op; linking a target held by another
    /// policy fails with [`Error::Conflict`] without updating anything.
    pub async fn link<K>(
        &self,
        policy: &ResourceKey,
        target: &mut K,
        annotation: &str,
    ) -> Result<()>
    where
        C: ObjectClient<K>,
        K: Resource<DynamicType = ()> + Send + Sync,
    {
        let kind = K::kind(&());
        let policy_ref = policy.to_string();

        match annotations::get(target, annotation) {
            Some(current) if current == policy_ref => Ok(()),
            Some(current) => {
                let target = ResourceKey::from_resource(target);
                tracing::info!(
                    %kind,
                    %target,
                    %current,
                    %policy,
                    "Target is already referenced by another policy"
                );
                self.metrics.conflict(&kind);
                Err(Error::Conflict {
                    kind: kind.to_string(),
                    target,
                    current: current.to_string(),
                    policy: policy.clone(),
                })
            }
            None => {
                annotations::set(target, annotation, policy_ref);
                self.update(target).await
            }
        }
    }

    /// Removes the `annotation` forward reference from `target`.
    ///
    /// The annotation is removed whichever policy holds it; `policy` is not
    /// checked against it. A target without the annotation is left untouched.
    pub async fn unlink<K>(
        &self,
        policy: &ResourceKey,
        target: &mut K,
        annotation: &str,
    ) -> Result<()>
    where
        C: ObjectClient<K>,
        K: Resource<DynamicType = ()> + Send + Sync,
    {
        let Some(current) = annotations::remove(target, annotation) else {
            return Ok(());
        };
        if current != policy.to_string() {
            tracing::debug!(
                kind = %K::kind(&()),
                target = %ResourceKey::from_resource(target),
                %current,
                %policy,
                "Removing reference held by another policy"
            );
        }
        self.update(target).await
    }

    /// Fetches the target and links it to `policy`.
    pub async fn link_key<K>(
        &self,
        policy: &ResourceKey,
        target: &ResourceKey,
        annotation: &str,
    ) -> Result<K>
    where
        C: ObjectClient<K>,
        K: Resource<DynamicType = ()> + Send + Sync,
    {
        let Some(mut resource) = self.client.get(target).await? else {
            return Err(Error::NotFound {
                kind: K::kind(&()).to_string(),
                key: target.clone(),
            });
        };
        self.link(policy, &mut resource, annotation).await?;
        Ok(resource)
    }

    /// Fetches the target and unlinks it. A target that no longer exists has
    /// nothing to unlink.
    pub async fn unlink_key<K>(
        &self,
        policy: &ResourceKey,
        target: &ResourceKey,
        annotation: &str,
    ) -> Result<Option<K>>
    where
        C: ObjectClient<K>,
        K: Resource<DynamicType = ()> + Send + Sync,
    {
        let Some(mut resource) = self.client.get(target).await? else {
            return Ok(None);
        };
        self.unlink(policy, &mut resource, annotation).await?;
        Ok(Some(resource))
    }

    /// Persists `resource`, replacing it with the stored object on success.
    pub(crate) async fn update<K>(&self, resource: &mut K) -> Result<()>
    where
        C: ObjectClient<K>,
        K: Resource<DynamicType = ()> + Send + Sync,
    {
        let kind = K::kind(&());
        let res = self.client.update(resource).await;
        tracing::debug!(
            %kind,
            name = %ResourceKey::from_resource(resource),
            ok = res.is_ok(),
            "Updated resource"
        );
        self.metrics.update(&kind, &res);
        *resource = res?;
        Ok(())
    }
}
