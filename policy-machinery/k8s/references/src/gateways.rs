use crate::{back_references, ObjectClient, Result, TargetRefReconciler};
use policy_machinery_k8s_api::{gateway::Gateway, Referrer, Resource, ResourceKey};
use std::collections::BTreeMap;

/// The gateways whose back-references to a policy must change, as computed by
/// target resolution.
#[derive(Clone, Debug)]
pub struct GatewayDiff<G = Gateway> {
    /// Gateways that may reference the policy but are no longer affected by it.
    pub gateways_with_invalid_policy_ref: Vec<G>,

    /// Gateways affected by the policy that may not reference it yet.
    pub gateways_missing_policy_ref: Vec<G>,
}

// === impl GatewayDiff ===

impl<G> GatewayDiff<G> {
    pub fn is_empty(&self) -> bool {
        self.gateways_with_invalid_policy_ref.is_empty()
            && self.gateways_missing_policy_ref.is_empty()
    }
}

impl<G> Default for GatewayDiff<G> {
    fn default() -> Self {
        Self {
            gateways_with_invalid_policy_ref: Vec::new(),
            gateways_missing_policy_ref: Vec::new(),
        }
    }
}

// === impl TargetRefReconciler ===

impl<C> TargetRefReconciler<C> {
    /// Updates the back-reference annotations of the gateways in `diff` so that
    /// they list `policy` exactly when the policy affects them.
    ///
    /// Removals are applied before additions, each in the order given. Only
    /// gateways whose annotation changes are updated. A gateway listed in both
    /// sets has its addition applied to the object stored by its removal. The
    /// first failure aborts the pass; the caller is expected to retry it from
    /// freshly read objects.
    pub async fn reconcile_gateway_policy_references<G, R>(
        &self,
        referrer: &R,
        policy: &ResourceKey,
        diff: GatewayDiff<G>,
    ) -> Result<()>
    where
        C: ObjectClient<G>,
        G: Resource<DynamicType = ()> + Send + Sync,
        R: Referrer + ?Sized,
    {
        let GatewayDiff {
            gateways_with_invalid_policy_ref,
            gateways_missing_policy_ref,
        } = diff;

        // Latest copy of each gateway seen by this pass.
        let mut seen = BTreeMap::new();

        for gateway in gateways_with_invalid_policy_ref {
            let key = ResourceKey::from_resource(&gateway);
            let mut gateway = seen.remove(&key).unwrap_or(gateway);
            if back_references::delete_policy(&mut gateway, referrer, policy)? {
                tracing::debug!(gateway = %key, %policy, "Removing invalid policy reference");
                self.update(&mut gateway).await?;
            }
            seen.insert(key, gateway);
        }

        for gateway in gateways_missing_policy_ref {
            let key = ResourceKey::from_resource(&gateway);
            let mut gateway = seen.remove(&key).unwrap_or(gateway);
            if back_references::add_policy(&mut gateway, referrer, policy)? {
                tracing::debug!(gateway = %key, %policy, "Adding missing policy reference");
                self.update(&mut gateway).await?;
            }
            seen.insert(key, gateway);
        }

        Ok(())
    }
}
