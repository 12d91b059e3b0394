use crate::KubeClient;
use tokio::time::Duration;

/// Configures how policy references are persisted.
///
/// Meant to be flattened into a controller's own arguments.
#[derive(Clone, Debug, clap::Args)]
pub struct ReferenceArgs {
    /// Field manager recorded on annotation updates.
    #[clap(
        long = "reference-field-manager",
        env = "POLICY_MACHINERY_FIELD_MANAGER",
        default_value = "policy-machinery"
    )]
    pub field_manager: String,

    /// Timeout applied to each annotation update.
    #[clap(
        long = "reference-update-timeout-ms",
        env = "POLICY_MACHINERY_UPDATE_TIMEOUT_MS",
        default_value = "5000"
    )]
    pub update_timeout_ms: u64,
}

impl ReferenceArgs {
    pub fn update_timeout(&self) -> Duration {
        Duration::from_millis(self.update_timeout_ms)
    }

    pub fn into_client(self, client: kube::Client) -> KubeClient {
        let timeout = self.update_timeout();
        KubeClient::new(client, self.field_manager, timeout)
    }
}
