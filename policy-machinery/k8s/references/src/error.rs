use policy_machinery_k8s_api::ResourceKey;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A back-reference annotation is present but cannot be decoded.
    #[error("invalid {annotation} annotation on {resource}: {source}")]
    Decode {
        resource: ResourceKey,
        annotation: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode policy references: {0}")]
    Encode(#[source] serde_json::Error),

    /// The target is already attached to a different policy of the same kind.
    #[error("the {kind} target {target} is already referenced by policy {current}")]
    Conflict {
        kind: String,
        target: ResourceKey,
        current: String,
        policy: ResourceKey,
    },

    #[error("{kind} {key} not found")]
    NotFound { kind: String, key: ResourceKey },

    #[error("timed out updating {kind} {key}")]
    Timeout { kind: String, key: ResourceKey },

    #[error(transparent)]
    Api(#[from] kube::Error),
}

// === impl Error ===

impl Error {
    /// Indicates that a target is already linked to another policy.
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }

    /// Indicates that the API server rejected an update because the resource
    /// changed since it was read. The whole read-modify-write cycle should be
    /// retried from a fresh read.
    pub fn is_version_conflict(&self) -> bool {
        matches!(self, Self::Api(kube::Error::Api(rsp)) if rsp.code == 409)
    }
}
