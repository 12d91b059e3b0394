use prometheus_client::{
    encoding::EncodeLabelSet,
    metrics::{counter::Counter, family::Family},
    registry::Registry,
};

#[derive(Clone, Debug, Default)]
pub struct ReferenceMetrics {
    updates: Family<UpdateLabels, Counter>,
    conflicts: Family<KindLabels, Counter>,
}

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
struct UpdateLabels {
    kind: String,
    result: &'static str,
}

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
struct KindLabels {
    kind: String,
}

// === impl ReferenceMetrics ===

impl ReferenceMetrics {
    pub fn register(prom: &mut Registry) -> Self {
        let updates = Family::default();
        prom.register(
            "updates",
            "Count of resource updates issued to persist policy references",
            updates.clone(),
        );

        let conflicts = Family::default();
        prom.register(
            "conflicts",
            "Count of targets that were already referenced by another policy",
            conflicts.clone(),
        );

        Self { updates, conflicts }
    }

    pub(crate) fn update<T, E>(&self, kind: &str, res: &Result<T, E>) {
        let result = if res.is_ok() { "ok" } else { "error" };
        self.updates
            .get_or_create(&UpdateLabels {
                kind: kind.to_string(),
                result,
            })
            .inc();
    }

    pub(crate) fn conflict(&self, kind: &str) {
        self.conflicts
            .get_or_create(&KindLabels {
                kind: kind.to_string(),
            })
            .inc();
    }

    #[cfg(test)]
    pub(crate) fn updates(&self, kind: &str, result: &'static str) -> u64 {
        self.updates
            .get_or_create(&UpdateLabels {
                kind: kind.to_string(),
                result,
            })
            .get()
    }

    #[cfg(test)]
    pub(crate) fn conflicts(&self, kind: &str) -> u64 {
        self.conflicts
            .get_or_create(&KindLabels {
                kind: kind.to_string(),
            })
            .get()
    }
}
