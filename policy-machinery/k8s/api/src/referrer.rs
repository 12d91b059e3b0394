use std::borrow::Cow;

/// A policy kind that records references to itself on the resources it
/// affects.
///
/// Annotation names are derived from the kind's group and name, so they are
/// stable across restarts. Two kinds that derive the same name would share
/// storage; callers must not register such kinds together.
pub trait Referrer {
    fn group(&self) -> Cow<'_, str>;

    fn kind(&self) -> Cow<'_, str>;

    /// Names the annotation that lists every policy of this kind affecting a
    /// gateway, e.g. `kuadrant.io/ratelimitpolicies`.
    fn back_reference_annotation_name(&self) -> String {
        qualify(&self.group(), &plural(&self.kind().to_ascii_lowercase()))
    }

    /// Names the annotation that records the single policy of this kind
    /// attached to a target, e.g. `kuadrant.io/ratelimitpolicy`.
    fn direct_reference_annotation_name(&self) -> String {
        qualify(&self.group(), &self.kind().to_ascii_lowercase())
    }
}

/// A [`Referrer`] identified by an API group and kind.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct PolicyKind {
    pub group: String,
    pub kind: String,
}

// === impl PolicyKind ===

impl PolicyKind {
    pub fn new(group: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            kind: kind.into(),
        }
    }

    /// Returns the policy kind of the given resource type.
    pub fn of<T>() -> Self
    where
        T: kube::Resource,
        T::DynamicType: Default,
    {
        let dt = Default::default();
        Self::new(T::group(&dt), T::kind(&dt))
    }
}

impl Referrer for PolicyKind {
    fn group(&self) -> Cow<'_, str> {
        Cow::Borrowed(&self.group)
    }

    fn kind(&self) -> Cow<'_, str> {
        Cow::Borrowed(&self.kind)
    }
}

fn qualify(group: &str, name: &str) -> String {
    if group.is_empty() {
        name.to_string()
    } else {
        format!("{group}/{name}")
    }
}

fn plural(kind: &str) -> String {
    if let Some(stem) = kind.strip_suffix('y') {
        format!("{stem}ies")
    } else if ["s", "x", "ch", "sh"].iter().any(|s| kind.ends_with(s)) {
        format!("{kind}es")
    } else {
        format!("{kind}s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::{Gateway, HTTPRoute};

    #[test]
    fn annotation_names() {
        for (group, kind, back, direct) in &[
            (
                "kuadrant.io",
                "TestPolicy",
                "kuadrant.io/testpolicies",
                "kuadrant.io/testpolicy",
            ),
            (
                "kuadrant.io",
                "RateLimitPolicy",
                "kuadrant.io/ratelimitpolicies",
                "kuadrant.io/ratelimitpolicy",
            ),
            (
                "example.com",
                "TLSPatch",
                "example.com/tlspatches",
                "example.com/tlspatch",
            ),
            ("example.com", "Filter", "example.com/filters", "example.com/filter"),
            ("", "Address", "addresses", "address"),
        ] {
            let kind = PolicyKind::new(*group, *kind);
            assert_eq!(kind.back_reference_annotation_name(), *back);
            assert_eq!(kind.direct_reference_annotation_name(), *direct);
        }
    }

    #[test]
    fn distinct_kinds_use_distinct_names() {
        let a = PolicyKind::new("kuadrant.io", "AuthPolicy");
        let b = PolicyKind::new("kuadrant.io", "RateLimitPolicy");
        assert_ne!(
            a.back_reference_annotation_name(),
            b.back_reference_annotation_name()
        );
        assert_ne!(
            a.direct_reference_annotation_name(),
            b.direct_reference_annotation_name()
        );
    }

    #[test]
    fn kind_of_resource_type() {
        let gw = PolicyKind::of::<Gateway>();
        assert_eq!(gw, PolicyKind::new("gateway.networking.k8s.io", "Gateway"));
        assert_eq!(
            gw.back_reference_annotation_name(),
            "gateway.networking.k8s.io/gateways"
        );

        let route = PolicyKind::of::<HTTPRoute>();
        assert_eq!(
            route.direct_reference_annotation_name(),
            "gateway.networking.k8s.io/httproute"
        );
    }
}
