#![deny(warnings, rust_2018_idioms)]
#![forbid(unsafe_code)]

pub mod annotations;
mod object_key;
mod referrer;

pub use self::{
    object_key::{InvalidResourceKey, ResourceKey},
    referrer::{PolicyKind, Referrer},
};
pub use k8s_openapi::{api, NamespaceResourceScope};
pub use kube::{
    api::{Api, ObjectMeta, PostParams},
    Client, Error, Resource, ResourceExt,
};

pub mod gateway {
    pub use gateway_api::apis::standard::{
        gateways::{Gateway, GatewaySpec},
        httproutes::{HTTPRoute, HTTPRouteSpec},
    };
}
