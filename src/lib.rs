//! rgw-admin - typed client for the Ceph RADOS Gateway admin REST API
//!
//! The heart of the crate is the [`schema`] engine: a declarative
//! deserialization layer that turns the gateway's loosely-typed JSON bodies
//! into validated domain records ([`models`]). The [`client`] module wraps
//! the admin endpoints, and [`cli`] is a thin command-line front end.

pub mod cli;
pub mod client;
pub mod models;
pub mod schema;
