#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod env_expansion;
pub mod errors;
pub mod graphql;
pub mod input;
pub(crate) mod json_schema;
pub mod server;
pub mod server_info;
pub mod tools;
