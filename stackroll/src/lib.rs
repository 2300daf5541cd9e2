//! stackroll library
//!
//! Rolling updates of Portainer stacks: submit a new manifest, gate on the
//! health of the resulting containers and roll back when they do not settle.

pub mod app;
pub mod authn;
pub mod deploy;
pub mod errors;
pub mod http;
pub mod logs;
pub mod models;
pub mod utils;
