//! Deployment module

pub mod api;
pub mod executor;
pub mod gate;
pub mod manifest;
pub mod outcome;
pub mod portainer;
pub mod rollback;
pub mod sampler;
pub mod target;
