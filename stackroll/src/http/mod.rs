//! HTTP client for the Portainer API

pub mod auth;
pub mod client;
pub mod containers;
pub mod stacks;
