//! Portainer API models
//!
//! Request and response shapes for the subset of the Portainer REST API and
//! its Docker proxy that stackroll talks to.

pub mod models;
