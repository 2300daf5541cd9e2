//! Authentication against the control plane

pub mod session;
