//! Application layer: options, orchestration and console output

pub mod options;
pub mod render;
pub mod run;
pub mod settings;
