//! Process environment

pub mod environment;

pub use environment::Environment;
