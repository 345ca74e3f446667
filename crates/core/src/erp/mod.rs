//! Business Central operations exposed to agent tooling

pub mod ports;
pub mod service;
pub mod tools;
