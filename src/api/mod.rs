// api module — typed wrappers over the engine's HTTP JSON API

pub mod client;
pub mod integrations;
pub mod logs;
pub mod workflows;

pub use client::{ApiError, EngineApi};
