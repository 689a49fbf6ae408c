//! Inbound MAVLink message handlers

pub mod engine;

pub use engine::EngineCommandHandler;
