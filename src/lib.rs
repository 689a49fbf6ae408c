#![cfg_attr(not(test), no_std)]

//! ice_engine - Internal combustion engine controller for autopilots
//!
//! This crate implements the engine lifecycle state machine, transmission
//! sequencing, throttle/brake overrides and status telemetry for a
//! combustion-engine vehicle. It is pure business logic: platform services
//! (time, GPIO, analog input, RPM, battery, AHRS) are injected via traits,
//! so everything is testable on host.
//!
//! # Design Principles
//!
//! - **Trait abstractions**: platform services injected via traits
//! - **No internal locking**: single-threaded cooperative ticking
//! - **Explicit time**: one `now_ms` captured per tick drives all timing
//!
//! # Modules
//!
//! - [`core`]: logging macros and the [`core::traits::TimeSource`] abstraction
//! - [`platform`]: error types, GPIO/analog traits and mocks
//! - [`libraries`]: RC input, servo output registry, RPM and battery sources
//! - [`parameters`]: parameter store and the ICE parameter block
//! - [`subsystems`]: the engine controller and its sensor front-ends
//! - [`communication`]: MAVLink command handling and status telemetry

// Platform abstraction layer
pub mod platform;

// Core systems (logging, time)
pub mod core;

// Communication protocols (MAVLink commands, telemetry, statustext)
pub mod communication;

// Parameter storage and the ICE parameter block
pub mod parameters;

// Subsystems (engine controller, AHRS position source)
pub mod subsystems;

// Common libraries (ArduPilot libraries/ equivalent)
pub mod libraries;

pub use subsystems::engine::{
    EngineController, EngineIo, EngineState, GearState, IgnitionState,
};

// Note: Logging macros (log_info!, log_warn!, log_error!, log_debug!, log_trace!)
// are exported at crate root via #[macro_export] in core::logging
