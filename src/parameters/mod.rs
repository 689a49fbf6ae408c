//! Parameter system
//!
//! In-memory parameter store plus the typed ICE parameter block. The store
//! is the surface the MAVLink parameter protocol talks to; persistence is
//! owned by the host autopilot (the controller only ever reads).
//!
//! # Parameter Types
//!
//! - `Int` - 32-bit signed integer
//! - `Float` - 32-bit floating point

pub mod ice;
pub mod storage;

pub use ice::{GearPwmTable, IceOptions, IceParams, TempFunction, VehicleClass};
pub use storage::{ParamFlags, ParamValue, ParameterStore, StoreError};
