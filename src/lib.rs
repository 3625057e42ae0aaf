//! # TDB Core
//!
//! Validated data model for power-semiconductor datasheets.
//!
//! This library provides:
//! - Rule-table validation of plain input records
//! - A typed entity hierarchy (device, switch, diode, curves, thermal model)
//! - Operating-point lookup over measured curves
//! - Linearization of forward curves into `v0 + r·i`
//! - Switching energy at other gate resistances and supply voltages
//! - Lossless round-trip to plain nested data
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`validate`] - Primitive checks, per-kind rule sets and the housing-type list
//! - [`model`] - Entity types and their record constructors
//! - [`analysis`] - Interpolation, operating-point resolver, linearization and energy rescaling
//! - [`plain`] - Conversion to and from `serde_json::Value`
//!
//! ## Usage
//!
//! ```no_run
//! use serde_json::json;
//! use tdb_core::{ConductionPath, Device, HousingTypes};
//!
//! # fn main() -> tdb_core::Result<()> {
//! let housing_types = HousingTypes::bundled();
//! let device = json!({
//!     "name": "EXAMPLE", "type": "MOSFET", "author": "me", "manufacturer": "Acme",
//!     "housing_area": 1e-4, "cooling_area": 1e-4, "housing_type": "to220",
//!     "v_abs_max": 650, "i_abs_max": 100, "i_cont": 30,
//! });
//! let switch = json!({
//!     "channel": {"t_j": 25, "v_g": 10, "graph_v_i": [[0, 1, 2], [0, 10, 20]]},
//! });
//! let device = Device::from_records(Some(&device), Some(&switch), None, &housing_types)?;
//! let model = device.linearize(ConductionPath::Switch, 25.0, 10.0, 10.0)?;
//! assert_eq!(model.r_channel, 0.1);
//! # Ok(())
//! # }
//! ```
//!
//! ## Logging
//!
//! Diagnostics go through [`tracing`]. The library never installs a
//! subscriber; the `tdb` binary does.

pub mod analysis;
pub mod error;
pub mod model;
pub mod plain;
pub mod validate;

// Re-export main types for convenience
pub use analysis::{ConductionKind, EnergyQuery, GateResistanceQuery};
pub use error::{AvailablePoint, Result, TdbError};
pub use model::{ConductionPath, Device, DeviceFamily, Diode, Switch, SwitchingEnergy};
pub use plain::{from_plain, to_plain};
pub use validate::HousingTypes;

/// Decimal places of linearized voltages (V)
pub const VOLTAGE_DECIMALS: i32 = 2;

/// Decimal places of linearized resistances (Ω)
pub const RESISTANCE_DECIMALS: i32 = 4;

/// Relative current step for the slope of offset channels
pub const OFFSET_CURRENT_STEP: f64 = 0.1;

/// Temperature-to-gate-voltage scaling for nearest working-point search (°C per V)
pub const DEFAULT_T_TO_V_NORMALIZATION: f64 = 10.0;
