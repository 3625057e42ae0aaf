//! Entity hierarchy and construction pipeline.
//!
//! Ownership is a tree rooted at [`Device`]:
//!
//! ```text
//! Device ─┬─ Switch ─┬─ FosterThermalModel
//!         │          ├─ ChannelData[]
//!         │          ├─ SwitchEnergyData[] (e_on, e_off)
//!         │          └─ LinearizedModel[]
//!         ├─ Diode ──┬─ FosterThermalModel
//!         │          ├─ ChannelData[]
//!         │          ├─ SwitchEnergyData[] (e_rr)
//!         │          └─ LinearizedModel[]
//!         └─ VoltageDependentCapacitance[] (c_oss, c_iss, c_rss)
//! ```
//!
//! Every entity has a `from_record` constructor that validates its input
//! record first. An absent or empty record produces the default entity (or
//! is skipped inside a collection); a present but malformed record is an
//! error. Collections keep input order.

mod capacitance;
mod channel;
mod device;
mod diode;
mod energy;
mod family;
mod graph;
mod linearized;
pub mod record;
mod switch;
mod thermal;

pub use capacitance::VoltageDependentCapacitance;
pub use channel::ChannelData;
pub use device::{ConductionPath, Device, SwitchingEnergy};
pub use diode::Diode;
pub use energy::{EnergyDatasetType, SwitchEnergyData};
pub use family::{DeviceFamily, GateDefaults};
pub use graph::Graph;
pub use linearized::LinearizedModel;
pub use switch::Switch;
pub use thermal::FosterThermalModel;
