//! Derived electrical data.
//!
//! Everything here reads the entity hierarchy and never changes it:
//!
//! - [`interp`] - piecewise-linear interpolation and trapezoidal integration
//! - [`resolve`] - operating-point lookup (exact, bracketing, nearest)
//! - [`linearize`] - reduction of a forward curve to `v0 + r·i`
//! - [`energy`] - switching energy at another gate resistance
//!
//! ## Linearization
//!
//! For a resistive channel the equivalent circuit is a plain resistance:
//!
//! ```text
//! r = v(i) / i,  v0 = 0
//! ```
//!
//! For a channel with a forward offset the slope is taken over a 10 % current
//! step:
//!
//! ```text
//! r  = (v(1.1·i) - v(i)) / (0.1·i)
//! v0 = v(i) - r·i
//! ```
//!
//! Curves are never extrapolated; a current outside the measured range reads
//! the boundary sample.

mod energy;
pub mod interp;
mod linearize;
mod resolve;

pub use energy::{energy_at_gate_resistance, GateResistanceQuery};
pub use linearize::{interpolate_channel_voltage, linearize, linearize_channel, ConductionKind};
pub use resolve::{
    available_points, find_bracketing, find_channel, find_energy, find_nearest, find_operating_point, Bracket,
    ChannelSource, EnergyQuery, TestCondition,
};
