//! Voltage-dependent capacitance curves.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::record::{as_record, required_graph, required_number};
use super::Graph;
use crate::error::Result;
use crate::validate::{validate, EntityKind};

/// A C(V) curve at one junction temperature.
///
/// Row 1 of `graph_v_c` is the drain-source voltage (V), row 2 the
/// capacitance (F).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoltageDependentCapacitance {
    /// Junction temperature (°C)
    pub t_j: f64,
    /// Capacitance against voltage
    pub graph_v_c: Graph,
}

impl VoltageDependentCapacitance {
    /// Build from a capacitance record. Absent or empty records give `Ok(None)`.
    pub fn from_record(record: &Value) -> Result<Option<Self>> {
        if !validate(Some(record), EntityKind::Capacitance)? {
            return Ok(None);
        }
        let Some(map) = as_record(Some(record)) else {
            return Ok(None);
        };
        let kind = EntityKind::Capacitance.name();
        Ok(Some(Self {
            t_j: required_number(map, kind, "t_j")?,
            graph_v_c: required_graph(map, kind, "graph_v_c")?,
        }))
    }

    /// Capacitance at `v`, clamped to the measured range.
    pub fn capacitance_at(&self, v: f64) -> f64 {
        self.graph_v_c.y_at(v)
    }

    /// Stored charge Q(V) = ∫ C dV from the first sample.
    pub fn charge_curve(&self) -> Graph {
        self.graph_v_c.cumulative_integral()
    }

    /// Stored energy E(V) = ∫ V·C dV from the first sample.
    pub fn energy_curve(&self) -> Graph {
        self.graph_v_c.map_y(|v, c| v * c).cumulative_integral()
    }
}
