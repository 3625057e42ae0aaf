//! Foster thermal model.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::record::{as_record, graph, number, vector};
use super::Graph;
use crate::error::{Result, TdbError};
use crate::validate::{validate, EntityKind};

/// Transient thermal impedance as a Foster RC network.
///
/// Each position in the three vectors is one RC stage, so any vectors that
/// are present have the same length. Every field is optional; a switch or
/// diode without thermal data carries the all-absent model.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FosterThermalModel {
    /// Thermal resistance per stage (K/W)
    pub r_th_vector: Option<Vec<f64>>,
    /// Sum of the stage resistances (K/W)
    pub r_th_total: Option<f64>,
    /// Thermal capacitance per stage (J/K)
    pub c_th_vector: Option<Vec<f64>>,
    /// Sum of the stage capacitances (J/K)
    pub c_th_total: Option<f64>,
    /// Time constant per stage (s)
    pub tau_vector: Option<Vec<f64>>,
    /// Sum of the stage time constants (s)
    pub tau_total: Option<f64>,
    /// Measured transient thermal impedance; row 1 time (s), row 2 Z_th (K/W)
    pub graph_t_rthjc: Option<Graph>,
}

impl FosterThermalModel {
    /// Build from a `thermal_foster` record; absent or empty gives the all-absent model.
    pub fn from_record(record: Option<&Value>) -> Result<Self> {
        if !validate(record, EntityKind::FosterThermalModel)? {
            return Ok(Self::default());
        }
        let Some(map) = as_record(record) else {
            return Ok(Self::default());
        };
        let kind = EntityKind::FosterThermalModel.name();
        Ok(Self {
            r_th_vector: vector(map, kind, "r_th_vector")?,
            r_th_total: number(map, "r_th_total"),
            c_th_vector: vector(map, kind, "c_th_vector")?,
            c_th_total: number(map, "c_th_total"),
            tau_vector: vector(map, kind, "tau_vector")?,
            tau_total: number(map, "tau_total"),
            graph_t_rthjc: graph(map, kind, "graph_t_rthjc")?,
        })
    }

    /// Check whether no thermal data is present.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Number of RC stages, if any stage vector is present.
    pub fn stages(&self) -> Option<usize> {
        [&self.r_th_vector, &self.c_th_vector, &self.tau_vector]
            .into_iter()
            .flatten()
            .map(Vec::len)
            .next()
    }

    /// Check that all present stage vectors have the same length.
    pub fn check_shape(&self) -> Result<()> {
        let lengths: Vec<usize> = [&self.r_th_vector, &self.c_th_vector, &self.tau_vector]
            .into_iter()
            .flatten()
            .map(Vec::len)
            .collect();
        if lengths.windows(2).any(|w| w[0] != w[1]) {
            return Err(TdbError::shape_mismatch(
                EntityKind::FosterThermalModel.name(),
                format!("stage vectors have different lengths: {lengths:?}"),
            ));
        }
        Ok(())
    }
}
