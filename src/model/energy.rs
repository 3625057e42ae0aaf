//! Switching and reverse-recovery energy datasets.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::record::{as_record, number, required_graph, required_number};
use super::Graph;
use crate::error::{Result, TdbError};
use crate::validate::checks::check_finite;
use crate::validate::{energy_dataset_type, validate, EntityKind};

/// Shape of an energy dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnergyDatasetType {
    /// One energy value at fixed gate resistance and current
    #[serde(rename = "single")]
    Single,
    /// Energy against gate resistance at a fixed current
    #[serde(rename = "graph_r_e")]
    GraphRE,
    /// Energy against current at a fixed gate resistance
    #[serde(rename = "graph_i_e")]
    GraphIE,
}

impl EnergyDatasetType {
    /// All recognized dataset types.
    pub const ALL: [EnergyDatasetType; 3] = [Self::Single, Self::GraphRE, Self::GraphIE];

    /// Record tag of the type.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Single => "single",
            Self::GraphRE => "graph_r_e",
            Self::GraphIE => "graph_i_e",
        }
    }

    /// Parse a record tag.
    pub fn parse(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == tag)
    }
}

impl fmt::Display for EnergyDatasetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One energy measurement (e_on, e_off or e_rr).
///
/// `dataset_type` decides which of the optional fields are populated:
///
/// | type        | e_x | r_g | i_x | graph_r_e | graph_i_e |
/// |-------------|-----|-----|-----|-----------|-----------|
/// | `single`    | set | set | set | -         | -         |
/// | `graph_r_e` | -   | -   | set | set       | -         |
/// | `graph_i_e` | -   | set | -   | -         | set       |
///
/// Fields outside the row are `None`, never zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwitchEnergyData {
    /// Shape discriminant
    pub dataset_type: EnergyDatasetType,
    /// Junction temperature (°C)
    pub t_j: f64,
    /// Supply voltage (V)
    pub v_supply: f64,
    /// Gate voltage (V)
    pub v_g: f64,
    /// Energy of a `single` dataset (J)
    pub e_x: Option<f64>,
    /// Gate resistance (Ω)
    pub r_g: Option<f64>,
    /// Test current (A)
    pub i_x: Option<f64>,
    /// Energy against gate resistance
    pub graph_r_e: Option<Graph>,
    /// Energy against current
    pub graph_i_e: Option<Graph>,
}

impl SwitchEnergyData {
    /// Build from an energy record. Absent or empty records give `Ok(None)`.
    ///
    /// Keys the dataset type does not use are dropped, even when supplied.
    pub fn from_record(record: &Value) -> Result<Option<Self>> {
        if !validate(Some(record), EntityKind::Energy)? {
            return Ok(None);
        }
        let Some(map) = as_record(Some(record)) else {
            return Ok(None);
        };
        let kind = EntityKind::Energy.name();
        let dataset_type = energy_dataset_type(map)?;
        let t_j = required_number(map, kind, "t_j")?;
        let v_supply = required_number(map, kind, "v_supply")?;
        let v_g = required_number(map, kind, "v_g")?;

        let data = match dataset_type {
            EnergyDatasetType::Single => Self {
                dataset_type,
                t_j,
                v_supply,
                v_g,
                e_x: number(map, "e_x"),
                r_g: number(map, "r_g"),
                i_x: number(map, "i_x"),
                graph_r_e: None,
                graph_i_e: None,
            },
            EnergyDatasetType::GraphRE => Self {
                dataset_type,
                t_j,
                v_supply,
                v_g,
                e_x: None,
                r_g: None,
                i_x: number(map, "i_x"),
                graph_r_e: Some(required_graph(map, kind, "graph_r_e")?),
                graph_i_e: None,
            },
            EnergyDatasetType::GraphIE => Self {
                dataset_type,
                t_j,
                v_supply,
                v_g,
                e_x: None,
                r_g: number(map, "r_g"),
                i_x: None,
                graph_r_e: None,
                graph_i_e: Some(required_graph(map, kind, "graph_i_e")?),
            },
        };
        Ok(Some(data))
    }

    /// Check that the populated fields match `dataset_type`.
    ///
    /// Fields required by the type must be set, the others must be `None`.
    pub fn check_shape(&self) -> Result<()> {
        let kind = EntityKind::Energy.name();
        let fields = [
            ("e_x", self.e_x.is_some()),
            ("r_g", self.r_g.is_some()),
            ("i_x", self.i_x.is_some()),
            ("graph_r_e", self.graph_r_e.is_some()),
            ("graph_i_e", self.graph_i_e.is_some()),
        ];
        let required: &[&str] = match self.dataset_type {
            EnergyDatasetType::Single => &["e_x", "r_g", "i_x"],
            EnergyDatasetType::GraphRE => &["i_x", "graph_r_e"],
            EnergyDatasetType::GraphIE => &["r_g", "graph_i_e"],
        };

        let missing: Vec<&str> = fields
            .iter()
            .filter(|(key, set)| !set && required.contains(key))
            .map(|(key, _)| *key)
            .collect();
        if !missing.is_empty() {
            return Err(TdbError::missing_keys(kind, missing));
        }

        let extra: Vec<&str> = fields
            .iter()
            .filter(|(key, set)| *set && !required.contains(key))
            .map(|(key, _)| *key)
            .collect();
        if !extra.is_empty() {
            return Err(TdbError::shape_mismatch(
                kind,
                format!(
                    "dataset_type '{}' does not use {}",
                    self.dataset_type,
                    extra.join(", ")
                ),
            ));
        }
        Ok(())
    }

    /// The energy curve of a graph dataset.
    pub fn curve(&self) -> Option<&Graph> {
        self.graph_r_e.as_ref().or(self.graph_i_e.as_ref())
    }

    /// Energy at a gate resistance (`graph_r_e`) or current (`graph_i_e`).
    ///
    /// A `single` dataset returns its one value regardless of `x`.
    pub fn energy_at(&self, x: f64) -> Option<f64> {
        match self.dataset_type {
            EnergyDatasetType::Single => self.e_x,
            EnergyDatasetType::GraphRE | EnergyDatasetType::GraphIE => self.curve().map(|g| g.y_at(x)),
        }
    }

    /// The dataset rescaled to another supply voltage.
    ///
    /// Switching energy is taken as proportional to the supply voltage: every
    /// energy value is multiplied by `v_op / v_supply` and `v_supply` becomes
    /// `v_op`.
    pub fn at_supply_voltage(&self, v_op: f64) -> Result<Self> {
        check_finite(v_op, EntityKind::Energy.name(), "v_supply")?;
        if self.v_supply == 0.0 {
            return Err(TdbError::energy_scaling(
                format!("{} energy", self.dataset_type),
                "measured at v_supply = 0 V",
            ));
        }
        let mut scaled = self.scaled(v_op / self.v_supply);
        scaled.v_supply = v_op;
        Ok(scaled)
    }

    /// Copy with every energy value multiplied by `factor`.
    pub(crate) fn scaled(&self, factor: f64) -> Self {
        Self {
            e_x: self.e_x.map(|e| e * factor),
            graph_r_e: self.graph_r_e.as_ref().map(|g| g.map_y(|_, e| e * factor)),
            graph_i_e: self.graph_i_e.as_ref().map(|g| g.map_y(|_, e| e * factor)),
            ..*self
        }
    }
}
