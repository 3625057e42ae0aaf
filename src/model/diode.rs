//! Diode conduction path.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::record::{as_record, build_collection, children, number, text};
use super::{ChannelData, FosterThermalModel, LinearizedModel, SwitchEnergyData};
use crate::analysis::{
    energy_at_gate_resistance, find_channel, find_energy, ChannelSource, EnergyQuery, GateResistanceQuery,
};
use crate::error::Result;
use crate::validate::{validate, EntityKind};

/// Measured behavior of the freewheeling or body diode.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Diode {
    /// Free-text comment
    pub comment: Option<String>,
    /// Manufacturer of the diode die
    pub manufacturer: Option<String>,
    /// Semiconductor technology
    pub technology: Option<String>,
    /// Maximum junction temperature (°C); required whenever a diode record is given
    pub t_j_max: Option<f64>,
    /// Junction-to-case thermal model
    pub thermal_foster: FosterThermalModel,
    /// Forward curves, one per t_j (and v_g for gate-dependent diodes)
    pub channel: Vec<ChannelData>,
    /// Reverse-recovery energies
    pub e_rr: Vec<SwitchEnergyData>,
    /// Stored linearizations
    pub linearized_diode: Vec<LinearizedModel>,
}

impl Diode {
    /// Build from a diode record; absent or empty gives the default diode.
    pub fn from_record(record: Option<&Value>) -> Result<Self> {
        if !validate(record, EntityKind::Diode)? {
            return Ok(Self::default());
        }
        let Some(map) = as_record(record) else {
            return Ok(Self::default());
        };
        let parent = EntityKind::Diode.name();

        let thermal_foster = FosterThermalModel::from_record(map.get("thermal_foster"))?;
        let channel = build_collection(children(map, parent, "channel")?, parent, "channel", |item| {
            ChannelData::from_record(item, EntityKind::DiodeChannel)
        })?;
        let e_rr = build_collection(children(map, parent, "e_rr")?, parent, "e_rr", SwitchEnergyData::from_record)?;
        let linearized_diode = build_collection(
            children(map, parent, "linearized_diode")?,
            parent,
            "linearized_diode",
            |item| LinearizedModel::from_record(item, EntityKind::DiodeLinearized),
        )?;

        Ok(Self {
            comment: text(map, "comment"),
            manufacturer: text(map, "manufacturer"),
            technology: text(map, "technology"),
            t_j_max: number(map, "t_j_max"),
            thermal_foster,
            channel,
            e_rr,
            linearized_diode,
        })
    }

    /// Forward curve at exactly `t_j`, and `v_g` when given.
    pub fn find_channel(&self, t_j: f64, v_g: Option<f64>) -> Result<&ChannelData> {
        find_channel(self, t_j, v_g)
    }

    /// Reverse-recovery energy dataset matching `query`.
    pub fn find_e_rr(&self, query: EnergyQuery) -> Result<&SwitchEnergyData> {
        find_energy(&self.e_rr, "diode e_rr", query)
    }

    /// Reverse-recovery energy against current at another gate resistance.
    pub fn e_rr_at_r_g(&self, query: GateResistanceQuery) -> Result<SwitchEnergyData> {
        energy_at_gate_resistance(&self.e_rr, "diode e_rr", query)
    }

    /// Stored linearization at exactly (t_j, v_g, i_channel).
    ///
    /// `v_g = None` matches any stored gate voltage, for diodes whose curves
    /// do not depend on it.
    pub fn find_linearized(&self, t_j: f64, v_g: Option<f64>, i_channel: f64) -> Option<&LinearizedModel> {
        self.linearized_diode.iter().find(|m| match v_g {
            Some(_) => m.matches(t_j, v_g, i_channel),
            None => m.matches(t_j, m.v_g, i_channel),
        })
    }

    /// Re-check the invariants construction guarantees, for data that
    /// bypassed [`Diode::from_record`].
    pub fn check_invariants(&self) -> Result<()> {
        let parent = EntityKind::Diode.name();
        self.thermal_foster.check_shape()?;
        for (index, data) in self.e_rr.iter().enumerate() {
            data.check_shape().map_err(|e| e.at_index(parent, "e_rr", index))?;
        }
        Ok(())
    }
}

impl ChannelSource for Diode {
    fn label(&self) -> &'static str {
        "diode"
    }

    fn channels(&self) -> &[ChannelData] {
        &self.channel
    }
}
