//! Switch conduction path.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::record::{as_record, build_collection, children, number, text};
use super::{ChannelData, FosterThermalModel, LinearizedModel, SwitchEnergyData};
use crate::analysis::{
    energy_at_gate_resistance, find_channel, find_energy, ChannelSource, EnergyQuery, GateResistanceQuery,
};
use crate::error::{Result, TdbError};
use crate::validate::{validate, EntityKind};

/// Measured behavior of the controllable switch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Switch {
    /// Free-text comment
    pub comment: Option<String>,
    /// Manufacturer of the switch die
    pub manufacturer: Option<String>,
    /// Semiconductor technology
    pub technology: Option<String>,
    /// Maximum junction temperature (°C)
    pub t_j_max: Option<f64>,
    /// Internal gate resistance (Ω)
    pub r_g_int: Option<f64>,
    /// Fixed output capacitance (F)
    pub c_oss_fix: Option<f64>,
    /// Fixed input capacitance (F)
    pub c_iss_fix: Option<f64>,
    /// Fixed reverse-transfer capacitance (F)
    pub c_rss_fix: Option<f64>,
    /// Junction-to-case thermal model
    pub thermal_foster: FosterThermalModel,
    /// Forward curves, one per (t_j, v_g)
    pub channel: Vec<ChannelData>,
    /// Turn-on energies
    pub e_on: Vec<SwitchEnergyData>,
    /// Turn-off energies
    pub e_off: Vec<SwitchEnergyData>,
    /// Stored linearizations
    pub linearized_switch: Vec<LinearizedModel>,
}

impl Switch {
    /// Build from a switch record; absent or empty gives the default switch.
    pub fn from_record(record: Option<&Value>) -> Result<Self> {
        if !validate(record, EntityKind::Switch)? {
            return Ok(Self::default());
        }
        let Some(map) = as_record(record) else {
            return Ok(Self::default());
        };
        let parent = EntityKind::Switch.name();

        let thermal_foster = FosterThermalModel::from_record(map.get("thermal_foster"))?;
        let channel = build_collection(children(map, parent, "channel")?, parent, "channel", |item| {
            ChannelData::from_record(item, EntityKind::SwitchChannel)
        })?;
        let e_on = build_collection(children(map, parent, "e_on")?, parent, "e_on", SwitchEnergyData::from_record)?;
        let e_off = build_collection(children(map, parent, "e_off")?, parent, "e_off", SwitchEnergyData::from_record)?;
        let linearized_switch = build_collection(
            children(map, parent, "linearized_switch")?,
            parent,
            "linearized_switch",
            |item| LinearizedModel::from_record(item, EntityKind::SwitchLinearized),
        )?;

        Ok(Self {
            comment: text(map, "comment"),
            manufacturer: text(map, "manufacturer"),
            technology: text(map, "technology"),
            t_j_max: number(map, "t_j_max"),
            r_g_int: number(map, "r_g_int"),
            c_oss_fix: number(map, "c_oss_fix"),
            c_iss_fix: number(map, "c_iss_fix"),
            c_rss_fix: number(map, "c_rss_fix"),
            thermal_foster,
            channel,
            e_on,
            e_off,
            linearized_switch,
        })
    }

    /// Forward curve at exactly (t_j, v_g).
    pub fn find_channel(&self, t_j: f64, v_g: f64) -> Result<&ChannelData> {
        find_channel(self, t_j, Some(v_g))
    }

    /// Turn-on energy dataset matching `query`.
    pub fn find_e_on(&self, query: EnergyQuery) -> Result<&SwitchEnergyData> {
        find_energy(&self.e_on, "switch e_on", query)
    }

    /// Turn-off energy dataset matching `query`.
    pub fn find_e_off(&self, query: EnergyQuery) -> Result<&SwitchEnergyData> {
        find_energy(&self.e_off, "switch e_off", query)
    }

    /// Turn-on energy against current at another gate resistance.
    pub fn e_on_at_r_g(&self, query: GateResistanceQuery) -> Result<SwitchEnergyData> {
        energy_at_gate_resistance(&self.e_on, "switch e_on", query)
    }

    /// Turn-off energy against current at another gate resistance.
    pub fn e_off_at_r_g(&self, query: GateResistanceQuery) -> Result<SwitchEnergyData> {
        energy_at_gate_resistance(&self.e_off, "switch e_off", query)
    }

    /// Stored linearization at exactly (t_j, v_g, i_channel).
    pub fn find_linearized(&self, t_j: f64, v_g: f64, i_channel: f64) -> Option<&LinearizedModel> {
        self.linearized_switch
            .iter()
            .find(|m| m.matches(t_j, Some(v_g), i_channel))
    }

    /// Re-check the invariants construction guarantees, for data that
    /// bypassed [`Switch::from_record`].
    pub fn check_invariants(&self) -> Result<()> {
        let parent = EntityKind::Switch.name();
        self.thermal_foster.check_shape()?;
        for (index, channel) in self.channel.iter().enumerate() {
            if channel.v_g.is_none() {
                return Err(TdbError::missing_keys(EntityKind::SwitchChannel.name(), ["v_g"])
                    .at_index(parent, "channel", index));
            }
        }
        for (collection, datasets) in [("e_on", &self.e_on), ("e_off", &self.e_off)] {
            for (index, data) in datasets.iter().enumerate() {
                data.check_shape().map_err(|e| e.at_index(parent, collection, index))?;
            }
        }
        for (index, model) in self.linearized_switch.iter().enumerate() {
            if model.v_g.is_none() {
                return Err(TdbError::missing_keys(EntityKind::SwitchLinearized.name(), ["v_g"])
                    .at_index(parent, "linearized_switch", index));
            }
        }
        Ok(())
    }
}

impl ChannelSource for Switch {
    fn label(&self) -> &'static str {
        "switch"
    }

    fn channels(&self) -> &[ChannelData] {
        &self.channel
    }
}
