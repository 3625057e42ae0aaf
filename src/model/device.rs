//! The device root entity.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use super::record::{as_record, build_collection, children, graph, number, required_number, required_text, text};
use super::{
    DeviceFamily, Diode, GateDefaults, Graph, LinearizedModel, Switch, SwitchEnergyData, VoltageDependentCapacitance,
};
use crate::analysis::{find_operating_point, linearize, ConductionKind, GateResistanceQuery};
use crate::error::{Result, TdbError};
use crate::validate::checks::check_finite;
use crate::validate::{validate_device, EntityKind, HousingTypes, RuleSet};
use crate::DEFAULT_T_TO_V_NORMALIZATION;

/// Which conduction path of a device to work on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConductionPath {
    /// The controllable switch
    Switch,
    /// The diode
    Diode,
}

impl fmt::Display for ConductionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Switch => f.write_str("switch"),
            Self::Diode => f.write_str("diode"),
        }
    }
}

/// Which switching energy of a device to work on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SwitchingEnergy {
    /// Switch turn-on
    EOn,
    /// Switch turn-off
    EOff,
    /// Diode reverse recovery
    ERr,
}

/// A transistor as described by its datasheet.
///
/// Built once from three records with [`Device::from_records`]; the only
/// state that changes afterwards are the linearization caches filled by
/// [`Device::linearize_cached`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Device {
    /// Part number
    pub name: String,
    /// Device family
    #[serde(rename = "type")]
    pub family: DeviceFamily,
    /// Author of the record
    pub author: String,
    /// Device manufacturer
    pub manufacturer: String,
    /// Free-text comment
    pub comment: Option<String>,
    /// Link to the datasheet
    pub datasheet_hyperlink: Option<String>,
    /// Datasheet release date
    pub datasheet_date: Option<String>,
    /// Datasheet version
    pub datasheet_version: Option<String>,
    /// Package designation, in the spelling of the housing-type list
    pub housing_type: String,
    /// Package footprint (m²)
    pub housing_area: f64,
    /// Area of the cooling interface (m²)
    pub cooling_area: f64,
    /// Maximum blocking voltage (V)
    pub v_abs_max: f64,
    /// Maximum pulsed current (A)
    pub i_abs_max: f64,
    /// Continuous current (A)
    pub i_cont: f64,
    /// Maximum case temperature (°C)
    pub t_c_max: Option<f64>,
    /// Case-to-sink thermal resistance of the whole device (K/W)
    pub r_th_cs: Option<f64>,
    /// Switch junction-to-sink thermal resistance (K/W)
    pub r_th_switch_cs: Option<f64>,
    /// Diode junction-to-sink thermal resistance (K/W)
    pub r_th_diode_cs: Option<f64>,
    /// Energy stored in C_oss against voltage
    pub graph_v_ecoss: Option<Graph>,
    /// Output capacitance curves, one per t_j
    pub c_oss: Vec<VoltageDependentCapacitance>,
    /// Input capacitance curves, one per t_j
    pub c_iss: Vec<VoltageDependentCapacitance>,
    /// Reverse-transfer capacitance curves, one per t_j
    pub c_rss: Vec<VoltageDependentCapacitance>,
    /// Switch path
    pub switch: Switch,
    /// Diode path
    pub diode: Diode,
}

impl Device {
    /// Build a device from its device-, switch- and diode-level records.
    ///
    /// The device record is mandatory: absent or empty reports every
    /// mandatory key as missing. Absent switch or diode records give default
    /// paths. The housing type is stored in the spelling of `housing_types`.
    pub fn from_records(
        device: Option<&Value>,
        switch: Option<&Value>,
        diode: Option<&Value>,
        housing_types: &HousingTypes,
    ) -> Result<Self> {
        let kind = EntityKind::Device.name();
        if !validate_device(device, housing_types)? {
            return Err(TdbError::missing_keys(
                kind,
                RuleSet::for_kind(EntityKind::Device).mandatory.iter().copied(),
            ));
        }
        let map = as_record(device).ok_or_else(|| TdbError::missing_keys(kind, ["name"]))?;

        let family_tag = required_text(map, kind, "type")?;
        let family = DeviceFamily::parse(&family_tag).ok_or_else(|| TdbError::DomainValue {
            kind: kind.to_string(),
            key: "type".to_string(),
            value: family_tag.clone(),
            allowed: DeviceFamily::ALL.iter().map(|f| f.as_str().to_string()).collect(),
        })?;
        let housing_type = housing_types
            .resolve(&required_text(map, kind, "housing_type")?)?
            .to_string();

        let capacitance = |key: &str| -> Result<Vec<VoltageDependentCapacitance>> {
            build_collection(children(map, kind, key)?, kind, key, VoltageDependentCapacitance::from_record)
        };

        let device = Self {
            name: required_text(map, kind, "name")?,
            family,
            author: required_text(map, kind, "author")?,
            manufacturer: required_text(map, kind, "manufacturer")?,
            comment: text(map, "comment"),
            datasheet_hyperlink: text(map, "datasheet_hyperlink"),
            datasheet_date: text(map, "datasheet_date"),
            datasheet_version: text(map, "datasheet_version"),
            housing_type,
            housing_area: required_number(map, kind, "housing_area")?,
            cooling_area: required_number(map, kind, "cooling_area")?,
            v_abs_max: required_number(map, kind, "v_abs_max")?,
            i_abs_max: required_number(map, kind, "i_abs_max")?,
            i_cont: required_number(map, kind, "i_cont")?,
            t_c_max: number(map, "t_c_max"),
            r_th_cs: number(map, "r_th_cs"),
            r_th_switch_cs: number(map, "r_th_switch_cs"),
            r_th_diode_cs: number(map, "r_th_diode_cs"),
            graph_v_ecoss: graph(map, kind, "graph_v_ecoss")?,
            c_oss: capacitance("c_oss")?,
            c_iss: capacitance("c_iss")?,
            c_rss: capacitance("c_rss")?,
            switch: Switch::from_record(switch)?,
            diode: Diode::from_record(diode)?,
        };
        debug!(
            name = %device.name,
            family = %device.family,
            switch_channels = device.switch.channel.len(),
            diode_channels = device.diode.channel.len(),
            "device built"
        );
        Ok(device)
    }

    /// Typical gate voltages of the device family.
    pub fn gate_defaults(&self) -> GateDefaults {
        self.family.gate_defaults()
    }

    /// Equivalent-circuit shape of a conduction path for this family.
    pub fn conduction_kind(&self, path: ConductionPath) -> ConductionKind {
        match path {
            ConductionPath::Switch => self.family.switch_conduction(),
            ConductionPath::Diode => self.family.diode_conduction(),
        }
    }

    /// Gate voltage a lookup on `path` filters by.
    ///
    /// Diode curves of gate-independent families are looked up by t_j only.
    fn lookup_v_g(&self, path: ConductionPath, v_g: f64) -> Option<f64> {
        match path {
            ConductionPath::Switch => Some(v_g),
            ConductionPath::Diode if self.family.diode_gate_dependent() => Some(v_g),
            ConductionPath::Diode => None,
        }
    }

    /// Linearize a conduction path at (t_j, v_g, i_channel).
    ///
    /// The equivalent-circuit shape follows the device family. `v_g` is
    /// ignored for diodes whose curves do not depend on the gate voltage.
    pub fn linearize(&self, path: ConductionPath, t_j: f64, v_g: f64, i_channel: f64) -> Result<LinearizedModel> {
        check_finite(i_channel, "linearization", "i_channel")?;
        if i_channel > self.i_abs_max {
            return Err(TdbError::CurrentAboveRating {
                i_channel,
                i_abs_max: self.i_abs_max,
            });
        }
        let v_g = self.lookup_v_g(path, v_g);
        let kind = self.conduction_kind(path);
        let (v0_channel, r_channel) = match path {
            ConductionPath::Switch => linearize(&self.switch, t_j, v_g, i_channel, kind)?,
            ConductionPath::Diode => linearize(&self.diode, t_j, v_g, i_channel, kind)?,
        };
        Ok(LinearizedModel {
            t_j,
            v_g,
            i_channel,
            r_channel,
            v0_channel,
        })
    }

    /// Like [`Device::linearize`], but reuses a stored result for the same
    /// (t_j, v_g, i_channel) and stores new ones on the path.
    ///
    /// Diode results of gate-independent families are reused whatever gate
    /// voltage they were stored with.
    pub fn linearize_cached(
        &mut self,
        path: ConductionPath,
        t_j: f64,
        v_g: f64,
        i_channel: f64,
    ) -> Result<LinearizedModel> {
        let lookup_v_g = self.lookup_v_g(path, v_g);
        let cached = match path {
            ConductionPath::Switch => self.switch.find_linearized(t_j, v_g, i_channel),
            ConductionPath::Diode => self.diode.find_linearized(t_j, lookup_v_g, i_channel),
        };
        if let Some(model) = cached {
            info!(%path, t_j, ?lookup_v_g, i_channel, "linearization cache hit");
            return Ok(*model);
        }

        info!(%path, t_j, ?lookup_v_g, i_channel, "linearization cache miss");
        let model = self.linearize(path, t_j, v_g, i_channel)?;
        match path {
            ConductionPath::Switch => self.switch.linearized_switch.push(model),
            ConductionPath::Diode => self.diode.linearized_diode.push(model),
        }
        Ok(model)
    }

    /// Energy-against-current curve at gate resistance `r_g`, rescaled to
    /// `v_supply`.
    ///
    /// Supply voltages above `v_abs_max` fall back to the measured one. The
    /// nearest `graph_r_e` curve is picked with [`DEFAULT_T_TO_V_NORMALIZATION`].
    pub fn energy_at_r_g(
        &self,
        energy: SwitchingEnergy,
        r_g: f64,
        t_j: f64,
        v_supply: Option<f64>,
    ) -> Result<SwitchEnergyData> {
        let query = GateResistanceQuery {
            r_g,
            t_j,
            v_supply,
            v_abs_max: self.v_abs_max,
            normalize_t_to_v: DEFAULT_T_TO_V_NORMALIZATION,
        };
        match energy {
            SwitchingEnergy::EOn => self.switch.e_on_at_r_g(query),
            SwitchingEnergy::EOff => self.switch.e_off_at_r_g(query),
            SwitchingEnergy::ERr => self.diode.e_rr_at_r_g(query),
        }
    }

    /// Output capacitance curve measured at exactly `t_j`.
    pub fn c_oss_at(&self, t_j: f64) -> Result<&VoltageDependentCapacitance> {
        find_operating_point(&self.c_oss, "c_oss", t_j, None)
    }

    /// Re-check the invariants construction guarantees, for data that
    /// bypassed [`Device::from_records`].
    pub fn check_invariants(&self) -> Result<()> {
        self.switch.check_invariants()?;
        self.diode.check_invariants()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use serde_json::json;

    fn housing() -> HousingTypes {
        HousingTypes::from_lines("TO-220\nTO-247\nTO-247-4\n")
    }

    fn device_record(family: &str) -> Value {
        json!({
            "name": "TEST_DEVICE",
            "type": family,
            "author": "Lab",
            "manufacturer": "Acme",
            "housing_area": 3.5e-4,
            "cooling_area": 1.6e-4,
            "housing_type": "to247",
            "v_abs_max": 1200,
            "i_abs_max": 100,
            "i_cont": 40,
            "c_oss": [{"t_j": 25, "graph_v_c": [[0, 400], [1e-9, 1e-10]]}],
        })
    }

    fn switch_record() -> Value {
        json!({
            "t_j_max": 175,
            "channel": [
                {"t_j": 25, "v_g": 15, "graph_v_i": [[0, 1, 2], [0, 10, 20]]},
                {"t_j": 25, "v_g": 15, "graph_v_i": [[0, 5, 10], [0, 10, 20]]},
            ],
        })
    }

    fn diode_record() -> Value {
        json!({
            "t_j_max": 175,
            "channel": [
                {"t_j": 25, "graph_v_i": [[0.8, 1.8, 2.8], [0, 50, 100]]},
            ],
        })
    }

    fn build(family: &str) -> Device {
        Device::from_records(
            Some(&device_record(family)),
            Some(&switch_record()),
            Some(&diode_record()),
            &housing(),
        )
        .unwrap()
    }

    #[test]
    fn test_empty_device_record_names_all_mandatory_keys() {
        let err = Device::from_records(Some(&json!({})), None, None, &housing()).unwrap_err();
        match err {
            TdbError::MissingKey { keys, .. } => {
                assert_eq!(keys.len(), 10);
                assert!(keys.iter().any(|k| k == "housing_type"));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_missing_device_key() {
        let mut record = device_record("IGBT");
        record.as_object_mut().unwrap().remove("i_cont");
        let err = Device::from_records(Some(&record), None, None, &housing()).unwrap_err();
        assert!(matches!(err, TdbError::MissingKey { ref keys, .. } if keys == &["i_cont"]));
    }

    #[test]
    fn test_canonical_housing_type_is_stored() {
        let device = build("MOSFET");
        assert_eq!(device.housing_type, "TO-247");
        assert_eq!(device.family, DeviceFamily::Mosfet);
        assert_eq!(device.switch.channel.len(), 2);
        assert_eq!(device.c_oss.len(), 1);
        assert!(device.c_iss.is_empty());
    }

    #[test]
    fn test_unknown_housing_type() {
        let mut record = device_record("MOSFET");
        record["housing_type"] = json!("SOT-23");
        let err = Device::from_records(Some(&record), None, None, &housing()).unwrap_err();
        assert!(matches!(err, TdbError::DomainValue { ref key, .. } if key == "housing_type"));
    }

    #[test]
    fn test_mosfet_switch_is_resistive() {
        // duplicate curves at (25, 15): the first one is used
        let device = build("MOSFET");
        let model = device.linearize(ConductionPath::Switch, 25.0, 15.0, 10.0).unwrap();
        assert_eq!(model.v0_channel, 0.0);
        assert_relative_eq!(model.r_channel, 0.1);
        assert_eq!(model.v_g, Some(15.0));
    }

    #[test]
    fn test_igbt_diode_ignores_gate_voltage() {
        let device = build("IGBT");
        let model = device.linearize(ConductionPath::Diode, 25.0, 15.0, 40.0).unwrap();
        assert_eq!(model.v_g, None);
        assert_relative_eq!(model.v0_channel, 0.8);
        assert_relative_eq!(model.r_channel, 0.02);
    }

    #[test]
    fn test_current_above_rating() {
        let device = build("IGBT");
        let err = device.linearize(ConductionPath::Switch, 25.0, 15.0, 150.0).unwrap_err();
        assert!(matches!(err, TdbError::CurrentAboveRating { .. }));
    }

    #[test]
    fn test_zero_current() {
        let device = build("IGBT");
        for path in [ConductionPath::Switch, ConductionPath::Diode] {
            let err = device.linearize(path, 25.0, 15.0, 0.0).unwrap_err();
            assert!(matches!(err, TdbError::DivisionByZero { .. }));
        }
    }

    #[test]
    fn test_non_finite_current() {
        let device = build("MOSFET");
        for i in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            for path in [ConductionPath::Switch, ConductionPath::Diode] {
                let err = device.linearize(path, 25.0, 10.0, i).unwrap_err();
                assert!(matches!(err, TdbError::DomainValue { ref key, .. } if key == "i_channel"));
            }
        }
    }

    #[test]
    fn test_cached_diode_result_reused_across_gate_voltages() {
        let mut record = diode_record();
        record["linearized_diode"] = json!([
            {"t_j": 25, "v_g": 0, "i_channel": 40, "r_channel": 0.02, "v0_channel": 0.8},
        ]);
        let mut device =
            Device::from_records(Some(&device_record("IGBT")), Some(&switch_record()), Some(&record), &housing())
                .unwrap();

        let stored = device.linearize_cached(ConductionPath::Diode, 25.0, 15.0, 40.0).unwrap();
        assert_eq!(stored.v_g, Some(0.0));
        device.linearize_cached(ConductionPath::Diode, 25.0, -5.0, 40.0).unwrap();
        assert_eq!(device.diode.linearized_diode.len(), 1);

        let fresh = device.linearize_cached(ConductionPath::Diode, 25.0, 15.0, 50.0).unwrap();
        assert_eq!(fresh.v_g, None);
        device.linearize_cached(ConductionPath::Diode, 25.0, 0.0, 50.0).unwrap();
        assert_eq!(device.diode.linearized_diode.len(), 2);
    }

    #[test]
    fn test_linearize_cached_stores_result_once() {
        let mut device = build("MOSFET");
        let first = device.linearize_cached(ConductionPath::Switch, 25.0, 15.0, 10.0).unwrap();
        let second = device.linearize_cached(ConductionPath::Switch, 25.0, 15.0, 10.0).unwrap();
        assert_eq!(first, second);
        assert_eq!(device.switch.linearized_switch.len(), 1);

        assert!(device.linearize_cached(ConductionPath::Switch, 99.0, 15.0, 10.0).is_err());
        assert_eq!(device.switch.linearized_switch.len(), 1);
    }

    #[test]
    fn test_energy_at_r_g_per_path() {
        let mut switch = switch_record();
        switch["e_on"] = json!([
            {"dataset_type": "graph_i_e", "t_j": 25, "v_supply": 600, "v_g": 15, "r_g": 5,
             "graph_i_e": [[0, 50, 100], [0, 1e-3, 2e-3]]},
            {"dataset_type": "graph_r_e", "t_j": 25, "v_supply": 600, "v_g": 15, "i_x": 100,
             "graph_r_e": [[5, 10, 20], [2e-3, 3e-3, 5e-3]]},
        ]);
        let device =
            Device::from_records(Some(&device_record("IGBT")), Some(&switch), Some(&diode_record()), &housing())
                .unwrap();

        let e_on = device.energy_at_r_g(SwitchingEnergy::EOn, 10.0, 25.0, Some(300.0)).unwrap();
        assert_eq!(e_on.v_supply, 300.0);
        assert_relative_eq!(e_on.energy_at(100.0).unwrap(), 1.5e-3, max_relative = 1e-12);

        // above v_abs_max, so the measured 600 V is kept
        let e_on = device.energy_at_r_g(SwitchingEnergy::EOn, 20.0, 25.0, Some(1500.0)).unwrap();
        assert_eq!(e_on.v_supply, 600.0);
        assert_relative_eq!(e_on.energy_at(100.0).unwrap(), 5e-3, max_relative = 1e-12);

        assert!(matches!(
            device.energy_at_r_g(SwitchingEnergy::EOn, 30.0, 25.0, None),
            Err(TdbError::GateResistanceOutOfRange { .. })
        ));
        for energy in [SwitchingEnergy::EOff, SwitchingEnergy::ERr] {
            assert!(matches!(
                device.energy_at_r_g(energy, 10.0, 25.0, None),
                Err(TdbError::NotFound { .. })
            ));
        }
    }

    #[test]
    fn test_c_oss_at() {
        let device = build("SiC-MOSFET");
        assert!(device.c_oss_at(25.0).is_ok());
        assert!(matches!(device.c_oss_at(100.0), Err(TdbError::NotFound { .. })));
    }
}
