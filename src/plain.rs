//! Round-trip conversion between entities and plain nested data.
//!
//! The plain form is a `serde_json::Value` tree: maps for entities, arrays
//! for collections, `[[x...], [y...]]` for matrices. Every field is written,
//! absent ones as explicit `null`, so "not supplied" and zero stay distinct
//! after a round trip:
//!
//! ```text
//! from_plain::<T>(to_plain(&e)?)? == e
//! ```
//!
//! Decoding re-checks the invariants that construction from records
//! guarantees (thermal stage lengths, energy field exclusivity, switch gate
//! voltages), so a hand-edited plain tree cannot produce an entity the
//! construction pipeline would have rejected. The housing-type vocabulary is
//! not consulted again; a stored device already carries the canonical name.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::Result;
use crate::model::{
    ChannelData, Device, Diode, FosterThermalModel, Graph, LinearizedModel, Switch, SwitchEnergyData,
    VoltageDependentCapacitance,
};

/// An entity with a plain form.
pub trait Plain: Serialize + DeserializeOwned {
    /// Invariants checked after decoding.
    fn check_plain(&self) -> Result<()> {
        Ok(())
    }
}

impl Plain for Device {
    fn check_plain(&self) -> Result<()> {
        self.check_invariants()
    }
}

impl Plain for Switch {
    fn check_plain(&self) -> Result<()> {
        self.check_invariants()
    }
}

impl Plain for Diode {
    fn check_plain(&self) -> Result<()> {
        self.check_invariants()
    }
}

impl Plain for FosterThermalModel {
    fn check_plain(&self) -> Result<()> {
        self.check_shape()
    }
}

impl Plain for SwitchEnergyData {
    fn check_plain(&self) -> Result<()> {
        self.check_shape()
    }
}

impl Plain for ChannelData {}

impl Plain for LinearizedModel {}

impl Plain for VoltageDependentCapacitance {}

impl Plain for Graph {}

/// Convert an entity to its plain form.
pub fn to_plain<T: Plain>(entity: &T) -> Result<Value> {
    Ok(serde_json::to_value(entity)?)
}

/// Rebuild an entity from its plain form.
pub fn from_plain<T: Plain>(plain: Value) -> Result<T> {
    let entity: T = serde_json::from_value(plain)?;
    entity.check_plain()?;
    Ok(entity)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TdbError;
    use crate::validate::HousingTypes;
    use serde_json::json;

    fn device() -> Device {
        let device = json!({
            "name": "TEST_IGBT", "type": "IGBT", "author": "Lab", "manufacturer": "Acme",
            "housing_area": 3.5e-4, "cooling_area": 1.6e-4, "housing_type": "TO-247",
            "v_abs_max": 1200, "i_abs_max": 100, "i_cont": 40, "r_th_cs": 0.0,
        });
        let switch = json!({
            "t_j_max": 175,
            "thermal_foster": {"r_th_vector": [0.1, 0.2], "c_th_vector": [0.01, 0.1], "r_th_total": 0.3},
            "channel": {"t_j": 25, "v_g": 15, "graph_v_i": [[0.7, 1.7], [0, 50]]},
            "e_on": {"dataset_type": "graph_r_e", "t_j": 25, "v_supply": 600, "v_g": 15,
                     "i_x": 40, "graph_r_e": [[1, 10], [1e-3, 4e-3]]},
        });
        Device::from_records(Some(&device), Some(&switch), None, &HousingTypes::from_lines("TO-247"))
            .unwrap()
    }

    #[test]
    fn test_device_round_trip() {
        let device = device();
        let plain = to_plain(&device).unwrap();
        let back: Device = from_plain(plain).unwrap();
        assert_eq!(back, device);
    }

    #[test]
    fn test_absent_values_are_explicit_null() {
        let plain = to_plain(&device()).unwrap();
        assert_eq!(plain["t_c_max"], Value::Null);
        assert_eq!(plain["r_th_cs"], json!(0.0));
        assert_eq!(plain["diode"]["t_j_max"], Value::Null);
        assert_eq!(plain["switch"]["e_on"][0]["e_x"], Value::Null);
        assert_eq!(plain["type"], json!("IGBT"));
        assert_eq!(plain["switch"]["channel"][0]["graph_v_i"], json!([[0.7, 1.7], [0.0, 50.0]]));
    }

    #[test]
    fn test_default_entities_round_trip() {
        let switch = Switch::default();
        assert_eq!(from_plain::<Switch>(to_plain(&switch).unwrap()).unwrap(), switch);
        let thermal = FosterThermalModel::default();
        assert_eq!(from_plain::<FosterThermalModel>(to_plain(&thermal).unwrap()).unwrap(), thermal);
    }

    #[test]
    fn test_decoding_rechecks_invariants() {
        let mut plain = to_plain(&device()).unwrap();
        plain["switch"]["thermal_foster"]["c_th_vector"] = json!([0.01]);
        let err = from_plain::<Device>(plain).unwrap_err();
        assert!(matches!(err, TdbError::ShapeMismatch { .. }));

        let mut plain = to_plain(&device()).unwrap();
        plain["switch"]["e_on"][0]["e_x"] = json!(1e-3);
        let err = from_plain::<Device>(plain).unwrap_err();
        assert!(matches!(err.root(), TdbError::ShapeMismatch { .. }));
    }

    #[test]
    fn test_malformed_matrix_is_rejected() {
        let mut plain = to_plain(&device()).unwrap();
        plain["switch"]["channel"][0]["graph_v_i"] = json!([[0.7, 1.7], [0.0]]);
        assert!(matches!(from_plain::<Device>(plain), Err(TdbError::Json(_))));
    }
}
