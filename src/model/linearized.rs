//! Stored linearization results.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::record::{as_record, number, required_number};
use crate::error::Result;
use crate::validate::{validate, EntityKind};

/// Equivalent circuit `v0 + r·i` of a channel at one operating point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearizedModel {
    /// Junction temperature (°C)
    pub t_j: f64,
    /// Gate voltage (V); always set on the switch path
    pub v_g: Option<f64>,
    /// Current the curve was linearized at (A)
    pub i_channel: f64,
    /// Series resistance (Ω)
    pub r_channel: f64,
    /// Offset voltage (V)
    pub v0_channel: f64,
}

impl LinearizedModel {
    /// Build from a switch or diode linearized record. Absent or empty records give `Ok(None)`.
    pub fn from_record(record: &Value, kind: EntityKind) -> Result<Option<Self>> {
        if !validate(Some(record), kind)? {
            return Ok(None);
        }
        let Some(map) = as_record(Some(record)) else {
            return Ok(None);
        };
        let name = kind.name();
        Ok(Some(Self {
            t_j: required_number(map, name, "t_j")?,
            v_g: number(map, "v_g"),
            i_channel: required_number(map, name, "i_channel")?,
            r_channel: required_number(map, name, "r_channel")?,
            v0_channel: required_number(map, name, "v0_channel")?,
        }))
    }

    /// Check whether this result was computed for exactly (t_j, v_g, i_channel).
    pub fn matches(&self, t_j: f64, v_g: Option<f64>, i_channel: f64) -> bool {
        self.t_j == t_j && self.v_g == v_g && self.i_channel == i_channel
    }

    /// Channel voltage predicted at `i_channel`.
    pub fn voltage_at(&self, i_channel: f64) -> f64 {
        self.v0_channel + self.r_channel * i_channel
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TdbError;
    use approx::assert_relative_eq;
    use serde_json::json;

    #[test]
    fn test_diode_record_without_gate_voltage() {
        let record = json!({"t_j": 25, "i_channel": 20, "r_channel": 0.01, "v0_channel": 0.9});
        let model = LinearizedModel::from_record(&record, EntityKind::DiodeLinearized)
            .unwrap()
            .unwrap();
        assert_eq!(model.v_g, None);
        assert!(model.matches(25.0, None, 20.0));
        assert_relative_eq!(model.voltage_at(10.0), 1.0);

        let err = LinearizedModel::from_record(&record, EntityKind::SwitchLinearized).unwrap_err();
        assert!(matches!(err, TdbError::MissingKey { ref keys, .. } if keys == &["v_g"]));
    }
}
