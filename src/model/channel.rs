//! Forward conduction curves.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::record::{as_record, number, required_graph, required_number};
use super::Graph;
use crate::error::Result;
use crate::validate::{validate, EntityKind};

/// One forward V-I curve at fixed test conditions.
///
/// Row 1 of `graph_v_i` is the voltage (V), row 2 the current (A).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelData {
    /// Junction temperature (°C)
    pub t_j: f64,
    /// Gate voltage (V); always set for switch curves
    pub v_g: Option<f64>,
    /// Forward curve, voltage against current
    pub graph_v_i: Graph,
}

impl ChannelData {
    /// Build from a channel record of `kind` (switch or diode channel).
    ///
    /// Absent or empty records give `Ok(None)`.
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
            graph_v_i: required_graph(map, name, "graph_v_i")?,
        }))
    }

    /// Forward voltage at `i_channel`, clamped to the measured range.
    pub fn voltage_at(&self, i_channel: f64) -> f64 {
        self.graph_v_i.x_at(i_channel)
    }

    /// Forward current at `v_channel`, clamped to the measured range.
    pub fn current_at(&self, v_channel: f64) -> f64 {
        self.graph_v_i.y_at(v_channel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TdbError;
    use approx::assert_relative_eq;
    use serde_json::json;

    #[test]
    fn test_from_record() {
        let record = json!({"t_j": 25, "v_g": 15, "graph_v_i": [[0, 1, 2], [0, 10, 20]]});
        let channel = ChannelData::from_record(&record, EntityKind::SwitchChannel).unwrap().unwrap();
        assert_eq!(channel.t_j, 25.0);
        assert_eq!(channel.v_g, Some(15.0));
        assert_relative_eq!(channel.voltage_at(15.0), 1.5);
        assert_relative_eq!(channel.current_at(0.5), 5.0);
    }

    #[test]
    fn test_empty_record_is_skipped() {
        assert!(ChannelData::from_record(&json!({}), EntityKind::DiodeChannel).unwrap().is_none());
    }

    #[test]
    fn test_switch_channel_needs_gate_voltage() {
        let record = json!({"t_j": 25, "graph_v_i": [[0, 1], [0, 10]]});
        assert!(ChannelData::from_record(&record, EntityKind::DiodeChannel).unwrap().is_some());
        let err = ChannelData::from_record(&record, EntityKind::SwitchChannel).unwrap_err();
        assert!(matches!(err, TdbError::MissingKey { .. }));
    }

    #[test]
    fn test_ragged_matrix_is_type_mismatch() {
        let record = json!({"t_j": 25, "v_g": 15, "graph_v_i": [[0, 1, 2], [0, 10]]});
        let err = ChannelData::from_record(&record, EntityKind::SwitchChannel).unwrap_err();
        assert!(matches!(err, TdbError::TypeMismatch { .. }));
    }
}
