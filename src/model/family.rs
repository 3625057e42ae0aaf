//! Device families and their conduction behavior.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::analysis::ConductionKind;

/// Semiconductor device family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeviceFamily {
    /// Silicon MOSFET
    #[serde(rename = "MOSFET")]
    Mosfet,
    /// Insulated-gate bipolar transistor
    #[serde(rename = "IGBT")]
    Igbt,
    /// Silicon-carbide MOSFET
    #[serde(rename = "SiC-MOSFET")]
    SicMosfet,
    /// Gallium-nitride transistor
    #[serde(rename = "GaN-Transistor")]
    GanTransistor,
}

/// Datasheet gate voltages typical for a family.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GateDefaults {
    /// Turn-on gate voltage (V)
    pub v_g_on: f64,
    /// Turn-off gate voltage (V)
    pub v_g_off: f64,
    /// Gate voltage during diode conduction (V)
    pub v_g_diode: f64,
}

impl DeviceFamily {
    /// All supported families.
    pub const ALL: [DeviceFamily; 4] = [
        DeviceFamily::Mosfet,
        DeviceFamily::Igbt,
        DeviceFamily::SicMosfet,
        DeviceFamily::GanTransistor,
    ];

    /// Record spelling of the family.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mosfet => "MOSFET",
            Self::Igbt => "IGBT",
            Self::SicMosfet => "SiC-MOSFET",
            Self::GanTransistor => "GaN-Transistor",
        }
    }

    /// Parse the record spelling. Matching is exact.
    pub fn parse(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|family| family.as_str() == tag)
    }

    /// How the switch channel behaves when linearized.
    ///
    /// MOSFET channels are pure resistances; everything else carries a
    /// forward offset voltage.
    pub fn switch_conduction(&self) -> ConductionKind {
        match self {
            Self::Mosfet | Self::SicMosfet => ConductionKind::Resistive,
            Self::Igbt | Self::GanTransistor => ConductionKind::Offset,
        }
    }

    /// Diode conduction always has an offset voltage.
    pub fn diode_conduction(&self) -> ConductionKind {
        ConductionKind::Offset
    }

    /// Whether diode curves are measured per gate voltage.
    ///
    /// True for SiC-MOSFET body diodes and GaN reverse conduction, which
    /// depend on the applied gate voltage.
    pub fn diode_gate_dependent(&self) -> bool {
        matches!(self, Self::SicMosfet | Self::GanTransistor)
    }

    /// Typical gate voltages for the family.
    pub fn gate_defaults(&self) -> GateDefaults {
        match self {
            Self::Igbt => GateDefaults { v_g_on: 15.0, v_g_off: -15.0, v_g_diode: 0.0 },
            Self::Mosfet => GateDefaults { v_g_on: 10.0, v_g_off: 0.0, v_g_diode: 0.0 },
            Self::SicMosfet => GateDefaults { v_g_on: 15.0, v_g_off: -4.0, v_g_diode: 0.0 },
            Self::GanTransistor => GateDefaults { v_g_on: 6.0, v_g_off: -3.0, v_g_diode: 0.0 },
        }
    }
}

impl fmt::Display for DeviceFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_round_trip() {
        for family in DeviceFamily::ALL {
            assert_eq!(DeviceFamily::parse(family.as_str()), Some(family));
        }
        assert_eq!(DeviceFamily::parse("mosfet"), None);
    }

    #[test]
    fn test_conduction_kinds() {
        assert_eq!(DeviceFamily::Mosfet.switch_conduction(), ConductionKind::Resistive);
        assert_eq!(DeviceFamily::SicMosfet.switch_conduction(), ConductionKind::Resistive);
        assert_eq!(DeviceFamily::Igbt.switch_conduction(), ConductionKind::Offset);
        assert_eq!(DeviceFamily::Mosfet.diode_conduction(), ConductionKind::Offset);
        assert!(DeviceFamily::GanTransistor.diode_gate_dependent());
        assert!(!DeviceFamily::Igbt.diode_gate_dependent());
    }
}
