//! Rule table: which keys each entity kind requires and how they are typed.

use std::fmt;

use serde_json::{Map, Value};

use super::checks::{check_2d_dataset, check_real_vector, check_realnum, check_str, is_absent, type_name};
use super::housing::HousingTypes;
use crate::error::{Result, TdbError};
use crate::model::{DeviceFamily, EnergyDatasetType};

/// Kinds of input record the construction pipeline accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    /// Device-level record (identity, ratings, package, capacitance curves)
    Device,
    /// Switch-level record
    Switch,
    /// Diode-level record
    Diode,
    /// Foster RC network
    FosterThermalModel,
    /// Switch forward curve (gate voltage mandatory)
    SwitchChannel,
    /// Diode forward curve (gate voltage optional)
    DiodeChannel,
    /// Switching or reverse-recovery energy, shape chosen by `dataset_type`
    Energy,
    /// Cached switch linearization
    SwitchLinearized,
    /// Cached diode linearization
    DiodeLinearized,
    /// Capacitance-vs-voltage curve
    Capacitance,
}

impl EntityKind {
    /// Name used in error messages.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Device => "Device",
            Self::Switch => "Switch",
            Self::Diode => "Diode",
            Self::FosterThermalModel => "FosterThermalModel",
            Self::SwitchChannel => "SwitchChannel",
            Self::DiodeChannel => "DiodeChannel",
            Self::Energy => "SwitchEnergyData",
            Self::SwitchLinearized => "SwitchLinearizedModel",
            Self::DiodeLinearized => "DiodeLinearizedModel",
            Self::Capacitance => "VoltageDependentCapacitance",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Key sets for one entity kind.
#[derive(Debug, Clone, Copy)]
pub struct RuleSet {
    /// Keys that must be present and non-null
    pub mandatory: &'static [&'static str],
    /// Keys that must hold real numbers
    pub numeric: &'static [&'static str],
    /// Keys that must hold strings
    pub strings: &'static [&'static str],
    /// Keys that must hold two-row matrices
    pub matrices: &'static [&'static str],
    /// Keys that must hold real vectors
    pub vectors: &'static [&'static str],
}

const NONE: &[&str] = &[];

impl RuleSet {
    /// Rule set for a kind whose rules do not depend on the record content.
    ///
    /// `Energy` is resolved through [`RuleSet::for_energy`]; here it only
    /// carries the keys shared by all dataset types.
    pub fn for_kind(kind: EntityKind) -> RuleSet {
        match kind {
            EntityKind::Device => RuleSet {
                mandatory: &[
                    "name", "type", "author", "manufacturer", "housing_area", "cooling_area",
                    "housing_type", "v_abs_max", "i_abs_max", "i_cont",
                ],
                numeric: &[
                    "housing_area", "cooling_area", "v_abs_max", "i_abs_max", "i_cont", "t_c_max",
                    "r_th_cs", "r_th_switch_cs", "r_th_diode_cs",
                ],
                strings: &[
                    "name", "type", "author", "manufacturer", "housing_type", "comment",
                    "datasheet_hyperlink", "datasheet_date", "datasheet_version",
                ],
                matrices: &["graph_v_ecoss"],
                vectors: NONE,
            },
            EntityKind::Switch => RuleSet {
                mandatory: NONE,
                numeric: &["t_j_max", "r_g_int", "c_oss_fix", "c_iss_fix", "c_rss_fix"],
                strings: &["comment", "manufacturer", "technology"],
                matrices: NONE,
                vectors: NONE,
            },
            EntityKind::Diode => RuleSet {
                mandatory: &["t_j_max"],
                numeric: &["t_j_max"],
                strings: &["comment", "manufacturer", "technology"],
                matrices: NONE,
                vectors: NONE,
            },
            EntityKind::FosterThermalModel => RuleSet {
                mandatory: NONE,
                numeric: &["r_th_total", "c_th_total", "tau_total"],
                strings: NONE,
                matrices: &["graph_t_rthjc"],
                vectors: &["r_th_vector", "c_th_vector", "tau_vector"],
            },
            EntityKind::SwitchChannel => RuleSet {
                mandatory: &["t_j", "v_g", "graph_v_i"],
                numeric: &["t_j", "v_g"],
                strings: NONE,
                matrices: &["graph_v_i"],
                vectors: NONE,
            },
            EntityKind::DiodeChannel => RuleSet {
                mandatory: &["t_j", "graph_v_i"],
                numeric: &["t_j", "v_g"],
                strings: NONE,
                matrices: &["graph_v_i"],
                vectors: NONE,
            },
            EntityKind::Energy => RuleSet {
                mandatory: &["dataset_type", "t_j", "v_supply", "v_g"],
                numeric: &["t_j", "v_supply", "v_g"],
                strings: &["dataset_type"],
                matrices: NONE,
                vectors: NONE,
            },
            EntityKind::SwitchLinearized => RuleSet {
                mandatory: &["t_j", "v_g", "i_channel", "r_channel", "v0_channel"],
                numeric: &["t_j", "v_g", "i_channel", "r_channel", "v0_channel"],
                strings: NONE,
                matrices: NONE,
                vectors: NONE,
            },
            EntityKind::DiodeLinearized => RuleSet {
                mandatory: &["t_j", "i_channel", "r_channel", "v0_channel"],
                numeric: &["t_j", "v_g", "i_channel", "r_channel", "v0_channel"],
                strings: NONE,
                matrices: NONE,
                vectors: NONE,
            },
            EntityKind::Capacitance => RuleSet {
                mandatory: &["t_j", "graph_v_c"],
                numeric: &["t_j"],
                strings: NONE,
                matrices: &["graph_v_c"],
                vectors: NONE,
            },
        }
    }

    /// Rule set for one energy dataset type.
    pub fn for_energy(dataset_type: EnergyDatasetType) -> RuleSet {
        match dataset_type {
            EnergyDatasetType::Single => RuleSet {
                mandatory: &["dataset_type", "t_j", "v_supply", "v_g", "e_x", "r_g", "i_x"],
                numeric: &["t_j", "v_supply", "v_g", "e_x", "r_g", "i_x"],
                strings: &["dataset_type"],
                matrices: NONE,
                vectors: NONE,
            },
            EnergyDatasetType::GraphRE => RuleSet {
                mandatory: &["dataset_type", "t_j", "v_supply", "v_g", "graph_r_e", "i_x"],
                numeric: &["t_j", "v_supply", "v_g", "i_x"],
                strings: &["dataset_type"],
                matrices: &["graph_r_e"],
                vectors: NONE,
            },
            EnergyDatasetType::GraphIE => RuleSet {
                mandatory: &["dataset_type", "t_j", "v_supply", "v_g", "graph_i_e", "r_g"],
                numeric: &["t_j", "v_supply", "v_g", "r_g"],
                strings: &["dataset_type"],
                matrices: &["graph_i_e"],
                vectors: NONE,
            },
        }
    }
}

/// Validate an input record for one entity kind.
///
/// Returns `Ok(false)` when the record is absent, `null` or an empty map:
/// that is the "nothing supplied" signal and is left for the caller to
/// interpret. Returns `Ok(true)` for a well-formed record and an error for
/// anything present but malformed.
///
/// Device records are checked structurally here; the housing-type
/// vocabulary is checked by [`validate_device`].
pub fn validate(record: Option<&Value>, kind: EntityKind) -> Result<bool> {
    let map = match record {
        None | Some(Value::Null) => return Ok(false),
        Some(Value::Object(map)) if map.is_empty() => return Ok(false),
        Some(Value::Object(map)) => map,
        Some(other) => {
            return Err(TdbError::type_mismatch(
                kind.name(),
                "<record>",
                format!("expected a map of {kind} fields, got {}", type_name(other)),
            ))
        }
    };

    let rules = match kind {
        EntityKind::Energy => RuleSet::for_energy(energy_dataset_type(map)?),
        other => RuleSet::for_kind(other),
    };
    check_rules(map, kind, &rules)?;

    match kind {
        EntityKind::Device => check_family(map)?,
        EntityKind::FosterThermalModel => check_foster_lengths(map)?,
        _ => {}
    }

    Ok(true)
}

/// Validate a device-level record, including the housing-type vocabulary.
pub fn validate_device(record: Option<&Value>, housing_types: &HousingTypes) -> Result<bool> {
    if !validate(record, EntityKind::Device)? {
        return Ok(false);
    }
    if let Some(housing_type) = record.and_then(|r| r.get("housing_type")).and_then(Value::as_str) {
        housing_types.resolve(housing_type)?;
    }
    Ok(true)
}

fn check_rules(map: &Map<String, Value>, kind: EntityKind, rules: &RuleSet) -> Result<()> {
    let missing: Vec<&str> = rules
        .mandatory
        .iter()
        .copied()
        .filter(|key| is_absent(map.get(*key)))
        .collect();
    if !missing.is_empty() {
        return Err(TdbError::missing_keys(kind.name(), missing));
    }

    for key in rules.numeric {
        check_realnum(map.get(*key), kind.name(), key)?;
    }
    for key in rules.strings {
        check_str(map.get(*key), kind.name(), key)?;
    }
    for key in rules.matrices {
        check_2d_dataset(map.get(*key), kind.name(), key)?;
    }
    for key in rules.vectors {
        check_real_vector(map.get(*key), kind.name(), key)?;
    }
    Ok(())
}

/// Read and check the `dataset_type` discriminant of an energy record.
pub(crate) fn energy_dataset_type(map: &Map<String, Value>) -> Result<EnergyDatasetType> {
    let kind = EntityKind::Energy.name();
    let value = match map.get("dataset_type") {
        None | Some(Value::Null) => return Err(TdbError::missing_keys(kind, ["dataset_type"])),
        Some(value) => value,
    };
    let tag = value.as_str().ok_or_else(|| {
        TdbError::type_mismatch(kind, "dataset_type", format!("expected a string, got {}", type_name(value)))
    })?;
    EnergyDatasetType::parse(tag).ok_or_else(|| TdbError::DomainValue {
        kind: kind.to_string(),
        key: "dataset_type".to_string(),
        value: tag.to_string(),
        allowed: EnergyDatasetType::ALL.iter().map(|t| t.as_str().to_string()).collect(),
    })
}

fn check_family(map: &Map<String, Value>) -> Result<()> {
    let tag = map.get("type").and_then(Value::as_str).unwrap_or_default();
    if DeviceFamily::parse(tag).is_none() {
        return Err(TdbError::DomainValue {
            kind: EntityKind::Device.name().to_string(),
            key: "type".to_string(),
            value: tag.to_string(),
            allowed: DeviceFamily::ALL.iter().map(|f| f.as_str().to_string()).collect(),
        });
    }
    Ok(())
}

fn check_foster_lengths(map: &Map<String, Value>) -> Result<()> {
    let kind = EntityKind::FosterThermalModel.name();
    let mut lengths = Vec::new();
    for key in RuleSet::for_kind(EntityKind::FosterThermalModel).vectors {
        if let Some(len) = check_real_vector(map.get(*key), kind, key)? {
            lengths.push((*key, len));
        }
    }
    if let Some((_, first)) = lengths.first() {
        if lengths.iter().any(|(_, len)| len != first) {
            let described: Vec<String> = lengths.iter().map(|(key, len)| format!("{key} has {len}")).collect();
            return Err(TdbError::shape_mismatch(
                kind,
                format!(
                    "r_th_vector, c_th_vector and tau_vector (if given) must have the same length: {}",
                    described.join(", ")
                ),
            ));
        }
    }
    Ok(())
}
