//! Error types for the transistor database core.
//!
//! This module provides a unified error type [`TdbError`] that covers
//! all error conditions that can occur during record validation, entity
//! construction, operating-point lookup, channel linearization and energy
//! rescaling.

use std::fmt;

use thiserror::Error;

/// Result type alias using [`TdbError`].
pub type Result<T> = std::result::Result<T, TdbError>;

/// A measured test condition, used to tell a caller which operating points exist.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AvailablePoint {
    /// Junction temperature in °C
    pub t_j: f64,
    /// Control (gate) voltage in V, absent for gate-independent datasets
    pub v_g: Option<f64>,
}

impl fmt::Display for AvailablePoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.v_g {
            Some(v_g) => write!(f, "({}, {})", self.t_j, v_g),
            None => write!(f, "({}, -)", self.t_j),
        }
    }
}

fn format_points(points: &[AvailablePoint]) -> String {
    let items: Vec<String> = points.iter().map(ToString::to_string).collect();
    format!("[{}]", items.join(", "))
}

/// Unified error type for all transistor database operations.
#[derive(Error, Debug)]
pub enum TdbError {
    // ============ Validation Errors ============
    /// Mandatory key absent or explicitly null
    #[error("{kind} record is missing mandatory key(s): {}", .keys.join(", "))]
    MissingKey { kind: String, keys: Vec<String> },

    /// Value fails its primitive type check
    #[error("{kind} key '{key}': {message}")]
    TypeMismatch {
        kind: String,
        key: String,
        message: String,
    },

    /// Value outside a controlled vocabulary or enumerated tag set
    #[error("{kind} key '{key}': value '{value}' is not allowed (expected one of: {})", .allowed.join(", "))]
    DomainValue {
        kind: String,
        key: String,
        value: String,
        allowed: Vec<String>,
    },

    /// Related vectors or matrices have inconsistent lengths
    #[error("{kind}: {message}")]
    ShapeMismatch { kind: String, message: String },

    /// Failure inside one element of a child collection
    #[error("{collection}[{index}] of {parent}: {source}")]
    IndexedChild {
        parent: String,
        collection: String,
        index: usize,
        #[source]
        source: Box<TdbError>,
    },

    // ============ Lookup Errors ============
    /// No dataset matches the requested operating point
    #[error("no {what} data at t_j = {t_j}{}; available operating points (t_j, v_g): {}",
        .v_g.map(|v| format!(", v_g = {v}")).unwrap_or_default(),
        format_points(.available))]
    NotFound {
        what: String,
        t_j: f64,
        v_g: Option<f64>,
        available: Vec<AvailablePoint>,
    },

    // ============ Linearization Errors ============
    /// Linearization requested at zero current
    #[error("cannot linearize {what} at i_channel = 0 A")]
    DivisionByZero { what: String },

    /// Linearization current exceeds the device's absolute maximum current
    #[error("linearization current {i_channel} A is above i_abs_max = {i_abs_max} A")]
    CurrentAboveRating { i_channel: f64, i_abs_max: f64 },

    // ============ Energy Errors ============
    /// Gate resistance beyond the measured energy-against-resistance curve
    #[error("r_g = {r_g} Ohm is above the largest measured gate resistance r_g_max = {r_g_max} Ohm")]
    GateResistanceOutOfRange { r_g: f64, r_g_max: f64 },

    /// An energy dataset cannot be rescaled because a reference value is zero
    #[error("cannot rescale {what}: {message}")]
    EnergyScaling { what: String, message: String },

    // ============ Configuration / I/O Errors ============
    /// Housing-type reference list cannot be loaded
    #[error("housing type list '{path}' is unavailable: {source}")]
    HousingTypesUnavailable {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Error reading an input file
    #[error("failed to read '{path}': {source}")]
    FileRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Plain-form decoding or encoding failed
    #[error("plain data error: {0}")]
    Json(#[from] serde_json::Error),
}

impl TdbError {
    /// Create a missing key error
    pub fn missing_keys<I, S>(kind: impl Into<String>, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::MissingKey {
            kind: kind.into(),
            keys: keys.into_iter().map(Into::into).collect(),
        }
    }

    /// Create a type mismatch error
    pub fn type_mismatch(kind: impl Into<String>, key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::TypeMismatch {
            kind: kind.into(),
            key: key.into(),
            message: message.into(),
        }
    }

    /// Create a shape mismatch error
    pub fn shape_mismatch(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ShapeMismatch {
            kind: kind.into(),
            message: message.into(),
        }
    }

    /// Create an energy rescaling error
    pub fn energy_scaling(what: impl Into<String>, message: impl Into<String>) -> Self {
        Self::EnergyScaling {
            what: what.into(),
            message: message.into(),
        }
    }

    /// Wrap an error with the position of the failing element in a child collection
    pub fn at_index(self, parent: impl Into<String>, collection: impl Into<String>, index: usize) -> Self {
        Self::IndexedChild {
            parent: parent.into(),
            collection: collection.into(),
            index,
            source: Box::new(self),
        }
    }

    /// The innermost error, looking through any positional wrappers.
    pub fn root(&self) -> &TdbError {
        match self {
            Self::IndexedChild { source, .. } => source.root(),
            other => other,
        }
    }
}
