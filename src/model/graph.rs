//! Two-row measurement matrix.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::analysis::interp;
use crate::error::{Result, TdbError};
use crate::validate::checks::two_row_matrix;

/// A digitized datasheet curve stored as a 2×n matrix.
///
/// Row 1 holds the independent variable (voltage, resistance, current, time),
/// row 2 the dependent one. Both rows always have the same, non-zero length.
/// In plain form the matrix is a nested array `[[x...], [y...]]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<f64>>", into = "Vec<Vec<f64>>")]
pub struct Graph {
    x: Vec<f64>,
    y: Vec<f64>,
}

impl Graph {
    /// Create a graph from its two rows.
    pub fn new(x: Vec<f64>, y: Vec<f64>) -> Result<Self> {
        if x.len() != y.len() {
            return Err(TdbError::shape_mismatch(
                "Graph",
                format!("rows must have equal length, got {} and {}", x.len(), y.len()),
            ));
        }
        if x.is_empty() {
            return Err(TdbError::shape_mismatch("Graph", "graph has no samples"));
        }
        Ok(Self { x, y })
    }

    /// Parse a graph from a record value, reporting failures against `kind`/`key`.
    pub fn from_value(value: &Value, kind: &str, key: &str) -> Result<Self> {
        let (x, y) = two_row_matrix(value).map_err(|message| TdbError::type_mismatch(kind, key, message))?;
        Ok(Self { x, y })
    }

    /// First row (independent variable).
    pub fn x(&self) -> &[f64] {
        &self.x
    }

    /// Second row (dependent variable).
    pub fn y(&self) -> &[f64] {
        &self.y
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.x.len()
    }

    /// Always false for a constructed graph; kept for API symmetry.
    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// Iterate `(x, y)` sample pairs.
    pub fn points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.x.iter().copied().zip(self.y.iter().copied())
    }

    /// Row 2 value at `x`, piecewise linear, clamped at the sampled range.
    pub fn y_at(&self, x: f64) -> f64 {
        interp::interp(x, &self.x, &self.y)
    }

    /// Row 1 value at `y`, piecewise linear, clamped at the sampled range.
    pub fn x_at(&self, y: f64) -> f64 {
        interp::interp(y, &self.y, &self.x)
    }

    /// Same x row, each y replaced by `f(x, y)`.
    pub fn map_y(&self, f: impl Fn(f64, f64) -> f64) -> Graph {
        Self {
            x: self.x.clone(),
            y: self.points().map(|(x, y)| f(x, y)).collect(),
        }
    }

    /// Running integral of y over x, starting at 0 at the first sample.
    pub fn cumulative_integral(&self) -> Graph {
        Self {
            x: self.x.clone(),
            y: interp::cumulative_trapezoid(&self.y, &self.x),
        }
    }
}

impl TryFrom<Vec<Vec<f64>>> for Graph {
    type Error = TdbError;

    fn try_from(rows: Vec<Vec<f64>>) -> Result<Self> {
        let mut rows = rows.into_iter();
        match (rows.next(), rows.next(), rows.next()) {
            (Some(x), Some(y), None) => Graph::new(x, y),
            _ => Err(TdbError::shape_mismatch("Graph", "expected exactly 2 rows")),
        }
    }
}

impl From<Graph> for Vec<Vec<f64>> {
    fn from(graph: Graph) -> Self {
        vec![graph.x, graph.y]
    }
}
