//! Primitive value checks shared by every rule set.
//!
//! Each check accepts an absent or `null` value, because optional keys may
//! be left out. Mandatory keys are checked for presence before these run.

use serde_json::Value;

use crate::error::{Result, TdbError};

/// Check whether a value is absent or an explicit `null`.
pub fn is_absent(value: Option<&Value>) -> bool {
    matches!(value, None | Some(Value::Null))
}

/// Short name of a JSON value's type for error messages.
pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "map",
    }
}

/// Check that a value is a real number (int or float), or absent.
pub fn check_realnum(value: Option<&Value>, kind: &str, key: &str) -> Result<()> {
    match value {
        None | Some(Value::Null) | Some(Value::Number(_)) => Ok(()),
        Some(other) => Err(TdbError::type_mismatch(
            kind,
            key,
            format!("expected a real number, got {} {}", type_name(other), other),
        )),
    }
}

/// Check that a value is a string, or absent.
pub fn check_str(value: Option<&Value>, kind: &str, key: &str) -> Result<()> {
    match value {
        None | Some(Value::Null) | Some(Value::String(_)) => Ok(()),
        Some(other) => Err(TdbError::type_mismatch(
            kind,
            key,
            format!("expected a string, got {} {}", type_name(other), other),
        )),
    }
}

/// Check that a value is a two-row, equal-length real matrix, or absent.
pub fn check_2d_dataset(value: Option<&Value>, kind: &str, key: &str) -> Result<()> {
    match value {
        None | Some(Value::Null) => Ok(()),
        Some(v) => two_row_matrix(v)
            .map(|_| ())
            .map_err(|message| TdbError::type_mismatch(kind, key, message)),
    }
}

/// Check that a value is a real vector (a lone number counts as length 1), or absent.
///
/// Returns the vector length when present.
pub fn check_real_vector(value: Option<&Value>, kind: &str, key: &str) -> Result<Option<usize>> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(v) => real_vector(v)
            .map(|values| Some(values.len()))
            .map_err(|message| TdbError::type_mismatch(kind, key, message)),
    }
}

/// Parse a two-row matrix `[[x...], [y...]]` of matched length.
pub fn two_row_matrix(value: &Value) -> std::result::Result<(Vec<f64>, Vec<f64>), String> {
    let rows = value
        .as_array()
        .ok_or_else(|| format!("expected a 2-row numeric matrix, got {}", type_name(value)))?;
    if rows.len() != 2 {
        return Err(format!("expected a matrix with exactly 2 rows, got {} rows", rows.len()));
    }
    let x = numeric_row(&rows[0], 1)?;
    let y = numeric_row(&rows[1], 2)?;
    if x.len() != y.len() {
        return Err(format!(
            "matrix rows must have equal length, got {} and {}",
            x.len(),
            y.len()
        ));
    }
    if x.is_empty() {
        return Err("matrix has no samples".to_string());
    }
    Ok((x, y))
}

/// Parse a real vector; a lone number is read as a one-element vector.
pub fn real_vector(value: &Value) -> std::result::Result<Vec<f64>, String> {
    match value {
        Value::Number(n) => n
            .as_f64()
            .map(|x| vec![x])
            .ok_or_else(|| format!("{n} is not a real number")),
        Value::Array(items) => items
            .iter()
            .map(|item| {
                item.as_f64()
                    .ok_or_else(|| format!("vector element {item} is not a real number"))
            })
            .collect(),
        other => Err(format!("expected a numeric vector, got {}", type_name(other))),
    }
}

/// Check that a query value is a finite number.
///
/// Record values come from JSON and are always finite; this guards values
/// passed in directly by callers.
pub fn check_finite(value: f64, kind: &str, key: &str) -> Result<()> {
    if value.is_finite() {
        return Ok(());
    }
    Err(TdbError::DomainValue {
        kind: kind.to_string(),
        key: key.to_string(),
        value: value.to_string(),
        allowed: vec!["a finite number".to_string()],
    })
}

fn numeric_row(row: &Value, row_number: usize) -> std::result::Result<Vec<f64>, String> {
    let items = row
        .as_array()
        .ok_or_else(|| format!("matrix row {row_number} is {}, expected an array", type_name(row)))?;
    items
        .iter()
        .map(|item| {
            item.as_f64()
                .ok_or_else(|| format!("matrix row {row_number} contains non-numeric value {item}"))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_check_finite() {
        assert!(check_finite(1.5, "linearization", "i_channel").is_ok());
        for value in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let err = check_finite(value, "linearization", "i_channel").unwrap_err();
            assert!(matches!(err, TdbError::DomainValue { ref key, .. } if key == "i_channel"));
        }
    }

    #[test]
    fn test_realnum_accepts_int_float_and_null() {
        assert!(check_realnum(Some(&json!(3)), "Switch", "t_j_max").is_ok());
        assert!(check_realnum(Some(&json!(3.5)), "Switch", "t_j_max").is_ok());
        assert!(check_realnum(Some(&Value::Null), "Switch", "t_j_max").is_ok());
        assert!(check_realnum(None, "Switch", "t_j_max").is_ok());
    }

    #[test]
    fn test_realnum_rejects_string() {
        let err = check_realnum(Some(&json!("175")), "Switch", "t_j_max").unwrap_err();
        assert!(matches!(err, TdbError::TypeMismatch { ref key, .. } if key == "t_j_max"));
    }

    #[test]
    fn test_matrix_shape() {
        assert!(two_row_matrix(&json!([[0, 1, 2], [0.0, 10.0, 20.0]])).is_ok());
        assert!(two_row_matrix(&json!([[0, 1, 2]])).is_err());
        assert!(two_row_matrix(&json!([[0, 1, 2], [0, 1]])).is_err());
        assert!(two_row_matrix(&json!([[0, "a"], [0, 1]])).is_err());
        assert!(two_row_matrix(&json!([[], []])).is_err());
    }

    #[test]
    fn test_vector_wraps_scalar() {
        assert_eq!(real_vector(&json!(2.5)).unwrap(), vec![2.5]);
        assert_eq!(check_real_vector(Some(&json!([1, 2, 3])), "Foster", "r_th_vector").unwrap(), Some(3));
        assert!(check_real_vector(Some(&json!([1, true])), "Foster", "r_th_vector").is_err());
    }
}
