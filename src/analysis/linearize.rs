//! Channel linearization.
//!
//! A forward curve is reduced to an offset voltage `v0` and a series
//! resistance `r` valid near one operating current, so that
//! `v(i) ≈ v0 + r·i` in that neighbourhood.

use serde::{Deserialize, Serialize};

use super::interp::round_to;
use super::resolve::{find_channel, Bracket, ChannelSource};
use crate::error::{Result, TdbError};
use crate::model::ChannelData;
use crate::validate::checks::check_finite;
use crate::{OFFSET_CURRENT_STEP, RESISTANCE_DECIMALS, VOLTAGE_DECIMALS};

/// Shape of the equivalent circuit for a conduction path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConductionKind {
    /// Pure resistance, `v0 = 0` (MOSFET-like channels)
    Resistive,
    /// Offset voltage plus slope resistance (IGBT-like channels, diodes)
    Offset,
}

/// Linearize one forward curve at `i_channel`.
///
/// Returns `(v0, r)` rounded to [`VOLTAGE_DECIMALS`] and
/// [`RESISTANCE_DECIMALS`]. The offset kind takes the slope between
/// `i_channel` and `(1 + OFFSET_CURRENT_STEP)·i_channel`.
pub fn linearize_channel(channel: &ChannelData, i_channel: f64, kind: ConductionKind) -> Result<(f64, f64)> {
    check_finite(i_channel, "linearization", "i_channel")?;
    if i_channel == 0.0 {
        return Err(TdbError::DivisionByZero {
            what: "channel".to_string(),
        });
    }

    let v_1 = channel.voltage_at(i_channel);
    let (v0, r) = match kind {
        ConductionKind::Resistive => (0.0, v_1 / i_channel),
        ConductionKind::Offset => {
            let v_2 = channel.voltage_at((1.0 + OFFSET_CURRENT_STEP) * i_channel);
            let r = (v_2 - v_1) / (OFFSET_CURRENT_STEP * i_channel);
            (v_1 - r * i_channel, r)
        }
    };
    Ok((round_to(v0, VOLTAGE_DECIMALS), round_to(r, RESISTANCE_DECIMALS)))
}

/// Resolve the curve at (t_j, v_g) on `entity` and linearize it at `i_channel`.
///
/// A zero current is rejected before the lookup, so it fails the same way
/// whether or not data exists at the requested point.
pub fn linearize<E: ChannelSource>(
    entity: &E,
    t_j: f64,
    v_g: Option<f64>,
    i_channel: f64,
    kind: ConductionKind,
) -> Result<(f64, f64)> {
    check_finite(i_channel, "linearization", "i_channel")?;
    if i_channel == 0.0 {
        return Err(TdbError::DivisionByZero {
            what: format!("{} channel", entity.label()),
        });
    }
    let channel = find_channel(entity, t_j, v_g)?;
    linearize_channel(channel, i_channel, kind)
}

/// Forward voltage at `i_channel`, blended linearly in t_j between the two
/// curves of a bracket.
pub fn interpolate_channel_voltage(bracket: &Bracket<'_, ChannelData>, i_channel: f64) -> f64 {
    let v_lower = bracket.lower.voltage_at(i_channel);
    if bracket.is_single() {
        return v_lower;
    }
    let v_upper = bracket.upper.voltage_at(i_channel);
    v_lower + bracket.weight * (v_upper - v_lower)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::find_bracketing;
    use crate::model::Graph;
    use approx::assert_relative_eq;

    fn channel(t_j: f64, v: Vec<f64>, i: Vec<f64>) -> ChannelData {
        ChannelData {
            t_j,
            v_g: Some(15.0),
            graph_v_i: Graph::new(v, i).unwrap(),
        }
    }

    struct Path(Vec<ChannelData>);

    impl ChannelSource for Path {
        fn label(&self) -> &'static str {
            "switch"
        }

        fn channels(&self) -> &[ChannelData] {
            &self.0
        }
    }

    #[test]
    fn test_resistive_channel() {
        let ch = channel(25.0, vec![0.0, 1.0, 2.0], vec![0.0, 10.0, 20.0]);
        let (v0, r) = linearize_channel(&ch, 10.0, ConductionKind::Resistive).unwrap();
        assert_eq!(v0, 0.0);
        assert_relative_eq!(r, 0.1);
    }

    #[test]
    fn test_offset_channel() {
        // v = 0.8 + 0.02 * i
        let ch = channel(25.0, vec![0.8, 1.8, 2.8], vec![0.0, 50.0, 100.0]);
        let (v0, r) = linearize_channel(&ch, 40.0, ConductionKind::Offset).unwrap();
        assert_relative_eq!(v0, 0.8);
        assert_relative_eq!(r, 0.02);
    }

    #[test]
    fn test_results_are_rounded() {
        let ch = channel(25.0, vec![0.0, 1.0], vec![0.0, 3.0]);
        let (_, r) = linearize_channel(&ch, 3.0, ConductionKind::Resistive).unwrap();
        assert_eq!(r, 0.3333);
    }

    #[test]
    fn test_zero_current_fails_for_every_kind() {
        let ch = channel(25.0, vec![0.0, 1.0], vec![0.0, 10.0]);
        for kind in [ConductionKind::Resistive, ConductionKind::Offset] {
            let err = linearize_channel(&ch, 0.0, kind).unwrap_err();
            assert!(matches!(err, TdbError::DivisionByZero { .. }));
        }
        // checked before the lookup, so even a missing operating point gives the same error
        let path = Path(vec![]);
        let err = linearize(&path, 25.0, Some(15.0), 0.0, ConductionKind::Offset).unwrap_err();
        assert!(matches!(err, TdbError::DivisionByZero { .. }));
    }

    #[test]
    fn test_non_finite_current_is_rejected() {
        let ch = channel(25.0, vec![0.0, 1.0], vec![0.0, 10.0]);
        for i in [f64::NAN, f64::INFINITY] {
            let err = linearize_channel(&ch, i, ConductionKind::Offset).unwrap_err();
            assert!(matches!(err, TdbError::DomainValue { .. }));
        }
        let path = Path(vec![ch]);
        let err = linearize(&path, 25.0, Some(15.0), f64::NAN, ConductionKind::Resistive).unwrap_err();
        assert!(matches!(err, TdbError::DomainValue { .. }));
    }

    #[test]
    fn test_linearize_resolves_operating_point() {
        let path = Path(vec![
            channel(25.0, vec![0.0, 1.0, 2.0], vec![0.0, 10.0, 20.0]),
            channel(125.0, vec![0.0, 2.0, 4.0], vec![0.0, 10.0, 20.0]),
        ]);
        let (_, r) = linearize(&path, 125.0, Some(15.0), 10.0, ConductionKind::Resistive).unwrap();
        assert_relative_eq!(r, 0.2);
        let err = linearize(&path, 75.0, Some(15.0), 10.0, ConductionKind::Resistive).unwrap_err();
        assert!(matches!(err, TdbError::NotFound { .. }));
    }

    #[test]
    fn test_current_beyond_curve_is_clamped() {
        let ch = channel(25.0, vec![0.0, 1.0, 2.0], vec![0.0, 10.0, 20.0]);
        let (_, r) = linearize_channel(&ch, 40.0, ConductionKind::Resistive).unwrap();
        assert_relative_eq!(r, 0.05);
    }

    #[test]
    fn test_interpolate_between_temperatures() {
        let channels = vec![
            channel(25.0, vec![0.0, 1.0, 2.0], vec![0.0, 10.0, 20.0]),
            channel(125.0, vec![0.0, 2.0, 4.0], vec![0.0, 10.0, 20.0]),
        ];
        let bracket = find_bracketing(&channels, "switch channel", 75.0, Some(15.0)).unwrap();
        assert_relative_eq!(interpolate_channel_voltage(&bracket, 10.0), 1.5);
    }
}
