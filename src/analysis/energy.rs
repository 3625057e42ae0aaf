//! Switching energy at conditions other than the measured ones.
//!
//! A datasheet gives energy against current at one gate resistance
//! (`graph_i_e`) and energy against gate resistance at one current
//! (`graph_r_e`). Combining the two gives the energy-against-current curve
//! at another gate resistance:
//!
//! ```text
//! E(i, r_g) = E_i_e(i) · E_r_e(r_g) / E_r_e(r_g_nominal) · v_supply / v_supply_measured
//! ```

use tracing::info;

use super::resolve::{find_nearest, not_found};
use crate::error::{Result, TdbError};
use crate::model::{EnergyDatasetType, SwitchEnergyData};
use crate::validate::checks::check_finite;

/// Operating conditions for [`energy_at_gate_resistance`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GateResistanceQuery {
    /// Gate resistance of interest (Ω)
    pub r_g: f64,
    /// Junction temperature; the `graph_i_e` curve must be measured exactly here (°C)
    pub t_j: f64,
    /// Supply voltage of interest (V); the measured one is kept when absent
    pub v_supply: Option<f64>,
    /// Largest acceptable supply voltage, normally the device's `v_abs_max` (V)
    pub v_abs_max: f64,
    /// Temperature-to-voltage weight used when picking the nearest `graph_r_e` curve
    pub normalize_t_to_v: f64,
}

fn is_pair(i_e: &SwitchEnergyData, r_e: &SwitchEnergyData) -> bool {
    r_e.dataset_type == EnergyDatasetType::GraphRE
        && r_e.v_supply == i_e.v_supply
        && r_e.t_j == i_e.t_j
        && r_e.v_g == i_e.v_g
}

/// Pick the `graph_i_e` curve at `t_j` and the `graph_r_e` curve to scale it with.
///
/// An i_e curve with an r_e curve at the same (t_j, v_g, v_supply) wins;
/// otherwise the first i_e curve is paired with the nearest r_e curve at
/// its supply voltage.
fn select_curves<'a>(
    datasets: &'a [SwitchEnergyData],
    what: &str,
    t_j: f64,
    normalize_t_to_v: f64,
) -> Result<(&'a SwitchEnergyData, &'a SwitchEnergyData)> {
    let i_e_curves: Vec<&SwitchEnergyData> = datasets
        .iter()
        .filter(|d| d.dataset_type == EnergyDatasetType::GraphIE && d.t_j == t_j)
        .collect();
    let paired = i_e_curves
        .iter()
        .find_map(|&i_e| datasets.iter().find(|r_e| is_pair(i_e, r_e)).map(|r_e| (i_e, r_e)));
    if let Some(pair) = paired {
        return Ok(pair);
    }

    let i_e = *i_e_curves
        .first()
        .ok_or_else(|| not_found(datasets, &format!("{what} graph_i_e"), t_j, None))?;
    let r_e_curves: Vec<&SwitchEnergyData> = datasets
        .iter()
        .filter(|d| d.dataset_type == EnergyDatasetType::GraphRE && d.v_supply == i_e.v_supply)
        .collect();
    let r_e = find_nearest(&r_e_curves, &format!("{what} graph_r_e"), i_e.t_j, i_e.v_g, normalize_t_to_v)
        .map_err(|_| not_found(datasets, &format!("{what} graph_r_e at v_supply = {}", i_e.v_supply), t_j, None))?;
    Ok((i_e, *r_e))
}

/// Energy-against-current curve of `datasets` at another gate resistance
/// and supply voltage.
///
/// The result is a `graph_i_e` dataset at the chosen `r_g` and supply voltage
/// with the measured curve's t_j and v_g. A supply voltage that is absent,
/// not positive or above `v_abs_max` falls back to the measured one. An
/// `r_g` above the measured `graph_r_e` range is rejected.
pub fn energy_at_gate_resistance(
    datasets: &[SwitchEnergyData],
    what: &str,
    query: GateResistanceQuery,
) -> Result<SwitchEnergyData> {
    check_finite(query.r_g, what, "r_g")?;
    let (i_e, r_e) = select_curves(datasets, what, query.t_j, query.normalize_t_to_v)?;
    let (Some(i_e_graph), Some(r_e_graph)) = (i_e.graph_i_e.as_ref(), r_e.graph_r_e.as_ref()) else {
        return Err(TdbError::energy_scaling(what, "selected datasets carry no curve"));
    };
    let r_g_nominal = i_e
        .r_g
        .ok_or_else(|| TdbError::missing_keys(format!("{what} graph_i_e"), ["r_g"]))?;

    let r_g_max = r_e_graph.x().iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if query.r_g > r_g_max {
        return Err(TdbError::GateResistanceOutOfRange {
            r_g: query.r_g,
            r_g_max,
        });
    }

    let v_supply = match query.v_supply {
        Some(v) if v.is_finite() && v > 0.0 && v <= query.v_abs_max => v,
        requested => {
            info!(what, ?requested, measured = i_e.v_supply, "invalid supply voltage, using the measured one");
            i_e.v_supply
        }
    };

    let loss_nominal = r_e_graph.y_at(r_g_nominal);
    if loss_nominal == 0.0 {
        return Err(TdbError::energy_scaling(
            what,
            format!("graph_r_e is 0 at the nominal r_g = {r_g_nominal} Ohm"),
        ));
    }
    if i_e.v_supply == 0.0 {
        return Err(TdbError::energy_scaling(what, "graph_i_e measured at v_supply = 0 V"));
    }
    let factor = r_e_graph.y_at(query.r_g) / loss_nominal * v_supply / i_e.v_supply;

    Ok(SwitchEnergyData {
        dataset_type: EnergyDatasetType::GraphIE,
        t_j: i_e.t_j,
        v_supply,
        v_g: i_e.v_g,
        e_x: None,
        r_g: Some(query.r_g),
        i_x: None,
        graph_r_e: None,
        graph_i_e: Some(i_e_graph.map_y(|_, e| e * factor)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Graph;
    use approx::assert_relative_eq;

    fn i_e(t_j: f64, v_supply: f64, v_g: f64) -> SwitchEnergyData {
        SwitchEnergyData {
            dataset_type: EnergyDatasetType::GraphIE,
            t_j,
            v_supply,
            v_g,
            e_x: None,
            r_g: Some(2.0),
            i_x: None,
            graph_r_e: None,
            graph_i_e: Some(Graph::new(vec![0.0, 50.0, 100.0], vec![0.0, 1e-3, 2e-3]).unwrap()),
        }
    }

    fn r_e(t_j: f64, v_supply: f64, v_g: f64, energies: Vec<f64>) -> SwitchEnergyData {
        SwitchEnergyData {
            dataset_type: EnergyDatasetType::GraphRE,
            t_j,
            v_supply,
            v_g,
            e_x: None,
            r_g: None,
            i_x: Some(100.0),
            graph_r_e: Some(Graph::new(vec![2.0, 10.0, 20.0], energies).unwrap()),
            graph_i_e: None,
        }
    }

    fn query(r_g: f64, v_supply: Option<f64>) -> GateResistanceQuery {
        GateResistanceQuery {
            r_g,
            t_j: 25.0,
            v_supply,
            v_abs_max: 1200.0,
            normalize_t_to_v: 10.0,
        }
    }

    #[test]
    fn test_curve_scaled_by_resistance_ratio() {
        // graph_r_e doubles between the nominal 2 Ohm and 10 Ohm
        let datasets = vec![i_e(25.0, 600.0, 15.0), r_e(25.0, 600.0, 15.0, vec![1e-3, 2e-3, 3e-3])];
        let e = energy_at_gate_resistance(&datasets, "switch e_on", query(10.0, None)).unwrap();
        assert_eq!(e.dataset_type, EnergyDatasetType::GraphIE);
        assert_eq!(e.r_g, Some(10.0));
        assert_eq!(e.v_supply, 600.0);
        assert_relative_eq!(e.energy_at(50.0).unwrap(), 2e-3, max_relative = 1e-12);
        assert_relative_eq!(e.energy_at(100.0).unwrap(), 4e-3, max_relative = 1e-12);
        assert!(e.check_shape().is_ok());
    }

    #[test]
    fn test_supply_voltage_correction_and_fallback() {
        let datasets = vec![i_e(25.0, 600.0, 15.0), r_e(25.0, 600.0, 15.0, vec![1e-3, 2e-3, 3e-3])];
        let e = energy_at_gate_resistance(&datasets, "switch e_on", query(2.0, Some(300.0))).unwrap();
        assert_eq!(e.v_supply, 300.0);
        assert_relative_eq!(e.energy_at(100.0).unwrap(), 1e-3, max_relative = 1e-12);

        for invalid in [Some(0.0), Some(-100.0), Some(1500.0), None] {
            let e = energy_at_gate_resistance(&datasets, "switch e_on", query(2.0, invalid)).unwrap();
            assert_eq!(e.v_supply, 600.0);
            assert_relative_eq!(e.energy_at(100.0).unwrap(), 2e-3, max_relative = 1e-12);
        }
    }

    #[test]
    fn test_paired_curves_preferred() {
        let datasets = vec![
            i_e(25.0, 400.0, 15.0),
            i_e(25.0, 600.0, 15.0),
            r_e(25.0, 600.0, 15.0, vec![1e-3, 3e-3, 4e-3]),
        ];
        let e = energy_at_gate_resistance(&datasets, "switch e_on", query(10.0, None)).unwrap();
        assert_eq!(e.v_supply, 600.0);
        assert_relative_eq!(e.energy_at(50.0).unwrap(), 3e-3, max_relative = 1e-12);
    }

    #[test]
    fn test_nearest_r_e_at_same_supply_voltage() {
        let datasets = vec![
            i_e(25.0, 600.0, 15.0),
            r_e(150.0, 600.0, 15.0, vec![1e-3, 4e-3, 5e-3]),
            r_e(50.0, 600.0, 15.0, vec![1e-3, 2e-3, 3e-3]),
            r_e(25.0, 800.0, 15.0, vec![1e-3, 8e-3, 9e-3]),
        ];
        let e = energy_at_gate_resistance(&datasets, "switch e_on", query(10.0, None)).unwrap();
        assert_relative_eq!(e.energy_at(50.0).unwrap(), 2e-3, max_relative = 1e-12);
    }

    #[test]
    fn test_r_g_above_measured_range() {
        let datasets = vec![i_e(25.0, 600.0, 15.0), r_e(25.0, 600.0, 15.0, vec![1e-3, 2e-3, 3e-3])];
        let err = energy_at_gate_resistance(&datasets, "switch e_on", query(25.0, None)).unwrap_err();
        assert!(matches!(err, TdbError::GateResistanceOutOfRange { r_g_max, .. } if r_g_max == 20.0));
    }

    #[test]
    fn test_missing_curves() {
        let only_r_e = vec![r_e(25.0, 600.0, 15.0, vec![1e-3, 2e-3, 3e-3])];
        let err = energy_at_gate_resistance(&only_r_e, "switch e_on", query(10.0, None)).unwrap_err();
        assert!(matches!(err, TdbError::NotFound { .. }));

        let other_voltage = vec![i_e(25.0, 600.0, 15.0), r_e(25.0, 800.0, 15.0, vec![1e-3, 2e-3, 3e-3])];
        let err = energy_at_gate_resistance(&other_voltage, "switch e_on", query(10.0, None)).unwrap_err();
        assert!(matches!(err, TdbError::NotFound { .. }));
    }

    #[test]
    fn test_zero_nominal_energy() {
        let datasets = vec![i_e(25.0, 600.0, 15.0), r_e(25.0, 600.0, 15.0, vec![0.0, 2e-3, 3e-3])];
        let err = energy_at_gate_resistance(&datasets, "switch e_on", query(10.0, None)).unwrap_err();
        assert!(matches!(err, TdbError::EnergyScaling { .. }));
    }
}
