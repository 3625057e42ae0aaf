//! Operating-point lookup over dataset collections.
//!
//! Test conditions are compared with exact floating-point equality: a
//! dataset measured at `t_j = 25` matches a request for 25 and nothing
//! else. When several datasets match, the first one in collection order is
//! used and a warning is logged.

use tracing::{info, warn};

use crate::error::{AvailablePoint, Result, TdbError};
use crate::model::{ChannelData, EnergyDatasetType, LinearizedModel, SwitchEnergyData, VoltageDependentCapacitance};

/// A dataset measured at one (junction temperature, gate voltage) condition.
pub trait TestCondition {
    /// Junction temperature in °C.
    fn t_j(&self) -> f64;

    /// Gate voltage in V, if the dataset depends on it.
    fn v_g(&self) -> Option<f64>;

    /// The condition as an [`AvailablePoint`].
    fn point(&self) -> AvailablePoint {
        AvailablePoint {
            t_j: self.t_j(),
            v_g: self.v_g(),
        }
    }
}

impl<T: TestCondition> TestCondition for &T {
    fn t_j(&self) -> f64 {
        (**self).t_j()
    }

    fn v_g(&self) -> Option<f64> {
        (**self).v_g()
    }
}

impl TestCondition for ChannelData {
    fn t_j(&self) -> f64 {
        self.t_j
    }

    fn v_g(&self) -> Option<f64> {
        self.v_g
    }
}

impl TestCondition for SwitchEnergyData {
    fn t_j(&self) -> f64 {
        self.t_j
    }

    fn v_g(&self) -> Option<f64> {
        Some(self.v_g)
    }
}

impl TestCondition for LinearizedModel {
    fn t_j(&self) -> f64 {
        self.t_j
    }

    fn v_g(&self) -> Option<f64> {
        self.v_g
    }
}

impl TestCondition for VoltageDependentCapacitance {
    fn t_j(&self) -> f64 {
        self.t_j
    }

    fn v_g(&self) -> Option<f64> {
        None
    }
}

/// An entity owning forward conduction curves.
pub trait ChannelSource {
    /// Name used in diagnostics ("switch", "diode").
    fn label(&self) -> &'static str;

    /// Forward curves in insertion order.
    fn channels(&self) -> &[ChannelData];
}

/// Distinct test conditions of a collection, in collection order.
pub fn available_points<T: TestCondition>(datasets: &[T]) -> Vec<AvailablePoint> {
    let mut points: Vec<AvailablePoint> = Vec::new();
    for point in datasets.iter().map(TestCondition::point) {
        if !points.contains(&point) {
            points.push(point);
        }
    }
    points
}

fn matches_point<T: TestCondition>(dataset: &T, t_j: f64, v_g: Option<f64>) -> bool {
    dataset.t_j() == t_j && v_g.map_or(true, |v| dataset.v_g() == Some(v))
}

pub(super) fn not_found<T: TestCondition>(datasets: &[T], what: &str, t_j: f64, v_g: Option<f64>) -> TdbError {
    let available = available_points(datasets);
    info!(what, t_j, ?v_g, ?available, "no dataset at requested operating point");
    TdbError::NotFound {
        what: what.to_string(),
        t_j,
        v_g,
        available,
    }
}

fn first_match<'a, T, I>(mut candidates: I, datasets: &'a [T], what: &str, t_j: f64, v_g: Option<f64>) -> Result<&'a T>
where
    T: TestCondition,
    I: Iterator<Item = &'a T>,
{
    let first = candidates
        .next()
        .ok_or_else(|| not_found(datasets, what, t_j, v_g))?;
    let others = candidates.count();
    if others > 0 {
        warn!(
            what,
            t_j,
            ?v_g,
            matches = others + 1,
            "multiple datasets match the operating point, using the first one"
        );
    }
    Ok(first)
}

/// Find the dataset measured exactly at `t_j` (and `v_g`, when given).
pub fn find_operating_point<'a, T: TestCondition>(
    datasets: &'a [T],
    what: &str,
    t_j: f64,
    v_g: Option<f64>,
) -> Result<&'a T> {
    let candidates = datasets.iter().filter(|d| matches_point(*d, t_j, v_g));
    first_match(candidates, datasets, what, t_j, v_g)
}

/// Find the forward curve of a switch or diode at an exact operating point.
pub fn find_channel<E: ChannelSource>(entity: &E, t_j: f64, v_g: Option<f64>) -> Result<&ChannelData> {
    let what = format!("{} channel", entity.label());
    find_operating_point(entity.channels(), &what, t_j, v_g)
}

/// Filter for energy dataset lookups.
///
/// `t_j` always has to match; every other condition only filters when set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnergyQuery {
    /// Junction temperature (°C)
    pub t_j: f64,
    /// Gate voltage (V)
    pub v_g: Option<f64>,
    /// Supply voltage (V)
    pub v_supply: Option<f64>,
    /// Gate resistance (Ω)
    pub r_g: Option<f64>,
    /// Dataset shape
    pub dataset_type: Option<EnergyDatasetType>,
}

impl EnergyQuery {
    /// Query by junction temperature only.
    pub fn at(t_j: f64) -> Self {
        Self {
            t_j,
            v_g: None,
            v_supply: None,
            r_g: None,
            dataset_type: None,
        }
    }

    /// Also require a gate voltage.
    pub fn with_v_g(mut self, v_g: f64) -> Self {
        self.v_g = Some(v_g);
        self
    }

    /// Also require a supply voltage.
    pub fn with_v_supply(mut self, v_supply: f64) -> Self {
        self.v_supply = Some(v_supply);
        self
    }

    /// Also require a gate resistance.
    pub fn with_r_g(mut self, r_g: f64) -> Self {
        self.r_g = Some(r_g);
        self
    }

    /// Also require a dataset shape.
    pub fn with_dataset_type(mut self, dataset_type: EnergyDatasetType) -> Self {
        self.dataset_type = Some(dataset_type);
        self
    }

    fn matches(&self, dataset: &SwitchEnergyData) -> bool {
        matches_point(dataset, self.t_j, self.v_g)
            && self.v_supply.map_or(true, |v| dataset.v_supply == v)
            && self.r_g.map_or(true, |r| dataset.r_g == Some(r))
            && self.dataset_type.map_or(true, |t| dataset.dataset_type == t)
    }
}

/// Find an energy dataset matching a query exactly.
pub fn find_energy<'a>(datasets: &'a [SwitchEnergyData], what: &str, query: EnergyQuery) -> Result<&'a SwitchEnergyData> {
    let candidates = datasets.iter().filter(|d| query.matches(d));
    first_match(candidates, datasets, what, query.t_j, query.v_g)
}

/// Two datasets enclosing a requested junction temperature.
#[derive(Debug, Clone, Copy)]
pub struct Bracket<'a, T> {
    /// Dataset at or below the requested temperature
    pub lower: &'a T,
    /// Dataset at or above the requested temperature
    pub upper: &'a T,
    /// Position between the two, 0 at `lower`, 1 at `upper`
    pub weight: f64,
}

impl<'a, T> Bracket<'a, T> {
    /// True when both ends are the same dataset (exact hit or clamped).
    pub fn is_single(&self) -> bool {
        std::ptr::eq(self.lower, self.upper)
    }
}

/// Find the datasets nearest below and above `t_j` among those at `v_g`.
///
/// An exact match gives a bracket with both ends on that dataset. A
/// temperature outside the measured range is clamped to the nearest
/// dataset, in line with the no-extrapolation policy of [`super::interp`].
pub fn find_bracketing<'a, T: TestCondition>(
    datasets: &'a [T],
    what: &str,
    t_j: f64,
    v_g: Option<f64>,
) -> Result<Bracket<'a, T>> {
    let candidates: Vec<&T> = datasets
        .iter()
        .filter(|d| v_g.map_or(true, |v| d.v_g() == Some(v)))
        .collect();
    if candidates.is_empty() {
        return Err(not_found(datasets, what, t_j, v_g));
    }

    if let Some(&exact) = candidates.iter().find(|d| d.t_j() == t_j) {
        return Ok(Bracket {
            lower: exact,
            upper: exact,
            weight: 0.0,
        });
    }

    let mut lower: Option<&T> = None;
    let mut upper: Option<&T> = None;
    for &dataset in &candidates {
        let t = dataset.t_j();
        if t < t_j && lower.map_or(true, |l| t > l.t_j()) {
            lower = Some(dataset);
        }
        if t > t_j && upper.map_or(true, |u| t < u.t_j()) {
            upper = Some(dataset);
        }
    }

    match (lower, upper) {
        (Some(lower), Some(upper)) => Ok(Bracket {
            lower,
            upper,
            weight: (t_j - lower.t_j()) / (upper.t_j() - lower.t_j()),
        }),
        (Some(only), None) | (None, Some(only)) => Ok(Bracket {
            lower: only,
            upper: only,
            weight: 0.0,
        }),
        (None, None) => Err(not_found(datasets, what, t_j, v_g)),
    }
}

/// Find the dataset closest to (t_j, v_g).
///
/// Distance is Euclidean in (t_j / normalize_t_to_v, v_g) space, so with a
/// normalization of 10, 10 °C weighs as much as 1 V. A dataset without gate
/// voltage counts as v_g = 0. Ties go to the first dataset.
pub fn find_nearest<'a, T: TestCondition>(
    datasets: &'a [T],
    what: &str,
    t_j: f64,
    v_g: f64,
    normalize_t_to_v: f64,
) -> Result<&'a T> {
    let distance = |d: &T| ((d.t_j() - t_j) / normalize_t_to_v).hypot(d.v_g().unwrap_or(0.0) - v_g);
    let mut best: Option<(&T, f64)> = None;
    for dataset in datasets {
        let dist = distance(dataset);
        if best.map_or(true, |(_, b)| dist < b) {
            best = Some((dataset, dist));
        }
    }
    let (nearest, _) = best.ok_or_else(|| not_found(datasets, what, t_j, Some(v_g)))?;
    info!(what, t_j, v_g, nearest_t_j = nearest.t_j(), nearest_v_g = ?nearest.v_g(), "closest working point");
    Ok(nearest)
}
