//! Record validation.
//!
//! Every input record passes through [`validate`] before an entity is built
//! from it. The checks are layered:
//!
//! - [`checks`] - primitive value checks (real number, string, two-row matrix, vector)
//! - [`rules`] - per-kind key sets and cross-field rules
//! - [`housing`] - the housing-type reference list
//!
//! Absence is not an error: an absent, `null` or empty record validates to
//! `false` and the caller decides what that means for its entity kind.

pub mod checks;
mod housing;
mod rules;

pub use housing::HousingTypes;
pub use rules::{validate, validate_device, EntityKind, RuleSet};

pub(crate) use rules::energy_dataset_type;
