//! Parks.
//!
//! A park's whole effect on the city flows through the aggregate
//! recomputations: its satisfaction bonus per cycle (suppressed while a
//! park-blocking event is active) and its negative pollution contribution.
//! The maintenance staff counts toward city job capacity like any other
//! service workforce.

use serde::{Deserialize, Serialize};

use super::Workforce;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grounds {
    pub jobs: Workforce,
}
