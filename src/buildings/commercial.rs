//! Profit mechanics for commercial buildings.

use serde::{Deserialize, Serialize};

use crate::config::Tuning;

use super::Workforce;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Commerce {
    pub jobs: Workforce,
    pub base_profit: f64,
}

impl Commerce {
    /// Realized profit this cycle. Recomputed on every call: full staffing
    /// earns the base profit, understaffing degrades output to the configured
    /// efficiency, and city pollution shaves off a percentage on top.
    pub fn realized_profit(&self, city_pollution: f64, tuning: &Tuning) -> f64 {
        let efficiency = if self.jobs.fully_staffed() {
            1.0
        } else {
            tuning.employee_efficiency
        };
        self.base_profit * efficiency * (1.0 - city_pollution * tuning.pollution_penalty / 100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fully_staffed_clean_city_pays_base_profit() {
        let tuning = Tuning::default();
        let commerce = Commerce {
            jobs: Workforce {
                needed: 10,
                filled: 10,
            },
            base_profit: 80.0,
        };
        assert_eq!(commerce.realized_profit(0.0, &tuning), 80.0);
    }

    #[test]
    fn understaffing_degrades_output() {
        let tuning = Tuning::default();
        let commerce = Commerce {
            jobs: Workforce {
                needed: 10,
                filled: 3,
            },
            base_profit: 100.0,
        };
        assert_eq!(commerce.realized_profit(0.0, &tuning), 80.0);
    }

    #[test]
    fn pollution_shaves_profit() {
        let tuning = Tuning::default();
        let commerce = Commerce {
            jobs: Workforce {
                needed: 5,
                filled: 5,
            },
            base_profit: 100.0,
        };
        // 40 pollution * 0.5 penalty / 100 = 20% off.
        let profit = commerce.realized_profit(40.0, &tuning);
        assert!((profit - 80.0).abs() < 1e-9);
    }
}
