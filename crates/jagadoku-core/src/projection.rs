//! Investment projection engine
//!
//! Simulates monthly compounding under a constant contribution and return
//! rate. Each month the contribution is added first and then the whole balance
//! grows by one month of return, so the contribution earns that month too.

use serde::{Deserialize, Serialize};

/// Simulator input
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionParams {
    pub initial_amount: f64,
    pub monthly_contribution: f64,
    /// Expected annual return in percent (intended range 1-30)
    pub annual_return_percent: f64,
    /// Horizon in years (intended range 1-40)
    pub years: u32,
}

impl Default for ProjectionParams {
    fn default() -> Self {
        Self {
            initial_amount: 1_000_000.0,
            monthly_contribution: 500_000.0,
            annual_return_percent: 10.0,
            years: 10,
        }
    }
}

/// Balance at the start of a given year
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct YearSample {
    pub year: u32,
    /// Rounded to whole rupiah
    pub balance: f64,
}

/// Result of a projection run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Projection {
    /// `years + 1` samples, year 0 through year N
    pub samples: Vec<YearSample>,
    pub final_balance: f64,
    pub total_invested: f64,
    pub total_profit: f64,
    /// Return on investment in percent; `None` when nothing was invested
    pub roi: Option<f64>,
}

/// Run the simulation.
///
/// Out-of-range inputs are not rejected: a negative rate shrinks the balance
/// every month, and `years = 0` yields a single sample at the initial amount.
pub fn project(params: &ProjectionParams) -> Projection {
    let monthly_rate = params.annual_return_percent / 100.0 / 12.0;
    let mut balance = params.initial_amount;
    let mut samples = Vec::with_capacity(params.years as usize + 1);

    for year in 0..=params.years {
        samples.push(YearSample {
            year,
            balance: balance.round(),
        });

        if year < params.years {
            for _ in 0..12 {
                balance = (balance + params.monthly_contribution) * (1.0 + monthly_rate);
            }
        }
    }

    let final_balance = samples.last().map(|s| s.balance).unwrap_or(0.0);
    let total_invested =
        params.initial_amount + params.monthly_contribution * 12.0 * params.years as f64;
    let total_profit = final_balance - total_invested;
    let roi = (total_invested != 0.0).then(|| total_profit / total_invested * 100.0);

    Projection {
        samples,
        final_balance,
        total_invested,
        total_profit,
        roi,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(initial: f64, monthly: f64, rate: f64, years: u32) -> ProjectionParams {
        ProjectionParams {
            initial_amount: initial,
            monthly_contribution: monthly,
            annual_return_percent: rate,
            years,
        }
    }

    #[test]
    fn test_series_length() {
        for years in [0, 1, 5, 40] {
            let p = project(&params(1_000.0, 100.0, 7.0, years));
            assert_eq!(p.samples.len(), years as usize + 1);
            assert_eq!(p.samples.last().unwrap().year, years);
        }
    }

    #[test]
    fn test_all_zero_inputs_stay_zero() {
        for rate in [0.0, 5.0, 30.0, -10.0] {
            let p = project(&params(0.0, 0.0, rate, 7));
            assert_eq!(p.samples.len(), 8);
            assert!(p.samples.iter().all(|s| s.balance == 0.0));
            assert_eq!(p.total_invested, 0.0);
            assert_eq!(p.roi, None);
        }
    }

    #[test]
    fn test_zero_rate_zero_contribution_is_flat() {
        let p = project(&params(1_000_000.0, 0.0, 0.0, 5));
        assert_eq!(p.samples.len(), 6);
        assert!(p.samples.iter().all(|s| s.balance == 1_000_000.0));
        assert_eq!(p.total_profit, 0.0);
        assert_eq!(p.roi, Some(0.0));
    }

    #[test]
    fn test_one_year_matches_manual_compounding() {
        let p = project(&params(1_000_000.0, 500_000.0, 10.0, 1));

        let mut expected = 1_000_000.0_f64;
        for _ in 0..12 {
            expected = (expected + 500_000.0) * (1.0 + 10.0 / 100.0 / 12.0);
        }

        assert_eq!(p.samples.len(), 2);
        assert_eq!(p.samples[0].balance, 1_000_000.0);
        assert_eq!(p.samples[1].balance, expected.round());
        assert_eq!(p.final_balance, expected.round());
        assert_eq!(p.total_invested, 7_000_000.0);
        assert_eq!(p.total_profit, expected.round() - 7_000_000.0);
    }

    #[test]
    fn test_zero_years() {
        let p = project(&params(2_500_000.0, 500_000.0, 12.0, 0));
        assert_eq!(p.samples, vec![YearSample { year: 0, balance: 2_500_000.0 }]);
        assert_eq!(p.total_invested, 2_500_000.0);
        assert_eq!(p.final_balance, 2_500_000.0);
        assert_eq!(p.roi, Some(0.0));
    }

    #[test]
    fn test_zero_initial_with_contributions_has_roi() {
        let p = project(&params(0.0, 100_000.0, 6.0, 2));
        assert_eq!(p.samples[0].balance, 0.0);
        assert!(p.final_balance > p.total_invested);
        assert!(p.roi.unwrap() > 0.0);
    }

    #[test]
    fn test_negative_rate_shrinks_balance() {
        let p = project(&params(1_000_000.0, 0.0, -12.0, 3));
        for pair in p.samples.windows(2) {
            assert!(pair[1].balance < pair[0].balance);
        }
        assert!(p.total_profit < 0.0);
    }

    #[test]
    fn test_samples_are_whole_rupiah() {
        let p = project(&params(1_234.56, 78.9, 13.0, 4));
        assert!(p.samples.iter().all(|s| s.balance.fract() == 0.0));
    }

    #[test]
    fn test_default_params() {
        let p = project(&ProjectionParams::default());
        assert_eq!(p.samples.len(), 11);
        assert_eq!(p.total_invested, 61_000_000.0);
    }
}
