//! Linear trend forecasting over quarterly expense totals
//!
//! Each bucket becomes one point `(year + quarter / 4, total)`. An ordinary
//! least-squares line is fitted through the points and evaluated at the
//! target quarter's position. Extrapolation beyond the observed range is the
//! normal case.

use serde::{Deserialize, Serialize};

use crate::quarter::QuarterBucket;

/// Fewest buckets that can support a trend line
pub const MIN_BUCKETS: usize = 2;

/// Fitted line `total = slope * t + intercept` with its in-sample R²
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrendFit {
    pub slope: f64,
    pub intercept: f64,
    pub r2_score: f64,
}

impl TrendFit {
    pub fn predict(&self, t: f64) -> f64 {
        self.slope * t + self.intercept
    }
}

/// A projected quarterly total
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    pub predicted_total: f64,
    pub r2_score: f64,
}

/// Result of a forecast request
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ForecastOutcome {
    Predicted(Forecast),
    /// No expense history at all
    NoHistory,
    /// History spans fewer than [`MIN_BUCKETS`] quarters
    InsufficientData { buckets: usize },
}

impl ForecastOutcome {
    /// Explanation for degenerate outcomes
    pub fn message(&self) -> Option<&'static str> {
        match self {
            Self::Predicted(_) => None,
            Self::NoHistory => Some("No historical data for prediction"),
            Self::InsufficientData { .. } => Some(
                "Not enough aggregated data (less than 2 trimesters) for meaningful prediction",
            ),
        }
    }

    /// Forecast values, zeroed for degenerate outcomes
    pub fn values(&self) -> Forecast {
        match self {
            Self::Predicted(f) => *f,
            _ => Forecast {
                predicted_total: 0.0,
                r2_score: 0.0,
            },
        }
    }
}

/// Time feature for a (year, quarter): quarters as fractional positions in the year
pub fn time_feature(year: i32, quarter: u32) -> f64 {
    f64::from(year) + f64::from(quarter) / 4.0
}

/// Closed-form least-squares fit of `y = a * x + b`
///
/// Works on mean-centred values so year-sized x coordinates do not cancel
/// out the quarter-sized differences. Expects at least one point.
pub fn fit_trend(points: &[(f64, f64)]) -> TrendFit {
    let n = points.len() as f64;
    let mean_x = points.iter().map(|(x, _)| x).sum::<f64>() / n;
    let mean_y = points.iter().map(|(_, y)| y).sum::<f64>() / n;

    let mut sxx = 0.0;
    let mut sxy = 0.0;
    for (x, y) in points {
        let dx = x - mean_x;
        sxx += dx * dx;
        sxy += dx * (y - mean_y);
    }

    let slope = if sxx > 0.0 { sxy / sxx } else { 0.0 };
    let intercept = mean_y - slope * mean_x;

    let mut ss_res = 0.0;
    let mut ss_tot = 0.0;
    for (x, y) in points {
        let residual = y - (slope * x + intercept);
        ss_res += residual * residual;
        let dy = y - mean_y;
        ss_tot += dy * dy;
    }

    // Constant targets are reproduced exactly by the flat line
    let r2_score = if ss_tot > 0.0 { 1.0 - ss_res / ss_tot } else { 1.0 };

    TrendFit {
        slope,
        intercept,
        r2_score,
    }
}

/// Project the total for `(target_year, target_quarter)` from quarterly buckets
pub fn forecast(
    buckets: &[QuarterBucket],
    target_year: i32,
    target_quarter: u32,
) -> ForecastOutcome {
    if buckets.is_empty() {
        return ForecastOutcome::NoHistory;
    }
    if buckets.len() < MIN_BUCKETS {
        return ForecastOutcome::InsufficientData {
            buckets: buckets.len(),
        };
    }

    let points: Vec<(f64, f64)> = buckets
        .iter()
        .map(|b| (time_feature(b.year, b.quarter), b.total_amount))
        .collect();
    let fit = fit_trend(&points);

    ForecastOutcome::Predicted(Forecast {
        predicted_total: fit.predict(time_feature(target_year, target_quarter)),
        r2_score: fit.r2_score,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bucket(year: i32, quarter: u32, total_amount: f64) -> QuarterBucket {
        QuarterBucket {
            year,
            quarter,
            total_amount,
        }
    }

    #[test]
    fn test_no_history() {
        let outcome = forecast(&[], 2024, 1);
        assert_eq!(outcome, ForecastOutcome::NoHistory);
        assert_eq!(outcome.values().predicted_total, 0.0);
        assert_eq!(outcome.values().r2_score, 0.0);
        assert_eq!(outcome.message(), Some("No historical data for prediction"));
    }

    #[test]
    fn test_single_bucket_is_insufficient() {
        let outcome = forecast(&[bucket(2024, 1, 500.0)], 2024, 2);
        assert_eq!(outcome, ForecastOutcome::InsufficientData { buckets: 1 });
        assert_eq!(outcome.values().predicted_total, 0.0);
        assert!(outcome.message().unwrap().contains("less than 2 trimesters"));
    }

    #[test]
    fn test_two_points_extrapolate_exactly() {
        let outcome = forecast(&[bucket(2023, 1, 100.0), bucket(2023, 2, 200.0)], 2023, 3);
        let ForecastOutcome::Predicted(f) = outcome else {
            panic!("expected a prediction, got {:?}", outcome);
        };
        assert!((f.predicted_total - 300.0).abs() < 1e-6);
        assert!((f.r2_score - 1.0).abs() < 1e-9);
        assert!(outcome.message().is_none());
    }

    #[test]
    fn test_points_on_a_line_predict_the_line() {
        // total = 120 * t - 240_000
        let m = 120.0;
        let c = -240_000.0;
        let buckets: Vec<QuarterBucket> = [(2022, 1), (2022, 3), (2023, 2), (2024, 4)]
            .iter()
            .map(|&(y, q)| bucket(y, q, m * time_feature(y, q) + c))
            .collect();

        for (year, quarter) in [(2025, 1), (2021, 2), (2030, 4)] {
            let f = forecast(&buckets, year, quarter).values();
            let expected = m * time_feature(year, quarter) + c;
            assert!(
                (f.predicted_total - expected).abs() < 1e-6,
                "{} Q{}: {} vs {}",
                year,
                quarter,
                f.predicted_total,
                expected
            );
            assert!((f.r2_score - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_noisy_points_have_partial_fit() {
        let buckets = vec![
            bucket(2023, 1, 100.0),
            bucket(2023, 2, 300.0),
            bucket(2023, 3, 150.0),
            bucket(2023, 4, 400.0),
        ];
        let f = forecast(&buckets, 2024, 1).values();
        assert!(f.r2_score > 0.0 && f.r2_score < 1.0);
        // Upward trend continues
        assert!(f.predicted_total > 400.0);
    }

    #[test]
    fn test_flat_history_is_perfect_fit() {
        let buckets = vec![bucket(2023, 1, 250.0), bucket(2023, 4, 250.0)];
        let f = forecast(&buckets, 2025, 2).values();
        assert!((f.predicted_total - 250.0).abs() < 1e-9);
        assert_eq!(f.r2_score, 1.0);
    }

    #[test]
    fn test_forecast_is_deterministic() {
        let buckets = vec![
            bucket(2022, 4, 812.37),
            bucket(2023, 1, 1020.11),
            bucket(2023, 3, 640.9),
            bucket(2024, 2, 1333.33),
        ];
        let first = forecast(&buckets, 2024, 4).values();
        for _ in 0..10 {
            let again = forecast(&buckets, 2024, 4).values();
            assert_eq!(
                first.predicted_total.to_bits(),
                again.predicted_total.to_bits()
            );
            assert_eq!(first.r2_score.to_bits(), again.r2_score.to_bits());
        }
    }

    #[test]
    fn test_time_feature() {
        assert_eq!(time_feature(2023, 3), 2023.75);
        assert_eq!(time_feature(2024, 4), 2025.0);
    }

    #[test]
    fn test_fit_single_x_is_flat_mean() {
        let fit = fit_trend(&[(1.0, 2.0), (1.0, 4.0)]);
        assert_eq!(fit.slope, 0.0);
        assert_eq!(fit.intercept, 3.0);
    }
}
