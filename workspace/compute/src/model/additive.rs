//! Additive regression model: piecewise-linear trend plus Fourier seasonality.
//!
//! The defaults follow Prophet's: 25 potential changepoints over the first
//! 80% of the history, yearly and weekly seasonality switched on
//! automatically from the history length, and an 80% uncertainty interval.
//! Parameters are the MAP estimate under Gaussian priors, solved as a ridge
//! regression whose penalties are the noise variance of a plain linear trend
//! divided by the squared prior scales.

use chrono::NaiveDate;
use std::f64::consts::PI;
use tracing::{debug, instrument, trace, warn};

use super::linalg::{dot, residual_variance, ridge_solve};
use super::{FittedModel, ForecastPoint, Forecaster};
use crate::error::{ComputeError, Result};
use crate::series::CanonicalSeries;

/// Penalty applied to every column so the normal equations stay solvable.
const RIDGE_FLOOR: f64 = 1e-8;

/// Tunables of the additive model. The defaults are the only configuration
/// the service uses.
#[derive(Debug, Clone, PartialEq)]
pub struct AdditiveModelConfig {
    /// Maximum number of potential trend changepoints.
    pub n_changepoints: usize,
    /// Share of the history in which changepoints may be placed.
    pub changepoint_range: f64,
    /// Prior scale of the slope changes at changepoints.
    pub changepoint_prior_scale: f64,
    /// Prior scale of the Fourier coefficients.
    pub seasonality_prior_scale: f64,
    pub yearly_fourier_order: usize,
    pub weekly_fourier_order: usize,
    /// Coverage of the uncertainty interval, e.g. 0.8 for 80%.
    pub interval_width: f64,
}

impl Default for AdditiveModelConfig {
    fn default() -> Self {
        Self {
            n_changepoints: 25,
            changepoint_range: 0.8,
            changepoint_prior_scale: 0.05,
            seasonality_prior_scale: 10.0,
            yearly_fourier_order: 10,
            weekly_fourier_order: 3,
            interval_width: 0.8,
        }
    }
}

/// Factory for fresh additive models.
#[derive(Debug, Clone, Default)]
pub struct AdditiveModel {
    config: AdditiveModelConfig,
}

impl AdditiveModel {
    pub fn new(config: AdditiveModelConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AdditiveModelConfig {
        &self.config
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Seasonality {
    period: f64,
    order: usize,
}

/// Parameters of a fitted additive model, in scaled units.
#[derive(Debug, Clone)]
struct FittedAdditive {
    t0: NaiveDate,
    t_scale: f64,
    y_scale: f64,
    changepoints: Vec<f64>,
    seasonalities: Vec<Seasonality>,
    beta: Vec<f64>,
    sigma_obs: f64,
    trend_rate: f64,
    z_score: f64,
}

/// Two-sided z-score for the supported interval widths.
fn z_score(interval_width: f64) -> f64 {
    match (interval_width * 100.0).round() as i32 {
        80 => 1.281_551_565_544_600_4,
        90 => 1.644_853_626_951_472_2,
        95 => 1.959_963_984_540_054,
        99 => 2.575_829_303_548_900_4,
        other => {
            warn!("Unsupported interval width {}%, using 80%", other);
            1.281_551_565_544_600_4
        }
    }
}

/// Picks changepoint locations (scaled time) uniformly over the first
/// `range` share of the history rows.
fn select_changepoints(t: &[f64], n_changepoints: usize, range: f64) -> Vec<f64> {
    let hist_size = (t.len() as f64 * range).floor() as usize;
    let n = if n_changepoints + 1 > hist_size {
        hist_size.saturating_sub(1)
    } else {
        n_changepoints
    };
    if n == 0 {
        return Vec::new();
    }

    let last = (hist_size - 1) as f64;
    (1..=n)
        .map(|i| {
            let idx = (last * i as f64 / n as f64).round() as usize;
            t[idx]
        })
        .collect()
}

/// Seasonal components switched on by the history shape.
fn select_seasonalities(
    config: &AdditiveModelConfig,
    span_days: i64,
    min_spacing_days: i64,
) -> Vec<Seasonality> {
    let mut seasonalities = Vec::new();
    if span_days >= 730 {
        seasonalities.push(Seasonality {
            period: 365.25,
            order: config.yearly_fourier_order,
        });
    }
    if span_days >= 14 && min_spacing_days < 7 {
        seasonalities.push(Seasonality {
            period: 7.0,
            order: config.weekly_fourier_order,
        });
    }
    seasonalities
}

impl FittedAdditive {
    fn scaled_time(&self, date: NaiveDate) -> (f64, f64) {
        let days = (date - self.t0).num_days() as f64;
        (days / self.t_scale, days)
    }

    /// Design row: offset, slope, changepoint hinges, Fourier terms.
    fn design_row(
        t: f64,
        days: f64,
        changepoints: &[f64],
        seasonalities: &[Seasonality],
    ) -> Vec<f64> {
        let mut row = Vec::with_capacity(2 + changepoints.len());
        row.push(1.0);
        row.push(t);
        row.extend(changepoints.iter().map(|cp| (t - cp).max(0.0)));
        for season in seasonalities {
            for i in 1..=season.order {
                let x = 2.0 * PI * i as f64 * days / season.period;
                row.push(x.sin());
                row.push(x.cos());
            }
        }
        row
    }
}

impl Forecaster for AdditiveModel {
    fn name(&self) -> &str {
        "additive"
    }

    #[instrument(skip(self, series), fields(points = series.len()))]
    fn fit(&self, series: &CanonicalSeries) -> Result<Box<dyn FittedModel>> {
        let points = series.points();
        if let Some(bad) = points.iter().find(|p| !p.value.is_finite()) {
            return Err(ComputeError::Forecasting(format!(
                "Sales value for {} is missing or not a number",
                bad.timestamp
            )));
        }
        if points.len() < 2 {
            return Err(ComputeError::Forecasting(
                "At least 2 rows are required to fit the model".to_string(),
            ));
        }

        let t0 = points[0].timestamp;
        let span_days = (points[points.len() - 1].timestamp - t0).num_days();
        if span_days <= 0 {
            return Err(ComputeError::Forecasting(
                "History must span more than one date".to_string(),
            ));
        }
        let min_spacing_days = points
            .windows(2)
            .map(|w| (w[1].timestamp - w[0].timestamp).num_days())
            .filter(|d| *d > 0)
            .min()
            .unwrap_or(span_days);

        let y_max = points.iter().map(|p| p.value.abs()).fold(0.0, f64::max);
        let y_scale = if y_max > 0.0 { y_max } else { 1.0 };
        let t_scale = span_days as f64;

        let days: Vec<f64> = points
            .iter()
            .map(|p| (p.timestamp - t0).num_days() as f64)
            .collect();
        let t: Vec<f64> = days.iter().map(|d| d / t_scale).collect();
        let y: Vec<f64> = points.iter().map(|p| p.value / y_scale).collect();

        let changepoints = select_changepoints(
            &t,
            self.config.n_changepoints,
            self.config.changepoint_range,
        );
        let seasonalities = select_seasonalities(&self.config, span_days, min_spacing_days);
        debug!(
            "Fitting additive model: {} changepoints, {} seasonal components",
            changepoints.len(),
            seasonalities.len()
        );

        let x: Vec<Vec<f64>> = t
            .iter()
            .zip(&days)
            .map(|(&ti, &di)| FittedAdditive::design_row(ti, di, &changepoints, &seasonalities))
            .collect();
        let p = x[0].len();

        let singular =
            || ComputeError::Forecasting("Model design matrix is singular".to_string());

        // noise level of a plain linear trend weighs the priors
        let x_linear: Vec<Vec<f64>> = x.iter().map(|row| row[..2].to_vec()).collect();
        let beta_linear = ridge_solve(&x_linear, &y, &[RIDGE_FLOOR; 2]).ok_or_else(singular)?;
        let noise = residual_variance(&x_linear, &y, &beta_linear);
        trace!("Linear trend residual variance {}", noise);

        let n_cp = changepoints.len();
        let cp_penalty = noise / self.config.changepoint_prior_scale.powi(2);
        let season_penalty = noise / self.config.seasonality_prior_scale.powi(2);
        let penalty: Vec<f64> = (0..p)
            .map(|j| match j {
                0 | 1 => RIDGE_FLOOR,
                j if j < 2 + n_cp => RIDGE_FLOOR + cp_penalty,
                _ => RIDGE_FLOOR + season_penalty,
            })
            .collect();
        let beta = ridge_solve(&x, &y, &penalty).ok_or_else(singular)?;

        let sigma_obs = residual_variance(&x, &y, &beta).sqrt();
        let trend_rate = if n_cp > 0 {
            beta[2..2 + n_cp].iter().map(|d| d.abs()).sum::<f64>() / n_cp as f64
        } else {
            0.0
        };
        debug!(
            "Additive model fitted: slope {:.4}, sigma {:.4}, trend rate {:.4}",
            beta[1], sigma_obs, trend_rate
        );

        Ok(Box::new(FittedAdditive {
            t0,
            t_scale,
            y_scale,
            changepoints,
            seasonalities,
            beta,
            sigma_obs,
            trend_rate,
            z_score: z_score(self.config.interval_width),
        }))
    }
}

impl FittedModel for FittedAdditive {
    fn predict(&self, dates: &[NaiveDate]) -> Result<Vec<ForecastPoint>> {
        dates
            .iter()
            .map(|&date| {
                let (t, days) = self.scaled_time(date);
                let row = Self::design_row(t, days, &self.changepoints, &self.seasonalities);
                let yhat = dot(&row, &self.beta) * self.y_scale;

                // trend uncertainty only grows past the end of the history (t = 1)
                let horizon = (t - 1.0).max(0.0);
                let spread = (self.sigma_obs.powi(2) + (self.trend_rate * horizon).powi(2)).sqrt();
                let half_width = self.z_score * spread * self.y_scale;

                if !yhat.is_finite() || !half_width.is_finite() {
                    return Err(ComputeError::Forecasting(format!(
                        "Prediction for {} is not finite",
                        date
                    )));
                }
                Ok(ForecastPoint::new(date, yhat, yhat - half_width, yhat + half_width))
            })
            .collect()
    }
}
