//! Chart series construction for the detail view.
//!
//! A series is the hospital's recent history followed by the forecast, all on
//! a fixed time step. Forecast point `i` sits at `now + (i + 1) * step`.
//!
//! Sentinel has no telemetry store, so history comes from a [`HistorySource`].
//! The bundled [`SyntheticHistory`] fabricates points for demos and marks every
//! one of them [`PointKind::Synthetic`]; a real source would plug in behind the
//! same trait and emit [`PointKind::Historical`].

use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use crate::model::{Hospital, PredictionResponse};

/// Where a chart point came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PointKind {
    /// Measured occupancy.
    Historical,
    /// Demo data derived from current occupancy. Not a measurement.
    Synthetic,
    /// Model output.
    Prediction,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    pub time: DateTime<Utc>,
    pub value: f64,
    pub kind: PointKind,
}

/// Provider of occupancy leading up to `now`.
pub trait HistorySource: Send + Sync {
    /// Points in ascending time order, all strictly before or at `now`.
    fn history(&self, hospital: &Hospital, now: DateTime<Utc>, step: Duration) -> Vec<ChartPoint>;
}

/// No history at all; the chart shows the forecast only.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHistory;

impl HistorySource for NoHistory {
    fn history(&self, _: &Hospital, _: DateTime<Utc>, _: Duration) -> Vec<ChartPoint> {
        Vec::new()
    }
}

/// Demo history: current occupancy plus uniform noise.
#[derive(Debug)]
pub struct SyntheticHistory {
    points: usize,
    spread: f64,
    rng: Mutex<StdRng>,
}

impl Default for SyntheticHistory {
    fn default() -> Self {
        Self {
            points: 5,
            spread: 25.0,
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }
}

impl SyntheticHistory {
    /// Deterministic generator for tests.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
            ..Self::default()
        }
    }
}

impl HistorySource for SyntheticHistory {
    fn history(&self, hospital: &Hospital, now: DateTime<Utc>, step: Duration) -> Vec<ChartPoint> {
        let mut rng = match self.rng.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let base = f64::from(hospital.occupancy);

        (0..self.points)
            .filter_map(|i| {
                let back = step.checked_mul((self.points - i) as i32)?;
                let time = now.checked_sub_signed(back)?;
                let noise = rng.gen_range(-self.spread..=self.spread);
                Some(ChartPoint {
                    time,
                    value: (base + noise).max(0.0),
                    kind: PointKind::Synthetic,
                })
            })
            .collect()
    }
}

/// Forecast values placed on the time axis.
///
/// Points whose timestamp would not be representable are dropped.
pub fn forecast_points(forecast: &[f64], now: DateTime<Utc>, step: Duration) -> Vec<ChartPoint> {
    forecast
        .iter()
        .enumerate()
        .map_while(|(i, value)| {
            let ahead = step.checked_mul(i32::try_from(i + 1).ok()?)?;
            Some(ChartPoint {
                time: now.checked_add_signed(ahead)?,
                value: *value,
                kind: PointKind::Prediction,
            })
        })
        .collect()
}

/// History followed by forecast.
pub fn build_series(
    hospital: &Hospital,
    prediction: &PredictionResponse,
    history: &dyn HistorySource,
    now: DateTime<Utc>,
    step: Duration,
) -> Vec<ChartPoint> {
    let mut series = history.history(hospital, now, step);
    series.extend(forecast_points(&prediction.load_forecast, now, step));
    series
}
