//! Detail view for a single hospital.
//!
//! The view moves through `Loading -> Ready | Failed`. A failed view can be
//! retried (`Failed -> Loading`); a ready view only reloads when a different
//! hospital is selected, which creates a new view. Fetch orchestration and
//! the staleness guard live in [`crate::dashboard`]; this module owns the
//! state and the transformation of a prediction into screen data.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::chart::{ChartPoint, HistorySource, PointKind, build_series};
use crate::error::{DashboardError, PredictionError};
use crate::fixtures;
use crate::i18n::{Language, labels};
use crate::map::status_label;
use crate::model::{
    Alert, AlertLevel, FactorAnalysis, Hospital, HospitalStatus, PredictionResponse, Severity,
    TransferPrediction, sort_by_severity,
};

/// How a settled prediction is turned into view data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DetailOptions {
    /// Chart step shared by history and forecast.
    pub step: Duration,
    /// Sort alerts high > medium > low.
    pub sort_alerts: bool,
}

impl Default for DetailOptions {
    fn default() -> Self {
        Self {
            step: Duration::minutes(30),
            sort_alerts: true,
        }
    }
}

/// Data shown once a prediction has arrived.
#[derive(Debug, Clone, PartialEq)]
pub struct DetailData {
    pub fetched_at: DateTime<Utc>,
    pub model_confidence: f64,
    pub series: Vec<ChartPoint>,
    pub expected_wait_time: f64,
    pub ambulance_offload_time: f64,
    pub inbound_ems: u32,
    pub reserve_capacity_pct: u32,
    pub factors: FactorAnalysis,
    pub alerts: Vec<Alert>,
    pub transfers: Vec<TransferPrediction>,
    pub degraded: bool,
}

impl DetailData {
    pub fn from_prediction(
        hospital: &Hospital,
        prediction: PredictionResponse,
        history: &dyn HistorySource,
        options: &DetailOptions,
        now: DateTime<Utc>,
    ) -> Self {
        let series = build_series(hospital, &prediction, history, now, options.step);
        let degraded = prediction.is_degraded();

        let mut alerts = prediction.alerts;
        if options.sort_alerts {
            sort_by_severity(&mut alerts);
        }

        Self {
            fetched_at: now,
            model_confidence: prediction.model_confidence,
            series,
            expected_wait_time: prediction.quality_indicators.expected_wait_time,
            ambulance_offload_time: prediction.quality_indicators.ambulance_offload_time,
            inbound_ems: prediction.quality_indicators.inbound_ems,
            reserve_capacity_pct: hospital.reserve_capacity_pct(),
            factors: prediction.factor_analysis,
            alerts,
            transfers: prediction.transfers,
            degraded,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DetailPhase {
    Loading,
    Ready(Box<DetailData>),
    Failed { error: PredictionError },
}

impl DetailPhase {
    pub fn name(&self) -> &'static str {
        match self {
            DetailPhase::Loading => "loading",
            DetailPhase::Ready(_) => "ready",
            DetailPhase::Failed { .. } => "failed",
        }
    }
}

/// Detail view state for one hospital.
#[derive(Debug, Clone)]
pub struct DetailView {
    hospital: &'static Hospital,
    phase: DetailPhase,
    attempts: u32,
}

impl DetailView {
    /// A freshly entered view, already loading.
    pub fn new(hospital: &'static Hospital) -> Self {
        Self {
            hospital,
            phase: DetailPhase::Loading,
            attempts: 1,
        }
    }

    pub fn hospital(&self) -> &'static Hospital {
        self.hospital
    }

    pub fn phase(&self) -> &DetailPhase {
        &self.phase
    }

    /// Number of fetches started for this view, including retries.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.phase, DetailPhase::Loading)
    }

    /// `Failed -> Loading`. Any other phase is not retryable.
    pub fn begin_retry(&mut self) -> Result<(), DashboardError> {
        match self.phase {
            DetailPhase::Failed { .. } => {
                self.phase = DetailPhase::Loading;
                self.attempts += 1;
                Ok(())
            }
            _ => Err(DashboardError::NotRetryable),
        }
    }

    /// Record the outcome of the current fetch.
    pub fn settle(
        &mut self,
        result: Result<PredictionResponse, PredictionError>,
        history: &dyn HistorySource,
        options: &DetailOptions,
        now: DateTime<Utc>,
    ) {
        self.phase = match result {
            Ok(prediction) => DetailPhase::Ready(Box::new(DetailData::from_prediction(
                self.hospital,
                prediction,
                history,
                options,
                now,
            ))),
            Err(error) => DetailPhase::Failed { error },
        };
    }

    /// Render the view in `lang`.
    pub fn screen(&self, lang: Language) -> DetailScreen {
        let text = labels(lang);
        let h = self.hospital;

        let state = match &self.phase {
            DetailPhase::Loading => DetailState::Loading {
                label: text.loading,
            },
            DetailPhase::Failed { error } => DetailState::Failed {
                label: text.connection_failed,
                error: error.to_string(),
                retry_label: text.retry,
            },
            DetailPhase::Ready(data) => {
                let has_synthetic = data.series.iter().any(|p| p.kind == PointKind::Synthetic);
                DetailState::Ready(Box::new(ReadyPanel {
                    forecast_title: text.forecast,
                    confidence_label: text.model_confidence,
                    model_confidence: data.model_confidence,
                    degraded: data.degraded.then_some(text.degraded),
                    history_caption: has_synthetic.then_some(text.synthetic_history),
                    series: data.series.clone(),
                    kpis: vec![
                        Kpi {
                            key: "wait_time",
                            label: text.wait_time,
                            value: data.expected_wait_time,
                            unit: "min",
                        },
                        Kpi {
                            key: "offload_time",
                            label: text.offload_time,
                            value: data.ambulance_offload_time,
                            unit: "min",
                        },
                        Kpi {
                            key: "inbound_ems",
                            label: text.inbound_ems,
                            value: f64::from(data.inbound_ems),
                            unit: "units",
                        },
                        Kpi {
                            key: "reserve_capacity",
                            label: text.reserve_capacity,
                            value: f64::from(data.reserve_capacity_pct),
                            unit: "%",
                        },
                    ],
                    factors: data.factors.clone(),
                    alerts_title: text.alerts,
                    alerts: data
                        .alerts
                        .iter()
                        .map(|a| AlertCard {
                            id: a.id.clone(),
                            timestamp: a.timestamp.clone(),
                            level: a.level,
                            severity: a.severity,
                            message: a.message.get(lang).to_string(),
                            action: a.action.get(lang).to_string(),
                        })
                        .collect(),
                    transfers_title: text.transfers,
                    transfers: data
                        .transfers
                        .iter()
                        .map(|t| TransferCard {
                            source_id: t.source_id.clone(),
                            target_id: t.target_id.clone(),
                            target_name: fixtures::find_hospital(&t.target_id)
                                .map(|target| target.name.get(lang).to_string()),
                            probability: t.probability,
                            reason: t.reason.get(lang).to_string(),
                            recommended_specialty: t.recommended_specialty.clone(),
                        })
                        .collect(),
                }))
            }
        };

        DetailScreen {
            heading: text.details,
            back_label: text.back,
            hospital_id: h.id.clone(),
            name: h.name.get(lang).to_string(),
            region_label: text.region,
            region: h.region.get(lang).to_string(),
            specialties_label: text.specialties,
            specialties: h.specialties.clone(),
            status: h.status,
            status_label: status_label(h.status, text),
            capacity: h.capacity,
            occupancy: h.occupancy,
            reserve_capacity_pct: h.reserve_capacity_pct(),
            state,
        }
    }
}

/// Everything a front end needs to draw the detail view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetailScreen {
    pub heading: &'static str,
    pub back_label: &'static str,
    pub hospital_id: String,
    pub name: String,
    pub region_label: &'static str,
    pub region: String,
    pub specialties_label: &'static str,
    pub specialties: Vec<String>,
    pub status: HospitalStatus,
    pub status_label: &'static str,
    pub capacity: u32,
    pub occupancy: u32,
    pub reserve_capacity_pct: u32,
    pub state: DetailState,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum DetailState {
    Loading {
        label: &'static str,
    },
    Ready(Box<ReadyPanel>),
    Failed {
        label: &'static str,
        error: String,
        retry_label: &'static str,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReadyPanel {
    pub forecast_title: &'static str,
    pub confidence_label: &'static str,
    pub model_confidence: f64,

    /// Set when the payload is the offline placeholder.
    pub degraded: Option<&'static str>,

    /// Set when the chart contains fabricated history.
    pub history_caption: Option<&'static str>,

    pub series: Vec<ChartPoint>,
    pub kpis: Vec<Kpi>,
    pub factors: FactorAnalysis,
    pub alerts_title: &'static str,
    pub alerts: Vec<AlertCard>,
    pub transfers_title: &'static str,
    pub transfers: Vec<TransferCard>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Kpi {
    pub key: &'static str,
    pub label: &'static str,
    pub value: f64,
    pub unit: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlertCard {
    pub id: String,
    pub timestamp: String,
    pub level: AlertLevel,
    pub severity: Severity,
    pub message: String,
    pub action: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransferCard {
    pub source_id: String,
    pub target_id: String,
    pub target_name: Option<String>,
    pub probability: f64,
    pub reason: String,
    pub recommended_specialty: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::{NoHistory, SyntheticHistory};
    use crate::i18n::Bilingual;
    use crate::model::{QualityIndicators, TransferPrediction};

    fn h2() -> &'static Hospital {
        fixtures::find_hospital("h2").unwrap()
    }

    fn alert(id: &str, severity: Severity) -> Alert {
        Alert {
            id: id.to_string(),
            timestamp: "10:15".to_string(),
            level: AlertLevel::T45,
            severity,
            message: Bilingual::new(format!("msg {id}"), format!("رسالة {id}")),
            action: Bilingual::new("act", "إجراء"),
        }
    }

    fn prediction() -> PredictionResponse {
        PredictionResponse {
            load_forecast: vec![790.0, 805.0, 820.0],
            model_confidence: 94.0,
            quality_indicators: QualityIndicators {
                expected_wait_time: 140.0,
                ambulance_offload_time: 38.0,
                inbound_ems: 6,
            },
            factor_analysis: FactorAnalysis {
                seasonal_score: 130.0,
                traffic_score: 88.0,
                cad_volume: 21.0,
            },
            alerts: vec![
                alert("low", Severity::Low),
                alert("high", Severity::High),
                alert("medium", Severity::Medium),
            ],
            transfers: vec![TransferPrediction {
                source_id: "h2".to_string(),
                target_id: "h3".to_string(),
                probability: 91.0,
                reason: Bilingual::new("Load balancing", "موازنة الأحمال"),
                recommended_specialty: Some("Trauma".to_string()),
            }],
        }
    }

    #[test]
    fn test_new_view_is_loading() {
        let view = DetailView::new(h2());
        assert!(view.is_loading());
        assert_eq!(view.attempts(), 1);
        assert!(matches!(
            view.screen(Language::En).state,
            DetailState::Loading { .. }
        ));
    }

    #[test]
    fn test_ready_populates_kpis_and_sorted_alerts() {
        let mut view = DetailView::new(h2());
        view.settle(
            Ok(prediction()),
            &SyntheticHistory::seeded(3),
            &DetailOptions::default(),
            Utc::now(),
        );

        let DetailPhase::Ready(data) = view.phase() else {
            panic!("expected ready, got {}", view.phase().name());
        };
        assert_eq!(data.reserve_capacity_pct, 3);
        assert_eq!(data.expected_wait_time, 140.0);
        assert_eq!(data.inbound_ems, 6);
        assert_eq!(data.series.len(), 8);
        let ids: Vec<_> = data.alerts.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, ["high", "medium", "low"]);
    }

    #[test]
    fn test_alert_order_kept_when_sorting_disabled() {
        let mut view = DetailView::new(h2());
        let options = DetailOptions {
            sort_alerts: false,
            ..DetailOptions::default()
        };
        view.settle(Ok(prediction()), &NoHistory, &options, Utc::now());

        let DetailPhase::Ready(data) = view.phase() else {
            panic!("expected ready");
        };
        let ids: Vec<_> = data.alerts.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, ["low", "high", "medium"]);
    }

    #[test]
    fn test_failure_then_retry() {
        let mut view = DetailView::new(h2());
        assert_eq!(view.begin_retry(), Err(DashboardError::NotRetryable));

        view.settle(
            Err(PredictionError::Status {
                code: 500,
                status_text: "Internal Server Error".to_string(),
            }),
            &NoHistory,
            &DetailOptions::default(),
            Utc::now(),
        );
        match view.screen(Language::En).state {
            DetailState::Failed { error, retry_label, .. } => {
                assert!(error.contains("500"));
                assert_eq!(retry_label, "Retry");
            }
            other => panic!("expected failed, got {other:?}"),
        }

        view.begin_retry().unwrap();
        assert!(view.is_loading());
        assert_eq!(view.attempts(), 2);
    }

    #[test]
    fn test_ready_not_retryable() {
        let mut view = DetailView::new(h2());
        view.settle(Ok(prediction()), &NoHistory, &DetailOptions::default(), Utc::now());
        assert_eq!(view.begin_retry(), Err(DashboardError::NotRetryable));
    }

    #[test]
    fn test_offline_payload_is_flagged_degraded() {
        let mut view = DetailView::new(h2());
        view.settle(
            Ok(PredictionResponse::offline()),
            &NoHistory,
            &DetailOptions::default(),
            Utc::now(),
        );
        let DetailState::Ready(panel) = view.screen(Language::En).state else {
            panic!("expected ready");
        };
        assert_eq!(panel.degraded, Some("Prediction engine offline"));
        assert_eq!(panel.alerts.len(), 1);
        assert!(panel.history_caption.is_none());
    }

    #[test]
    fn test_screen_selects_language_fields() {
        let mut view = DetailView::new(h2());
        view.settle(
            Ok(prediction()),
            &SyntheticHistory::seeded(9),
            &DetailOptions::default(),
            Utc::now(),
        );

        let DetailState::Ready(en) = view.screen(Language::En).state else {
            panic!("expected ready");
        };
        let DetailState::Ready(ar) = view.screen(Language::Ar).state else {
            panic!("expected ready");
        };
        assert_eq!(en.alerts[0].message, "msg high");
        assert_eq!(ar.alerts[0].message, "رسالة high");
        assert_eq!(en.transfers[0].target_name.as_deref(), Some("Riyadh Care Hospital"));
        assert_eq!(ar.transfers[0].reason, "موازنة الأحمال");
        assert_eq!(en.history_caption, Some("Simulated history (not measured)"));
        assert_eq!(en.series, ar.series);
    }
}
