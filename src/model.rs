//! Data models for Sentinel.
//!
//! Two kinds of data live here:
//!
//! - **Reference data** (hospitals, ambulances, weather zones, traffic routes)
//!   loaded once from the fixture store and treated as read-only, apart from
//!   ambulance positions under the motion simulation.
//! - **The prediction payload** returned by the external prediction service.
//!   Sentinel does not own that contract; the types below mirror its JSON
//!   (camelCase, with bilingual text flattened to `...En`/`...Ar` pairs).

use serde::{Deserialize, Serialize};

use crate::i18n::Bilingual;

/// A geographic position in WGS-84 degrees.
///
/// This is the only position type in the crate. Screen placement is a
/// separate projection step (see [`crate::map::Viewport`]).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Shift by a delta in degrees.
    pub fn offset(self, d_lat: f64, d_lon: f64) -> Self {
        Self {
            lat: self.lat + d_lat,
            lon: self.lon + d_lon,
        }
    }
}

/// Operational status of a hospital.
///
/// Assigned by upstream data. The viewer only displays it and never derives
/// it from occupancy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HospitalStatus {
    Normal,
    Strain,
    Critical,
}

/// Prevailing weather at a hospital site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WeatherCondition {
    Clear,
    Rain,
    Sandstorm,
    Heatwave,
}

/// A hospital emergency department.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Hospital {
    pub id: String,
    pub name: Bilingual,
    pub region: Bilingual,
    pub position: GeoPoint,

    /// Licensed beds. Always positive in fixture data.
    pub capacity: u32,

    /// Occupied beds. May exceed `capacity` when the department is over census.
    pub occupancy: u32,

    /// Arrivals per hour.
    pub ed_flow_rate: u32,

    /// Road congestion around the site, 0-100.
    pub traffic_index: u8,

    pub weather: WeatherCondition,
    pub status: HospitalStatus,
    pub specialties: Vec<String>,
}

impl Hospital {
    /// Free capacity as a whole percentage, never below zero.
    ///
    /// `max(0, round(100 * (1 - occupancy / capacity)))`
    pub fn reserve_capacity_pct(&self) -> u32 {
        if self.capacity == 0 {
            return 0;
        }
        let free = 100.0 * (1.0 - f64::from(self.occupancy) / f64::from(self.capacity));
        free.round().max(0.0) as u32
    }

    /// Occupancy as a fraction of capacity (can exceed 1.0).
    pub fn load_ratio(&self) -> f64 {
        if self.capacity == 0 {
            return 0.0;
        }
        f64::from(self.occupancy) / f64::from(self.capacity)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AmbulanceStatus {
    Idle,
    Dispatched,
    Transferring,
}

/// Crew and equipment level of an ambulance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum UnitType {
    /// Advanced life support.
    Als,
    /// Basic life support.
    Bls,
    /// Mobile intensive care unit.
    Micu,
    #[serde(rename = "Rescue")]
    Rescue,
}

/// A field unit as reported by computer-aided dispatch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ambulance {
    pub id: String,
    pub status: AmbulanceStatus,
    pub position: GeoPoint,
    pub unit: UnitType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Hazard {
    Heatwave,
    Sandstorm,
    Rain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Intensity {
    Moderate,
    Severe,
}

/// A circular weather hazard area.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherZone {
    pub id: String,
    pub hazard: Hazard,
    pub center: GeoPoint,
    pub radius_m: f64,
    pub intensity: Intensity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Congestion {
    Light,
    Heavy,
    Gridlock,
}

/// A monitored road corridor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrafficRoute {
    pub id: String,
    pub name: Bilingual,
    pub path: Vec<GeoPoint>,
    pub congestion: Congestion,
}

// ============================================================================
// Prediction payload
// ============================================================================

/// Coarse alert severity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    /// Any value the service sends that Sentinel does not know.
    #[default]
    #[serde(other)]
    Unknown,
}

impl Severity {
    /// Sort weight: high = 3, medium = 2, low = 1, unknown = 0.
    pub fn weight(&self) -> u8 {
        match self {
            Severity::Unknown => 0,
            Severity::Low => 1,
            Severity::Medium => 2,
            Severity::High => 3,
        }
    }
}

/// Lead time tier of a timed alert.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlertLevel {
    #[serde(rename = "T-90")]
    T90,
    #[serde(rename = "T-45")]
    T45,
    #[serde(rename = "T-15")]
    T15,
    #[default]
    #[serde(other)]
    #[serde(rename = "unknown")]
    Unknown,
}

/// A timed operational alert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "AlertWire", into = "AlertWire")]
pub struct Alert {
    pub id: String,

    /// Display time as sent by the service (e.g. "14:05"), not parsed.
    pub timestamp: String,

    pub level: AlertLevel,
    pub severity: Severity,
    pub message: Bilingual,
    pub action: Bilingual,
}

// Everything but the structure is optional: an odd alert is shown as far as
// it can be rather than failing the whole forecast.
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AlertWire {
    #[serde(default)]
    id: String,
    #[serde(default)]
    timestamp: String,
    #[serde(default)]
    level: AlertLevel,
    #[serde(default)]
    severity: Severity,
    #[serde(default)]
    message_en: String,
    #[serde(default)]
    message_ar: String,
    #[serde(default)]
    action_en: String,
    #[serde(default)]
    action_ar: String,
}

impl From<AlertWire> for Alert {
    fn from(w: AlertWire) -> Self {
        Self {
            id: w.id,
            timestamp: w.timestamp,
            level: w.level,
            severity: w.severity,
            message: Bilingual::new(w.message_en, w.message_ar),
            action: Bilingual::new(w.action_en, w.action_ar),
        }
    }
}

impl From<Alert> for AlertWire {
    fn from(a: Alert) -> Self {
        Self {
            id: a.id,
            timestamp: a.timestamp,
            level: a.level,
            severity: a.severity,
            message_en: a.message.en,
            message_ar: a.message.ar,
            action_en: a.action.en,
            action_ar: a.action.ar,
        }
    }
}

/// Order alerts high > medium > low. Equal severities keep arrival order.
pub fn sort_by_severity(alerts: &mut [Alert]) {
    // slice::sort_by_key is stable
    alerts.sort_by_key(|a| std::cmp::Reverse(a.severity.weight()));
}

/// A recommended interfacility transfer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "TransferWire", into = "TransferWire")]
pub struct TransferPrediction {
    pub source_id: String,
    pub target_id: String,

    /// Likelihood the transfer will be needed, 0-100.
    pub probability: f64,

    pub reason: Bilingual,
    pub recommended_specialty: Option<String>,
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TransferWire {
    source_id: String,
    target_id: String,
    probability: f64,
    #[serde(default)]
    reason_en: String,
    #[serde(default)]
    reason_ar: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    recommended_specialty: Option<String>,
}

impl From<TransferWire> for TransferPrediction {
    fn from(w: TransferWire) -> Self {
        Self {
            source_id: w.source_id,
            target_id: w.target_id,
            probability: w.probability,
            reason: Bilingual::new(w.reason_en, w.reason_ar),
            recommended_specialty: w.recommended_specialty,
        }
    }
}

impl From<TransferPrediction> for TransferWire {
    fn from(t: TransferPrediction) -> Self {
        Self {
            source_id: t.source_id,
            target_id: t.target_id,
            probability: t.probability,
            reason_en: t.reason.en,
            reason_ar: t.reason.ar,
            recommended_specialty: t.recommended_specialty,
        }
    }
}

/// Predictive quality indicators.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityIndicators {
    /// Minutes until admission (TTA).
    pub expected_wait_time: f64,

    /// Minutes to hand a patient over from an ambulance crew.
    pub ambulance_offload_time: f64,

    /// EMS units currently heading to the hospital. Older services omit it.
    #[serde(default)]
    pub inbound_ems: u32,
}

/// Contribution of each input signal to the forecast.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FactorAnalysis {
    pub seasonal_score: f64,
    pub traffic_score: f64,
    pub cad_volume: f64,
}

/// Response of `GET {base}/hospitals/{id}/predict`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionResponse {
    /// Projected occupancy, one value per fixed time step starting one step from now.
    pub load_forecast: Vec<f64>,

    /// Model confidence percentage, 0-100.
    pub model_confidence: f64,

    pub quality_indicators: QualityIndicators,
    pub factor_analysis: FactorAnalysis,

    #[serde(default)]
    pub alerts: Vec<Alert>,

    #[serde(default)]
    pub transfers: Vec<TransferPrediction>,
}

impl PredictionResponse {
    /// The degraded payload used by the silent-fallback policy.
    ///
    /// All-zero forecast, zero confidence, one high severity alert saying the
    /// connection was lost, no transfers.
    pub fn offline() -> Self {
        Self {
            load_forecast: vec![0.0; 3],
            model_confidence: 0.0,
            quality_indicators: QualityIndicators::default(),
            factor_analysis: FactorAnalysis::default(),
            alerts: vec![Alert {
                id: "err".to_string(),
                timestamp: "NOW".to_string(),
                level: AlertLevel::T90,
                severity: Severity::High,
                message: Bilingual::new(
                    "Connection to AI Engine lost.",
                    "فقد الاتصال بمحرك الذكاء الاصطناعي.",
                ),
                action: Bilingual::new(
                    "Check local server status.",
                    "تحقق من حالة السيرفر المحلي.",
                ),
            }],
            transfers: Vec::new(),
        }
    }

    /// Whether this payload is the offline placeholder rather than a real forecast.
    pub fn is_degraded(&self) -> bool {
        self.model_confidence == 0.0
    }

    /// Highest value in the forecast, if any.
    pub fn peak_load(&self) -> Option<f64> {
        self.load_forecast.iter().copied().reduce(f64::max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i18n::Language;

    fn hospital(capacity: u32, occupancy: u32) -> Hospital {
        Hospital {
            id: "hx".to_string(),
            name: Bilingual::new("Test", "اختبار"),
            region: Bilingual::new("Central", "الوسطى"),
            position: GeoPoint::new(24.7, 46.7),
            capacity,
            occupancy,
            ed_flow_rate: 10,
            traffic_index: 10,
            weather: WeatherCondition::Clear,
            status: HospitalStatus::Normal,
            specialties: vec![],
        }
    }

    fn alert(id: &str, severity: Severity) -> Alert {
        Alert {
            id: id.to_string(),
            timestamp: "12:00".to_string(),
            level: AlertLevel::T45,
            severity,
            message: Bilingual::new("m", "م"),
            action: Bilingual::new("a", "ا"),
        }
    }

    #[test]
    fn test_reserve_capacity_scenario() {
        // 100 * (1 - 780/800) = 2.5, rounds to 3
        assert_eq!(hospital(800, 780).reserve_capacity_pct(), 3);
    }

    #[test]
    fn test_reserve_capacity_clamped_when_over_census() {
        assert_eq!(hospital(400, 520).reserve_capacity_pct(), 0);
        assert_eq!(hospital(400, 400).reserve_capacity_pct(), 0);
    }

    #[test]
    fn test_reserve_capacity_matches_formula() {
        for capacity in [1u32, 7, 120, 500, 1200] {
            for occupancy in (0..=capacity * 2).step_by(3) {
                let expected = (100.0 * (1.0 - occupancy as f64 / capacity as f64))
                    .round()
                    .max(0.0) as u32;
                assert_eq!(hospital(capacity, occupancy).reserve_capacity_pct(), expected);
            }
        }
    }

    #[test]
    fn test_severity_sort_orders_and_keeps_arrival() {
        let mut alerts = vec![
            alert("a", Severity::Low),
            alert("b", Severity::High),
            alert("c", Severity::Medium),
            alert("d", Severity::High),
            alert("e", Severity::Low),
        ];
        sort_by_severity(&mut alerts);

        let ids: Vec<_> = alerts.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, ["b", "d", "c", "a", "e"]);
        assert!(
            alerts
                .windows(2)
                .all(|w| w[0].severity.weight() >= w[1].severity.weight())
        );
    }

    #[test]
    fn test_alert_wire_format() {
        let json = serde_json::json!({
            "id": "alt-1",
            "timestamp": "14:05",
            "level": "T-15",
            "severity": "high",
            "messageEn": "Surge imminent",
            "messageAr": "تدفق عالي متوقع",
            "actionEn": "Activate diversion protocol.",
            "actionAr": "تفعيل بروتوكول تحويل المسار."
        });
        let alert: Alert = serde_json::from_value(json.clone()).unwrap();
        assert_eq!(alert.level, AlertLevel::T15);
        assert_eq!(alert.message.get(Language::Ar), "تدفق عالي متوقع");
        assert_eq!(serde_json::to_value(&alert).unwrap(), json);
    }

    #[test]
    fn test_prediction_payload_without_optional_fields() {
        let json = serde_json::json!({
            "loadForecast": [40, 42, 47],
            "modelConfidence": 93,
            "qualityIndicators": { "expectedWaitTime": 120, "ambulanceOffloadTime": 33 },
            "factorAnalysis": { "seasonalScore": 130, "trafficScore": 71, "cadVolume": 18 }
        });
        let response: PredictionResponse = serde_json::from_value(json).unwrap();
        assert_eq!(response.load_forecast, vec![40.0, 42.0, 47.0]);
        assert_eq!(response.quality_indicators.inbound_ems, 0);
        assert!(response.alerts.is_empty());
        assert!(!response.is_degraded());
        assert_eq!(response.peak_load(), Some(47.0));
    }

    #[test]
    fn test_odd_alert_does_not_reject_forecast() {
        let json = serde_json::json!({
            "loadForecast": [510, 530, 560],
            "modelConfidence": 81,
            "qualityIndicators": { "expectedWaitTime": 95, "ambulanceOffloadTime": 27 },
            "factorAnalysis": { "seasonalScore": 110, "trafficScore": 64, "cadVolume": 15 },
            "alerts": [
                {
                    "id": "odd-1",
                    "timestamp": "09:40",
                    "level": "T-5",
                    "severity": "critical",
                    "messageEn": "Mass casualty incident",
                    "messageAr": "حادث إصابات جماعية"
                },
                {
                    "id": "ok-1",
                    "timestamp": "09:45",
                    "level": "T-45",
                    "severity": "low",
                    "messageEn": "Minor delay",
                    "messageAr": "تأخير بسيط",
                    "actionEn": "Monitor",
                    "actionAr": "راقب"
                }
            ]
        });
        let mut response: PredictionResponse = serde_json::from_value(json).unwrap();

        assert_eq!(response.load_forecast, vec![510.0, 530.0, 560.0]);
        let odd = &response.alerts[0];
        assert_eq!(odd.severity, Severity::Unknown);
        assert_eq!(odd.level, AlertLevel::Unknown);
        assert_eq!(odd.message.en, "Mass casualty incident");
        assert_eq!(odd.action.en, "");

        sort_by_severity(&mut response.alerts);
        assert_eq!(response.alerts[0].id, "ok-1");
        assert_eq!(response.alerts[1].id, "odd-1");
    }

    #[test]
    fn test_structurally_wrong_payload_is_rejected() {
        let json = serde_json::json!({
            "loadForecast": "rising",
            "modelConfidence": 81,
            "qualityIndicators": { "expectedWaitTime": 95, "ambulanceOffloadTime": 27 },
            "factorAnalysis": { "seasonalScore": 110, "trafficScore": 64, "cadVolume": 15 }
        });
        assert!(serde_json::from_value::<PredictionResponse>(json).is_err());
    }

    #[test]
    fn test_offline_payload_shape() {
        let offline = PredictionResponse::offline();
        assert!(offline.load_forecast.iter().all(|v| *v == 0.0));
        assert_eq!(offline.model_confidence, 0.0);
        assert!(offline.is_degraded());
        assert_eq!(offline.alerts.len(), 1);
        assert_eq!(offline.alerts[0].severity, Severity::High);
        assert!(!offline.alerts[0].message.is_incomplete());
        assert!(!offline.alerts[0].action.is_incomplete());
        assert!(offline.transfers.is_empty());
    }
}
