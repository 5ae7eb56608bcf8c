//! A scriptable stand-in for the prediction service.

#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::sync::Notify;

use sentinel::config::SentinelConfig;

/// How the fake answers a forecast request for one hospital.
#[derive(Clone)]
pub enum Behavior {
    Ok,
    Status(u16),
    /// Fail with 500 on the first request, succeed afterwards.
    FailOnce,
    Delay(Duration),
    /// Hold the response until the gate is notified.
    WaitFor(Arc<Notify>),
    Malformed,
}

#[derive(Clone)]
pub struct FakeUpstream {
    pub addr: SocketAddr,
    hits: Arc<AtomicUsize>,
    per_hospital: Arc<Mutex<HashMap<String, usize>>>,
    behaviors: Arc<Mutex<HashMap<String, Behavior>>>,
}

impl FakeUpstream {
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let upstream = Self {
            addr,
            hits: Arc::new(AtomicUsize::new(0)),
            per_hospital: Arc::new(Mutex::new(HashMap::new())),
            behaviors: Arc::new(Mutex::new(HashMap::new())),
        };

        let app = Router::new()
            .route("/hospitals/:id/predict", get(predict))
            .route("/api/health", get(health))
            .with_state(upstream.clone());

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        upstream
    }

    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn set(&self, hospital_id: &str, behavior: Behavior) {
        self.behaviors
            .lock()
            .unwrap()
            .insert(hospital_id.to_string(), behavior);
    }

    /// Forecast requests received so far.
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    pub fn hits_for(&self, hospital_id: &str) -> usize {
        self.per_hospital
            .lock()
            .unwrap()
            .get(hospital_id)
            .copied()
            .unwrap_or(0)
    }

    /// Wait until at least `n` forecast requests arrived.
    pub async fn wait_for_hits(&self, n: usize) {
        tokio::time::timeout(Duration::from_secs(5), async {
            while self.hits() < n {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("upstream never received the expected requests");
    }

    /// Configuration pointing at this fake, with the motion simulation off.
    pub fn config(&self) -> SentinelConfig {
        SentinelConfig {
            prediction_url: self.url(),
            jitter_interval: None,
            ..SentinelConfig::default()
        }
    }
}

async fn predict(State(up): State<FakeUpstream>, Path(id): Path<String>) -> Response {
    up.hits.fetch_add(1, Ordering::SeqCst);
    let seen = {
        let mut per = up.per_hospital.lock().unwrap();
        let count = per.entry(id.clone()).or_insert(0);
        *count += 1;
        *count
    };
    let behavior = up
        .behaviors
        .lock()
        .unwrap()
        .get(&id)
        .cloned()
        .unwrap_or(Behavior::Ok);

    match behavior {
        Behavior::Ok => Json(sample_prediction(&id)).into_response(),
        Behavior::Status(code) => StatusCode::from_u16(code).unwrap().into_response(),
        Behavior::FailOnce if seen == 1 => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        Behavior::FailOnce => Json(sample_prediction(&id)).into_response(),
        Behavior::Delay(delay) => {
            tokio::time::sleep(delay).await;
            Json(sample_prediction(&id)).into_response()
        }
        Behavior::WaitFor(gate) => {
            gate.notified().await;
            Json(sample_prediction(&id)).into_response()
        }
        Behavior::Malformed => Json(json!({ "loadForecast": "not a series" })).into_response(),
    }
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "online",
        "system": "Sentinel Forecast Engine",
        "mode": "Integrated"
    }))
}

/// A forecast payload; alerts arrive unsorted (low, high, medium).
pub fn sample_prediction(hospital_id: &str) -> Value {
    json!({
        "loadForecast": [360.0, 395.0, 430.0],
        "modelConfidence": 87.5,
        "qualityIndicators": {
            "expectedWaitTime": 42.0,
            "ambulanceOffloadTime": 18.0,
            "inboundEms": 4
        },
        "factorAnalysis": {
            "seasonalScore": 0.4,
            "trafficScore": 0.7,
            "cadVolume": 12.0
        },
        "alerts": [
            {
                "id": format!("{hospital_id}-low"),
                "timestamp": "14:05",
                "level": "T-90",
                "severity": "low",
                "messageEn": "Minor inflow increase",
                "messageAr": "زيادة طفيفة في التدفق",
                "actionEn": "Monitor",
                "actionAr": "راقب"
            },
            {
                "id": format!("{hospital_id}-high"),
                "timestamp": "14:10",
                "level": "T-15",
                "severity": "high",
                "messageEn": "Surge expected",
                "messageAr": "تدفق عالي متوقع",
                "actionEn": "Open overflow area",
                "actionAr": "افتح منطقة الفائض"
            },
            {
                "id": format!("{hospital_id}-medium"),
                "timestamp": "14:20",
                "level": "T-45",
                "severity": "medium",
                "messageEn": "Offload delays building",
                "messageAr": "تأخر التسليم يتزايد",
                "actionEn": "Call extra crews",
                "actionAr": "استدع طواقم إضافية"
            }
        ],
        "transfers": [
            {
                "sourceId": hospital_id,
                "targetId": "h3",
                "probability": 72.0,
                "reasonEn": "Spare cardiology beds",
                "reasonAr": "أسرة قلب متاحة",
                "recommendedSpecialty": "Cardiology"
            }
        ]
    })
}
