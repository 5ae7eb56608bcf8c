//! Static reference data standing in for a live backend.
//!
//! All values are fictional demo data for the Riyadh sector. They are built
//! once on first access and never modified; the motion simulation works on
//! its own copy of the ambulance list.

use std::sync::LazyLock;

use crate::i18n::Bilingual;
use crate::model::{
    Ambulance, AmbulanceStatus, Congestion, GeoPoint, Hazard, Hospital, HospitalStatus,
    Intensity, TrafficRoute, UnitType, WeatherCondition, WeatherZone,
};

static HOSPITALS: LazyLock<Vec<Hospital>> = LazyLock::new(|| {
    vec![
        Hospital {
            id: "h1".to_string(),
            name: Bilingual::new("Central General Hospital", "مستشفى الشميسي العام"),
            region: Bilingual::new("Central", "الوسطى"),
            position: GeoPoint::new(24.6366, 46.7107),
            capacity: 500,
            occupancy: 350,
            ed_flow_rate: 45,
            traffic_index: 82,
            weather: WeatherCondition::Heatwave,
            status: HospitalStatus::Strain,
            specialties: vec!["General".to_string(), "Respiratory".to_string()],
        },
        Hospital {
            id: "h2".to_string(),
            name: Bilingual::new("King Faisal Specialist", "مستشفى الملك فيصل التخصصي"),
            region: Bilingual::new("Central", "الوسطى"),
            position: GeoPoint::new(24.6734, 46.6766),
            capacity: 800,
            occupancy: 780,
            ed_flow_rate: 90,
            traffic_index: 95,
            weather: WeatherCondition::Heatwave,
            status: HospitalStatus::Critical,
            specialties: vec![
                "Trauma".to_string(),
                "Oncology".to_string(),
                "Cardiac".to_string(),
            ],
        },
        Hospital {
            id: "h3".to_string(),
            name: Bilingual::new("Riyadh Care Hospital", "مستشفى رعاية الرياض"),
            region: Bilingual::new("East", "الشرق"),
            position: GeoPoint::new(24.6946, 46.7865),
            capacity: 600,
            occupancy: 200,
            ed_flow_rate: 20,
            traffic_index: 30,
            weather: WeatherCondition::Clear,
            status: HospitalStatus::Normal,
            specialties: vec!["Infectious Diseases".to_string()],
        },
        Hospital {
            id: "h4".to_string(),
            name: Bilingual::new("Security Forces Hospital", "مستشفى قوى الأمن"),
            region: Bilingual::new("Central", "الوسطى"),
            position: GeoPoint::new(24.6858, 46.7324),
            capacity: 400,
            occupancy: 380,
            ed_flow_rate: 55,
            traffic_index: 60,
            weather: WeatherCondition::Sandstorm,
            status: HospitalStatus::Critical,
            specialties: vec!["Trauma".to_string(), "Respiratory".to_string()],
        },
    ]
});

static AMBULANCES: LazyLock<Vec<Ambulance>> = LazyLock::new(|| {
    let unit = |id: &str, status: AmbulanceStatus, lat: f64, lon: f64, kind: UnitType| Ambulance {
        id: id.to_string(),
        status,
        position: GeoPoint::new(lat, lon),
        unit: kind,
    };
    vec![
        unit("a1", AmbulanceStatus::Dispatched, 24.6500, 46.7000, UnitType::Als),
        unit("a2", AmbulanceStatus::Transferring, 24.6800, 46.6800, UnitType::Als),
        unit("a3", AmbulanceStatus::Idle, 24.7000, 46.7500, UnitType::Bls),
        unit("a4", AmbulanceStatus::Dispatched, 24.6600, 46.7200, UnitType::Micu),
        unit("a5", AmbulanceStatus::Idle, 24.6900, 46.6600, UnitType::Rescue),
    ]
});

static WEATHER_ZONES: LazyLock<Vec<WeatherZone>> = LazyLock::new(|| {
    vec![
        WeatherZone {
            id: "w1".to_string(),
            hazard: Hazard::Heatwave,
            center: GeoPoint::new(24.6700, 46.7100),
            radius_m: 3000.0,
            intensity: Intensity::Severe,
        },
        WeatherZone {
            id: "w2".to_string(),
            hazard: Hazard::Sandstorm,
            center: GeoPoint::new(24.7500, 46.8000),
            radius_m: 5000.0,
            intensity: Intensity::Moderate,
        },
    ]
});

static TRAFFIC_ROUTES: LazyLock<Vec<TrafficRoute>> = LazyLock::new(|| {
    vec![
        TrafficRoute {
            id: "r1".to_string(),
            name: Bilingual::new("King Fahd Road", "طريق الملك فهد"),
            path: vec![
                GeoPoint::new(24.6500, 46.6900),
                GeoPoint::new(24.6734, 46.6850),
                GeoPoint::new(24.7000, 46.6800),
            ],
            congestion: Congestion::Heavy,
        },
        TrafficRoute {
            id: "r2".to_string(),
            name: Bilingual::new("Eastern Ring Road", "الطريق الدائري الشرقي"),
            path: vec![
                GeoPoint::new(24.6600, 46.7700),
                GeoPoint::new(24.6946, 46.7800),
                GeoPoint::new(24.7300, 46.7900),
            ],
            congestion: Congestion::Light,
        },
    ]
});

static LIVE_FEED: [&str; 4] = [
    "[ALERT] SANDSTORM DETECTED IN RIYADH SECTOR 4",
    "[EMS] RED CRESCENT UNIT 101 RESPONDING TO TRAUMA CODE",
    "[SYSTEM] AI FORECAST CONFIDENCE 98%",
    "[CIVIL DEFENSE] HEATWAVE WARNING IN JEDDAH SECTOR",
];

pub fn hospitals() -> &'static [Hospital] {
    &HOSPITALS
}

pub fn ambulances() -> &'static [Ambulance] {
    &AMBULANCES
}

pub fn weather_zones() -> &'static [WeatherZone] {
    &WEATHER_ZONES
}

pub fn traffic_routes() -> &'static [TrafficRoute] {
    &TRAFFIC_ROUTES
}

/// Static ticker lines shown under the header.
pub fn live_feed() -> &'static [&'static str] {
    &LIVE_FEED
}

/// First hospital in critical status, if any.
pub fn first_critical() -> Option<&'static Hospital> {
    hospitals()
        .iter()
        .find(|h| h.status == HospitalStatus::Critical)
}

/// Look up a hospital by identifier.
pub fn find_hospital(id: &str) -> Option<&'static Hospital> {
    hospitals().iter().find(|h| h.id == id)
}
