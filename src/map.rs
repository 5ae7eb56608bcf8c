//! Map view: hospitals, ambulances, weather hazards and traffic over a base map.
//!
//! The view owns three independent layer toggles and, optionally, the
//! ambulance motion simulation. The simulation is a [`ScheduledTask`] owned by
//! the view; [`MapView::unmount`] stops it and no position changes afterwards.

use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use rand::Rng;
use rand::rngs::StdRng;
use serde::Serialize;
use tracing::debug;

use crate::error::DashboardError;
use crate::fixtures;
use crate::i18n::{Language, Labels, labels};
use crate::model::{
    Ambulance, AmbulanceStatus, Congestion, GeoPoint, Hazard, HospitalStatus, Intensity,
    UnitType,
};
use crate::schedule::ScheduledTask;

/// Largest per-tick displacement of a simulated ambulance, in degrees.
pub const JITTER_DEGREES: f64 = 0.001;

/// Meters per degree of latitude.
const METERS_PER_DEGREE: f64 = 111_320.0;

/// A toggleable map layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Layer {
    Hospitals,
    Ambulances,
    Weather,
}

impl Layer {
    pub const ALL: [Layer; 3] = [Layer::Hospitals, Layer::Ambulances, Layer::Weather];

    pub fn label(&self, labels: &Labels) -> &'static str {
        match self {
            Layer::Hospitals => labels.layer_hospitals,
            Layer::Ambulances => labels.layer_ambulances,
            Layer::Weather => labels.layer_weather,
        }
    }
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Layer::Hospitals => "hospitals",
            Layer::Ambulances => "ambulances",
            Layer::Weather => "weather",
        })
    }
}

impl FromStr for Layer {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "hospitals" => Ok(Layer::Hospitals),
            "ambulances" | "ems" => Ok(Layer::Ambulances),
            "weather" => Ok(Layer::Weather),
            _ => Err(DashboardError::UnknownLayer(s.to_string())),
        }
    }
}

/// Visibility of each layer. Everything is visible by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LayerVisibility {
    pub hospitals: bool,
    pub ambulances: bool,
    pub weather: bool,
}

impl Default for LayerVisibility {
    fn default() -> Self {
        Self {
            hospitals: true,
            ambulances: true,
            weather: true,
        }
    }
}

impl LayerVisibility {
    pub fn is_visible(&self, layer: Layer) -> bool {
        match layer {
            Layer::Hospitals => self.hospitals,
            Layer::Ambulances => self.ambulances,
            Layer::Weather => self.weather,
        }
    }

    /// Flip one layer and return its new visibility.
    pub fn toggle(&mut self, layer: Layer) -> bool {
        let slot = match layer {
            Layer::Hospitals => &mut self.hospitals,
            Layer::Ambulances => &mut self.ambulances,
            Layer::Weather => &mut self.weather,
        };
        *slot = !*slot;
        *slot
    }
}

/// A position on the map panel, in percent of width (x) and height (y).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PanelPoint {
    pub x: f64,
    pub y: f64,
}

/// Geographic window shown on the map panel (north up, equirectangular).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Viewport {
    pub south: f64,
    pub north: f64,
    pub west: f64,
    pub east: f64,
}

impl Default for Viewport {
    /// The Riyadh sector.
    fn default() -> Self {
        Self {
            south: 24.60,
            north: 24.80,
            west: 46.62,
            east: 46.84,
        }
    }
}

impl Viewport {
    pub fn contains(&self, p: GeoPoint) -> bool {
        (self.south..=self.north).contains(&p.lat) && (self.west..=self.east).contains(&p.lon)
    }

    /// Project onto the 0-100 panel. `None` when the point is outside the window.
    pub fn project(&self, p: GeoPoint) -> Option<PanelPoint> {
        if !self.contains(p) {
            return None;
        }
        Some(PanelPoint {
            x: (p.lon - self.west) / (self.east - self.west) * 100.0,
            y: (self.north - p.lat) / (self.north - self.south) * 100.0,
        })
    }

    /// A distance in meters as a fraction of panel height, in percent.
    pub fn project_radius(&self, meters: f64) -> f64 {
        meters / (METERS_PER_DEGREE * (self.north - self.south)) * 100.0
    }
}

/// Live ambulance positions plus a count of simulation updates.
#[derive(Debug, Clone, Default)]
pub struct Fleet {
    pub units: Vec<Ambulance>,
    pub updates: u64,
}

fn lock(fleet: &Mutex<Fleet>) -> MutexGuard<'_, Fleet> {
    match fleet.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// The map view.
#[derive(Debug)]
pub struct MapView {
    layers: LayerVisibility,
    viewport: Viewport,
    fleet: Arc<Mutex<Fleet>>,
    jitter: Option<ScheduledTask>,
}

impl MapView {
    /// Mount the view with a fresh copy of the fixture fleet.
    ///
    /// With `jitter` set, every ambulance is nudged by a symmetric random
    /// offset of at most [`JITTER_DEGREES`] once per interval until unmount.
    /// Must be called from within a tokio runtime when `jitter` is set.
    pub fn mount(jitter: Option<Duration>, mut rng: StdRng) -> Self {
        let fleet = Arc::new(Mutex::new(Fleet {
            units: fixtures::ambulances().to_vec(),
            updates: 0,
        }));

        let jitter = jitter.map(|period| {
            let fleet = fleet.clone();
            ScheduledTask::spawn("ambulance-jitter", period, move || {
                let mut fleet = lock(&fleet);
                for unit in fleet.units.iter_mut() {
                    let d_lat = rng.gen_range(-JITTER_DEGREES..=JITTER_DEGREES);
                    let d_lon = rng.gen_range(-JITTER_DEGREES..=JITTER_DEGREES);
                    unit.position = unit.position.offset(d_lat, d_lon);
                }
                fleet.updates += 1;
            })
        });

        Self {
            layers: LayerVisibility::default(),
            viewport: Viewport::default(),
            fleet,
            jitter,
        }
    }

    /// Stop the motion simulation. Safe to call more than once.
    pub async fn unmount(&mut self) {
        if let Some(task) = self.jitter.take() {
            let name = task.name();
            task.cancel().await;
            debug!(task = name, "Map view unmounted");
        }
    }

    /// Whether the motion simulation is running.
    pub fn is_simulating(&self) -> bool {
        self.jitter.is_some()
    }

    pub fn layers(&self) -> LayerVisibility {
        self.layers
    }

    pub fn toggle_layer(&mut self, layer: Layer) -> bool {
        self.layers.toggle(layer)
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Current ambulance positions.
    pub fn ambulances(&self) -> Vec<Ambulance> {
        lock(&self.fleet).units.clone()
    }

    /// How many times the simulation has moved the fleet.
    pub fn position_updates(&self) -> u64 {
        lock(&self.fleet).updates
    }

    /// Render the view in `lang`. Hidden layers produce no markers.
    pub fn screen(&self, lang: Language) -> MapScreen {
        let text = labels(lang);
        let vp = &self.viewport;

        let layers = Layer::ALL
            .iter()
            .map(|layer| LayerToggle {
                layer: *layer,
                label: layer.label(text),
                visible: self.layers.is_visible(*layer),
            })
            .collect();

        let hospitals = if self.layers.hospitals {
            fixtures::hospitals()
                .iter()
                .map(|h| HospitalMarker {
                    id: h.id.clone(),
                    name: h.name.get(lang).to_string(),
                    region: h.region.get(lang).to_string(),
                    status: h.status,
                    status_label: status_label(h.status, text),
                    occupancy: h.occupancy,
                    capacity: h.capacity,
                    reserve_capacity_pct: h.reserve_capacity_pct(),
                    position: h.position,
                    panel: vp.project(h.position),
                })
                .collect()
        } else {
            Vec::new()
        };

        let ambulances = if self.layers.ambulances {
            lock(&self.fleet)
                .units
                .iter()
                .map(|a| AmbulanceMarker {
                    id: a.id.clone(),
                    status: a.status,
                    unit: a.unit,
                    position: a.position,
                    panel: vp.project(a.position),
                })
                .collect()
        } else {
            Vec::new()
        };

        let weather = if self.layers.weather {
            fixtures::weather_zones()
                .iter()
                .map(|w| WeatherMarker {
                    id: w.id.clone(),
                    hazard: w.hazard,
                    intensity: w.intensity,
                    center: w.center,
                    radius_m: w.radius_m,
                    panel: vp.project(w.center),
                    panel_radius: vp.project_radius(w.radius_m),
                })
                .collect()
        } else {
            Vec::new()
        };

        let routes = fixtures::traffic_routes()
            .iter()
            .map(|r| RouteLine {
                id: r.id.clone(),
                name: r.name.get(lang).to_string(),
                congestion: r.congestion,
                panel: r.path.iter().filter_map(|p| vp.project(*p)).collect(),
            })
            .collect();

        MapScreen {
            title: text.title,
            heading: text.dashboard,
            layers,
            hospitals,
            ambulances,
            weather,
            routes,
        }
    }
}

impl Drop for MapView {
    fn drop(&mut self) {
        // ScheduledTask cancels itself on drop; this only makes the intent visible in logs.
        if self.jitter.is_some() {
            debug!("Map view dropped while mounted");
        }
    }
}

pub(crate) fn status_label(status: HospitalStatus, text: &Labels) -> &'static str {
    match status {
        HospitalStatus::Normal => text.status_normal,
        HospitalStatus::Strain => text.status_strain,
        HospitalStatus::Critical => text.status_critical,
    }
}

/// Everything a front end needs to draw the map view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapScreen {
    pub title: &'static str,
    pub heading: &'static str,
    pub layers: Vec<LayerToggle>,
    pub hospitals: Vec<HospitalMarker>,
    pub ambulances: Vec<AmbulanceMarker>,
    pub weather: Vec<WeatherMarker>,
    pub routes: Vec<RouteLine>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayerToggle {
    pub layer: Layer,
    pub label: &'static str,
    pub visible: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HospitalMarker {
    pub id: String,
    pub name: String,
    pub region: String,
    pub status: HospitalStatus,
    pub status_label: &'static str,
    pub occupancy: u32,
    pub capacity: u32,
    pub reserve_capacity_pct: u32,
    pub position: GeoPoint,
    pub panel: Option<PanelPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AmbulanceMarker {
    pub id: String,
    pub status: AmbulanceStatus,
    pub unit: UnitType,
    pub position: GeoPoint,
    pub panel: Option<PanelPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherMarker {
    pub id: String,
    pub hazard: Hazard,
    pub intensity: Intensity,
    pub center: GeoPoint,
    pub radius_m: f64,
    pub panel: Option<PanelPoint>,
    pub panel_radius: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteLine {
    pub id: String,
    pub name: String,
    pub congestion: Congestion,
    pub panel: Vec<PanelPoint>,
}
