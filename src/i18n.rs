//! Display languages and the static label table.
//!
//! Every entity that reaches the screen already carries both its English and
//! Arabic text. Switching language never translates anything at runtime: it
//! only changes which of the two stored strings is selected.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DashboardError;

/// Active display language.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Ar,
}

impl Language {
    /// The BCP-47 style tag used on the wire.
    pub fn tag(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Ar => "ar",
        }
    }

    /// The other language.
    pub fn toggle(self) -> Self {
        match self {
            Language::En => Language::Ar,
            Language::Ar => Language::En,
        }
    }

    /// Whether screens in this language are laid out right-to-left.
    pub fn is_rtl(&self) -> bool {
        matches!(self, Language::Ar)
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for Language {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" | "en-us" | "en-gb" => Ok(Language::En),
            "ar" | "ar-sa" => Ok(Language::Ar),
            other => Err(DashboardError::UnknownLanguage(other.to_string())),
        }
    }
}

/// A piece of text stored in both display languages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bilingual {
    pub en: String,
    pub ar: String,
}

impl Bilingual {
    pub fn new(en: impl Into<String>, ar: impl Into<String>) -> Self {
        Self {
            en: en.into(),
            ar: ar.into(),
        }
    }

    /// Select the stored text for `lang`.
    pub fn get(&self, lang: Language) -> &str {
        match lang {
            Language::En => &self.en,
            Language::Ar => &self.ar,
        }
    }

    /// True when either translation is missing.
    pub fn is_incomplete(&self) -> bool {
        self.en.trim().is_empty() || self.ar.trim().is_empty()
    }
}

/// Fixed interface labels for one language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Labels {
    pub title: &'static str,
    pub dashboard: &'static str,
    pub alerts: &'static str,
    pub details: &'static str,
    pub forecast: &'static str,
    pub layer_hospitals: &'static str,
    pub layer_ambulances: &'static str,
    pub layer_weather: &'static str,
    pub back: &'static str,
    pub region: &'static str,
    pub specialties: &'static str,
    pub model_confidence: &'static str,
    pub wait_time: &'static str,
    pub offload_time: &'static str,
    pub inbound_ems: &'static str,
    pub reserve_capacity: &'static str,
    pub transfers: &'static str,
    pub loading: &'static str,
    pub connection_failed: &'static str,
    pub retry: &'static str,
    pub synthetic_history: &'static str,
    pub degraded: &'static str,
    pub status_normal: &'static str,
    pub status_strain: &'static str,
    pub status_critical: &'static str,
    pub live_feed: &'static str,
    pub sound_on: &'static str,
    pub sound_off: &'static str,
}

static EN: Labels = Labels {
    title: "National Medical Response",
    dashboard: "Command Center",
    alerts: "Active Alerts",
    details: "Hospital Details",
    forecast: "Predictive ED Load",
    layer_hospitals: "Hospitals",
    layer_ambulances: "Live CAD (EMS)",
    layer_weather: "Weather Hazards",
    back: "Back to Tactical Map",
    region: "Region",
    specialties: "Specialties",
    model_confidence: "Model Confidence",
    wait_time: "Expected Wait (TTA)",
    offload_time: "Ambulance Offload",
    inbound_ems: "Inbound EMS",
    reserve_capacity: "Reserve Capacity",
    transfers: "Transfer Recommendations",
    loading: "Initializing AI model...",
    connection_failed: "Connection to prediction engine failed",
    retry: "Retry",
    synthetic_history: "Simulated history (not measured)",
    degraded: "Prediction engine offline",
    status_normal: "Normal",
    status_strain: "Strain",
    status_critical: "Critical",
    live_feed: "LIVE FEED",
    sound_on: "Voice alerts on",
    sound_off: "Voice alerts muted",
};

static AR: Labels = Labels {
    title: "منصة الاستجابة الطبية الوطنية",
    dashboard: "مركز القيادة والتحكم",
    alerts: "التنبيهات الموقوتة",
    details: "تحليل المستشفى",
    forecast: "التنبؤ بأحمال الطوارئ",
    layer_hospitals: "المستشفيات",
    layer_ambulances: "الإسعاف (CAD)",
    layer_weather: "مخاطر الطقس",
    back: "العودة للخريطة",
    region: "المنطقة",
    specialties: "التخصصات",
    model_confidence: "ثقة النموذج",
    wait_time: "وقت الانتظار المتوقع",
    offload_time: "وقت تسليم الإسعاف",
    inbound_ems: "الإسعاف القادم",
    reserve_capacity: "السعة الاحتياطية",
    transfers: "توصيات التحويل",
    loading: "جاري تهيئة نموذج الذكاء الاصطناعي...",
    connection_failed: "فشل الاتصال بمحرك التنبؤ",
    retry: "إعادة المحاولة",
    synthetic_history: "بيانات تاريخية محاكاة (غير مقاسة)",
    degraded: "محرك التنبؤ غير متصل",
    status_normal: "طبيعي",
    status_strain: "ضغط",
    status_critical: "حرج",
    live_feed: "بث مباشر",
    sound_on: "التنبيهات الصوتية مفعلة",
    sound_off: "التنبيهات الصوتية مكتومة",
};

/// The label table for `lang`.
pub fn labels(lang: Language) -> &'static Labels {
    match lang {
        Language::En => &EN,
        Language::Ar => &AR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_is_involution() {
        assert_eq!(Language::En.toggle(), Language::Ar);
        assert_eq!(Language::En.toggle().toggle(), Language::En);
    }

    #[test]
    fn test_parse_language_tags() {
        assert_eq!("EN".parse::<Language>().unwrap(), Language::En);
        assert_eq!("ar-SA".parse::<Language>().unwrap(), Language::Ar);
        assert!("fr".parse::<Language>().is_err());
    }

    #[test]
    fn test_bilingual_selection() {
        let text = Bilingual::new("Critical", "حرج");
        assert_eq!(text.get(Language::En), "Critical");
        assert_eq!(text.get(Language::Ar), "حرج");
        assert!(!text.is_incomplete());
        assert!(Bilingual::new("x", " ").is_incomplete());
    }

    #[test]
    fn test_only_arabic_is_rtl() {
        assert!(Language::Ar.is_rtl());
        assert!(!Language::En.is_rtl());
    }

    #[test]
    fn test_label_tables_differ() {
        assert_ne!(labels(Language::En).title, labels(Language::Ar).title);
        assert_eq!(labels(Language::En).layer_weather, "Weather Hazards");
    }
}
