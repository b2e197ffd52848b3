use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Largest integer a browser can represent exactly (2^53 - 1)
pub const MAX_SAFE_INTEGER: u64 = 9_007_199_254_740_991;

/// Positive integer identifying a listed property
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FavoriteId(u64);

impl FavoriteId {
    /// Accepts positive values a browser can represent exactly
    pub fn new(raw: i64) -> Option<Self> {
        if raw > 0 && raw as u64 <= MAX_SAFE_INTEGER {
            Some(Self(raw as u64))
        } else {
            None
        }
    }

    /// Accepts a JS-style number: finite, integral, positive and exactly representable
    pub fn from_f64(raw: f64) -> Option<Self> {
        if raw.is_finite() && raw.fract() == 0.0 && raw >= 1.0 && raw <= MAX_SAFE_INTEGER as f64 {
            Some(Self(raw as u64))
        } else {
            None
        }
    }

    /// Validate one entry of a persisted favorites array. Strings are rejected
    /// even when they spell a number.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => {
                if let Some(u) = n.as_u64() {
                    (u > 0 && u <= MAX_SAFE_INTEGER).then_some(Self(u))
                } else if n.is_i64() {
                    None
                } else {
                    n.as_f64().and_then(Self::from_f64)
                }
            }
            _ => None,
        }
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for FavoriteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DealType {
    Sale,
    Rent,
    Both,
}

/// Denormalized listing data returned by the backend for a favorites id list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertySummary {
    pub id: FavoriteId,
    pub title: String,
    pub slug: String,
    #[serde(default)]
    pub price_display: String,
    #[serde(default)]
    pub district_name: String,
    #[serde(default)]
    pub main_image_url: Option<String>,
    #[serde(default)]
    pub deal_type: Option<DealType>,
    #[serde(default)]
    pub property_type_name: Option<String>,
    #[serde(default)]
    pub price_per_sqm: Option<f64>,
    #[serde(default)]
    pub currency_symbol: Option<String>,
    #[serde(default)]
    pub bedrooms: Option<u32>,
    #[serde(default)]
    pub bathrooms: Option<u32>,
    #[serde(default)]
    pub area_total: Option<f64>,
    #[serde(default)]
    pub area_land: Option<f64>,
    #[serde(default)]
    pub pool: bool,
    #[serde(default)]
    pub parking: bool,
    #[serde(default)]
    pub furnished: bool,
}

impl PropertySummary {
    /// Title shortened for grid cards
    pub fn card_title(&self) -> String {
        truncate_title(&self.title, 50)
    }

    /// Title shortened for comparison table headers
    pub fn comparison_title(&self) -> String {
        truncate_title(&self.title, 40)
    }

    /// Detail page link
    pub fn detail_path(&self) -> String {
        format!("/property/{}/", self.slug)
    }
}

/// Cut `title` to `max_chars` characters and append "..." when it was longer
pub fn truncate_title(title: &str, max_chars: usize) -> String {
    if title.chars().count() > max_chars {
        let cut: String = title.chars().take(max_chars).collect();
        format!("{}...", cut)
    } else {
        title.to_string()
    }
}

/// Backend response envelope for the favorite properties endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct PropertiesResponse {
    pub success: bool,
    #[serde(default)]
    pub properties: Vec<PropertySummary>,
    #[serde(default)]
    pub error: Option<String>,
}
