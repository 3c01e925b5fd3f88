use serde::{Deserialize, Serialize};

/// A machine listing as the backend returns it. Older endpoints spell the
/// model and image fields differently, so several source fields coexist and
/// accessors resolve the fallback chain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Machine {
    pub id: i64,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub machine_model: Option<String>,
    #[serde(default)]
    pub model_name: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub price_per_hour: Option<f64>,
    #[serde(default)]
    pub machine_image_1: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub availability: Option<String>,
}

fn non_empty(field: &Option<String>) -> Option<&str> {
    field.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl Machine {
    /// Resolved model name: `machine_model`, then `model_name`, then `model`.
    pub fn display_name(&self) -> Option<&str> {
        non_empty(&self.machine_model)
            .or_else(|| non_empty(&self.model_name))
            .or_else(|| non_empty(&self.model))
    }

    /// Raw image reference: `machine_image_1` when non-empty, else `image`.
    pub fn image_ref(&self) -> Option<&str> {
        non_empty(&self.machine_image_1).or_else(|| non_empty(&self.image))
    }

    pub fn is_available(&self) -> bool {
        self.availability
            .as_deref()
            .map(|s| s.trim().eq_ignore_ascii_case("available"))
            .unwrap_or(false)
    }
}
