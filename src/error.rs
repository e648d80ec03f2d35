// Error type shared by every constructor in the crate. Runtime per-frame code
// never fails, only configuration and WebGl setup do.

use thiserror::Error;
use wasm_bindgen::JsValue;

#[derive(Debug, Error)]
pub enum SurferError {
    #[error("gradient for the {axis} axis has no color stops")]
    EmptyGradient { axis: &'static str },

    #[error("invalid hex color '{0}', expected #rgb or #rrggbb")]
    InvalidHexColor(String),

    #[error("color grid needs at least one cell per axis, got {detail_x}x{detail_y}")]
    ZeroGridDimension { detail_x: usize, detail_y: usize },

    #[error("particle system needs at least one particle")]
    EmptyPool,

    #[error("ring radii must satisfy 0 <= inner < outer, got inner={inner} outer={outer}")]
    InvalidRing { inner: f64, outer: f64 },

    #[error("lifetime range must satisfy 0 <= min < max, got min={min} max={max}")]
    InvalidLifetime { min: f64, max: f64 },

    #[error("max speed must be finite and non-negative, got {0}")]
    InvalidMaxSpeed(f64),

    #[error("noise range must satisfy min <= max, got min={min} max={max}")]
    InvalidNoiseRange { min: f64, max: f64 },

    #[error("camera extents and zoom must be finite and positive, got {half_width}x{half_height} at zoom {zoom}")]
    InvalidCamera {
        half_width: f64,
        half_height: f64,
        zoom: f64,
    },

    #[error("max frame delta must be finite and positive, got {0}")]
    InvalidMaxDt(f64),

    #[error("game needs at least one particle system")]
    NoSystems,

    #[error("failed to parse configuration: {0}")]
    Config(#[from] serde_json::Error),

    #[error("shader error: {0}")]
    Shader(String),

    #[error("webgl error: {0}")]
    WebGl(String),
}

pub type Result<T> = std::result::Result<T, SurferError>;

impl From<SurferError> for JsValue {
    fn from(err: SurferError) -> JsValue {
        JsValue::from_str(&err.to_string())
    }
}
