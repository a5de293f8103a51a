use serde::{Deserialize, Serialize};

/// Zoom change applied by one zoom-in or zoom-out step.
pub const ZOOM_STEP: f32 = 0.25;
pub const MIN_SCALE: f32 = 0.5;
pub const MAX_SCALE: f32 = 3.0;

const QUARTERS_PER_UNIT: u8 = 4;
const MIN_QUARTERS: u8 = 2;
const MAX_QUARTERS: u8 = 12;
const DEFAULT_QUARTERS: u8 = 4;

/// Zoom scale in `[0.5, 3.0]`, held as a whole number of 0.25 steps so that
/// any sequence of zoom-in/zoom-out lands on exactly the same values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "f32", from = "f32")]
pub struct Zoom {
    quarters: u8,
}

impl Zoom {
    pub const ACTUAL_SIZE: Zoom = Zoom { quarters: DEFAULT_QUARTERS };
    pub const MIN: Zoom = Zoom { quarters: MIN_QUARTERS };
    pub const MAX: Zoom = Zoom { quarters: MAX_QUARTERS };

    /// Nearest zoom step to `scale`, clamped to the supported range.
    pub fn from_scale(scale: f32) -> Self {
        if !scale.is_finite() {
            return Self::ACTUAL_SIZE;
        }
        let quarters = (scale * QUARTERS_PER_UNIT as f32).round();
        let quarters = quarters.clamp(MIN_QUARTERS as f32, MAX_QUARTERS as f32) as u8;
        Self { quarters }
    }

    pub fn scale(self) -> f32 {
        self.quarters as f32 / QUARTERS_PER_UNIT as f32
    }

    /// Rounded percentage shown on the zoom reset button.
    pub fn percent(self) -> u16 {
        u16::from(self.quarters) * 25
    }

    pub fn label(self) -> String {
        format!("{}%", self.percent())
    }

    pub fn zoomed_in(self) -> Self {
        Self { quarters: (self.quarters + 1).min(MAX_QUARTERS) }
    }

    pub fn zoomed_out(self) -> Self {
        Self { quarters: self.quarters.saturating_sub(1).max(MIN_QUARTERS) }
    }

    pub fn can_zoom_in(self) -> bool {
        self.quarters < MAX_QUARTERS
    }

    pub fn can_zoom_out(self) -> bool {
        self.quarters > MIN_QUARTERS
    }
}

impl Default for Zoom {
    fn default() -> Self {
        Self::ACTUAL_SIZE
    }
}

impl From<Zoom> for f32 {
    fn from(zoom: Zoom) -> Self {
        zoom.scale()
    }
}

impl From<f32> for Zoom {
    fn from(scale: f32) -> Self {
        Zoom::from_scale(scale)
    }
}
