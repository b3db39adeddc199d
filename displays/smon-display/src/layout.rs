//! Screen geometry
//!
//! ```text
//!  0 +--------------------------------------+
//!    | 21C          title                   |  header (inverted)
//! 10 +--------------------------------------+
//!    | CPU:          |                      |
//!    | [=====   ]    |       face           |
//!    | RAM:          |                      |
//!    | [===     ]    |                      |
//! 55 +--------------------------------------+
//!    |  21C  CPU 12%  RAM 5120MB ...        |  ticker
//! 64 +--------------------------------------+
//! ```

use crate::framebuffer::{HEIGHT, WIDTH};

pub const SCREEN_WIDTH: i32 = WIDTH as i32;
pub const SCREEN_HEIGHT: i32 = HEIGHT as i32;

/// Horizontal advance of the UI font
pub const CHAR_WIDTH: i32 = 6;

pub const HEADER_HEIGHT: i32 = 10;
pub const HEADER_TEXT_X: i32 = 2;
pub const HEADER_TEXT_Y: i32 = 1;
/// Space between the temperature and the title area
pub const HEADER_TITLE_GAP: i32 = 4;

pub const TICKER_HEIGHT: i32 = 9;
/// Separator line above the ticker
pub const TICKER_RULE_Y: i32 = SCREEN_HEIGHT - TICKER_HEIGHT;
pub const TICKER_TEXT_Y: i32 = TICKER_RULE_Y + 2;

pub const LEFT_X: i32 = 2;
pub const COLUMN_GAP: i32 = 2;
/// Gauges take two thirds of half the usable width
pub const GAUGE_WIDTH: i32 = ((SCREEN_WIDTH - 4 - COLUMN_GAP) / 2) * 2 / 3;
pub const GAUGE_HEIGHT: i32 = 7;
pub const GAUGE_LABEL_X: i32 = 0;
/// Distance from a label to its bar
pub const GAUGE_LABEL_SPACING: i32 = 8;
/// Space below a bar before the next label
pub const GAUGE_SPACING: i32 = 3;
pub const GAUGES_TOP: i32 = HEADER_HEIGHT + 2;

/// Left edge of the face column
pub const FACE_COLUMN_X: i32 = LEFT_X + GAUGE_WIDTH + COLUMN_GAP;
pub const FACE_COLUMN_WIDTH: i32 = SCREEN_WIDTH - FACE_COLUMN_X - 2;
pub const FACE_AREA_TOP: i32 = HEADER_HEIGHT + 2;
pub const FACE_AREA_HEIGHT: i32 = TICKER_RULE_Y - FACE_AREA_TOP;
pub const FACE_MIN_SIZE: i32 = 22;
pub const FACE_MAX_SIZE: i32 = 50;

/// Face feature positions for one frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FaceGeometry {
    pub cx: i32,
    pub cy: i32,
    pub radius: i32,
    pub eye_y: i32,
    /// Horizontal distance of each eye from the centre
    pub eye_dx: i32,
    pub eye_width: i32,
    pub eye_height: i32,
    pub mouth_y: i32,
    pub mouth_width: i32,
}

impl FaceGeometry {
    /// Geometry centred in the face column, shifted by the head bob
    pub fn new(head_bob: i32) -> Self {
        let size = FACE_COLUMN_WIDTH
            .min(FACE_AREA_HEIGHT)
            .clamp(FACE_MIN_SIZE, FACE_MAX_SIZE);
        let radius = size / 2 - 1;
        let cx = FACE_COLUMN_X + FACE_COLUMN_WIDTH / 2;
        let cy = FACE_AREA_TOP + FACE_AREA_HEIGHT / 2 + head_bob;
        let feature = (radius / 5).max(2);

        Self {
            cx,
            cy,
            radius,
            eye_y: cy - radius / 4,
            eye_dx: radius / 2,
            eye_width: feature,
            eye_height: feature,
            mouth_y: cy + radius / 4,
            mouth_width: (radius * 7 / 10).max(6),
        }
    }

    pub fn left_eye_x(&self) -> i32 {
        self.cx - self.eye_dx
    }

    pub fn right_eye_x(&self) -> i32 {
        self.cx + self.eye_dx
    }
}
