use serde::{Deserialize, Serialize};

use crate::geometry::{Rect, Vector2};
use crate::ids::WallId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Orientation {
    Vertical,
    Horizontal,
}

/// Axis-aligned, immutable once placed. `position` is the center of the
/// wall along its thin axis; the long axis has no stored endpoint, only a
/// length.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Wall {
    pub id: WallId,
    pub position: Vector2,
    pub width: f64,
    pub height: f64,
    pub orientation: Orientation,
}

impl Wall {
    pub fn new(
        id: WallId,
        position: Vector2,
        width: f64,
        height: f64,
        orientation: Orientation,
    ) -> Self {
        Self {
            id,
            position,
            width,
            height,
            orientation,
        }
    }

    pub fn center(&self) -> Vector2 {
        self.position
    }

    pub fn top_left(&self) -> Vector2 {
        Vector2::new(
            self.position.x - self.width / 2.0,
            self.position.y - self.height / 2.0,
        )
    }

    pub fn rect(&self) -> Rect {
        Rect::from_center_size(self.position, self.width, self.height)
    }

    /// Bounding radius of the wall, used for coarse overlap rejection during
    /// generation and broadphase line-of-sight checks.
    pub fn bounding_radius(&self) -> f64 {
        ((self.width / 2.0).powi(2) + (self.height / 2.0).powi(2)).sqrt()
    }

    /// Half-extent along the wall's long axis, i.e. the patrol range for an
    /// enemy attached to it.
    pub fn long_half_extent(&self) -> f64 {
        match self.orientation {
            Orientation::Vertical => self.height / 2.0,
            Orientation::Horizontal => self.width / 2.0,
        }
    }

    /// Half-extent along the wall's thin axis (its width, `WallWidth`).
    pub fn short_half_extent(&self) -> f64 {
        match self.orientation {
            Orientation::Vertical => self.width / 2.0,
            Orientation::Horizontal => self.height / 2.0,
        }
    }

    pub fn corners_within_sight(&self, viewer: Vector2, sight_radius: f64) -> bool {
        self.rect()
            .corners()
            .iter()
            .any(|c| c.distance_to(viewer) < sight_radius)
    }
}
