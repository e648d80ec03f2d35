// Orthographic camera state and the world-space rectangle it can see.

use crate::config::CameraConfig;
use cgmath::{InnerSpace, Quaternion, Rad, Rotation, Rotation3, Vector3};

/// Axis-aligned rectangle in world space, closed on every side.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Bounds {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

impl Bounds {
    pub fn new(min_x: f64, max_x: f64, min_y: f64, max_y: f64) -> Bounds {
        Bounds {
            min_x,
            max_x,
            min_y,
            max_y,
        }
    }

    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }
}

#[derive(Clone, Debug)]
pub struct Camera {
    /// z is carried for the renderer and ignored by the simulation.
    pub position: Vector3<f64>,
    /// Roll about the view axis, radians.
    pub rotation: f64,
    pub left: f64,
    pub right: f64,
    pub top: f64,
    pub bottom: f64,
    pub zoom: f64,
}

impl Camera {
    pub fn new(half_width: f64, half_height: f64) -> Camera {
        Camera {
            position: Vector3::new(0.0, 0.0, 0.0),
            rotation: 0.0,
            left: -half_width,
            right: half_width,
            top: half_height,
            bottom: -half_height,
            zoom: 1.0,
        }
    }

    pub fn from_config(config: &CameraConfig) -> Camera {
        let mut camera = Camera::new(config.half_width, config.half_height);
        camera.zoom = config.zoom;
        camera
    }

    pub fn orientation(&self) -> Quaternion<f64> {
        Quaternion::from_angle_z(Rad(self.rotation))
    }

    pub fn half_extents(&self) -> (f64, f64) {
        (
            (self.right - self.left) / 2.0 / self.zoom,
            (self.top - self.bottom) / 2.0 / self.zoom,
        )
    }

    pub fn look_at(&mut self, x: f64, y: f64) {
        self.position.x = x;
        self.position.y = y;
    }

    /// Bounding box of the rotated viewport. When the camera is rolled this
    /// is larger than the viewport itself, which keeps particles alive in the
    /// corners of the screen.
    pub fn visible_bounds(&self) -> Bounds {
        let orientation = self.orientation();
        let right = orientation.rotate_vector(Vector3::unit_x()).normalize();
        let up = orientation.rotate_vector(Vector3::unit_y()).normalize();

        let (half_width, half_height) = self.half_extents();
        let offset_right = right * half_width;
        let offset_up = up * half_height;

        let corners = [
            self.position + offset_right + offset_up,
            self.position - offset_right + offset_up,
            self.position - offset_right - offset_up,
            self.position + offset_right - offset_up,
        ];

        let mut bounds = Bounds::new(
            f64::INFINITY,
            f64::NEG_INFINITY,
            f64::INFINITY,
            f64::NEG_INFINITY,
        );
        for corner in corners.iter() {
            bounds.min_x = bounds.min_x.min(corner.x);
            bounds.max_x = bounds.max_x.max(corner.x);
            bounds.min_y = bounds.min_y.min(corner.y);
            bounds.max_y = bounds.max_y.max(corner.y);
        }
        bounds
    }
}
