//! Geographic coordinates on a sphere
//!
//! Latitude/longitude in degrees are mapped onto a y-up sphere: the poles sit
//! on the vertical axis and longitude 0 faces +x after the half-turn offset.

use std::f32::consts::PI;

const DEG_TO_RAD: f32 = PI / 180.0;

/// Point in globe space (y is up)
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Spin around the vertical axis
    pub fn rotate_y(self, angle: f32) -> Self {
        let (sin, cos) = angle.sin_cos();
        Self {
            x: self.x * cos + self.z * sin,
            y: self.y,
            z: -self.x * sin + self.z * cos,
        }
    }

    /// Tilt toward/away from the viewer around the horizontal axis
    pub fn rotate_x(self, angle: f32) -> Self {
        let (sin, cos) = angle.sin_cos();
        Self {
            x: self.x,
            y: self.y * cos - self.z * sin,
            z: self.y * sin + self.z * cos,
        }
    }
}

/// Map latitude/longitude (degrees) onto a sphere of the given radius.
///
/// Polar angle comes from `90 - lat`, azimuth from `lon + 180`. Input is not
/// range-checked.
#[inline]
pub fn lat_lon_to_vector3(lat: f32, lon: f32, radius: f32) -> Vec3 {
    let phi = (90.0 - lat) * DEG_TO_RAD;
    let theta = (lon + 180.0) * DEG_TO_RAD;

    Vec3::new(
        -(radius * phi.sin() * theta.cos()),
        radius * phi.cos(),
        radius * phi.sin() * theta.sin(),
    )
}
