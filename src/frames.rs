//! Conversions from the flight controller's frame convention into the
//! simulator's.
//!
//! The flight controller reports positions and velocities with the first two
//! axes swapped relative to the simulator, where 0 degree yaw points along
//! positive X. Every conversion is a plain move of components (plus one sign
//! flip for the attitude) so values are carried over bit for bit.

use nalgebra as na;

use crate::data;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub position: na::Point3<f64>,
    /// Not wrapped in `UnitQuaternion`, the snapshot starts out all zero
    pub orientation: na::Quaternion<f64>,
}

impl Default for Pose {
    fn default() -> Self {
        Self {
            position: na::Point3::origin(),
            orientation: na::Quaternion::new(0., 0., 0., 0.),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Velocity {
    pub linear: na::Vector3<f64>,
    pub angular: na::Vector3<f64>,
}

impl Default for Velocity {
    fn default() -> Self {
        Self {
            linear: na::Vector3::zeros(),
            angular: na::Vector3::zeros(),
        }
    }
}

pub fn convert_orientation(attitude: &data::Quaternion) -> na::Quaternion<f64> {
    na::Quaternion::new(-attitude.w, attitude.y, attitude.x, attitude.z)
}

pub fn convert_velocity(velocity: &data::Vector) -> na::Vector3<f64> {
    na::Vector3::new(velocity.y, velocity.x, velocity.z)
}

pub fn convert_position(position: &data::Vector) -> na::Point3<f64> {
    na::Point3::new(position.y, position.x, position.z)
}
