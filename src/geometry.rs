use nalgebra::{Matrix3, Vector3};

use crate::error::{Error, Result};

pub type Vec3f = Vector3<f64>;
pub type Mat3f = Matrix3<f64>;

pub static EPS: f64 = 0.00001;

// direction is normalized once, on construction
#[derive(Clone, Debug)]
pub struct Ray {
    pub origin: Vec3f,
    direction: Vec3f,
}

impl Ray {
    pub fn new(origin: Vec3f, direction: Vec3f) -> Result<Ray> {
        Ok(Ray {
            origin,
            direction: normalize(&direction)?,
        })
    }

    pub fn direction(&self) -> &Vec3f {
        &self.direction
    }
}

pub fn normalize(v: &Vec3f) -> Result<Vec3f> {
    if !v.iter().all(|c| c.is_finite()) {
        return Err(Error::DegenerateDirection);
    }
    v.try_normalize(f64::MIN_POSITIVE).ok_or(Error::DegenerateDirection)
}

// dot of `v` with each row of `m`
pub fn transform(m: &Mat3f, v: &Vec3f) -> Vec3f {
    m * v
}

/// Transforming by the result is transforming by `second`, then by `first`.
pub fn compose(first: &Mat3f, second: &Mat3f) -> Mat3f {
    first * second
}

// rotation about the y axis; the reference camera calls it pitch
pub fn rotation_pitch(theta: f64) -> Mat3f {
    let (sin, cos) = theta.sin_cos();
    Mat3f::new(
        cos, 0.0, sin, //
        0.0, 1.0, 0.0, //
        -sin, 0.0, cos,
    )
}

// rotation about the x axis
pub fn rotation_yaw(theta: f64) -> Mat3f {
    let (sin, cos) = theta.sin_cos();
    Mat3f::new(
        1.0, 0.0, 0.0, //
        0.0, cos, -sin, //
        0.0, sin, cos,
    )
}

pub fn rotation(pitch: f64, yaw: f64) -> Mat3f {
    compose(&rotation_pitch(pitch), &rotation_yaw(yaw))
}
