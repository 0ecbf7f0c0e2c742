use crate::error::{Error, Result};
use crate::geometry::{rotation, transform, Mat3f, Ray, Vec3f, EPS};

#[derive(Clone, Debug)]
pub struct Camera {
    pub position: Vec3f,
    orientation: Mat3f,
}

impl Camera {
    // a singular orientation could map a primary direction to zero
    pub fn new(position: Vec3f, orientation: Mat3f) -> Result<Camera> {
        if !position.iter().all(|c| c.is_finite()) {
            return Err(Error::InvalidCamera(format!(
                "position {:?} is not finite",
                position
            )));
        }
        if !orientation.iter().all(|c| c.is_finite()) || orientation.determinant().abs() < EPS {
            return Err(Error::InvalidCamera(format!(
                "orientation {:?} is singular",
                orientation
            )));
        }
        Ok(Camera {
            position,
            orientation,
        })
    }

    pub fn with_rotation(position: Vec3f, pitch: f64, yaw: f64) -> Result<Camera> {
        Camera::new(position, rotation(pitch, yaw))
    }

    pub fn primary_direction(&self, x: u32, y: u32, width: u32, height: u32) -> Vec3f {
        let ndc_x = x as f64 / (width as f64 / 2.0) - 1.0;
        let ndc_y = y as f64 / (height as f64 / 2.0) - 1.0;
        transform(&self.orientation, &Vec3f::new(ndc_x, ndc_y, 1.0))
    }

    pub fn primary_ray(&self, x: u32, y: u32, width: u32, height: u32) -> Result<Ray> {
        Ray::new(self.position, self.primary_direction(x, y, width, height))
    }
}
