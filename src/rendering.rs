use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use image::{Rgba, RgbaImage};
use indicatif::{ParallelProgressIterator, ProgressBar};
use rayon::prelude::*;

use crate::camera::Camera;
use crate::error::{Error, Result};
use crate::geometry::{Ray, Vec3f};
use crate::marcher::{march, step_count, MAX_MARCH_STEPS};
use crate::scene::{Color, Scene};

const CHANNELS: usize = 4;
// 8192 x 8192
pub const MAX_PIXELS: u64 = 1 << 26;

#[derive(Clone, Debug, PartialEq)]
pub struct RenderConfig {
    pub width: u32,
    pub height: u32,
    pub step: f64,
    // first shadow increment is step * shadow_step_multiplier
    pub shadow_step_multiplier: f64,
    pub dark_factor: u8,
    pub sky_color: Color,
    pub max_distance: f64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        RenderConfig {
            width: 200,
            height: 200,
            step: 0.01,
            shadow_step_multiplier: 10.0,
            dark_factor: 3,
            sky_color: Rgba([0, 255, 255, 255]),
            max_distance: 50.0,
        }
    }
}

fn positive(name: &str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(Error::InvalidConfig(format!(
            "{} must be finite and positive, got {}",
            name, value
        )))
    }
}

impl RenderConfig {
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(Error::InvalidConfig(format!(
                "image dimensions {}x{} must be non-zero",
                self.width, self.height
            )));
        }
        if self.width as u64 * self.height as u64 > MAX_PIXELS {
            return Err(Error::InvalidConfig(format!(
                "image dimensions {}x{} exceed {} pixels",
                self.width, self.height, MAX_PIXELS
            )));
        }
        positive("step", self.step)?;
        positive("shadow step multiplier", self.shadow_step_multiplier)?;
        positive("max distance", self.max_distance)?;
        for initial_step in [self.step, self.shadow_initial_step()] {
            if step_count(self.max_distance, self.step, initial_step).is_none() {
                return Err(Error::InvalidConfig(format!(
                    "max distance {} with step {} needs more than {} samples per ray",
                    self.max_distance, self.step, MAX_MARCH_STEPS
                )));
            }
        }
        if self.dark_factor == 0 {
            return Err(Error::InvalidConfig(
                "dark factor must be non-zero".to_string(),
            ));
        }
        Ok(())
    }

    pub fn shadow_initial_step(&self) -> f64 {
        self.step * self.shadow_step_multiplier
    }
}

pub fn darken(color: Color, dark_factor: u8) -> Color {
    let [r, g, b, a] = color.0;
    Rgba([r / dark_factor, g / dark_factor, b / dark_factor, a])
}

// the shadow ray uses the full march budget, like the primary one
pub fn is_shadowed(scene: &Scene, point: &Vec3f, config: &RenderConfig) -> bool {
    match Ray::new(*point, scene.light.position - point) {
        Ok(shadow_ray) => march(
            scene,
            &shadow_ray,
            config.max_distance,
            config.step,
            config.shadow_initial_step(),
        )
        .is_some(),
        // the sample sits on the light itself
        Err(_) => false,
    }
}

pub fn shade_pixel(
    scene: &Scene,
    camera: &Camera,
    config: &RenderConfig,
    x: u32,
    y: u32,
) -> Result<Color> {
    let ray = camera.primary_ray(x, y, config.width, config.height)?;
    match march(scene, &ray, config.max_distance, config.step, config.step) {
        Some(hit) => {
            let color = hit.primitive.surface_color();
            if is_shadowed(scene, &hit.position, config) {
                Ok(darken(color, config.dark_factor))
            } else {
                Ok(color)
            }
        }
        None => Ok(config.sky_color),
    }
}

pub fn render_scene(scene: &Scene, camera: &Camera, config: &RenderConfig) -> Result<RgbaImage> {
    render_scene_with(
        scene,
        camera,
        config,
        &ProgressBar::hidden(),
        &AtomicBool::new(false),
    )
}

/// Renders rows in parallel, one row per task. `cancel` is checked before every row.
/// Pixel `(x, y)` of the result is the pixel computed for those coordinates, with no flip.
pub fn render_scene_with(
    scene: &Scene,
    camera: &Camera,
    config: &RenderConfig,
    progress: &ProgressBar,
    cancel: &AtomicBool,
) -> Result<RgbaImage> {
    config.validate()?;
    let row_len = config.width as usize * CHANNELS;
    let mut buffer = vec![0u8; row_len * config.height as usize];

    log::info!(
        "rendering {}x{} with {} primitives, step {}",
        config.width,
        config.height,
        scene.primitives.len(),
        config.step
    );
    let now = Instant::now();
    progress.set_length(config.height as u64);

    buffer
        .par_chunks_mut(row_len)
        .enumerate()
        .progress_with(progress.clone())
        .try_for_each(|(y, row)| {
            if cancel.load(Ordering::Relaxed) {
                return Err(Error::Cancelled);
            }
            for (x, pixel) in row.chunks_exact_mut(CHANNELS).enumerate() {
                let color = shade_pixel(scene, camera, config, x as u32, y as u32)?;
                pixel.copy_from_slice(&color.0);
            }
            Ok(())
        })?;
    progress.finish();
    log::info!("render finished in {:.2?}", now.elapsed());

    RgbaImage::from_raw(config.width, config.height, buffer).ok_or_else(|| {
        Error::InvalidConfig("pixel buffer does not match the image dimensions".to_string())
    })
}
