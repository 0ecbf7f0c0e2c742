//! Offline renderer for small scenes of implicit primitives, found by fixed-step
//! ray marching and lit by a single point light.

pub mod camera;
pub mod error;
pub mod geometry;
pub mod marcher;
pub mod rendering;
pub mod scene;


pub use camera::Camera;
pub use error::{Error, Result};
pub use rendering::{render_scene, render_scene_with, RenderConfig};
pub use scene::{parse_file_content, Light, Primitive, RenderJob, Scene, Shape3D};
