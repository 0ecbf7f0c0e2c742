use image::Rgba;

use crate::camera::Camera;
use crate::error::{Error, Result};
use crate::geometry::{rotation, Vec3f};
use crate::rendering::RenderConfig;

pub type Color = Rgba<u8>;

#[derive(Clone, Debug, PartialEq)]
pub enum Shape3D {
    Ellipsoid { centre: Vec3f, radii: Vec3f },
    Cuboid { position: Vec3f, size: Vec3f },
}

impl Shape3D {
    // surfaces are outside for both shapes
    pub fn contains(&self, point: &Vec3f) -> bool {
        match self {
            Shape3D::Ellipsoid { centre, radii } => {
                let local = (point - centre).component_div(radii);
                local.norm_squared() < 1.0
            }
            Shape3D::Cuboid { position, size } => (0..3).all(|axis| {
                position[axis] < point[axis] && point[axis] < position[axis] + size[axis]
            }),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Primitive {
    pub shape: Shape3D,
    color: Color,
}

impl Primitive {
    pub fn new(shape: Shape3D, color: Color) -> Result<Primitive> {
        match &shape {
            Shape3D::Ellipsoid { centre, radii } => {
                if !radii.iter().all(|r| r.is_finite() && *r != 0.0)
                    || !centre.iter().all(|c| c.is_finite())
                {
                    return Err(Error::InvalidEllipsoid { radii: *radii });
                }
            }
            Shape3D::Cuboid { position, size } => {
                if !size.iter().all(|s| s.is_finite() && *s > 0.0)
                    || !position.iter().all(|c| c.is_finite())
                {
                    return Err(Error::InvalidCuboid { size: *size });
                }
            }
        }
        Ok(Primitive { shape, color })
    }

    pub fn ellipsoid(centre: Vec3f, radii: Vec3f, color: Color) -> Result<Primitive> {
        Primitive::new(Shape3D::Ellipsoid { centre, radii }, color)
    }

    pub fn sphere(centre: Vec3f, radius: f64, color: Color) -> Result<Primitive> {
        Primitive::ellipsoid(centre, Vec3f::repeat(radius), color)
    }

    pub fn cuboid(position: Vec3f, size: Vec3f, color: Color) -> Result<Primitive> {
        Primitive::new(Shape3D::Cuboid { position, size }, color)
    }

    pub fn contains(&self, point: &Vec3f) -> bool {
        self.shape.contains(point)
    }

    pub fn surface_color(&self) -> Color {
        self.color
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Light {
    pub position: Vec3f,
}

#[derive(Clone, Debug)]
pub struct Scene {
    // earlier entries win wherever primitives overlap
    pub primitives: Vec<Primitive>,
    pub light: Light,
}

impl Scene {
    pub fn new(light: Light) -> Scene {
        Scene {
            primitives: vec![],
            light,
        }
    }

    pub fn with_primitive(mut self, primitive: Primitive) -> Scene {
        self.primitives.push(primitive);
        self
    }
}

#[derive(Clone, Debug)]
pub struct RenderJob {
    pub scene: Scene,
    pub camera: Camera,
    pub config: RenderConfig,
}

pub const REFERENCE_CAMERA_POSITION: [f64; 3] = [5.0, 6.0, -6.0];
pub const REFERENCE_CAMERA_PITCH: f64 = -std::f64::consts::PI / 6.0;
pub const REFERENCE_LIGHT_POSITION: [f64; 3] = [0.0, 0.0, -3.0];

pub const REFERENCE_SCENE: &str = include_str!("../scenes/reference.scene");

enum PendingShape {
    Ellipsoid(Vec3f),
    Cuboid(Vec3f),
}

struct PendingPrimitive {
    line: usize,
    shape: Option<PendingShape>,
    position: Vec3f,
    color: Color,
}

impl PendingPrimitive {
    fn new(line: usize) -> PendingPrimitive {
        PendingPrimitive {
            line,
            shape: None,
            position: Vec3f::zeros(),
            color: Rgba([255, 255, 255, 255]),
        }
    }

    fn build(self) -> Result<Primitive> {
        let built = match self.shape {
            Some(PendingShape::Ellipsoid(radii)) => {
                Primitive::ellipsoid(self.position, radii, self.color)
            }
            Some(PendingShape::Cuboid(size)) => Primitive::cuboid(self.position, size, self.color),
            None => {
                return Err(Error::Parse {
                    line: self.line,
                    message: "primitive has no shape (expected ELLIPSOID or BOX)".to_string(),
                })
            }
        };
        built.map_err(|e| Error::Parse {
            line: self.line,
            message: e.to_string(),
        })
    }
}

fn parse_error(line: usize, message: impl Into<String>) -> Error {
    Error::Parse {
        line,
        message: message.into(),
    }
}

fn pending<'a>(
    current: &'a mut Option<PendingPrimitive>,
    line: usize,
    command: &str,
) -> Result<&'a mut PendingPrimitive> {
    current
        .as_mut()
        .ok_or_else(|| parse_error(line, format!("{} before NEW_PRIMITIVE", command)))
}

fn parse_args<T: std::str::FromStr>(
    line: usize,
    command: &str,
    args: &[&str],
    count: usize,
) -> Result<Vec<T>> {
    if args.len() != count {
        return Err(parse_error(
            line,
            format!("{} expects {} arguments, got {}", command, count, args.len()),
        ));
    }
    args.iter()
        .map(|token| {
            token
                .parse::<T>()
                .map_err(|_| parse_error(line, format!("{}: cannot parse {:?}", command, token)))
        })
        .collect()
}

fn parse_vector(line: usize, command: &str, args: &[&str]) -> Result<Vec3f> {
    let v = parse_args::<f64>(line, command, args, 3)?;
    Ok(Vec3f::new(v[0], v[1], v[2]))
}

fn parse_color(line: usize, command: &str, args: &[&str]) -> Result<Color> {
    let c = parse_args::<u8>(line, command, args, 4)?;
    Ok(Rgba([c[0], c[1], c[2], c[3]]))
}

fn parse_scalar<T: std::str::FromStr>(line: usize, command: &str, args: &[&str]) -> Result<T> {
    Ok(parse_args::<T>(line, command, args, 1)?.remove(0))
}

/// Parses a line-oriented scene description. Values that are not given keep the
/// reference configuration; see `scenes/reference.scene` for the format.
pub fn parse_file_content(content: &str) -> Result<RenderJob> {
    let mut config = RenderConfig::default();
    let mut camera_position = Vec3f::from(REFERENCE_CAMERA_POSITION);
    let mut camera_rotation = (REFERENCE_CAMERA_PITCH, 0.0);
    let mut light = Light {
        position: Vec3f::from(REFERENCE_LIGHT_POSITION),
    };
    let mut primitives = vec![];
    let mut current_primitive: Option<PendingPrimitive> = None;

    for (index, raw_line) in content.lines().enumerate() {
        let line = index + 1;
        let trimmed = raw_line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let tokens: Vec<&str> = trimmed.split_whitespace().collect();
        let (command, args) = (tokens[0], &tokens[1..]);

        match command {
            "DIMENSIONS" => {
                let dims = parse_args::<u32>(line, command, args, 2)?;
                config.width = dims[0];
                config.height = dims[1];
            }
            "BG_COLOR" => config.sky_color = parse_color(line, command, args)?,
            "CAMERA_POSITION" => camera_position = parse_vector(line, command, args)?,
            "CAMERA_ROTATION" => {
                let angles = parse_args::<f64>(line, command, args, 2)?;
                camera_rotation = (angles[0], angles[1]);
            }
            "STEP" => config.step = parse_scalar(line, command, args)?,
            "SHADOW_STEP_MULTIPLIER" => {
                config.shadow_step_multiplier = parse_scalar(line, command, args)?
            }
            "DARK_FACTOR" => config.dark_factor = parse_scalar(line, command, args)?,
            "MAX_DISTANCE" => config.max_distance = parse_scalar(line, command, args)?,
            "LIGHT_POSITION" => light.position = parse_vector(line, command, args)?,
            "NEW_PRIMITIVE" => {
                if let Some(finished) = current_primitive.take() {
                    primitives.push(finished.build()?);
                }
                current_primitive = Some(PendingPrimitive::new(line));
            }
            "ELLIPSOID" => {
                let radii = parse_vector(line, command, args)?;
                pending(&mut current_primitive, line, command)?.shape =
                    Some(PendingShape::Ellipsoid(radii));
            }
            "BOX" => {
                let size = parse_vector(line, command, args)?;
                pending(&mut current_primitive, line, command)?.shape =
                    Some(PendingShape::Cuboid(size));
            }
            "POSITION" => {
                let position = parse_vector(line, command, args)?;
                pending(&mut current_primitive, line, command)?.position = position;
            }
            "COLOR" => {
                let color = parse_color(line, command, args)?;
                pending(&mut current_primitive, line, command)?.color = color;
            }
            _ => {
                log::warn!("line {}: ignoring unknown command {:?}", line, command);
            }
        }
    }
    if let Some(finished) = current_primitive {
        primitives.push(finished.build()?);
    }

    config.validate()?;
    let camera = Camera::new(
        camera_position,
        rotation(camera_rotation.0, camera_rotation.1),
    )?;
    log::debug!(
        "parsed scene with {} primitives, light at {:?}",
        primitives.len(),
        light.position
    );
    Ok(RenderJob {
        scene: Scene { primitives, light },
        camera,
        config,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_scene_parses() {
        let job = parse_file_content(REFERENCE_SCENE).unwrap();
        assert_eq!(job.config, RenderConfig::default());
        assert_eq!(job.scene.primitives.len(), 2);
        assert_eq!(
            job.scene.primitives[0],
            Primitive::cuboid(
                Vec3f::new(2.0, 0.0, 2.0),
                Vec3f::new(2.0, 2.0, 5.0),
                Rgba([0, 255, 0, 255])
            )
            .unwrap()
        );
        assert_eq!(
            job.scene.primitives[1].shape,
            Shape3D::Ellipsoid {
                centre: Vec3f::new(0.0, 1.0, 0.0),
                radii: Vec3f::new(1.0, 1.0, 2.0),
            }
        );
        assert_eq!(job.scene.light.position, Vec3f::new(0.0, 0.0, -3.0));
        assert_eq!(job.camera.position, Vec3f::new(5.0, 6.0, -6.0));
    }

    #[test]
    fn test_defaults_when_empty() {
        let job = parse_file_content("# nothing here\n\n").unwrap();
        assert!(job.scene.primitives.is_empty());
        assert_eq!(job.config, RenderConfig::default());
    }

    #[test]
    fn test_overrides() {
        let job = parse_file_content(
            "DIMENSIONS 64 32\nSTEP 0.05\nDARK_FACTOR 2\nBG_COLOR 1 2 3 4\nSOMETHING_ELSE 1\n",
        )
        .unwrap();
        assert_eq!(job.config.width, 64);
        assert_eq!(job.config.height, 32);
        assert_eq!(job.config.step, 0.05);
        assert_eq!(job.config.dark_factor, 2);
        assert_eq!(job.config.sky_color, Rgba([1, 2, 3, 4]));
    }

    #[test]
    fn test_property_before_primitive() {
        match parse_file_content("DIMENSIONS 10 10\nCOLOR 1 2 3 4\n") {
            Err(Error::Parse { line, .. }) => assert_eq!(line, 2),
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn test_primitive_without_shape() {
        match parse_file_content("NEW_PRIMITIVE\nPOSITION 0 0 0\nNEW_PRIMITIVE\nBOX 1 1 1\n") {
            Err(Error::Parse { line, .. }) => assert_eq!(line, 1),
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn test_bad_arguments() {
        assert!(matches!(
            parse_file_content("STEP fast"),
            Err(Error::Parse { line: 1, .. })
        ));
        assert!(matches!(
            parse_file_content("\nLIGHT_POSITION 1 2"),
            Err(Error::Parse { line: 2, .. })
        ));
        assert!(matches!(
            parse_file_content("NEW_PRIMITIVE\nELLIPSOID 1 0 1"),
            Err(Error::Parse { line: 1, .. })
        ));
    }

    #[test]
    fn test_invalid_config_rejected() {
        assert!(matches!(
            parse_file_content("STEP 0"),
            Err(Error::InvalidConfig(_))
        ));
    }
}
