//! Built-in scenes.
//!
//! Each preset assembles its primitives, picks a camera for the requested
//! image size and builds the BVH, ready to render.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use glint_math::{DMat4, DQuat, DVec3, Point3};
use rand::RngCore;

use crate::sampling::{gen_f64, gen_range, random_vec3};
use crate::{
    Background, Bvh, Camera, CameraSettings, Checker, Color, ConstantMedium, Cuboid, Dielectric,
    DiffuseLight, HittableList, ImageTexture, Instance, Lambertian, Material, Metal, NoiseTexture,
    Primitive, Rect, Scene, SceneError, Sphere, Texture,
};

/// Texture the earth preset loads when no path is given.
pub const DEFAULT_EARTH_TEXTURE: &str = "earthmap.jpg";

const DAYLIGHT: Color = Color::new(0.70, 0.80, 1.00);

/// A named scene that can be built at any resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Preset {
    #[default]
    RandomSpheres,
    ThreeSpheres,
    Earth(PathBuf),
    PerlinSpheres,
    SimpleLight,
    SimpleBox,
    CornellBox,
    CornellSmoke,
    Showcase,
}

impl Preset {
    /// Names accepted by `from_str`.
    pub const NAMES: [&'static str; 9] = [
        "random-spheres",
        "three-spheres",
        "earth",
        "perlin-spheres",
        "simple-light",
        "simple-box",
        "cornell-box",
        "cornell-smoke",
        "showcase",
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Preset::RandomSpheres => "random-spheres",
            Preset::ThreeSpheres => "three-spheres",
            Preset::Earth(_) => "earth",
            Preset::PerlinSpheres => "perlin-spheres",
            Preset::SimpleLight => "simple-light",
            Preset::SimpleBox => "simple-box",
            Preset::CornellBox => "cornell-box",
            Preset::CornellSmoke => "cornell-smoke",
            Preset::Showcase => "showcase",
        }
    }

    /// Assemble the scene for a `width` x `height` image and build its BVH.
    ///
    /// `rng` drives both random scene content and BVH axis choices.
    pub fn build(&self, width: u32, height: u32, rng: &mut dyn RngCore) -> Result<Scene, SceneError> {
        let mut scene = match self {
            Preset::RandomSpheres => random_spheres(width, height, rng),
            Preset::ThreeSpheres => three_spheres(width, height),
            Preset::Earth(path) => earth(width, height, path.clone()),
            Preset::PerlinSpheres => perlin_spheres(width, height, rng),
            Preset::SimpleLight => simple_light(width, height, rng),
            Preset::SimpleBox => simple_box(width, height, rng),
            Preset::CornellBox => cornell_box(width, height),
            Preset::CornellSmoke => cornell_smoke(width, height),
            Preset::Showcase => showcase(width, height, rng)?,
        };
        scene.build_bvh(rng)?;
        log::info!("Built preset '{}' at {}x{}", self.name(), width, height);
        Ok(scene)
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Preset::Earth(path) => write!(f, "earth:{}", path.display()),
            other => f.write_str(other.name()),
        }
    }
}

impl FromStr for Preset {
    type Err = SceneError;

    /// Parse a preset name. `earth:<path>` selects a custom texture file.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(path) = s.strip_prefix("earth:") {
            return Ok(Preset::Earth(PathBuf::from(path)));
        }
        Ok(match s {
            "random-spheres" => Preset::RandomSpheres,
            "three-spheres" => Preset::ThreeSpheres,
            "earth" => Preset::Earth(PathBuf::from(DEFAULT_EARTH_TEXTURE)),
            "perlin-spheres" => Preset::PerlinSpheres,
            "simple-light" => Preset::SimpleLight,
            "simple-box" => Preset::SimpleBox,
            "cornell-box" => Preset::CornellBox,
            "cornell-smoke" => Preset::CornellSmoke,
            "showcase" => Preset::Showcase,
            _ => return Err(SceneError::UnknownPreset(s.to_string())),
        })
    }
}

fn camera(
    width: u32,
    height: u32,
    look_from: Point3,
    look_at: Point3,
    vfov: f64,
    aperture: f64,
) -> Camera {
    let focus_dist = (look_from - look_at).length();
    let settings = CameraSettings::new(look_from, look_at).with_lens(vfov, aperture, focus_dist);
    Camera::new(settings, width, height)
}

fn lambertian(color: Color) -> Arc<Material> {
    Arc::new(Lambertian::new(color).into())
}

fn textured(texture: &Arc<Texture>) -> Arc<Material> {
    Arc::new(Lambertian::textured(Arc::clone(texture)).into())
}

fn light(color: Color) -> Arc<Material> {
    Arc::new(DiffuseLight::new(color).into())
}

fn checker_ground() -> Arc<Material> {
    let checker = Checker::from_colors(Color::ZERO, Color::splat(0.8));
    Arc::new(Lambertian::textured(Arc::new(checker.into())).into())
}

fn marble(rng: &mut dyn RngCore) -> Arc<Texture> {
    Arc::new(NoiseTexture::new(4.0, rng).into())
}

fn rotation_y(degrees: f64) -> DQuat {
    DQuat::from_rotation_y(degrees.to_radians())
}

fn rotation_x(degrees: f64) -> DQuat {
    DQuat::from_rotation_x(degrees.to_radians())
}

/// Field of small diffuse, metal and glass spheres; the diffuse ones bounce
/// upward during the shutter.
fn random_spheres(width: u32, height: u32, rng: &mut dyn RngCore) -> Scene {
    let look_from = Point3::new(13.0, 2.0, 3.0);
    let settings = CameraSettings::new(look_from, Point3::ZERO)
        .with_lens(60.0, 0.1, 10.0)
        .with_shutter(0.0, 1.0);
    let mut scene = Scene::new(Camera::new(settings, width, height));

    scene.add(Sphere::new(Point3::new(0.0, -1000.0, 0.0), 1000.0, checker_ground()));

    for a in -11..11 {
        for b in -11..11 {
            let choose_mat = gen_f64(rng);
            let center = Point3::new(
                a as f64 + 0.9 * gen_f64(rng),
                0.2,
                b as f64 + 0.9 * gen_f64(rng),
            );
            if (center - Point3::new(4.0, 0.2, 0.0)).length() <= 0.9 {
                continue;
            }

            if choose_mat < 0.8 {
                // diffuse
                let albedo = random_vec3(rng, 0.0, 1.0) * random_vec3(rng, 0.0, 1.0);
                let center1 = center + DVec3::new(0.0, gen_range(rng, 0.0, 0.5), 0.0);
                scene.add(Sphere::moving(center, center1, 0.0, 1.0, 0.2, lambertian(albedo)));
            } else if choose_mat < 0.95 {
                // metal
                let albedo = random_vec3(rng, 0.5, 1.0);
                let fuzz = gen_range(rng, 0.0, 0.5);
                scene.add(Sphere::new(center, 0.2, Arc::new(Metal::new(albedo, fuzz).into())));
            } else {
                // glass
                scene.add(Sphere::new(center, 0.2, Arc::new(Dielectric::new(1.5).into())));
            }
        }
    }

    scene.add(Sphere::new(Point3::new(0.0, 1.0, 0.0), 1.0, Arc::new(Dielectric::new(1.5).into())));
    scene.add(Sphere::new(Point3::new(-4.0, 1.0, 0.0), 1.0, lambertian(Color::new(0.4, 0.2, 0.1))));
    scene.add(Sphere::new(
        Point3::new(4.0, 1.0, 0.0),
        1.0,
        Arc::new(Metal::new(Color::new(0.7, 0.6, 0.5), 0.0).into()),
    ));

    scene.set_background(Background::Solid(DAYLIGHT));
    scene
}

/// Diffuse, hollow glass and metal spheres on a large ground sphere.
fn three_spheres(width: u32, height: u32) -> Scene {
    let cam = camera(width, height, Point3::new(3.0, 3.0, 2.0), Point3::new(0.0, 0.0, -1.0), 60.0, 1.0);
    let mut scene = Scene::new(cam);

    let glass: Arc<Material> = Arc::new(Dielectric::new(1.5).into());
    scene.add(Sphere::new(Point3::new(0.0, -100.5, -1.0), 100.0, lambertian(Color::new(0.8, 0.8, 0.0))));
    scene.add(Sphere::new(Point3::new(0.0, 0.0, -1.0), 0.5, lambertian(Color::new(0.1, 0.2, 0.5))));
    scene.add(Sphere::new(Point3::new(-1.0, 0.0, -1.0), 0.5, Arc::clone(&glass)));
    // Negative radius: inner surface of a glass shell
    scene.add(Sphere::new(Point3::new(-1.0, 0.0, -1.0), -0.45, glass));
    scene.add(Sphere::new(
        Point3::new(1.0, 0.0, -1.0),
        0.5,
        Arc::new(Metal::new(Color::new(0.8, 0.6, 0.2), 0.0).into()),
    ));

    scene.set_background(Background::Solid(DAYLIGHT));
    scene
}

/// Single image-textured globe.
fn earth(width: u32, height: u32, texture: PathBuf) -> Scene {
    let cam = camera(width, height, Point3::new(13.0, 2.0, 3.0), Point3::ZERO, 20.0, 0.1);
    let mut scene = Scene::new(cam);

    let image = ImageTexture::load(&texture);
    if image.is_loaded() {
        log::info!("Earth texture: {}", texture.display());
    } else {
        log::warn!("Earth preset has no texture, globe will render cyan");
    }
    let surface = Arc::new(Texture::from(image));
    scene.add(Sphere::new(Point3::ZERO, 2.0, textured(&surface)));

    scene.set_background(Background::Solid(DAYLIGHT));
    scene
}

fn perlin_spheres(width: u32, height: u32, rng: &mut dyn RngCore) -> Scene {
    let cam = camera(width, height, Point3::new(13.0, 2.0, 3.0), Point3::ZERO, 20.0, 0.1);
    let mut scene = Scene::new(cam);

    let pertext = marble(rng);
    scene.add(Sphere::new(Point3::new(0.0, -1000.0, 0.0), 1000.0, textured(&pertext)));
    scene.add(Sphere::new(Point3::new(0.0, 2.0, 0.0), 2.0, textured(&pertext)));

    scene.set_background(Background::Solid(DAYLIGHT));
    scene
}

/// Marble spheres lit only by a rectangular area light.
fn simple_light(width: u32, height: u32, rng: &mut dyn RngCore) -> Scene {
    let cam = camera(width, height, Point3::new(0.0, 3.0, 20.0), Point3::new(0.0, 2.0, 0.0), 20.0, 0.1);
    let mut scene = Scene::new(cam);

    let pertext = marble(rng);
    scene.add(Sphere::new(Point3::new(0.0, -1000.0, 0.0), 1000.0, textured(&pertext)));
    scene.add(Sphere::new(Point3::new(0.0, 2.0, 0.0), 2.0, textured(&pertext)));
    scene.add(Rect::new(
        3.0,
        3.0,
        Point3::new(3.0, 2.0, 0.0),
        rotation_y(-90.0),
        light(Color::splat(4.0)),
    ));

    scene.set_background(Background::Solid(Color::new(0.01, 0.02, 0.03)));
    scene
}

/// Rotated marble slab on a checkered ground.
fn simple_box(width: u32, height: u32, rng: &mut dyn RngCore) -> Scene {
    let cam = camera(width, height, Point3::new(15.0, 15.0, 20.0), Point3::new(0.0, 2.0, 0.0), 20.0, 0.1);
    let mut scene = Scene::new(cam);

    let pertext = marble(rng);
    scene.add(Sphere::new(Point3::new(0.0, -1000.0, 0.0), 1000.0, checker_ground()));
    scene.add(Cuboid::new(
        Point3::new(0.0, 2.0, 0.0),
        rotation_y(-45.0),
        4.0,
        0.5,
        2.0,
        textured(&pertext),
    ));

    scene.set_background(Background::Solid(DAYLIGHT));
    scene
}

/// The five walls and ceiling light shared by both Cornell presets.
fn cornell_walls(scene: &mut Scene, white: &Arc<Material>) {
    let red = lambertian(Color::new(0.65, 0.05, 0.05));
    let green = lambertian(Color::new(0.12, 0.45, 0.15));
    let r90x = rotation_x(90.0);
    let r90y = rotation_y(90.0);

    scene.add(Rect::new(555.0, 555.0, Point3::new(0.0, 0.0, -555.5), DQuat::IDENTITY, Arc::clone(white)));
    scene.add(Rect::new(555.0, 555.0, Point3::new(0.0, -277.5, -277.5), r90x, Arc::clone(white)));
    scene.add(Rect::new(555.0, 555.0, Point3::new(0.0, 277.5, -277.5), r90x, Arc::clone(white)));
    scene.add(Rect::new(150.0, 150.0, Point3::new(0.0, 277.0, -277.5), r90x, light(Color::splat(15.0))));
    scene.add(Rect::new(555.0, 555.0, Point3::new(-277.5, 0.0, -277.5), r90y, red));
    scene.add(Rect::new(555.0, 555.0, Point3::new(277.5, 0.0, -277.5), r90y, green));
}

fn cornell_box(width: u32, height: u32) -> Scene {
    let cam = camera(width, height, Point3::new(500.0, 500.0, 800.0), Point3::ZERO, 40.0, 0.1);
    let mut scene = Scene::new(cam);

    let white = lambertian(Color::splat(0.73));
    let blue = lambertian(Color::new(0.12, 0.45, 0.85));
    cornell_walls(&mut scene, &white);

    scene.add(Cuboid::new(
        Point3::new(50.0, -277.5 + 75.0, -150.0),
        rotation_y(-15.0),
        150.0,
        150.0,
        150.0,
        white,
    ));
    scene.add(Cuboid::new(
        Point3::new(-100.0, -277.5 + 125.0, -400.0),
        rotation_y(15.0),
        200.0,
        250.0,
        200.0,
        blue,
    ));

    scene.set_background(Background::Solid(Color::ZERO));
    scene
}

/// Cornell box holding a block of dark smoke.
fn cornell_smoke(width: u32, height: u32) -> Scene {
    let cam = camera(width, height, Point3::new(0.0, 0.0, 800.0), Point3::ZERO, 40.0, 0.1);
    let mut scene = Scene::new(cam);

    let white = lambertian(Color::splat(0.73));
    cornell_walls(&mut scene, &white);

    let block = Cuboid::new(Point3::ZERO, DQuat::IDENTITY, 150.0, 150.0, 150.0, white);
    scene.add(ConstantMedium::from_color(Arc::new(block.into()), 0.01, Color::ZERO));

    scene.set_background(Background::Solid(Color::ZERO));
    scene
}

/// Everything at once: a field of boxes, glass, metal, marble, smoke, motion
/// blur and an instanced cluster of spheres under one area light.
fn showcase(width: u32, height: u32, rng: &mut dyn RngCore) -> Result<Scene, SceneError> {
    let look_from = Point3::new(478.0, 278.0, -600.0);
    let look_at = Point3::new(278.0, 278.0, 0.0);
    let settings = CameraSettings::new(look_from, look_at)
        .with_lens(40.0, 0.1, (look_from - look_at).length())
        .with_shutter(0.0, 1.0);
    let mut scene = Scene::new(Camera::new(settings, width, height));

    // Ground: its own hierarchy, added to the scene as one primitive
    const BOXES_PER_SIDE: usize = 20;
    let ground = lambertian(Color::new(0.48, 0.83, 0.53));
    let mut boxes = Vec::with_capacity(BOXES_PER_SIDE * BOXES_PER_SIDE);
    for i in 0..BOXES_PER_SIDE {
        for j in 0..BOXES_PER_SIDE {
            let w = 100.0;
            let h = gen_range(rng, 10.0, 150.0);
            let center = Point3::new(-1000.0 + i as f64 * w, h / 2.0, -1000.0 + j as f64 * w);
            let cuboid = Cuboid::new(center, DQuat::IDENTITY, w, h, w, Arc::clone(&ground));
            boxes.push(Arc::new(Primitive::from(cuboid)));
        }
    }
    scene.add(Bvh::new(boxes, 0.0, 1.0, rng)?);

    scene.add(Rect::new(300.0, 300.0, Point3::new(0.0, 554.0, 0.0), rotation_x(90.0), light(Color::splat(7.0))));

    scene.add(Sphere::moving(
        Point3::new(400.0, 400.0, 200.0),
        Point3::new(430.0, 400.0, 200.0),
        0.0,
        1.0,
        50.0,
        lambertian(Color::new(0.7, 0.3, 0.1)),
    ));
    scene.add(Sphere::new(Point3::new(260.0, 150.0, 45.0), 50.0, Arc::new(Dielectric::new(1.5).into())));
    scene.add(Sphere::new(
        Point3::new(0.0, 150.0, 145.0),
        50.0,
        Arc::new(Metal::new(Color::new(0.8, 0.8, 0.9), 1.0).into()),
    ));

    // Glass ball filled with blue fog
    let fog_boundary = scene.add(Sphere::new(
        Point3::new(360.0, 150.0, 145.0),
        70.0,
        Arc::new(Dielectric::new(1.5).into()),
    ));
    scene.add(ConstantMedium::from_color(fog_boundary, 0.2, Color::new(0.2, 0.4, 0.9)));

    let pertext = Arc::new(Texture::from(NoiseTexture::new(0.1, rng)));
    scene.add(Sphere::new(Point3::new(220.0, 280.0, 300.0), 80.0, textured(&pertext)));

    // Cluster of small spheres, built once and placed with an instance transform
    let white = lambertian(Color::splat(0.73));
    let mut cluster = HittableList::new();
    for _ in 0..200 {
        cluster.push(Sphere::new(random_vec3(rng, 0.0, 165.0), 10.0, Arc::clone(&white)));
    }
    let cluster = Bvh::new(cluster.objects().to_vec(), 0.0, 1.0, rng)?;
    let placement = DMat4::from_rotation_translation(rotation_y(15.0), DVec3::new(-100.0, 270.0, 395.0));
    scene.add(Instance::new(Arc::new(cluster.into()), placement));

    scene.set_background(Background::Solid(Color::ZERO));
    Ok(scene)
}
