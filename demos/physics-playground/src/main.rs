//! Physics playground
//!
//! Builds a floor, drops a ball, a square and a triangle onto it on a short
//! timeline, and writes every frame as a PNG.
//!
//! Usage: `physics-playground [config.json] [output prefix]`

use std::error::Error;
use std::{env, fs};

use glam::Vec2;
use px_scene::{
    circle, rectangle, square, triangle, Color, Easing, Effect, LogSink, MassClass, Material,
    Scene, SceneConfig, SceneRunner, Sequence,
};

const FRAMES: u32 = 180;
const FRAME_DT: f32 = 1.0 / 60.0;

fn load_config(path: Option<&String>) -> Result<SceneConfig, Box<dyn Error>> {
    match path {
        Some(path) => {
            log::info!("Loading scene config from {path}");
            Ok(SceneConfig::from_json(&fs::read_to_string(path)?)?)
        }
        None => Ok(SceneConfig::default()),
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let args: Vec<String> = env::args().skip(1).collect();
    let config = load_config(args.first())?;
    let prefix = args
        .get(1)
        .cloned()
        .unwrap_or_else(|| "frames/playground".to_string());

    let mut scene = Scene::with_diagnostics(config, LogSink);

    let floor = scene.insert(rectangle(
        Vec2::new(0.0, -2.5),
        6.0,
        0.2,
        MassClass::Infinite,
        Color::LIGHT_GRAY,
    ));
    scene.fit_to_object(floor);

    let ball = scene.spawn(circle(Vec2::ZERO, 0.2, MassClass::Dynamic, Color::RED));
    let crate_box = scene.spawn(square(Vec2::new(-1.5, 1.0), 0.5, MassClass::Dynamic, Color::BLUE));
    let wedge = scene.spawn(triangle(Vec2::new(1.5, 1.5), 0.6, MassClass::Dynamic, Color::GREEN));

    scene.insert(circle(Vec2::new(2.5, -2.2), 0.2, MassClass::Fixed, Color::BLACK));
    scene.set_material(ball, Material::default().with_restitution(0.6));

    let timeline = Sequence::new()
        .add_with_effect(
            ball,
            0.0,
            Effect::move_in(ball, Vec2::new(0.0, 1.0), 0.5).with_easing(Easing::CubicOut),
        )
        .wait_seconds(0.5)
        .add(crate_box)
        .wait_seconds(0.5)
        .add(wedge)
        .rotate_after(wedge, 0.4, 0.25)
        .wait_seconds(1.0)
        .reposition_with_effect(
            crate_box,
            0.0,
            Effect::shift(crate_box, Vec2::new(-0.5, 1.5), 0.3).with_easing(Easing::QuadInOut),
        );
    scene.play(timeline);

    let mut runner = SceneRunner::headless(scene)?;
    let written = runner.export_frames(FRAMES, FRAME_DT, &prefix)?;

    let scene = runner.scene();
    if let Some(position) = scene.position(ball) {
        log::info!("Ball settled at ({:.3}, {:.3})", position.x, position.y);
    }
    println!("wrote {} frames with prefix {prefix}", written.len());
    Ok(())
}
