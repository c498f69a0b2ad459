//! Headless Frame Example
//!
//! Builds a small lit scene with a 2D overlay and renders a few frames
//! through the recording backend, printing what reached the "GPU".
//!
//! Run with `RUST_LOG=debug` to see program compilation and overlay redraws.

use anyhow::Result;
use glam::{Vec3, Vec4};
use kestrel::prelude::*;
use kestrel::renderer::backend::Command;

fn main() -> Result<()> {
    env_logger::init();

    let mut renderer = Renderer::new(RendererSettings::default())?;
    renderer.set_size(1280, 720);
    let mut backend = RecordingBackend::new();

    // Scene
    let mut scene = Scene::new();

    let ambient = scene.create_light(Light::new_ambient(Vec3::splat(0.15), 1.0));
    scene.add_to_root(ambient);

    let sun = scene.create_light(Light::new_directional(Vec3::ONE, 1.0));
    scene.add_to_root(sun);
    scene.node(sun).set_position(5.0, 10.0, 5.0).look_at(Vec3::ZERO);

    let lamp = scene.create_light(Light::new_point(Vec3::new(1.0, 0.8, 0.6), 2.0));
    scene.add_to_root(lamp);
    scene.node(lamp).set_position(-2.0, 3.0, 1.0);

    let pivot = scene.create_node("pivot");
    scene.add_to_root(pivot);

    let cube = scene.create_mesh(
        Mesh::new(
            Geometry::cuboid(Vec3::splat(2.0)),
            Material::standard(Vec3::new(0.8, 0.2, 0.2)),
        )
        .with_name("cube"),
    );
    scene.add(pivot, cube);

    let floor = scene.create_mesh(
        Mesh::new(
            Geometry::cuboid(Vec3::new(10.0, 0.1, 10.0)),
            Material::basic(Vec3::splat(0.4)),
        )
        .with_name("floor"),
    );
    scene.add_to_root(floor);
    scene.node(floor).set_position(0.0, -1.05, 0.0);

    let speaker = scene.create_emitter(AudioEmitter::new(0.8));
    scene.add(pivot, speaker);
    scene.node(speaker).set_position(0.0, 1.5, 0.0);

    let mut camera = Camera::new_perspective(45.0, 1280.0 / 720.0, 0.1, 100.0);
    camera.look_at(Vec3::new(0.0, 3.0, 10.0), Vec3::ZERO, Vec3::Y);

    // Overlay: toolbar, 3D viewport, status bar
    let mut overlay = Overlay::new(1280.0, 720.0);
    let root = overlay.root();
    let toolbar = overlay.create_panel(root, Rect::new(0.0, 0.0, 1280.0, 48.0));
    overlay.set_color(toolbar, Vec4::new(0.2, 0.2, 0.25, 1.0));
    let viewport = overlay.create_panel(root, Rect::new(0.0, 48.0, 1280.0, 640.0));
    overlay.set_renderable(viewport, false);
    overlay.set_viewport_3d(Some(viewport));
    let status = overlay.create_panel(root, Rect::new(0.0, 688.0, 1280.0, 32.0));
    overlay.set_color(status, Vec4::new(0.1, 0.1, 0.1, 1.0));

    for frame in 0..4 {
        scene.node(pivot).rotate_y(0.25);
        if frame == 2 {
            scene.node(lamp).set_visible(false);
        }

        backend.take_commands();
        let drawn = renderer.render(&mut backend, Some(&mut scene), Some(&mut overlay), &camera)?;
        let stats = renderer.stats();

        println!(
            "frame {frame}: drawn={drawn} lights(amb={} dir={} point={}) draws={} programs={} overlay={}",
            stats.ambient_lights,
            stats.dir_lights,
            stats.point_lights,
            stats.draw_calls,
            stats.programs_compiled,
            if stats.overlay_full_redraw { "full" } else { "partial" },
        );
        println!(
            "         {} commands, {} program binds",
            backend.commands().len(),
            backend.count(|c| matches!(c, Command::UseProgram(_))),
        );
    }

    if let Some(emitter) = scene.get_emitter(speaker) {
        println!(
            "speaker at {:?} facing {:?}",
            emitter.position(),
            emitter.direction()
        );
    }

    let released = scene.dispose(pivot);
    renderer.release_geometries(&mut backend, &released);
    println!("disposed pivot, released {} geometries", released.len());

    Ok(())
}
