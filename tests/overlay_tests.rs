//! Overlay Tests
//!
//! Tests for:
//! - Panel change tracking (check_changed / collect_redraw)
//! - Full vs partial overlay redraw inside a frame
//! - Buffered-frame countdown after a change

use glam::{Vec3, Vec4};
use kestrel::overlay::{Overlay, PanelHandle, Rect};
use kestrel::renderer::backend::{Command, Uniform, UniformValue};
use kestrel::renderer::{RecordingBackend, Renderer, RendererSettings};
use kestrel::resources::{Geometry, Material, Mesh};
use kestrel::scene::{Camera, Scene};

// ============================================================================
// Helper
// ============================================================================

fn renderer(buffered_frames: u32) -> Renderer {
    let _ = env_logger::builder().is_test(true).try_init();
    let settings = RendererSettings {
        buffered_frames,
        ..RendererSettings::default()
    };
    let mut renderer = Renderer::new(settings).unwrap();
    renderer.set_size(800, 600);
    renderer
}

fn scene_with_mesh() -> Scene {
    let mut scene = Scene::new();
    let mesh = scene.create_mesh(Mesh::new(
        Geometry::cuboid(Vec3::ONE),
        Material::standard(Vec3::ONE),
    ));
    scene.add_to_root(mesh);
    scene
}

/// Toolbar on top, 3D viewport in the middle, a small badge overlapping the
/// viewport's corner, and a status bar at the bottom.
struct Layout {
    overlay: Overlay,
    toolbar: PanelHandle,
    badge: PanelHandle,
    status: PanelHandle,
}

fn layout() -> Layout {
    let mut overlay = Overlay::new(800.0, 600.0);
    let root = overlay.root();
    let toolbar = overlay.create_panel(root, Rect::new(0.0, 0.0, 800.0, 40.0));
    let viewport = overlay.create_panel(root, Rect::new(0.0, 40.0, 800.0, 520.0));
    overlay.set_renderable(viewport, false);
    overlay.set_viewport_3d(Some(viewport));
    let badge = overlay.create_panel(root, Rect::new(760.0, 30.0, 30.0, 30.0));
    let status = overlay.create_panel(root, Rect::new(0.0, 560.0, 800.0, 40.0));
    Layout {
        overlay,
        toolbar,
        badge,
        status,
    }
}

fn panel_colors(backend: &RecordingBackend) -> Vec<Vec4> {
    backend
        .commands()
        .iter()
        .filter_map(|c| match c {
            Command::SetUniform(Uniform::PanelColor, UniformValue::Vec4(color)) => Some(*color),
            _ => None,
        })
        .collect()
}

fn camera() -> Camera {
    Camera::new_perspective(60.0, 800.0 / 600.0, 0.1, 100.0)
}

// ============================================================================
// Change Tracking
// ============================================================================

#[test]
fn new_panels_start_changed() {
    let Layout { overlay, .. } = layout();
    assert!(overlay.check_changed());
}

#[test]
fn collect_clears_every_flag() {
    let Layout {
        mut overlay,
        toolbar,
        ..
    } = layout();
    let hidden_child = overlay.create_panel(toolbar, Rect::new(0.0, 0.0, 10.0, 10.0));
    overlay.set_visible(toolbar, false);

    let mut out = Vec::new();
    overlay.collect_redraw(None, &mut out);

    assert!(!overlay.check_changed());
    assert!(!overlay.panel(hidden_child).unwrap().changed());
    assert!(out.iter().all(|d| d.handle != toolbar && d.handle != hidden_child));
}

#[test]
fn changes_to_hidden_bounded_panels_are_ignored() {
    let Layout {
        mut overlay,
        status,
        ..
    } = layout();
    let mut out = Vec::new();
    overlay.set_visible(status, false);
    overlay.collect_redraw(None, &mut out);

    overlay.set_color(status, Vec4::new(1.0, 0.0, 0.0, 1.0));
    assert!(!overlay.check_changed());

    overlay.set_visible(status, true);
    assert!(overlay.check_changed());
}

#[test]
fn partial_collect_only_queues_overlapping_panels() {
    let Layout {
        mut overlay,
        badge,
        ..
    } = layout();
    let area = overlay.viewport_rect().unwrap();

    let mut out = Vec::new();
    overlay.collect_redraw(Some(area), &mut out);
    let handles: Vec<_> = out.iter().map(|d| d.handle).collect();
    assert_eq!(handles, vec![badge]);
}

#[test]
fn removing_viewport_panel_clears_viewport() {
    let Layout { mut overlay, .. } = layout();
    let viewport = overlay.viewport_3d().unwrap();
    assert!(overlay.remove_panel(viewport));
    assert!(overlay.viewport_3d().is_none());
    assert!(!overlay.remove_panel(viewport));
}

// ============================================================================
// Frame Integration
// ============================================================================

#[test]
fn overlay_alone_clears_and_redraws_everything() {
    let mut renderer = renderer(2);
    let mut backend = RecordingBackend::new();
    let Layout { mut overlay, .. } = layout();

    assert!(
        renderer
            .render(&mut backend, None, Some(&mut overlay), &camera())
            .unwrap()
    );

    assert_eq!(backend.count(|c| matches!(c, Command::Clear(..))), 1);
    // toolbar, badge, status
    assert_eq!(backend.draw_count(), 3);
    let stats = renderer.stats();
    assert!(stats.overlay_full_redraw);
    assert!(!stats.scene_drawn);
    assert_eq!(stats.panels_drawn, 3);
}

#[test]
fn empty_overlay_without_scene_still_clears() {
    let mut renderer = renderer(2);
    let mut backend = RecordingBackend::new();
    let mut overlay = Overlay::new(800.0, 600.0);

    assert!(
        renderer
            .render(&mut backend, None, Some(&mut overlay), &camera())
            .unwrap()
    );
    assert_eq!(backend.count(|c| matches!(c, Command::Clear(..))), 1);
    assert_eq!(backend.draw_count(), 0);
}

#[test]
fn change_triggers_buffered_full_redraws_then_partial() {
    let mut renderer = renderer(2);
    let mut backend = RecordingBackend::new();
    let mut scene = scene_with_mesh();
    let Layout {
        mut overlay,
        toolbar,
        badge,
        status,
    } = layout();
    overlay.set_color(toolbar, Vec4::new(1.0, 0.0, 0.0, 1.0));
    overlay.set_color(badge, Vec4::new(0.0, 1.0, 0.0, 1.0));
    overlay.set_color(status, Vec4::new(0.0, 0.0, 1.0, 1.0));

    let mut full = Vec::new();
    let mut colors = Vec::new();
    for _ in 0..5 {
        backend.take_commands();
        renderer
            .render(&mut backend, Some(&mut scene), Some(&mut overlay), &camera())
            .unwrap();
        full.push(renderer.stats().overlay_full_redraw);
        colors.push(panel_colors(&backend));
    }

    // Change frame, two buffered frames, then partial.
    assert_eq!(full, vec![true, true, true, false, false]);
    assert_eq!(colors[0].len(), 3);
    assert_eq!(colors[2].len(), 3);
    assert_eq!(colors[3], vec![Vec4::new(0.0, 1.0, 0.0, 1.0)]);

    // A new change re-arms the countdown.
    overlay.mark_changed(status);
    backend.take_commands();
    renderer
        .render(&mut backend, Some(&mut scene), Some(&mut overlay), &camera())
        .unwrap();
    assert!(renderer.stats().overlay_full_redraw);
    assert_eq!(panel_colors(&backend).len(), 3);
}

#[test]
fn panel_program_is_compiled_once() {
    let mut renderer = renderer(0);
    let mut backend = RecordingBackend::new();
    let mut scene = scene_with_mesh();
    let Layout { mut overlay, .. } = layout();

    for _ in 0..3 {
        renderer
            .render(&mut backend, Some(&mut scene), Some(&mut overlay), &camera())
            .unwrap();
    }

    // standard + panel
    assert_eq!(renderer.cache().len(), 2);
    // unit quad + cuboid
    assert_eq!(backend.count(|c| matches!(c, Command::UploadGeometry(_))), 2);
}

#[test]
fn panels_are_scissored_to_their_clip_rect() {
    let mut renderer = renderer(0);
    let mut backend = RecordingBackend::new();
    let Layout {
        mut overlay,
        toolbar,
        ..
    } = layout();
    let clipped = overlay.create_panel(toolbar, Rect::new(780.0, 20.0, 100.0, 100.0));

    renderer
        .render(&mut backend, None, Some(&mut overlay), &camera())
        .unwrap();

    assert!(
        backend
            .commands()
            .contains(&Command::Scissor(Some(Rect::new(780.0, 20.0, 20.0, 20.0))))
    );
    assert!(overlay.panel(clipped).is_some());
}
