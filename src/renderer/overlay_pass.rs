//! Overlay redraw.
//!
//! Redraw policy, checked in order:
//!
//! | Condition | Redraw |
//! |-----------|--------|
//! | the scene pass drew nothing | clear + every panel |
//! | a relevant panel changed | every panel, then arm `buffered_frames` |
//! | frames still armed | every panel |
//! | otherwise | panels overlapping the 3D viewport |
//!
//! Every visited panel has its `changed` flag cleared, drawn or not.

use glam::Vec4;
use log::debug;

use super::Renderer;
use super::backend::{ClearFlags, DrawRange, GraphicsBackend, Uniform, UniformValue};
use crate::errors::Result;
use crate::overlay::{Overlay, Rect};
use crate::resources::geometry::Geometry;

/// Index range of [`Geometry::unit_quad`].
const QUAD_RANGE: DrawRange = DrawRange::new(0, 6);

impl Renderer {
    pub(super) fn render_overlay(
        &mut self,
        backend: &mut dyn GraphicsBackend,
        overlay: &mut Overlay,
        scene_drawn: bool,
    ) -> Result<bool> {
        let full = if !scene_drawn {
            true
        } else if overlay.check_changed() {
            self.overlay_frames = self.settings.buffered_frames;
            true
        } else if self.overlay_frames > 0 {
            self.overlay_frames -= 1;
            true
        } else {
            false
        };

        let area = if full {
            None
        } else {
            Some(overlay.viewport_rect().unwrap_or(self.screen))
        };

        self.panel_draws.clear();
        overlay.collect_redraw(area, &mut self.panel_draws);
        self.stats.overlay_full_redraw = full;

        if !scene_drawn {
            backend.set_scissor(None);
            backend.clear(
                ClearFlags::COLOR | ClearFlags::DEPTH | ClearFlags::STENCIL,
                self.settings.clear_color(),
            );
        }

        if self.panel_draws.is_empty() {
            return Ok(!scene_drawn);
        }

        self.cache
            .set_program(backend, &self.registry, &self.panel_specs)?;

        let quad = match self.panel_quad {
            Some(quad) => quad,
            None => {
                let quad = backend.upload_geometry(&Geometry::unit_quad())?;
                self.panel_quad = Some(quad);
                quad
            }
        };
        backend.bind_geometry(quad);

        for draw in &self.panel_draws {
            backend.set_scissor(Some(draw.rect));
            backend.set_uniform(
                Uniform::PanelRect,
                UniformValue::Vec4(to_ndc(draw.rect, self.screen)),
            );
            backend.set_uniform(Uniform::PanelColor, UniformValue::Vec4(draw.color));
            backend.draw(QUAD_RANGE);
        }
        backend.set_scissor(None);

        self.stats.panels_drawn = self.panel_draws.len();
        self.stats.draw_calls += self.panel_draws.len();
        debug!(
            "Overlay: {} panel(s), {} redraw",
            self.panel_draws.len(),
            if full { "full" } else { "partial" }
        );
        Ok(true)
    }
}

/// Window rectangle (top-left origin) to NDC `(x, y, width, height)` with
/// `(x, y)` the bottom-left corner.
fn to_ndc(rect: Rect, screen: Rect) -> Vec4 {
    if screen.is_empty() {
        return Vec4::ZERO;
    }
    let sx = 2.0 / screen.width;
    let sy = 2.0 / screen.height;
    Vec4::new(
        (rect.x - screen.x) * sx - 1.0,
        1.0 - (rect.bottom() - screen.y) * sy,
        rect.width * sx,
        rect.height * sy,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_screen_rect_maps_to_clip_square() {
        let screen = Rect::new(0.0, 0.0, 800.0, 600.0);
        assert_eq!(to_ndc(screen, screen), Vec4::new(-1.0, -1.0, 2.0, 2.0));
    }

    #[test]
    fn top_left_quarter() {
        let screen = Rect::new(0.0, 0.0, 800.0, 600.0);
        let ndc = to_ndc(Rect::new(0.0, 0.0, 400.0, 300.0), screen);
        assert_eq!(ndc, Vec4::new(-1.0, 0.0, 1.0, 1.0));
    }
}
