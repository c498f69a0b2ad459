//! 2D overlay panel tree.
//!
//! The overlay is drawn on top of the 3D scene. Panels are kept in a
//! `SlotMap` owned by [`Overlay`], the same way the scene keeps its nodes;
//! the root panel covers the whole window.
//!
//! One panel may be designated as the 3D viewport: the scene pass scissors
//! to it, and when the overlay has not changed only the panels overlapping
//! it are redrawn.
//!
//! # Example
//!
//! ```rust,ignore
//! let mut overlay = Overlay::new(800.0, 600.0);
//! let toolbar = overlay.create_panel(overlay.root(), Rect::new(0.0, 0.0, 800.0, 40.0));
//! let view = overlay.create_panel(overlay.root(), Rect::new(0.0, 40.0, 800.0, 560.0));
//! overlay.set_renderable(view, false);
//! overlay.set_viewport_3d(Some(view));
//! ```

pub mod panel;
pub mod rect;

pub use panel::Panel;
pub use rect::Rect;

use glam::Vec4;
use slotmap::{SlotMap, new_key_type};

new_key_type! {
    pub struct PanelHandle;
}

/// One panel queued for drawing: absolute, clipped rectangle plus color.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanelDraw {
    pub handle: PanelHandle,
    pub rect: Rect,
    pub color: Vec4,
}

#[derive(Debug)]
pub struct Overlay {
    panels: SlotMap<PanelHandle, Panel>,
    root: PanelHandle,
    viewport_3d: Option<PanelHandle>,
}

impl Overlay {
    /// Overlay whose root covers a `width` x `height` window.
    #[must_use]
    pub fn new(width: f32, height: f32) -> Self {
        let mut panels = SlotMap::with_key();
        let mut root = Panel::new(Rect::new(0.0, 0.0, width, height));
        root.renderable = false;
        root.bounded = false;
        let root = panels.insert(root);

        Self {
            panels,
            root,
            viewport_3d: None,
        }
    }

    #[inline]
    #[must_use]
    pub fn root(&self) -> PanelHandle {
        self.root
    }

    #[inline]
    #[must_use]
    pub fn panel(&self, handle: PanelHandle) -> Option<&Panel> {
        self.panels.get(handle)
    }

    #[inline]
    #[must_use]
    pub fn panel_count(&self) -> usize {
        self.panels.len()
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.set_rect(self.root, Rect::new(0.0, 0.0, width, height));
    }

    // ====层级====

    /// Creates a panel under `parent`, with `rect` relative to it.
    pub fn create_panel(&mut self, parent: PanelHandle, rect: Rect) -> PanelHandle {
        assert!(
            self.panels.contains_key(parent),
            "create_panel: stale parent handle"
        );
        let mut panel = Panel::new(rect);
        panel.parent = Some(parent);
        let handle = self.panels.insert(panel);
        self.panels[parent].children.push(handle);
        handle
    }

    /// Removes a panel and its subtree. Returns `false` for stale handles.
    pub fn remove_panel(&mut self, handle: PanelHandle) -> bool {
        assert_ne!(handle, self.root, "cannot remove the overlay root");
        let Some(parent) = self.panels.get(handle).map(|p| p.parent) else {
            return false;
        };
        if let Some(parent) = parent
            && let Some(parent) = self.panels.get_mut(parent)
        {
            parent.children.retain(|&child| child != handle);
        }

        let mut stack = vec![handle];
        while let Some(current) = stack.pop() {
            if let Some(panel) = self.panels.remove(current) {
                stack.extend(panel.children);
            }
            if self.viewport_3d == Some(current) {
                self.viewport_3d = None;
            }
        }
        // Uncovered pixels need repainting.
        self.panels[self.root].changed = true;
        true
    }

    // ====属性====

    pub fn set_rect(&mut self, handle: PanelHandle, rect: Rect) {
        self.update(handle, |panel| panel.rect = rect);
        self.panels[self.root].changed = true;
    }

    pub fn set_color(&mut self, handle: PanelHandle, color: Vec4) {
        self.update(handle, |panel| panel.color = color);
    }

    /// Hiding a panel uncovers what is below it, so it also dirties the root.
    pub fn set_visible(&mut self, handle: PanelHandle, visible: bool) {
        self.update(handle, |panel| panel.visible = visible);
        self.panels[self.root].changed = true;
    }

    pub fn set_renderable(&mut self, handle: PanelHandle, renderable: bool) {
        self.update(handle, |panel| panel.renderable = renderable);
    }

    pub fn set_bounded(&mut self, handle: PanelHandle, bounded: bool) {
        self.update(handle, |panel| panel.bounded = bounded);
    }

    /// Flags a panel whose content changed outside the overlay's setters.
    pub fn mark_changed(&mut self, handle: PanelHandle) {
        self.update(handle, |_| {});
    }

    fn update(&mut self, handle: PanelHandle, f: impl FnOnce(&mut Panel)) {
        if let Some(panel) = self.panels.get_mut(handle) {
            f(panel);
            panel.changed = true;
        } else {
            log::warn!("Ignoring update of stale panel {handle:?}");
        }
    }

    // ====3D 视口====

    pub fn set_viewport_3d(&mut self, handle: Option<PanelHandle>) {
        self.viewport_3d = handle.filter(|h| self.panels.contains_key(*h));
    }

    #[inline]
    #[must_use]
    pub fn viewport_3d(&self) -> Option<PanelHandle> {
        self.viewport_3d
    }

    /// Window rectangle of the 3D viewport panel.
    #[must_use]
    pub fn viewport_rect(&self) -> Option<Rect> {
        self.viewport_3d.and_then(|h| self.absolute_rect(h))
    }

    /// Rectangle of `handle` in window coordinates (unclipped).
    #[must_use]
    pub fn absolute_rect(&self, handle: PanelHandle) -> Option<Rect> {
        let mut rect = self.panels.get(handle)?.rect;
        let mut parent = self.panels[handle].parent;
        while let Some(p) = parent {
            let panel = &self.panels[p];
            rect = rect.offset_by(&panel.rect);
            parent = panel.parent;
        }
        Some(rect)
    }

    // ====重绘====

    /// `true` if any changed panel could affect the picture: an unbounded
    /// one, or one that is visible and renderable.
    #[must_use]
    pub fn check_changed(&self) -> bool {
        self.check_changed_from(self.root)
    }

    fn check_changed_from(&self, handle: PanelHandle) -> bool {
        let panel = &self.panels[handle];
        if panel.changed && (!panel.bounded || (panel.visible && panel.renderable)) {
            return true;
        }
        panel
            .children
            .iter()
            .any(|&child| self.check_changed_from(child))
    }

    /// Walks the whole tree depth-first, clearing every `changed` flag, and
    /// queues the visible renderable panels. With `area` set only panels
    /// overlapping it are queued.
    pub fn collect_redraw(&mut self, area: Option<Rect>, out: &mut Vec<PanelDraw>) {
        let root = self.root;
        let root_rect = self.panels[root].rect;
        self.collect_from(root, root_rect, root_rect, true, area, out);
    }

    fn collect_from(
        &mut self,
        handle: PanelHandle,
        parent_abs: Rect,
        parent_clip: Rect,
        parent_visible: bool,
        area: Option<Rect>,
        out: &mut Vec<PanelDraw>,
    ) {
        let is_root = handle == self.root;
        let panel = &mut self.panels[handle];
        panel.changed = false;

        let abs = if is_root {
            panel.rect
        } else {
            panel.rect.offset_by(&parent_abs)
        };
        let clip = if panel.bounded {
            abs.intersection(&parent_clip).unwrap_or(Rect::new(abs.x, abs.y, 0.0, 0.0))
        } else {
            abs
        };
        let visible = parent_visible && panel.visible;

        if visible
            && panel.renderable
            && !clip.is_empty()
            && area.is_none_or(|area| clip.intersects(&area))
        {
            out.push(PanelDraw {
                handle,
                rect: clip,
                color: panel.color,
            });
        }

        // Invisible subtrees are still walked so their flags get cleared.
        for i in 0..self.panels[handle].children.len() {
            let child = self.panels[handle].children[i];
            self.collect_from(child, abs, clip, visible, area, out);
        }
    }
}
