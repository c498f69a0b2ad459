use glam::Vec4;

use super::{PanelHandle, Rect};

/// One rectangle of the 2D overlay.
///
/// The rectangle is relative to the parent panel. Every mutation through
/// [`Overlay`](super::Overlay) sets the `changed` flag; the renderer clears
/// it when it visits the panel during a redraw.
#[derive(Debug, Clone)]
pub struct Panel {
    pub(crate) parent: Option<PanelHandle>,
    pub(crate) children: Vec<PanelHandle>,

    pub(crate) rect: Rect,
    pub(crate) color: Vec4,
    pub(crate) visible: bool,
    /// Containers that only group children are not drawn.
    pub(crate) renderable: bool,
    /// Clipped to the parent's rectangle.
    pub(crate) bounded: bool,
    pub(crate) changed: bool,
}

impl Panel {
    pub(crate) fn new(rect: Rect) -> Self {
        Self {
            parent: None,
            children: Vec::new(),
            rect,
            color: Vec4::ONE,
            visible: true,
            renderable: true,
            bounded: true,
            changed: true,
        }
    }

    #[inline]
    #[must_use]
    pub fn parent(&self) -> Option<PanelHandle> {
        self.parent
    }

    #[inline]
    #[must_use]
    pub fn children(&self) -> &[PanelHandle] {
        &self.children
    }

    #[inline]
    #[must_use]
    pub fn rect(&self) -> Rect {
        self.rect
    }

    #[inline]
    #[must_use]
    pub fn color(&self) -> Vec4 {
        self.color
    }

    #[inline]
    #[must_use]
    pub fn visible(&self) -> bool {
        self.visible
    }

    #[inline]
    #[must_use]
    pub fn renderable(&self) -> bool {
        self.renderable
    }

    #[inline]
    #[must_use]
    pub fn bounded(&self) -> bool {
        self.bounded
    }

    #[inline]
    #[must_use]
    pub fn changed(&self) -> bool {
        self.changed
    }
}
