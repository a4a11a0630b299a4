//! Renderer port and drawing-surface handle.
//!
//! The chart computes geometry; drawing it is someone else's job. A
//! [`Renderer`] receives full geometry once per initialization and a
//! [`GeometryTransition`] per update, and decides how (or whether) to
//! animate between states. A [`Surface`] only reports its size.

use crate::geometry::{ChartGeometry, GeometryTransition};

/// Drawing surface with a queryable size.
pub trait Surface {
    /// Width in pixels.
    fn width(&self) -> u32;

    /// Height in pixels.
    fn height(&self) -> u32;
}

/// Fixed-size surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SurfaceSize {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl SurfaceSize {
    /// Create a surface size.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl Surface for SurfaceSize {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }
}

impl batuta_common::display::WithDimensions for SurfaceSize {
    fn set_dimensions(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }
}

/// Consumer of emitted chart geometry.
pub trait Renderer {
    /// Draw a chart from scratch: groups, bars, labels and gridlines.
    fn render(&mut self, geometry: &ChartGeometry);

    /// Move existing bars and replace gridlines.
    fn transition(&mut self, transition: &GeometryTransition);

    /// Drop everything drawn so far. Called before a re-initialization.
    fn clear(&mut self) {}
}

impl<R: Renderer + ?Sized> Renderer for &mut R {
    fn render(&mut self, geometry: &ChartGeometry) {
        (**self).render(geometry);
    }

    fn transition(&mut self, transition: &GeometryTransition) {
        (**self).transition(transition);
    }

    fn clear(&mut self) {
        (**self).clear();
    }
}

/// One call received by a [`RecordingRenderer`].
#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    /// [`Renderer::render`].
    Render(ChartGeometry),
    /// [`Renderer::transition`].
    Transition(GeometryTransition),
    /// [`Renderer::clear`].
    Clear,
}

/// Renderer that keeps every call it receives, in order.
///
/// Also tracks the geometry a real renderer would show after the last call.
#[derive(Debug, Clone, Default)]
pub struct RecordingRenderer {
    frames: Vec<Frame>,
    current: Option<ChartGeometry>,
}

impl RecordingRenderer {
    /// Create an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All calls so far.
    #[must_use]
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    /// Geometry on screen after the last call, if any.
    #[must_use]
    pub fn current(&self) -> Option<&ChartGeometry> {
        self.current.as_ref()
    }

    /// Transitions received, in order.
    pub fn transitions(&self) -> impl Iterator<Item = &GeometryTransition> {
        self.frames.iter().filter_map(|frame| match frame {
            Frame::Transition(transition) => Some(transition),
            _ => None,
        })
    }

    /// Number of full renders received.
    #[must_use]
    pub fn render_count(&self) -> usize {
        self.frames.iter().filter(|frame| matches!(frame, Frame::Render(_))).count()
    }
}

impl Renderer for RecordingRenderer {
    fn render(&mut self, geometry: &ChartGeometry) {
        self.frames.push(Frame::Render(geometry.clone()));
        self.current = Some(geometry.clone());
    }

    fn transition(&mut self, transition: &GeometryTransition) {
        self.frames.push(Frame::Transition(transition.clone()));
        if let Some(current) = self.current.as_mut() {
            current.apply(transition);
        }
    }

    fn clear(&mut self) {
        self.frames.push(Frame::Clear);
        self.current = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use batuta_common::display::WithDimensions;

    #[test]
    fn test_surface_size() {
        let mut size = SurfaceSize::new(640, 480);
        assert_eq!((size.width(), size.height()), (640, 480));
        size.set_dimensions(800, 600);
        assert_eq!((size.width(), size.height()), (800, 600));
    }

    #[test]
    fn test_recording_renderer_tracks_current() {
        let mut recorder = RecordingRenderer::new();
        assert!(recorder.current().is_none());

        let geometry = ChartGeometry { max_total: 4.0, ..ChartGeometry::default() };
        recorder.render(&geometry);
        recorder.transition(&GeometryTransition { max_total: 9.0, ..GeometryTransition::default() });

        assert_eq!(recorder.render_count(), 1);
        assert_eq!(recorder.transitions().count(), 1);
        assert_eq!(recorder.current().map(|g| g.max_total), Some(9.0));

        recorder.clear();
        assert!(recorder.current().is_none());
        assert_eq!(recorder.frames().last(), Some(&Frame::Clear));
    }

    #[test]
    fn test_renderer_through_mut_ref() {
        let mut recorder = RecordingRenderer::new();
        {
            let mut borrowed = &mut recorder;
            Renderer::render(&mut borrowed, &ChartGeometry::default());
        }
        assert_eq!(recorder.render_count(), 1);
    }
}
