//! Renderer Boundary
//!
//! The renderer is an external producer of per-frame vertex and color data
//! behind an opaque native handle. This module only models its lifecycle:
//! the handle is acquired when a [`Renderer`] is constructed and released
//! exactly once when it is dropped.

use crate::error::Result;

/// Floats per vertex in [`FrameData::coords`] (x, y, z).
pub const COORDS_PER_VERTEX: usize = 3;

/// Floats per vertex in [`FrameData::colors`] (r, g, b, a).
pub const COLOR_COMPONENTS: usize = 4;

/// Opaque handle returned by the native constructor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RawHandle(pub u64);

/// One frame pulled from the renderer: `count` vertices with parallel flat
/// coordinate and color arrays.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameData {
    pub count: usize,
    pub coords: Vec<f32>,
    pub colors: Vec<f32>,
}

impl FrameData {
    /// Clamps the frame to at most `max_vertices` vertices, truncating both
    /// arrays to match the clamped count.
    pub fn clamp(mut self, max_vertices: usize) -> Self {
        let available = self
            .count
            .min(self.coords.len() / COORDS_PER_VERTEX)
            .min(self.colors.len() / COLOR_COMPONENTS);
        self.count = available.min(max_vertices);
        self.coords.truncate(self.count * COORDS_PER_VERTEX);
        self.colors.truncate(self.count * COLOR_COMPONENTS);
        self
    }
}

/// Native renderer entry points.
pub trait RendererBackend: Send {
    fn create(&mut self) -> Result<RawHandle>;

    /// Releases the handle. Called exactly once per successful `create`.
    fn destroy(&mut self, handle: RawHandle);

    fn set_screen_size(&mut self, handle: RawHandle, width: u32, height: u32);

    fn start(&mut self, handle: RawHandle);

    fn stop(&mut self, handle: RawHandle);

    fn render_data(&mut self, handle: RawHandle, max_vertices: usize) -> FrameData;
}

/// Scoped owner of a native renderer handle.
pub struct Renderer<B: RendererBackend> {
    backend: B,
    handle: RawHandle,
    running: bool,
}

impl<B: RendererBackend> Renderer<B> {
    pub fn new(mut backend: B) -> Result<Self> {
        let handle = backend.create()?;
        Ok(Self {
            backend,
            handle,
            running: false,
        })
    }

    pub fn handle(&self) -> RawHandle {
        self.handle
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn set_screen_size(&mut self, width: u32, height: u32) {
        self.backend.set_screen_size(self.handle, width, height);
    }

    pub fn start(&mut self) {
        if !self.running {
            self.backend.start(self.handle);
            self.running = true;
        }
    }

    pub fn stop(&mut self) {
        if self.running {
            self.backend.stop(self.handle);
            self.running = false;
        }
    }

    /// Pulls the current frame, never returning more than `max_vertices`.
    pub fn frame(&mut self, max_vertices: usize) -> FrameData {
        self.backend
            .render_data(self.handle, max_vertices)
            .clamp(max_vertices)
    }
}

impl<B: RendererBackend> Drop for Renderer<B> {
    fn drop(&mut self) {
        self.stop();
        self.backend.destroy(self.handle);
    }
}
