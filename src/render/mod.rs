//! Renderable projection of validated definitions.
//!
//! Each region or locset that evaluates to `good` owns one [`Renderable`].
//! Its payload is replaced on every successful re-evaluation while its color
//! and visibility stay put; it is dropped together with its definition.

mod backend;
mod mesh;

pub use backend::{GpuHandle, HeadlessBackend, RenderBackend, RenderError};
pub use mesh::{locset_mesh, region_mesh, Instance, MeshPayload};

use serde::{Deserialize, Serialize};

/// Linear RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgba {
    /// Red.
    pub r: f32,
    /// Green.
    pub g: f32,
    /// Blue.
    pub b: f32,
    /// Alpha.
    pub a: f32,
}

impl Rgba {
    /// Color from components in `[0, 1]`.
    #[must_use]
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Color from `0xRRGGBBAA`.
    #[must_use]
    pub fn from_hex(rgba: u32) -> Self {
        let [r, g, b, a] = rgba.to_be_bytes();
        Self::new(
            f32::from(r) / 255.0,
            f32::from(g) / 255.0,
            f32::from(b) / 255.0,
            f32::from(a) / 255.0,
        )
    }
}

impl Default for Rgba {
    fn default() -> Self {
        Self::new(1.0, 1.0, 1.0, 1.0)
    }
}

/// Round-robin color source.
#[derive(Debug, Clone, Default)]
pub struct Palette {
    cursor: usize,
}

impl Palette {
    /// A palette that has already handed out `used` colors.
    #[must_use]
    pub const fn skipping(used: usize) -> Self {
        Self { cursor: used }
    }

    /// Next color of `colors`, wrapping around; white if `colors` is empty.
    pub fn next_color(&mut self, colors: &[Rgba]) -> Rgba {
        if colors.is_empty() {
            return Rgba::default();
        }
        let color = colors[self.cursor % colors.len()];
        self.cursor = self.cursor.wrapping_add(1);
        color
    }
}

/// GPU-facing projection of one definition plus its display attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct Renderable {
    /// Indices drawn per instance.
    pub count: usize,
    /// Instances drawn.
    pub instance_count: usize,
    /// Uploaded payload, if any.
    pub handle: Option<GpuHandle>,
    /// Drawn only when set.
    pub visible: bool,
    /// Draw color.
    pub color: Rgba,
}

impl Renderable {
    /// A renderable with no payload yet.
    #[must_use]
    pub const fn new(color: Rgba, visible: bool) -> Self {
        Self {
            count: 0,
            instance_count: 0,
            handle: None,
            visible,
            color,
        }
    }

    /// True if a payload is uploaded.
    #[must_use]
    pub const fn has_payload(&self) -> bool {
        self.handle.is_some()
    }

    /// Swaps in a new payload, releasing the previous handle first.
    ///
    /// An upload failure is logged and leaves the renderable empty.
    pub fn replace(&mut self, payload: &MeshPayload, backend: &mut dyn RenderBackend) {
        self.clear(backend);
        if payload.is_empty() {
            return;
        }
        match backend.upload(payload) {
            Ok(handle) => {
                self.handle = Some(handle);
                self.count = payload.count();
                self.instance_count = payload.instance_count();
            }
            Err(e) => {
                tracing::warn!(error = %e, "renderable upload failed; keeping it empty");
            }
        }
    }

    /// Releases the payload, keeping color and visibility.
    pub fn clear(&mut self, backend: &mut dyn RenderBackend) {
        if let Some(handle) = self.handle.take() {
            backend.release(handle);
        }
        self.count = 0;
        self.instance_count = 0;
    }
}
