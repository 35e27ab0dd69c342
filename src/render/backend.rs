//! GPU boundary.

use std::collections::HashMap;
use std::fmt;

use thiserror::Error;

use crate::render::mesh::MeshPayload;

/// Errors raised by a render backend.
#[derive(Debug, Clone, Error)]
pub enum RenderError {
    #[error("Upload failed: {0}")]
    Upload(String),

    #[error("Shader program unavailable: {0}")]
    Program(String),
}

/// Opaque handle to uploaded geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GpuHandle(u64);

impl GpuHandle {
    /// Wraps a backend-specific handle value.
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Backend-specific handle value.
    #[must_use]
    pub const fn raw(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for GpuHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "gpu:{}", self.0)
    }
}

/// Uploads mesh payloads and releases their handles.
pub trait RenderBackend {
    /// Upload `payload` and return a handle owning the GPU resources.
    ///
    /// # Errors
    /// Any backend failure; the caller logs it and keeps no payload.
    fn upload(&mut self, payload: &MeshPayload) -> Result<GpuHandle, RenderError>;

    /// Free everything owned by `handle`.
    fn release(&mut self, handle: GpuHandle);
}

/// In-memory backend that only tracks live handles.
#[derive(Debug, Default)]
pub struct HeadlessBackend {
    next: u64,
    live: HashMap<GpuHandle, (usize, usize)>,
    failure: Option<String>,
}

impl HeadlessBackend {
    /// Backend with no live handles.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every upload fail with `reason` until cleared with `None`.
    pub fn set_failure(&mut self, reason: Option<String>) {
        self.failure = reason;
    }

    /// Number of handles uploaded and not yet released.
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    /// `(vertex count, index count)` of a live handle.
    #[must_use]
    pub fn sizes(&self, handle: GpuHandle) -> Option<(usize, usize)> {
        self.live.get(&handle).copied()
    }
}

impl RenderBackend for HeadlessBackend {
    fn upload(&mut self, payload: &MeshPayload) -> Result<GpuHandle, RenderError> {
        if let Some(reason) = &self.failure {
            return Err(RenderError::Upload(reason.clone()));
        }
        self.next += 1;
        let handle = GpuHandle(self.next);
        self.live.insert(handle, (payload.vertices.len(), payload.indices.len()));
        Ok(handle)
    }

    fn release(&mut self, handle: GpuHandle) {
        self.live.remove(&handle);
    }
}
