//! Boundary to the expression evaluator and the geometry builder.
//!
//! Neither is implemented here. The morphology provider the evaluator needs
//! to resolve a region or locset lives inside the implementing type and must
//! not change during a reconciliation pass.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Structured parser diagnostic.
///
/// `what` is expected to carry at least two colon-separated prefixes
/// (location and category) before the human-readable text, e.g.
/// `"parse error:region:unexpected token 'x'"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    what: String,
}

impl Diagnostic {
    /// Wraps raw diagnostic text.
    pub fn new(what: impl Into<String>) -> Self {
        Self { what: what.into() }
    }

    /// Raw diagnostic text.
    #[must_use]
    pub fn what(&self) -> &str {
        &self.what
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.what)
    }
}

impl std::error::Error for Diagnostic {}

/// Point in morphology space (micrometres).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point3 {
    /// x coordinate.
    pub x: f32,
    /// y coordinate.
    pub y: f32,
    /// z coordinate.
    pub z: f32,
}

impl Point3 {
    /// Point at `(x, y, z)`.
    #[must_use]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub(crate) fn sub(self, o: Self) -> Self {
        Self::new(self.x - o.x, self.y - o.y, self.z - o.z)
    }

    pub(crate) fn add(self, o: Self) -> Self {
        Self::new(self.x + o.x, self.y + o.y, self.z + o.z)
    }

    pub(crate) fn scale(self, s: f32) -> Self {
        Self::new(self.x * s, self.y * s, self.z * s)
    }

    pub(crate) fn cross(self, o: Self) -> Self {
        Self::new(
            self.y * o.z - self.z * o.y,
            self.z * o.x - self.x * o.z,
            self.x * o.y - self.y * o.x,
        )
    }

    pub(crate) fn length(self) -> f32 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    pub(crate) fn normalized(self) -> Option<Self> {
        let len = self.length();
        (len > f32::EPSILON && len.is_finite()).then(|| self.scale(1.0 / len))
    }
}

/// Truncated cone between two sample points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    /// Proximal end.
    pub prox: Point3,
    /// Radius at the proximal end.
    pub prox_radius: f32,
    /// Distal end.
    pub dist: Point3,
    /// Radius at the distal end.
    pub dist_radius: f32,
}

/// Parses definition text into concrete values.
pub trait Evaluator {
    /// Concrete region value.
    type Region;
    /// Concrete locset value.
    type Locset;
    /// Concrete ion expression value.
    type Expr;

    /// Parse and resolve a region expression.
    ///
    /// # Errors
    /// A `Diagnostic` describing the first problem found.
    fn parse_region(&self, text: &str) -> Result<Self::Region, Diagnostic>;

    /// Parse and resolve a locset expression.
    ///
    /// # Errors
    /// A `Diagnostic` describing the first problem found.
    fn parse_locset(&self, text: &str) -> Result<Self::Locset, Diagnostic>;

    /// Parse an iexpr.
    ///
    /// # Errors
    /// A `Diagnostic` describing the first problem found.
    fn parse_iexpr(&self, text: &str) -> Result<Self::Expr, Diagnostic>;
}

/// Turns resolved regions and locsets into concrete geometry.
pub trait GeometryBuilder<E: Evaluator + ?Sized> {
    /// Segments covered by `region`.
    fn segments_for(&self, region: &E::Region) -> Vec<Segment>;

    /// Points of `locset`.
    fn points_for(&self, locset: &E::Locset) -> Vec<Point3>;
}
