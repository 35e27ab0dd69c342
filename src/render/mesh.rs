//! CPU-side mesh payloads for regions and locsets.

use std::f32::consts::TAU;

use crate::evaluator::{Point3, Segment};

/// One placed copy of a shared mesh.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Instance {
    /// Translation of the instance.
    pub position: Point3,
    /// Uniform scale of the instance.
    pub scale: f32,
}

/// Vertex/index data ready for upload.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshPayload {
    /// Shared vertex positions.
    pub vertices: Vec<Point3>,
    /// Triangle list into `vertices`.
    pub indices: Vec<u32>,
    /// Placements; a region mesh has exactly one.
    pub instances: Vec<Instance>,
}

impl MeshPayload {
    /// Number of indices drawn per instance.
    #[must_use]
    pub fn count(&self) -> usize {
        self.indices.len()
    }

    /// Number of instances; a plain mesh counts as one.
    #[must_use]
    pub fn instance_count(&self) -> usize {
        self.instances.len().max(1)
    }

    /// True if there is nothing to draw.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

fn basis(axis: Point3) -> (Point3, Point3) {
    let helper = if axis.x.abs() < 0.9 {
        Point3::new(1.0, 0.0, 0.0)
    } else {
        Point3::new(0.0, 1.0, 0.0)
    };
    let u = axis.cross(helper).normalized().unwrap_or(Point3::new(0.0, 1.0, 0.0));
    let v = axis.cross(u);
    (u, v)
}

/// Open frusta, one per segment, each with `sides` faces.
///
/// Produces `2 * sides` vertices and `6 * sides` indices per segment.
/// Zero-length segments are drawn along +z.
#[must_use]
pub fn region_mesh(segments: &[Segment], sides: usize) -> MeshPayload {
    let sides = sides.max(3);
    let mut mesh = MeshPayload {
        vertices: Vec::with_capacity(segments.len() * 2 * sides),
        indices: Vec::with_capacity(segments.len() * 6 * sides),
        instances: Vec::new(),
    };
    #[allow(clippy::cast_precision_loss)]
    let step = TAU / sides as f32;

    for seg in segments {
        let axis = seg.dist.sub(seg.prox).normalized().unwrap_or(Point3::new(0.0, 0.0, 1.0));
        let (u, v) = basis(axis);
        #[allow(clippy::cast_possible_truncation)]
        let base = mesh.vertices.len() as u32;

        for (center, radius) in [(seg.prox, seg.prox_radius), (seg.dist, seg.dist_radius)] {
            for i in 0..sides {
                #[allow(clippy::cast_precision_loss)]
                let angle = step * i as f32;
                let offset = u.scale(angle.cos() * radius).add(v.scale(angle.sin() * radius));
                mesh.vertices.push(center.add(offset));
            }
        }

        #[allow(clippy::cast_possible_truncation)]
        let n = sides as u32;
        for i in 0..n {
            let j = (i + 1) % n;
            let (p0, p1, d0, d1) = (base + i, base + j, base + n + i, base + n + j);
            mesh.indices.extend_from_slice(&[p0, p1, d0, p1, d1, d0]);
        }
    }
    mesh
}

const OCTAHEDRON_FACES: [[u32; 3]; 8] = [
    [0, 2, 4],
    [2, 1, 4],
    [1, 3, 4],
    [3, 0, 4],
    [2, 0, 5],
    [1, 2, 5],
    [3, 1, 5],
    [0, 3, 5],
];

/// Shared octahedron marker plus one instance per point.
///
/// An empty point list yields an empty payload.
#[must_use]
pub fn locset_mesh(points: &[Point3], scale: f32) -> MeshPayload {
    if points.is_empty() {
        return MeshPayload::default();
    }
    let vertices = vec![
        Point3::new(1.0, 0.0, 0.0),
        Point3::new(-1.0, 0.0, 0.0),
        Point3::new(0.0, 1.0, 0.0),
        Point3::new(0.0, -1.0, 0.0),
        Point3::new(0.0, 0.0, 1.0),
        Point3::new(0.0, 0.0, -1.0),
    ];
    MeshPayload {
        vertices,
        indices: OCTAHEDRON_FACES.iter().flatten().copied().collect(),
        instances: points
            .iter()
            .map(|&position| Instance { position, scale })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seg(z0: f32, z1: f32) -> Segment {
        Segment {
            prox: Point3::new(0.0, 0.0, z0),
            prox_radius: 1.0,
            dist: Point3::new(0.0, 0.0, z1),
            dist_radius: 0.5,
        }
    }

    #[test]
    fn region_mesh_counts() {
        let mesh = region_mesh(&[seg(0.0, 10.0), seg(10.0, 20.0)], 6);
        assert_eq!(mesh.vertices.len(), 2 * 2 * 6);
        assert_eq!(mesh.count(), 2 * 6 * 6);
        assert_eq!(mesh.instance_count(), 1);
        let max = *mesh.indices.iter().max().unwrap() as usize;
        assert!(max < mesh.vertices.len());
    }

    #[test]
    fn region_mesh_is_idempotent() {
        let segs = [seg(0.0, 3.0), seg(3.0, 3.0)];
        assert_eq!(region_mesh(&segs, 8), region_mesh(&segs, 8));
    }

    #[test]
    fn region_mesh_ring_radius() {
        let mesh = region_mesh(&[seg(0.0, 10.0)], 4);
        for v in &mesh.vertices[..4] {
            let r = (v.x * v.x + v.y * v.y).sqrt();
            assert!((r - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn empty_region_has_no_indices() {
        assert!(region_mesh(&[], 8).is_empty());
    }

    #[test]
    fn locset_mesh_instances() {
        let pts = [Point3::new(1.0, 2.0, 3.0), Point3::default()];
        let mesh = locset_mesh(&pts, 2.0);
        assert_eq!(mesh.count(), 24);
        assert_eq!(mesh.instance_count(), 2);
        assert_eq!(mesh.instances[0].position, pts[0]);
        assert!(locset_mesh(&[], 1.0).is_empty());
    }
}
