//! Unit-radius blob meshes.
//!
//! A [`MeshTemplate`] holds the undisplaced vertex buffer and index list for
//! one [`GeometryKind`]; it is built once and shared by every blob of that
//! kind. Each [`BlobMesh`] owns only its displaced positions and normals.

use crate::modes::GeometryKind;
use fnv::FnvHashMap;
use glam::Vec3;
use std::f32::consts::{PI, TAU};
use std::rc::Rc;

#[derive(Clone, Debug)]
pub struct MeshTemplate {
    kind: GeometryKind,
    positions: Rc<[Vec3]>,
    indices: Rc<[u32]>,
}

impl MeshTemplate {
    pub fn build(kind: GeometryKind) -> Self {
        let (positions, mut indices) = match kind {
            GeometryKind::Sphere { segments } => uv_sphere(segments.max(3), segments.max(2)),
            GeometryKind::Icosahedron { detail } => icosphere(detail),
        };
        orient_outward(&positions, &mut indices);
        Self {
            kind,
            positions: positions.into(),
            indices: indices.into(),
        }
    }

    pub fn kind(&self) -> GeometryKind {
        self.kind
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn instantiate(&self) -> BlobMesh {
        let mut mesh = BlobMesh {
            rest: Rc::clone(&self.positions),
            indices: Rc::clone(&self.indices),
            positions: self.positions.to_vec(),
            normals: Some(vec![Vec3::ZERO; self.positions.len()]),
        };
        mesh.recompute_normals();
        mesh
    }
}

/// Per-blob geometry handed to the renderer.
#[derive(Clone, Debug)]
pub struct BlobMesh {
    rest: Rc<[Vec3]>,
    indices: Rc<[u32]>,
    pub positions: Vec<Vec3>,
    pub normals: Option<Vec<Vec3>>,
}

impl BlobMesh {
    /// Undisplaced positions, shared with every mesh of the same template.
    pub fn rest_positions(&self) -> &[Vec3] {
        &self.rest
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn positions_flat(&self) -> &[f32] {
        bytemuck::cast_slice(&self.positions)
    }

    pub fn normals_flat(&self) -> &[f32] {
        self.normals
            .as_deref()
            .map(|n| bytemuck::cast_slice::<Vec3, f32>(n))
            .unwrap_or(&[])
    }

    /// Rewrite every position as `f(rest_position)`.
    pub fn displace_from_rest(&mut self, mut f: impl FnMut(Vec3) -> Vec3) {
        self.positions.clear();
        self.positions.extend(self.rest.iter().map(|&v| f(v)));
    }

    /// Drop normals; the deformer then skips the recompute.
    pub fn without_normals(mut self) -> Self {
        self.normals = None;
        self
    }

    /// Area-weighted vertex normals from the current positions.
    pub fn recompute_normals(&mut self) {
        let Some(normals) = self.normals.as_mut() else {
            return;
        };
        normals.clear();
        normals.resize(self.positions.len(), Vec3::ZERO);
        for tri in self.indices.chunks_exact(3) {
            let (a, b, c) = (tri[0] as usize, tri[1] as usize, tri[2] as usize);
            let face = (self.positions[b] - self.positions[a])
                .cross(self.positions[c] - self.positions[a]);
            normals[a] += face;
            normals[b] += face;
            normals[c] += face;
        }
        for (n, p) in normals.iter_mut().zip(&self.positions) {
            *n = n.try_normalize().unwrap_or_else(|| p.normalize_or_zero());
        }
    }
}

/// Lazily built templates keyed by geometry kind.
#[derive(Default)]
pub struct MeshCache {
    templates: FnvHashMap<GeometryKind, MeshTemplate>,
}

impl MeshCache {
    pub fn template(&mut self, kind: GeometryKind) -> &MeshTemplate {
        self.templates
            .entry(kind)
            .or_insert_with(|| MeshTemplate::build(kind))
    }

    pub fn instantiate(&mut self, kind: GeometryKind) -> BlobMesh {
        self.template(kind).instantiate()
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

fn uv_sphere(width_segments: u32, height_segments: u32) -> (Vec<Vec3>, Vec<u32>) {
    let row = width_segments + 1;
    let mut positions = Vec::with_capacity((row * (height_segments + 1)) as usize);
    for iy in 0..=height_segments {
        let v = iy as f32 / height_segments as f32;
        for ix in 0..=width_segments {
            let u = ix as f32 / width_segments as f32;
            positions.push(Vec3::new(
                -(u * TAU).cos() * (v * PI).sin(),
                (v * PI).cos(),
                (u * TAU).sin() * (v * PI).sin(),
            ));
        }
    }

    let mut indices = Vec::with_capacity((width_segments * height_segments * 6) as usize);
    for iy in 0..height_segments {
        for ix in 0..width_segments {
            let a = iy * row + ix + 1;
            let b = iy * row + ix;
            let c = (iy + 1) * row + ix;
            let d = (iy + 1) * row + ix + 1;
            // pole rows collapse to a single triangle
            if iy != 0 {
                indices.extend_from_slice(&[a, b, d]);
            }
            if iy != height_segments - 1 {
                indices.extend_from_slice(&[b, c, d]);
            }
        }
    }
    (positions, indices)
}

const ICO_FACES: [[usize; 3]; 20] = [
    [0, 11, 5],
    [0, 5, 1],
    [0, 1, 7],
    [0, 7, 10],
    [0, 10, 11],
    [1, 5, 9],
    [5, 11, 4],
    [11, 10, 2],
    [10, 7, 6],
    [7, 1, 8],
    [3, 9, 4],
    [3, 4, 2],
    [3, 2, 6],
    [3, 6, 8],
    [3, 8, 9],
    [4, 9, 5],
    [2, 4, 11],
    [6, 2, 10],
    [8, 6, 7],
    [9, 8, 1],
];

fn icosphere(detail: u32) -> (Vec<Vec3>, Vec<u32>) {
    let t = (1.0 + 5f32.sqrt()) * 0.5;
    let corners = [
        Vec3::new(-1.0, t, 0.0),
        Vec3::new(1.0, t, 0.0),
        Vec3::new(-1.0, -t, 0.0),
        Vec3::new(1.0, -t, 0.0),
        Vec3::new(0.0, -1.0, t),
        Vec3::new(0.0, 1.0, t),
        Vec3::new(0.0, -1.0, -t),
        Vec3::new(0.0, 1.0, -t),
        Vec3::new(t, 0.0, -1.0),
        Vec3::new(t, 0.0, 1.0),
        Vec3::new(-t, 0.0, -1.0),
        Vec3::new(-t, 0.0, 1.0),
    ];

    let cols = detail as usize + 1;
    let mut welder = Welder::default();
    let mut indices = Vec::with_capacity(20 * cols * cols * 3);

    for face in ICO_FACES {
        let (a, b, c) = (corners[face[0]], corners[face[1]], corners[face[2]]);
        // grid[i][j]: row i from edge ab toward c, column j across the row
        let mut grid: Vec<Vec<u32>> = Vec::with_capacity(cols + 1);
        for i in 0..=cols {
            let f = i as f32 / cols as f32;
            let aj = a.lerp(c, f);
            let bj = b.lerp(c, f);
            let rows = cols - i;
            let row = (0..=rows)
                .map(|j| {
                    let p = if rows == 0 {
                        aj
                    } else {
                        aj.lerp(bj, j as f32 / rows as f32)
                    };
                    welder.index(p.normalize())
                })
                .collect();
            grid.push(row);
        }
        for i in 0..cols {
            for j in 0..(2 * (cols - i) - 1) {
                let k = j / 2;
                if j % 2 == 0 {
                    indices.extend_from_slice(&[grid[i][k + 1], grid[i + 1][k], grid[i][k]]);
                } else {
                    indices.extend_from_slice(&[
                        grid[i][k + 1],
                        grid[i + 1][k + 1],
                        grid[i + 1][k],
                    ]);
                }
            }
        }
    }
    (welder.positions, indices)
}

/// Merges vertices that land on the same point along shared face edges.
#[derive(Default)]
struct Welder {
    positions: Vec<Vec3>,
    lookup: FnvHashMap<[i32; 3], u32>,
}

impl Welder {
    fn index(&mut self, p: Vec3) -> u32 {
        let key = [
            (p.x * 1e5).round() as i32,
            (p.y * 1e5).round() as i32,
            (p.z * 1e5).round() as i32,
        ];
        let positions = &mut self.positions;
        *self.lookup.entry(key).or_insert_with(|| {
            positions.push(p);
            (positions.len() - 1) as u32
        })
    }
}

/// Flip the winding of every triangle if the mesh faces inward.
fn orient_outward(positions: &[Vec3], indices: &mut [u32]) {
    let facing: f32 = indices
        .chunks_exact(3)
        .map(|tri| {
            let (a, b, c) = (
                positions[tri[0] as usize],
                positions[tri[1] as usize],
                positions[tri[2] as usize],
            );
            (b - a).cross(c - a).dot(a + b + c)
        })
        .sum();
    if facing < 0.0 {
        for tri in indices.chunks_exact_mut(3) {
            tri.swap(1, 2);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_outward_unit_normals(mesh: &BlobMesh) {
        let normals = mesh.normals.as_ref().unwrap();
        for (n, p) in normals.iter().zip(&mesh.positions) {
            assert!((n.length() - 1.0).abs() < 1e-3);
            assert!(n.dot(*p) > 0.5, "normal not outward at {p:?}");
        }
    }

    #[test]
    fn sphere_vertices_lie_on_unit_sphere() {
        let t = MeshTemplate::build(GeometryKind::Sphere { segments: 12 });
        assert_eq!(t.vertex_count(), 13 * 13);
        let mesh = t.instantiate();
        for p in &mesh.positions {
            assert!((p.length() - 1.0).abs() < 1e-5);
        }
        assert_eq!(mesh.indices().len() % 3, 0);
        assert_outward_unit_normals(&mesh);
    }

    #[test]
    fn icosphere_welds_shared_edges() {
        let t = MeshTemplate::build(GeometryKind::Icosahedron { detail: 0 });
        assert_eq!(t.vertex_count(), 12);
        let t = MeshTemplate::build(GeometryKind::Icosahedron { detail: 2 });
        // 10 * n^2 + 2 unique vertices for n = detail + 1
        assert_eq!(t.vertex_count(), 10 * 9 + 2);
        let mesh = t.instantiate();
        assert_eq!(mesh.indices().len(), 20 * 9 * 3);
        assert_outward_unit_normals(&mesh);
    }

    #[test]
    fn cache_shares_rest_buffer() {
        let mut cache = MeshCache::default();
        let kind = GeometryKind::Icosahedron { detail: 1 };
        let a = cache.instantiate(kind);
        let b = cache.instantiate(kind);
        assert_eq!(cache.len(), 1);
        assert!(std::ptr::eq(a.rest_positions(), b.rest_positions()));
    }
}
