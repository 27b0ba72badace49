//! Tile anchors on the unit sphere.
//!
//! Anchors are the vertices of a subdivided icosahedron. Each subdivision
//! splits every triangle into four through its edge midpoints, so the
//! closest pair of anchors at level `k` is exactly `ICOSAHEDRON_EDGE_ANGLE / 2^k`
//! apart. Shared edges are looked up in a midpoint cache, which keeps
//! every vertex unique.

use crate::constants::MAX_MIN_ANCHORS;
use fnv::FnvHashMap;
use glam::Vec3;

/// Angle subtended by one edge of the unit icosahedron, `atan(2)`.
pub const ICOSAHEDRON_EDGE_ANGLE: f32 = 1.107_148_8;

/// A fixed placement of one item on the sphere.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tile {
    pub anchor: Vec3,
    pub item_index: usize,
}

impl Tile {
    /// Tangent basis `(right, up)` for a quad centred on the anchor and
    /// facing the sphere centre.
    pub fn basis(&self) -> (Vec3, Vec3) {
        tangent_basis(self.anchor)
    }
}

#[derive(Clone, Debug, Default)]
pub struct SphereLayout {
    pub tiles: Vec<Tile>,
    /// Smallest angle between any two anchors, radians. Zero when there
    /// are fewer than two anchors.
    pub min_separation: f32,
}

impl SphereLayout {
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    /// Angular half-size a tile may occupy without touching its neighbours.
    pub fn tile_half_angle(&self, fill: f32) -> f32 {
        if self.tiles.len() < 2 {
            return std::f32::consts::FRAC_PI_8;
        }
        self.min_separation * 0.5 * fill
    }
}

/// Build the layout for `item_count` items.
///
/// Picks the smallest icosphere with at least `max(item_count, min_anchors)`
/// vertices and assigns item `i % item_count` to anchor `i`. An empty item
/// list yields an empty layout.
pub fn build_layout(item_count: usize, min_anchors: usize) -> SphereLayout {
    if item_count == 0 {
        return SphereLayout::default();
    }
    // Every item needs an anchor; padding beyond that is capped.
    let wanted = item_count.max(min_anchors.min(MAX_MIN_ANCHORS));
    let mut level = 0u32;
    while icosphere_vertex_count(level) < wanted {
        level += 1;
    }
    let anchors = icosphere(level);
    let tiles = anchors
        .iter()
        .enumerate()
        .map(|(i, &anchor)| Tile {
            anchor,
            item_index: i % item_count,
        })
        .collect();
    SphereLayout {
        tiles,
        min_separation: ICOSAHEDRON_EDGE_ANGLE / (1u32 << level) as f32,
    }
}

/// Vertex count of an icosphere at `level`: `10 * 4^level + 2`.
/// Saturates at `usize::MAX` for levels too deep to represent.
pub fn icosphere_vertex_count(level: u32) -> usize {
    4usize
        .checked_pow(level)
        .and_then(|n| n.checked_mul(10))
        .and_then(|n| n.checked_add(2))
        .unwrap_or(usize::MAX)
}

/// Unit-length vertices of an icosahedron subdivided `level` times.
pub fn icosphere(level: u32) -> Vec<Vec3> {
    let t = (1.0 + 5.0_f32.sqrt()) / 2.0;
    let mut vertices: Vec<Vec3> = [
        [-1.0, t, 0.0],
        [1.0, t, 0.0],
        [-1.0, -t, 0.0],
        [1.0, -t, 0.0],
        [0.0, -1.0, t],
        [0.0, 1.0, t],
        [0.0, -1.0, -t],
        [0.0, 1.0, -t],
        [t, 0.0, -1.0],
        [t, 0.0, 1.0],
        [-t, 0.0, -1.0],
        [-t, 0.0, 1.0],
    ]
    .iter()
    .map(|p| Vec3::from_array(*p).normalize())
    .collect();

    let mut faces: Vec<[u32; 3]> = vec![
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

    for _ in 0..level {
        let mut midpoints: FnvHashMap<(u32, u32), u32> = FnvHashMap::default();
        let mut next = Vec::with_capacity(faces.len() * 4);
        for [a, b, c] in faces {
            let ab = midpoint(&mut vertices, &mut midpoints, a, b);
            let bc = midpoint(&mut vertices, &mut midpoints, b, c);
            let ca = midpoint(&mut vertices, &mut midpoints, c, a);
            next.push([a, ab, ca]);
            next.push([b, bc, ab]);
            next.push([c, ca, bc]);
            next.push([ab, bc, ca]);
        }
        faces = next;
    }
    vertices
}

fn midpoint(
    vertices: &mut Vec<Vec3>,
    cache: &mut FnvHashMap<(u32, u32), u32>,
    a: u32,
    b: u32,
) -> u32 {
    let key = (a.min(b), a.max(b));
    if let Some(&i) = cache.get(&key) {
        return i;
    }
    let p = (vertices[a as usize] + vertices[b as usize]).normalize();
    vertices.push(p);
    let i = (vertices.len() - 1) as u32;
    cache.insert(key, i);
    i
}

/// Brute-force smallest pairwise angle. O(n²); for tests and diagnostics.
pub fn min_angular_separation(anchors: &[Vec3]) -> f32 {
    let mut best = f32::MAX;
    for (i, a) in anchors.iter().enumerate() {
        for b in &anchors[i + 1..] {
            let angle = a.dot(*b).clamp(-1.0, 1.0).acos();
            best = best.min(angle);
        }
    }
    if best == f32::MAX {
        0.0
    } else {
        best
    }
}

/// `(right, up)` for a surface patch whose normal is `n`, seen from the
/// centre of the sphere with world +Y as up.
pub fn tangent_basis(n: Vec3) -> (Vec3, Vec3) {
    // Near the poles world up is parallel to the normal; fall back to -Z.
    let reference = if n.y.abs() > 0.999 { Vec3::NEG_Z } else { Vec3::Y };
    let right = n.cross(reference).normalize();
    let up = right.cross(n);
    (right, up)
}

// =============================================================================
// Tests
// =============================================================================
