//! Diamond lattice: dots, unit edges and the triangles they bound.
//!
//! Rows are listed top to bottom. A row transition is *expanding* when the
//! next row is longer (each dot links down-left and down-right to columns
//! `c` and `c + 1`) and *contracting* otherwise (each dot links to columns
//! `c` and `c - 1` of the shorter row, where those exist).

use std::collections::HashMap;

use once_cell::sync::Lazy;

use crate::games::diamond::types::*;

/// Dots per row of the playing board.
pub const ROW_LENGTHS: [usize; 7] = [4, 5, 6, 7, 6, 5, 4];
/// Horizontal distance between neighbouring dots.
pub const DOT_SPACING: f64 = 100.0;
/// Margin around the outermost dots.
pub const PADDING: f64 = 50.0;
/// A point selects a dot only if it is strictly closer than this.
pub const HIT_TOLERANCE: f64 = 15.0;

pub const DIAMOND_DOTS: usize = 37;
pub const DIAMOND_EDGES: usize = 90;
pub const DIAMOND_TRIANGLES: usize = 54;

static DIAMOND: Lazy<Lattice> = Lazy::new(|| {
    let lattice = Lattice::build(&ROW_LENGTHS, DOT_SPACING, PADDING);
    assert_eq!(lattice.dots().len(), DIAMOND_DOTS);
    assert_eq!(lattice.edges().len(), DIAMOND_EDGES);
    assert_eq!(lattice.triangles().len(), DIAMOND_TRIANGLES);
    lattice
});

/// The fixed playing board, built on first use.
pub fn diamond() -> &'static Lattice {
    &DIAMOND
}

#[derive(Debug, Clone)]
pub struct Lattice {
    profile: Vec<usize>,
    row_start: Vec<DotId>,
    dots: Vec<Dot>,
    edges: Vec<EdgeDef>,
    edge_index: HashMap<EdgeKey, EdgeId>,
    triangles: Vec<TriangleDef>,
    edge_triangles: Vec<Vec<TriangleId>>,
    width: f64,
    height: f64,
}

impl Lattice {
    /// Build a lattice for an arbitrary row profile.
    pub fn build(profile: &[usize], spacing: f64, padding: f64) -> Self {
        let row_spacing = spacing * 3f64.sqrt() / 2.0;
        let longest = profile.iter().copied().max().unwrap_or(0);
        let width = longest.saturating_sub(1) as f64 * spacing + 2.0 * padding;
        let height = profile.len().saturating_sub(1) as f64 * row_spacing + 2.0 * padding;

        let mut lattice = Lattice {
            profile: profile.to_vec(),
            row_start: Vec::with_capacity(profile.len()),
            dots: Vec::new(),
            edges: Vec::new(),
            edge_index: HashMap::new(),
            triangles: Vec::new(),
            edge_triangles: Vec::new(),
            width,
            height,
        };

        for (r, &len) in profile.iter().enumerate() {
            lattice.row_start.push(lattice.dots.len());
            let row_width = len.saturating_sub(1) as f64 * spacing;
            let offset_x = (width - row_width) / 2.0;
            for c in 0..len {
                lattice.dots.push(Dot {
                    pos: GridPos::new(r, c),
                    x: c as f64 * spacing + offset_x,
                    y: r as f64 * row_spacing + padding,
                });
            }
        }

        lattice.generate_edges();
        lattice.generate_triangles();
        lattice
    }

    fn generate_edges(&mut self) {
        let rows = self.profile.len();
        for r in 0..rows {
            for c in 0..self.profile[r] {
                let here = GridPos::new(r, c);
                self.add_edge(here, GridPos::new(r, c + 1));
                if r + 1 == rows {
                    continue;
                }
                if self.profile[r + 1] > self.profile[r] {
                    self.add_edge(here, GridPos::new(r + 1, c));
                    self.add_edge(here, GridPos::new(r + 1, c + 1));
                } else {
                    self.add_edge(here, GridPos::new(r + 1, c));
                    if c > 0 {
                        self.add_edge(here, GridPos::new(r + 1, c - 1));
                    }
                }
            }
        }
        self.edge_triangles = vec![Vec::new(); self.edges.len()];
    }

    fn add_edge(&mut self, p: GridPos, q: GridPos) {
        let (Some(dp), Some(dq)) = (self.dot_id(p), self.dot_id(q)) else {
            return;
        };
        let key = EdgeKey::new(p, q);
        if self.edge_index.contains_key(&key) {
            return;
        }
        self.edge_index.insert(key, self.edges.len());
        self.edges.push(EdgeDef { key, dots: [dp, dq] });
    }

    fn generate_triangles(&mut self) {
        for r in 0..self.profile.len().saturating_sub(1) {
            let (len1, len2) = (self.profile[r], self.profile[r + 1]);
            if len2 > len1 {
                for c in 0..len1 {
                    let d1 = GridPos::new(r, c);
                    let d2 = GridPos::new(r + 1, c);
                    let d3 = GridPos::new(r + 1, c + 1);
                    self.add_triangle([d1, d2, d3], [(d1, d2), (d1, d3), (d2, d3)]);
                    if c + 1 < len1 {
                        let d4 = GridPos::new(r, c + 1);
                        self.add_triangle([d1, d4, d3], [(d1, d4), (d1, d3), (d4, d3)]);
                    }
                }
            } else {
                for c in 0..len2 {
                    let d1 = GridPos::new(r, c);
                    let d2 = GridPos::new(r, c + 1);
                    let d3 = GridPos::new(r + 1, c);
                    self.add_triangle([d1, d2, d3], [(d1, d2), (d1, d3), (d2, d3)]);
                    if c + 1 < len2 {
                        let d4 = GridPos::new(r + 1, c + 1);
                        self.add_triangle([d2, d3, d4], [(d2, d3), (d2, d4), (d3, d4)]);
                    }
                }
            }
        }
    }

    fn add_triangle(&mut self, corners: [GridPos; 3], sides: [(GridPos, GridPos); 3]) {
        let mut edges = [0; 3];
        for (slot, (p, q)) in edges.iter_mut().zip(sides) {
            match self.edge_between(p, q) {
                Some(id) => *slot = id,
                None => return,
            }
        }
        let id = self.triangles.len();
        self.triangles.push(TriangleDef { corners, edges });
        for e in edges {
            self.edge_triangles[e].push(id);
        }
    }

    pub fn dots(&self) -> &[Dot] {
        &self.dots
    }

    pub fn edges(&self) -> &[EdgeDef] {
        &self.edges
    }

    pub fn triangles(&self) -> &[TriangleDef] {
        &self.triangles
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn dot_id(&self, pos: GridPos) -> Option<DotId> {
        let len = *self.profile.get(pos.row)?;
        (pos.col < len).then(|| self.row_start[pos.row] + pos.col)
    }

    pub fn dot_at(&self, pos: GridPos) -> Option<&Dot> {
        self.dot_id(pos).map(|id| &self.dots[id])
    }

    pub fn edge_id(&self, key: &EdgeKey) -> Option<EdgeId> {
        self.edge_index.get(key).copied()
    }

    pub fn edge_between(&self, p: GridPos, q: GridPos) -> Option<EdgeId> {
        self.edge_id(&EdgeKey::new(p, q))
    }

    /// Triangles bounded by the given edge (at most two).
    pub fn triangles_of(&self, edge: EdgeId) -> &[TriangleId] {
        &self.edge_triangles[edge]
    }

    /// The dot nearest to `(x, y)` that is strictly within `tolerance`.
    pub fn nearest_dot(&self, x: f64, y: f64, tolerance: f64) -> Option<GridPos> {
        let mut best = None;
        let mut best_dist_sq = tolerance * tolerance;
        for dot in &self.dots {
            let dist_sq = (x - dot.x).powi(2) + (y - dot.y).powi(2);
            if dist_sq < best_dist_sq {
                best_dist_sq = dist_sq;
                best = Some(dot.pos);
            }
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_diamond_counts() {
        let lattice = diamond();
        assert_eq!(lattice.dots().len(), 37);
        assert_eq!(lattice.edges().len(), 90);
        assert_eq!(lattice.triangles().len(), 54);
    }

    #[test]
    fn test_edge_keys_unique_and_symmetric() {
        let lattice = diamond();
        let keys: HashSet<EdgeKey> = lattice.edges().iter().map(|e| e.key).collect();
        assert_eq!(keys.len(), lattice.edges().len());
        for edge in lattice.edges() {
            let (a, b) = edge.key.endpoints();
            assert_eq!(lattice.edge_between(b, a), lattice.edge_between(a, b));
            assert!(lattice.edge_between(a, b).is_some());
        }
    }

    #[test]
    fn test_edges_have_unit_length() {
        let lattice = diamond();
        for edge in lattice.edges() {
            let a = lattice.dots()[edge.dots[0]];
            let b = lattice.dots()[edge.dots[1]];
            let len = ((a.x - b.x).powi(2) + (a.y - b.y).powi(2)).sqrt();
            assert!((len - DOT_SPACING).abs() < 1e-9, "edge {} has length {}", edge.key, len);
        }
    }

    #[test]
    fn test_triangle_edges_distinct_and_corners_adjacent() {
        let lattice = diamond();
        for tri in lattice.triangles() {
            let [e0, e1, e2] = tri.edges;
            assert!(e0 != e1 && e1 != e2 && e0 != e2);
            let [a, b, c] = tri.corners;
            assert!(lattice.edge_between(a, b).is_some());
            assert!(lattice.edge_between(b, c).is_some());
            assert!(lattice.edge_between(a, c).is_some());
            for e in tri.edges {
                let (p, q) = lattice.edges()[e].key.endpoints();
                assert!(tri.corners.contains(&p) && tri.corners.contains(&q));
            }
        }
    }

    #[test]
    fn test_each_edge_bounds_one_or_two_triangles() {
        let lattice = diamond();
        let mut boundary = 0;
        for id in 0..lattice.edges().len() {
            let n = lattice.triangles_of(id).len();
            assert!(n == 1 || n == 2, "edge {} bounds {} triangles", id, n);
            if n == 1 {
                boundary += 1;
            }
        }
        // Perimeter of the hexagon: 3 + 3 + 3 + 3 + 3 + 3.
        assert_eq!(boundary, 18);
    }

    #[test]
    fn test_first_triangle_is_top_left() {
        let lattice = diamond();
        let tri = &lattice.triangles()[0];
        assert_eq!(
            tri.corners,
            [GridPos::new(0, 0), GridPos::new(1, 0), GridPos::new(1, 1)]
        );
    }

    #[test]
    fn test_rows_are_centered() {
        let lattice = diamond();
        assert!((lattice.width() - 700.0).abs() < 1e-9);
        let top = lattice.dot_at(GridPos::new(0, 0)).unwrap();
        let middle = lattice.dot_at(GridPos::new(3, 0)).unwrap();
        assert!((top.x - 200.0).abs() < 1e-9);
        assert!((middle.x - 50.0).abs() < 1e-9);
        assert!((top.y - PADDING).abs() < 1e-9);
    }

    #[test]
    fn test_contracting_rows_link_down_left() {
        let lattice = diamond();
        assert!(lattice.edge_between(GridPos::new(3, 1), GridPos::new(4, 0)).is_some());
        assert!(lattice.edge_between(GridPos::new(3, 1), GridPos::new(4, 1)).is_some());
        assert!(lattice.edge_between(GridPos::new(3, 0), GridPos::new(4, 1)).is_none());
        assert!(lattice.edge_between(GridPos::new(3, 6), GridPos::new(4, 5)).is_some());
    }

    #[test]
    fn test_dot_lookup_bounds() {
        let lattice = diamond();
        assert!(lattice.dot_id(GridPos::new(0, 3)).is_some());
        assert!(lattice.dot_id(GridPos::new(0, 4)).is_none());
        assert!(lattice.dot_id(GridPos::new(7, 0)).is_none());
    }

    #[test]
    fn test_nearest_dot_tolerance_is_strict() {
        let lattice = diamond();
        let dot = *lattice.dot_at(GridPos::new(2, 2)).unwrap();
        assert_eq!(lattice.nearest_dot(dot.x + 5.0, dot.y - 5.0, HIT_TOLERANCE), Some(dot.pos));
        assert_eq!(lattice.nearest_dot(dot.x + 15.0, dot.y, HIT_TOLERANCE), None);
        assert_eq!(lattice.nearest_dot(0.0, 0.0, HIT_TOLERANCE), None);
    }

    #[test]
    fn test_small_profile() {
        let lattice = Lattice::build(&[1, 2], 10.0, 5.0);
        assert_eq!(lattice.dots().len(), 3);
        assert_eq!(lattice.edges().len(), 3);
        assert_eq!(lattice.triangles().len(), 1);
    }
}
