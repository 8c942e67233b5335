use eframe::egui::{Vec2, vec2};

const LEAF_CAPACITY: usize = 8;
const MAX_DEPTH: usize = 12;

/// Axis-aligned square cell.
#[derive(Clone, Copy, Debug)]
pub(super) struct Square {
    pub(super) center: Vec2,
    pub(super) half: f32,
}

impl Square {
    fn enclosing(points: &[Vec2]) -> Option<Self> {
        let (min, max) = points.iter().fold(
            (Vec2::splat(f32::INFINITY), Vec2::splat(f32::NEG_INFINITY)),
            |(min, max), point| (min.min(*point), max.max(*point)),
        );

        if !(min.x.is_finite() && min.y.is_finite() && max.x.is_finite() && max.y.is_finite()) {
            return None;
        }

        let span = (max - min).max(Vec2::splat(1.0));
        Some(Self {
            center: (min + max) * 0.5,
            half: span.x.max(span.y) * 0.5 + 1.0,
        })
    }

    pub(super) fn contains(self, point: Vec2) -> bool {
        (point.x - self.center.x).abs() <= self.half && (point.y - self.center.y).abs() <= self.half
    }

    pub(super) fn width(self) -> f32 {
        self.half * 2.0
    }

    /// Squared gap between two squares; zero when they touch or overlap.
    pub(super) fn gap_sq(self, other: Self) -> f32 {
        let reach = self.half + other.half;
        let dx = ((self.center.x - other.center.x).abs() - reach).max(0.0);
        let dy = ((self.center.y - other.center.y).abs() - reach).max(0.0);
        dx * dx + dy * dy
    }

    fn quadrant_of(self, point: Vec2) -> usize {
        usize::from(point.x >= self.center.x) | (usize::from(point.y >= self.center.y) << 1)
    }

    fn quadrant(self, index: usize) -> Self {
        let quarter = self.half * 0.5;
        let sign_x = if index & 1 == 0 { -1.0 } else { 1.0 };
        let sign_y = if index & 2 == 0 { -1.0 } else { 1.0 };
        Self {
            center: self.center + vec2(sign_x * quarter, sign_y * quarter),
            half: quarter,
        }
    }
}

/// Point-region quadtree over node positions. Every cell records the count
/// and centroid of the points below it for Barnes-Hut approximation.
pub(super) struct QuadNode {
    pub(super) cell: Square,
    pub(super) centroid: Vec2,
    pub(super) count: usize,
    /// Point indices; only populated on leaves.
    pub(super) points: Vec<usize>,
    pub(super) children: [Option<Box<QuadNode>>; 4],
}

impl QuadNode {
    pub(super) fn build(positions: &[Vec2]) -> Option<Self> {
        let cell = Square::enclosing(positions)?;
        Some(Self::subdivide(
            cell,
            (0..positions.len()).collect(),
            positions,
            0,
        ))
    }

    fn subdivide(cell: Square, points: Vec<usize>, positions: &[Vec2], depth: usize) -> Self {
        let count = points.len();
        let centroid = if count == 0 {
            cell.center
        } else {
            let sum = points
                .iter()
                .fold(Vec2::ZERO, |sum, &index| sum + positions[index]);
            sum / count as f32
        };

        let mut node = Self {
            cell,
            centroid,
            count,
            points,
            children: [None, None, None, None],
        };

        if count <= LEAF_CAPACITY || depth >= MAX_DEPTH {
            return node;
        }

        let mut buckets: [Vec<usize>; 4] = Default::default();
        for &index in &node.points {
            buckets[cell.quadrant_of(positions[index])].push(index);
        }

        // Coincident points would split forever.
        if buckets.iter().filter(|bucket| !bucket.is_empty()).count() < 2 {
            return node;
        }

        for (quadrant, bucket) in buckets.into_iter().enumerate() {
            if !bucket.is_empty() {
                node.children[quadrant] = Some(Box::new(Self::subdivide(
                    cell.quadrant(quadrant),
                    bucket,
                    positions,
                    depth + 1,
                )));
            }
        }
        node.points = Vec::new();
        node
    }

    pub(super) fn is_leaf(&self) -> bool {
        self.children.iter().all(Option::is_none)
    }

    pub(super) fn child_nodes(&self) -> impl Iterator<Item = &QuadNode> {
        self.children.iter().filter_map(|child| child.as_deref())
    }
}
