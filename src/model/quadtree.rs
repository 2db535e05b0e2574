use uuid::Uuid;

use crate::model::constants::QUADTREE_NODE_CAPACITY;

#[derive(Debug, Clone, Copy)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Rect {
    pub fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    /// Square window of `radius` cells around a center point.
    pub fn around(x: u16, y: u16, radius: i32) -> Self {
        Self {
            x: x as i32 - radius,
            y: y as i32 - radius,
            w: radius * 2 + 1,
            h: radius * 2 + 1,
        }
    }

    pub fn contains(&self, x: u16, y: u16) -> bool {
        let (x, y) = (x as i32, y as i32);
        x >= self.x && x < self.x + self.w && y >= self.y && y < self.y + self.h
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.x + other.w
            && other.x < self.x + self.w
            && self.y < other.y + other.h
            && other.y < self.y + self.h
    }
}

#[derive(Debug, Clone, Copy)]
pub struct QuadPoint {
    pub x: u16,
    pub y: u16,
    pub id: Uuid,
}

/// Region quadtree over actor positions, rebuilt from scratch each tick.
pub struct Quadtree {
    boundary: Rect,
    points: Vec<QuadPoint>,
    children: Option<Box<[Quadtree; 4]>>,
}

impl Quadtree {
    pub fn new(boundary: Rect) -> Self {
        Self {
            boundary,
            points: Vec::with_capacity(QUADTREE_NODE_CAPACITY),
            children: None,
        }
    }

    pub fn insert(&mut self, point: QuadPoint) -> bool {
        if !self.boundary.contains(point.x, point.y) {
            return false;
        }
        if let Some(children) = &mut self.children {
            for child in children.iter_mut() {
                if child.insert(point) {
                    return true;
                }
            }
            // Unreachable: the children tile the boundary exactly.
            return false;
        }
        if self.points.len() < QUADTREE_NODE_CAPACITY || !self.subdivide() {
            // Unit-sized nodes cannot split; they hold duplicates instead.
            self.points.push(point);
            return true;
        }
        self.insert(point)
    }

    fn subdivide(&mut self) -> bool {
        let Rect { x, y, w, h } = self.boundary;
        if w <= 1 && h <= 1 {
            return false;
        }
        // The four halves partition the boundary exactly; a degenerate
        // axis leaves two children with zero extent that never match.
        let hw = w / 2;
        let hh = h / 2;
        let mut children = Box::new([
            Quadtree::new(Rect::new(x, y, hw, hh)),
            Quadtree::new(Rect::new(x + hw, y, w - hw, hh)),
            Quadtree::new(Rect::new(x, y + hh, hw, h - hh)),
            Quadtree::new(Rect::new(x + hw, y + hh, w - hw, h - hh)),
        ]);
        for point in std::mem::take(&mut self.points) {
            for child in children.iter_mut() {
                if child.insert(point) {
                    break;
                }
            }
        }
        self.children = Some(children);
        true
    }

    /// All points inside any rectangle intersecting `range`.
    pub fn query(&self, range: &Rect, out: &mut Vec<QuadPoint>) {
        if !self.boundary.intersects(range) {
            return;
        }
        for point in &self.points {
            if range.contains(point.x, point.y) {
                out.push(*point);
            }
        }
        if let Some(children) = &self.children {
            for child in children.iter() {
                child.query(range, out);
            }
        }
    }

    pub fn query_around(&self, x: u16, y: u16, radius: i32) -> Vec<QuadPoint> {
        let mut out = Vec::new();
        self.query(&Rect::around(x, y, radius), &mut out);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(n: u128) -> Uuid {
        Uuid::from_u128(n)
    }

    fn tree_with(points: &[(u16, u16)]) -> Quadtree {
        let mut tree = Quadtree::new(Rect::new(0, 0, 16, 16));
        for (i, &(x, y)) in points.iter().enumerate() {
            assert!(tree.insert(QuadPoint {
                x,
                y,
                id: id(i as u128),
            }));
        }
        tree
    }

    #[test]
    fn test_insert_rejects_out_of_bounds() {
        let mut tree = Quadtree::new(Rect::new(0, 0, 8, 8));
        assert!(!tree.insert(QuadPoint { x: 8, y: 0, id: id(1) }));
    }

    #[test]
    fn test_query_finds_points_after_subdivision() {
        let points: Vec<(u16, u16)> = (0..12).map(|i| (i as u16, i as u16)).collect();
        let tree = tree_with(&points);
        let mut out = Vec::new();
        tree.query(&Rect::new(0, 0, 16, 16), &mut out);
        assert_eq!(out.len(), 12);

        let near = tree.query_around(3, 3, 1);
        let coords: Vec<(u16, u16)> = near.iter().map(|p| (p.x, p.y)).collect();
        assert!(coords.contains(&(2, 2)));
        assert!(coords.contains(&(3, 3)));
        assert!(coords.contains(&(4, 4)));
        assert_eq!(coords.len(), 3);
    }

    #[test]
    fn test_duplicate_positions_do_not_recurse_forever() {
        let mut tree = Quadtree::new(Rect::new(0, 0, 4, 4));
        for i in 0..20 {
            assert!(tree.insert(QuadPoint { x: 2, y: 2, id: id(i) }));
        }
        let out = tree.query_around(2, 2, 0);
        assert_eq!(out.len(), 20);
    }

    #[test]
    fn test_query_respects_range() {
        let tree = tree_with(&[(0, 0), (15, 15), (7, 8)]);
        let out = tree.query_around(0, 0, 2);
        assert_eq!(out.len(), 1);
        assert_eq!((out[0].x, out[0].y), (0, 0));
    }
}
