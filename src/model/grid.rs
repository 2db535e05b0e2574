use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::model::actor::Actor;

/// The committed world state: one bucket of actors per cell. Cells are
/// stored row-major; the order of actors within a bucket is insertion
/// order, which is what fixes the behavior-phase iteration order.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Grid {
    pub width: u16,
    pub height: u16,
    cells: Vec<Vec<Actor>>,
}

impl Grid {
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            cells: vec![Vec::new(); width as usize * height as usize],
        }
    }

    fn index(&self, x: u16, y: u16) -> usize {
        y as usize * self.width as usize + x as usize
    }

    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && x < self.width as i32 && y < self.height as i32
    }

    pub fn cell(&self, x: u16, y: u16) -> &[Actor] {
        &self.cells[self.index(x, y)]
    }

    /// Places an actor, skipping (with a warning) coordinates outside the
    /// grid. Out-of-bounds actors can only come from a foreign payload.
    pub fn insert(&mut self, actor: Actor) -> bool {
        if !self.in_bounds(actor.x as i32, actor.y as i32) {
            tracing::warn!(
                id = %actor.id,
                x = actor.x,
                y = actor.y,
                "dropping actor outside grid bounds"
            );
            return false;
        }
        let idx = self.index(actor.x, actor.y);
        self.cells[idx].push(actor);
        true
    }

    pub fn from_actors(width: u16, height: u16, actors: impl IntoIterator<Item = Actor>) -> Self {
        let mut grid = Self::new(width, height);
        for actor in actors {
            grid.insert(actor);
        }
        grid
    }

    /// Row-major, per-cell insertion order. This is the snapshot order the
    /// behavior phase iterates in.
    pub fn flatten(&self) -> Vec<Actor> {
        self.cells.iter().flatten().cloned().collect()
    }

    pub fn actor_map(&self) -> BTreeMap<Uuid, Actor> {
        self.cells
            .iter()
            .flatten()
            .map(|a| (a.id, a.clone()))
            .collect()
    }

    pub fn actor_count(&self) -> usize {
        self.cells.iter().map(Vec::len).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Actor> {
        self.cells.iter().flatten()
    }
}
