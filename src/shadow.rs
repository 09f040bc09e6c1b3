//! Shadow relationships between cells for a given sun direction.
//!
//! A tree of size `S` covers the `S` cells downwind of it. Forecasts for a
//! later day reuse the current layout under that day's direction; trees that
//! will be grown, cut or planted in between are not modelled.

use crate::{
    grid::{CellId, Grid, DIRECTIONS},
    state::{Tree, TurnState, MAX_TREE_SIZE},
};

pub fn sun_direction(day: u32) -> usize {
    day as usize % DIRECTIONS
}

pub fn opposite(direction: usize) -> usize {
    (direction + DIRECTIONS / 2) % DIRECTIONS
}

/// A tree throwing shadow onto some cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caster<'a> {
    pub tree: &'a Tree,
    pub distance: usize,
}

pub struct ShadowEngine<'a> {
    grid: &'a Grid,
    state: &'a TurnState,
}

impl<'a> ShadowEngine<'a> {
    pub fn new(grid: &'a Grid, state: &'a TurnState) -> Self {
        Self { grid, state }
    }

    /// Cells a tree of `size` on `cell` would cover.
    pub fn cast_from(&self, cell: CellId, direction: usize, size: usize) -> &'a [CellId] {
        self.grid.ray(cell, direction, size)
    }

    /// Trees standing on the cells a tree of `size` on `cell` would cover.
    pub fn downwind_trees(
        &self,
        cell: CellId,
        direction: usize,
        size: usize,
    ) -> impl Iterator<Item = Caster<'a>> + 'a {
        let state = self.state;
        self.cast_from(cell, direction, size)
            .iter()
            .enumerate()
            .filter_map(move |(index, &target)| {
                state.tree_at(target).map(|tree| Caster {
                    tree,
                    distance: index + 1,
                })
            })
    }

    /// Trees upwind of `cell`, at most `size` steps away, tall enough to
    /// reach it.
    pub fn shadowed_by(&self, cell: CellId, direction: usize, size: usize) -> Vec<Caster<'a>> {
        self.upwind(cell, direction, size).collect()
    }

    pub fn shadow_cast_on(&self, cell: CellId, direction: usize, size: usize) -> bool {
        self.upwind(cell, direction, size).next().is_some()
    }

    /// Whether anything shades `cell` on `day`.
    pub fn is_shadowed_on(&self, cell: CellId, day: u32) -> bool {
        self.shadow_cast_on(cell, sun_direction(day), MAX_TREE_SIZE as usize)
    }

    /// Sun a tree of `size` on `cell` would collect. Only casters at least as
    /// tall as the tree block it. `ignore` removes one cell from the casters.
    pub fn sun_yield(
        &self,
        cell: CellId,
        size: u8,
        direction: usize,
        ignore: Option<CellId>,
    ) -> u32 {
        if size == 0 {
            return 0;
        }
        let blocked = self
            .upwind(cell, direction, MAX_TREE_SIZE as usize)
            .any(|caster| Some(caster.tree.cell) != ignore && caster.tree.size >= size);
        if blocked {
            0
        } else {
            size as u32
        }
    }

    fn upwind(
        &self,
        cell: CellId,
        direction: usize,
        size: usize,
    ) -> impl Iterator<Item = Caster<'a>> + 'a {
        let state = self.state;
        self.grid
            .ray(cell, opposite(direction), size)
            .iter()
            .enumerate()
            .filter_map(move |(index, &source)| {
                let distance = index + 1;
                state
                    .tree_at(source)
                    .filter(|tree| tree.size as usize >= distance)
                    .map(|tree| Caster { tree, distance })
            })
    }
}
