//! Hexagonal board geometry.
//!
//! The board is handed over once as a list of cell records. Everything the
//! other modules ask for (rings, rays, distances) is computed here at
//! construction and only read afterwards.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type CellId = usize;

/// Number of hex directions; also the length of the sun cycle.
pub const DIRECTIONS: usize = 6;

/// Largest ring radius that is precomputed.
pub const MAX_RADIUS: usize = 3;

const RING_BOUNDS: [usize; MAX_RADIUS] = [6, 12, 18];

/// Cube coordinate offsets, indexed by direction. Direction 0 points east and
/// the others follow counter-clockwise.
const CUBE_DIRECTIONS: [(i32, i32, i32); DIRECTIONS] = [
    (1, -1, 0),
    (1, 0, -1),
    (0, 1, -1),
    (-1, 1, 0),
    (-1, 0, 1),
    (0, -1, 1),
];

/// Raw board description as supplied by the referee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellRecord {
    pub id: CellId,
    pub richness: u8,
    /// Neighbour id per direction, `-1` at the board edge.
    pub neighbors: [i32; DIRECTIONS],
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    pub id: CellId,
    pub richness: u8,
    pub neighbors: [Option<CellId>; DIRECTIONS],
}

impl Cell {
    /// Cells with richness 0 can never hold a tree.
    pub fn is_usable(&self) -> bool {
        self.richness > 0
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GridError {
    #[error("board has no cells")]
    Empty,
    #[error("cell record #{index} carries id {id}; records must be listed by id")]
    OutOfOrder { index: usize, id: CellId },
    #[error("cell {cell} has richness {richness}, expected 0..=3")]
    Richness { cell: CellId, richness: u8 },
    #[error("cell {cell} points to unknown neighbour {neighbor} in direction {direction}")]
    UnknownNeighbor {
        cell: CellId,
        direction: usize,
        neighbor: i32,
    },
    #[error("cell {cell} has {found} cells at distance {radius}; a hex board allows {bound}")]
    RingOverflow {
        cell: CellId,
        radius: usize,
        found: usize,
        bound: usize,
    },
}

/// Immutable board with precomputed rings and rays.
#[derive(Debug, Clone)]
pub struct Grid {
    cells: Vec<Cell>,
    rings: Vec<[Vec<CellId>; MAX_RADIUS]>,
    rays: Vec<[Vec<CellId>; DIRECTIONS]>,
}

impl Grid {
    pub fn from_records(records: &[CellRecord]) -> Result<Self, GridError> {
        if records.is_empty() {
            return Err(GridError::Empty);
        }

        let count = records.len();
        let mut cells = Vec::with_capacity(count);
        for (index, record) in records.iter().enumerate() {
            if record.id != index {
                return Err(GridError::OutOfOrder {
                    index,
                    id: record.id,
                });
            }
            if record.richness > 3 {
                return Err(GridError::Richness {
                    cell: record.id,
                    richness: record.richness,
                });
            }
            let mut neighbors = [None; DIRECTIONS];
            for (direction, &raw) in record.neighbors.iter().enumerate() {
                neighbors[direction] = match raw {
                    -1 => None,
                    id if id >= 0 && (id as usize) < count => Some(id as usize),
                    neighbor => {
                        return Err(GridError::UnknownNeighbor {
                            cell: record.id,
                            direction,
                            neighbor,
                        })
                    }
                };
            }
            cells.push(Cell {
                id: record.id,
                richness: record.richness,
                neighbors,
            });
        }

        let mut rings = Vec::with_capacity(count);
        for origin in 0..count {
            rings.push(bounded_rings(&cells, origin)?);
        }

        let rays = (0..count)
            .map(|origin| std::array::from_fn(|direction| walk_ray(&cells, origin, direction)))
            .collect();

        Ok(Self { cells, rings, rays })
    }

    /// The referee's default board: 37 cells numbered in a spiral from the
    /// centre, richness 3 on the inner two rings, 2 on ring 2, 1 on ring 3.
    pub fn standard() -> Result<Self, GridError> {
        Self::from_records(&standard_records())
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn cell(&self, id: CellId) -> &Cell {
        &self.cells[id]
    }

    pub fn contains(&self, id: CellId) -> bool {
        id < self.cells.len()
    }

    pub fn neighbor(&self, cell: CellId, direction: usize) -> Option<CellId> {
        self.cells[cell].neighbors[direction % DIRECTIONS]
    }

    /// Cells at exactly `radius` steps. Empty outside `1..=MAX_RADIUS`.
    pub fn ring(&self, cell: CellId, radius: usize) -> &[CellId] {
        match radius {
            1..=MAX_RADIUS => &self.rings[cell][radius - 1],
            _ => &[],
        }
    }

    /// Cells at distance `1..=radius`, nearest ring first.
    pub fn within(&self, cell: CellId, radius: usize) -> impl Iterator<Item = CellId> + '_ {
        (1..=radius.min(MAX_RADIUS)).flat_map(move |r| self.ring(cell, r).iter().copied())
    }

    /// Cells met by repeatedly stepping in `direction`, at most `max_len`.
    pub fn ray(&self, cell: CellId, direction: usize, max_len: usize) -> &[CellId] {
        let ray = &self.rays[cell][direction % DIRECTIONS];
        &ray[..max_len.min(ray.len())]
    }

    /// Ring distance between two cells, `None` when further than `MAX_RADIUS`.
    pub fn distance(&self, a: CellId, b: CellId) -> Option<usize> {
        if a == b {
            return Some(0);
        }
        (1..=MAX_RADIUS).find(|&radius| self.ring(a, radius).contains(&b))
    }
}

fn bounded_rings(cells: &[Cell], origin: CellId) -> Result<[Vec<CellId>; MAX_RADIUS], GridError> {
    let mut distance = vec![usize::MAX; cells.len()];
    let mut queue = VecDeque::new();
    let mut rings: [Vec<CellId>; MAX_RADIUS] = Default::default();

    distance[origin] = 0;
    queue.push_back(origin);
    while let Some(current) = queue.pop_front() {
        let next = distance[current] + 1;
        if next > MAX_RADIUS {
            continue;
        }
        for neighbor in cells[current].neighbors.iter().flatten().copied() {
            if distance[neighbor] <= next {
                continue;
            }
            distance[neighbor] = next;
            rings[next - 1].push(neighbor);
            queue.push_back(neighbor);
        }
    }

    for (index, ring) in rings.iter().enumerate() {
        if ring.len() > RING_BOUNDS[index] {
            return Err(GridError::RingOverflow {
                cell: origin,
                radius: index + 1,
                found: ring.len(),
                bound: RING_BOUNDS[index],
            });
        }
    }
    Ok(rings)
}

fn walk_ray(cells: &[Cell], origin: CellId, direction: usize) -> Vec<CellId> {
    let mut ray = Vec::new();
    let mut current = cells[origin].neighbors[direction];
    while let Some(cell) = current {
        // A malformed board could loop back on itself.
        if cell == origin || ray.len() >= cells.len() {
            break;
        }
        ray.push(cell);
        current = cells[cell].neighbors[direction];
    }
    ray
}

fn cube_step(coord: (i32, i32, i32), direction: usize) -> (i32, i32, i32) {
    let (dx, dy, dz) = CUBE_DIRECTIONS[direction];
    (coord.0 + dx, coord.1 + dy, coord.2 + dz)
}

fn cube_length(coord: (i32, i32, i32)) -> i32 {
    (coord.0.abs() + coord.1.abs() + coord.2.abs()) / 2
}

/// Records of the default board, laid out the way the referee numbers it.
pub fn standard_records() -> Vec<CellRecord> {
    let mut coords = vec![(0, 0, 0)];
    let mut coord = cube_step((0, 0, 0), 0);
    for distance in 1..=MAX_RADIUS {
        for orientation in 0..DIRECTIONS {
            for _ in 0..distance {
                coords.push(coord);
                coord = cube_step(coord, (orientation + 2) % DIRECTIONS);
            }
        }
        coord = cube_step(coord, 0);
    }

    coords
        .iter()
        .enumerate()
        .map(|(id, &coord)| {
            let neighbors = std::array::from_fn(|direction| {
                let target = cube_step(coord, direction);
                coords
                    .iter()
                    .position(|&c| c == target)
                    .map_or(-1, |index| index as i32)
            });
            let richness = match cube_length(coord) {
                0 | 1 => 3,
                2 => 2,
                _ => 1,
            };
            CellRecord {
                id,
                richness,
                neighbors,
            }
        })
        .collect()
}
