//! Heuristic scores for seed targets, grow candidates and complete
//! candidates. Scores only mean something relative to each other.

use crate::{
    grid::{CellId, Grid, DIRECTIONS},
    policy::{Limits, Policy, Weights},
    shadow::{sun_direction, ShadowEngine},
    state::{SizeCounts, Tree, TurnState, MAX_TREE_SIZE},
};

/// Days ahead covered by the short forecasts.
pub const FORECAST_DAYS: u32 = 3;

/// Sun needed to grow a tree of `size` one step, given the current counts.
pub fn grow_cost(size: u8, counts: &SizeCounts) -> u32 {
    let next = size as usize + 1;
    (1u32 << next) - 1 + counts.get(next).copied().unwrap_or(0) as u32
}

/// Days a fully grown tree on soil of `richness` may stand before it is
/// considered overripe.
pub fn overripe_after(richness: u8) -> usize {
    (3usize.saturating_sub(richness as usize)) * 4 + 1
}

pub struct Scorer<'a> {
    grid: &'a Grid,
    state: &'a TurnState,
    shadows: ShadowEngine<'a>,
    limits: &'a Limits,
    weights: &'a Weights,
}

impl<'a> Scorer<'a> {
    pub fn new(grid: &'a Grid, state: &'a TurnState, policy: &'a Policy) -> Self {
        Self {
            grid,
            state,
            shadows: ShadowEngine::new(grid, state),
            limits: &policy.limits,
            weights: &policy.weights,
        }
    }

    pub fn shadows(&self) -> &ShadowEngine<'a> {
        &self.shadows
    }

    /// Shadow a tree of `size` on `cell` would throw on `day`: +1 per
    /// opponent tree covered, -2 per own tree (own trees would shade us back).
    pub fn shadow_impact(&self, cell: CellId, day: u32, size: usize) -> f64 {
        self.shadows
            .downwind_trees(cell, sun_direction(day), size)
            .map(|caster| if caster.tree.is_mine() { -2.0 } else { 1.0 })
            .sum()
    }

    /// Expected shadow impact of a seed planted on `cell` today, assuming it
    /// reaches size 1 two days from now and size 3 four days from now.
    pub fn seed_shadow_forecast(&self, cell: CellId, day: u32) -> f64 {
        let growing: f64 = (2..2 + FORECAST_DAYS)
            .map(|offset| {
                self.shadow_impact(cell, day + offset, (offset - 1) as usize) / offset as f64
            })
            .sum();
        let rotation: f64 = (0..DIRECTIONS as u32)
            .map(|direction| {
                self.shadow_impact(cell, direction, MAX_TREE_SIZE as usize)
                    / self.weights.rotation_damping
            })
            .sum();
        growing + rotation
    }

    /// Penalty for the days the seed itself would sit in shade.
    pub fn seed_shade_penalty(&self, cell: CellId, day: u32) -> f64 {
        (2..2 + FORECAST_DAYS)
            .filter(|&offset| self.shadows.is_shadowed_on(cell, day + offset))
            .map(|offset| 1.0 / offset as f64)
            .sum()
    }

    pub fn seed_score(&self, cell: CellId, day: u32, prefer_unshadowed: bool) -> f64 {
        let target = self.grid.cell(cell);
        if !target.is_usable() || self.state.is_occupied(cell) {
            return 0.0;
        }

        let mut score = target.richness as f64;

        let forecast = self.seed_shadow_forecast(cell, day);
        let penalty = self.seed_shade_penalty(cell, day);
        score += self.weights.shadow_impact * forecast - penalty;
        if forecast == 0.0 && penalty == 0.0 {
            score += if prefer_unshadowed {
                self.weights.preferred_unshadowed_bonus
            } else {
                self.weights.unshadowed_bonus
            };
        }

        for neighbor in target.neighbors.iter().flatten().copied() {
            let richness = self.grid.cell(neighbor).richness;
            score +=
                richness.saturating_sub(1) as f64 / self.weights.neighbor_richness_divisor;
            if let Some(tree) = self.state.tree_at(neighbor) {
                score += if tree.is_mine() {
                    -(tree.size as f64) * richness as f64
                } else {
                    tree.size as f64
                };
            }
        }
        score
    }

    /// True when too few of our standing trees are in the sun today.
    pub fn prefer_unshadowed(&self, day: u32) -> bool {
        let (standing, lit) = self
            .state
            .my_trees()
            .filter(|tree| tree.size > 0)
            .fold((0usize, 0usize), |(standing, lit), tree| {
                let open = !self.shadows.is_shadowed_on(tree.cell, day);
                (standing + 1, lit + open as usize)
            });
        standing > 0 && (lit as f64) < self.weights.unshadowed_ratio * standing as f64
    }

    /// Own sun gained minus opponent sun gained over the next days if `tree`
    /// grew one size now.
    pub fn sun_delta(&self, tree: &Tree, day: u32) -> f64 {
        let next = tree.size + 1;
        let mut own = 0i64;
        let mut opp = 0i64;
        for offset in 1..=FORECAST_DAYS {
            let direction = sun_direction(day + offset);
            let before = self.shadows.sun_yield(tree.cell, tree.size, direction, None) as i64;
            let after = self.shadows.sun_yield(tree.cell, next, direction, None) as i64;
            own += after - before;

            for caster in self
                .shadows
                .downwind_trees(tree.cell, direction, next as usize)
            {
                let other = caster.tree;
                let covered_before =
                    caster.distance <= tree.size as usize && other.size <= tree.size;
                let covered_after = other.size <= next;
                if !covered_after || covered_before {
                    continue;
                }
                let lost = self
                    .shadows
                    .sun_yield(other.cell, other.size, direction, Some(tree.cell))
                    as i64;
                if other.is_mine() {
                    own -= lost;
                } else {
                    opp -= lost;
                }
            }
        }
        (own - opp) as f64
    }

    /// Richness of fresh seeding ground a grown `tree` would reach that no
    /// other own tree reaches yet.
    pub fn seedable_expansion(&self, tree: &Tree) -> f64 {
        let next = tree.size as usize + 1;
        if next > 2 {
            return 0.0;
        }
        let fresh: u32 = self
            .grid
            .ring(tree.cell, next)
            .iter()
            .copied()
            .filter(|&cell| self.grid.cell(cell).is_usable() && !self.state.is_occupied(cell))
            .filter(|&cell| !self.reachable_by_other(cell, tree.cell))
            .map(|cell| self.grid.cell(cell).richness as u32)
            .sum();
        fresh as f64 / self.weights.expansion_divisor
    }

    fn reachable_by_other(&self, cell: CellId, except: CellId) -> bool {
        self.state.my_trees().any(|other| {
            other.cell != except
                && other.size > 0
                && self
                    .grid
                    .distance(other.cell, cell)
                    .map_or(false, |distance| distance <= other.size as usize)
        })
    }

    pub fn grow_score(&self, tree: &Tree, day: u32, counts: &SizeCounts) -> f64 {
        if tree.size >= MAX_TREE_SIZE {
            return 0.0;
        }
        let cost = grow_cost(tree.size, counts) as f64;
        let richness = self.grid.cell(tree.cell).richness as f64;
        let reach = (tree.size + 1) as f64;

        let base = if counts[MAX_TREE_SIZE as usize] < self.limits.max_fully_grown {
            richness * reach * reach
        } else {
            richness.powf(1.5) * reach
        };
        let mut score = base + self.sun_delta(tree, day) - cost + self.seedable_expansion(tree);
        if self.shadows.is_shadowed_on(tree.cell, day + 1) {
            score -= self.weights.shadowed_grow_penalty * cost;
        }
        score
    }

    pub fn complete_score(
        &self,
        tree: &Tree,
        day: u32,
        counts: &SizeCounts,
        nutrients: u32,
        only_if_shadowed: bool,
    ) -> f64 {
        if tree.size < MAX_TREE_SIZE {
            return 0.0;
        }
        let richness = self.grid.cell(tree.cell).richness;
        let shaded = [1, 2, 3].map(|offset| self.shadows.is_shadowed_on(tree.cell, day + offset));

        let mut score = nutrients as f64 + 2.0 * (richness as f64 - 1.0);
        for (is_shaded, bonus) in shaded.iter().zip([10.0, 5.0, 1.0]) {
            if *is_shaded {
                score += bonus;
            }
        }
        if tree.days_at_size() > overripe_after(richness) {
            score += self.weights.overripe_bonus;
        }

        if only_if_shadowed {
            let fully_grown = counts[MAX_TREE_SIZE as usize];
            let [tomorrow, second, third] = shaded;
            let eligible = if fully_grown <= self.limits.min_fully_grown + 1 {
                tomorrow && second && third
            } else if fully_grown + 1 >= self.limits.max_fully_grown {
                tomorrow
            } else {
                tomorrow && (second || third)
            };
            if !eligible {
                return 0.0;
            }
        }
        score
    }
}
