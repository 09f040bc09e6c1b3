use crate::{
    action::Action,
    controller::{Planner, PlannerContext, Proposal},
    grid::CellId,
};

use super::clearing;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedStage {
    /// Runs before growing, and only while we have no seed on the board.
    Opening,
    /// Runs last, after nothing else was worth doing.
    Fallback,
}

/// Plants a seed on the best reachable empty cell.
pub struct SeedPlanner {
    stage: SeedStage,
}

impl SeedPlanner {
    pub fn opening() -> Self {
        Self {
            stage: SeedStage::Opening,
        }
    }

    pub fn fallback() -> Self {
        Self {
            stage: SeedStage::Fallback,
        }
    }
}

impl Planner for SeedPlanner {
    fn name(&self) -> &str {
        match self.stage {
            SeedStage::Opening => "seed_opening",
            SeedStage::Fallback => "seed_fallback",
        }
    }

    fn propose(&mut self, ctx: &mut PlannerContext<'_>) -> Option<Proposal> {
        if !ctx.seeding_allowed() {
            return None;
        }
        let grid = ctx.grid;
        let state = ctx.state;
        if self.stage == SeedStage::Opening && state.my_counts()[0] > 0 {
            return None;
        }
        let scorer = ctx.scorer();
        let prefer_unshadowed = scorer.prefer_unshadowed(state.day);

        let mut best: Option<((CellId, CellId), f64)> = None;
        for tree in state.my_active_trees().filter(|tree| tree.size > 0) {
            for target in grid.within(tree.cell, tree.size as usize) {
                if !grid.cell(target).is_usable() || state.is_occupied(target) {
                    continue;
                }
                let score =
                    ctx.seed_cache
                        .get_or_compute(state.day, target, prefer_unshadowed, || {
                            scorer.seed_score(target, state.day, prefer_unshadowed)
                        });
                if best.map_or(true, |(_, top)| score > top) {
                    best = Some(((tree.cell, target), score));
                }
            }
        }

        clearing(best, ctx.policy.thresholds.seed).map(|((source, target), score)| Proposal {
            action: Action::Seed { source, target },
            score,
        })
    }
}
