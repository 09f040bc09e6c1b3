use std::collections::HashMap;
use std::time::Instant;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::{
    action::Action,
    grid::{CellId, Grid},
    planners::{CompletePlanner, GrowPlanner, SeedPlanner},
    policy::Policy,
    scoring::Scorer,
    state::{InputError, SizeCounts, TurnInput, TurnState, MAX_TREE_SIZE},
    trace::TraceWriter,
};

/// Where the controller stands within the current request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    NotStarted,
    TreesUpdated,
    ActionChosen,
}

/// Actions already spent today. Reset only when the day index changes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DayQuotas {
    day: Option<u32>,
    pub grows: u32,
    pub seeds: u32,
}

impl DayQuotas {
    /// Moves to `day`, clearing the counters if it is a new one.
    pub fn roll_over(&mut self, day: u32) -> bool {
        if self.day == Some(day) {
            return false;
        }
        *self = Self {
            day: Some(day),
            ..Self::default()
        };
        true
    }

    pub fn charge(&mut self, action: &Action) {
        match action {
            Action::Grow { .. } => self.grows += 1,
            Action::Seed { .. } => self.seeds += 1,
            Action::Complete { .. } | Action::Wait => {}
        }
    }

    pub fn day(&self) -> Option<u32> {
        self.day
    }
}

/// Seed scores memoised for one day (and one tree layout).
#[derive(Debug, Default)]
pub struct SeedScoreCache {
    day: Option<u32>,
    scores: HashMap<(CellId, bool), f64>,
}

impl SeedScoreCache {
    pub fn get_or_compute(
        &mut self,
        day: u32,
        cell: CellId,
        prefer_unshadowed: bool,
        compute: impl FnOnce() -> f64,
    ) -> f64 {
        if self.day != Some(day) {
            self.reset(day);
        }
        *self
            .scores
            .entry((cell, prefer_unshadowed))
            .or_insert_with(compute)
    }

    pub fn reset(&mut self, day: u32) {
        self.day = Some(day);
        self.scores.clear();
    }

    pub fn clear(&mut self) {
        self.scores.clear();
    }

    pub fn day(&self) -> Option<u32> {
        self.day
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }
}

/// Read access to the turn plus the mutable memo, handed to each planner.
pub struct PlannerContext<'a> {
    pub grid: &'a Grid,
    pub state: &'a TurnState,
    pub policy: &'a Policy,
    pub quotas: &'a DayQuotas,
    pub seed_cache: &'a mut SeedScoreCache,
}

impl<'a> PlannerContext<'a> {
    pub fn scorer(&self) -> Scorer<'a> {
        Scorer::new(self.grid, self.state, self.policy)
    }

    pub fn seeding_allowed(&self) -> bool {
        let limits = &self.policy.limits;
        let seeds = self.state.my_counts()[0];
        self.state.days_left() > limits.seed_stop_days
            && seeds < limits.max_seeds
            && seeds as u32 <= self.state.me.sun
            && self.state.my_tree_count() < limits.max_trees
            && self.quotas.seeds < limits.max_seeds_per_day
    }

    pub fn growth_allowed(&self) -> bool {
        self.quotas.grows < self.policy.limits.max_grows_per_day
    }

    /// Smallest size still worth growing; rises over the last days.
    pub fn min_grow_size(&self) -> u8 {
        (MAX_TREE_SIZE as u32).saturating_sub(self.state.days_left()) as u8
    }

    pub fn completion_allowed(&self) -> bool {
        let limits = &self.policy.limits;
        let state = self.state;
        let fully_grown = state.my_counts()[MAX_TREE_SIZE as usize];
        fully_grown > 0
            && state.me.sun >= limits.complete_cost
            && state.day >= limits.complete_opening_day
            && (state.me.score <= state.opponent.score
                || fully_grown > limits.min_fully_grown
                || state.is_last_day())
    }

    /// Over the cap, only harvest trees about to be shaded. The last day
    /// harvests everything.
    pub fn only_if_shadowed(&self) -> bool {
        !self.state.is_last_day()
            && self.state.my_counts()[MAX_TREE_SIZE as usize] > self.policy.limits.max_fully_grown
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Proposal {
    pub action: Action,
    pub score: f64,
}

/// One stage of the decision pipeline. Stages run in order and the first
/// proposal wins.
pub trait Planner {
    fn name(&self) -> &str;
    fn propose(&mut self, ctx: &mut PlannerContext<'_>) -> Option<Proposal>;
}

#[derive(Clone, Debug, Serialize)]
pub struct PlannerReport {
    pub name: String,
    pub score: Option<f64>,
    pub duration_ms: f64,
}

#[derive(Clone, Debug, Serialize)]
pub struct DecisionSummary {
    pub turn: u64,
    pub day: u32,
    pub action: Action,
    pub planner: Option<String>,
    pub score: Option<f64>,
    pub sun: u32,
    pub my_counts: SizeCounts,
    pub quotas: DayQuotas,
    pub reports: Vec<PlannerReport>,
}

pub struct ControllerBuilder {
    grid: Grid,
    policy: Policy,
    planners: Vec<Box<dyn Planner>>,
    trace: Option<TraceWriter>,
}

impl ControllerBuilder {
    pub fn new(grid: Grid, policy: Policy) -> Self {
        Self {
            grid,
            policy,
            planners: Vec::new(),
            trace: None,
        }
    }

    pub fn with_planner(mut self, planner: impl Planner + 'static) -> Self {
        self.planners.push(Box::new(planner));
        self
    }

    /// Complete, first seed, grow, any seed.
    pub fn with_default_planners(self) -> Self {
        self.with_planner(CompletePlanner::new())
            .with_planner(SeedPlanner::opening())
            .with_planner(GrowPlanner::new())
            .with_planner(SeedPlanner::fallback())
    }

    pub fn with_trace(mut self, writer: TraceWriter) -> Self {
        self.trace = Some(writer);
        self
    }

    pub fn build(self) -> TurnController {
        TurnController {
            grid: self.grid,
            policy: self.policy,
            planners: self.planners,
            trace: self.trace,
            state: None,
            phase: Phase::NotStarted,
            quotas: DayQuotas::default(),
            seed_cache: SeedScoreCache::default(),
            turn: 0,
            last_decision: None,
        }
    }
}

pub struct TurnController {
    grid: Grid,
    policy: Policy,
    planners: Vec<Box<dyn Planner>>,
    trace: Option<TraceWriter>,
    state: Option<TurnState>,
    phase: Phase,
    quotas: DayQuotas,
    seed_cache: SeedScoreCache,
    turn: u64,
    last_decision: Option<DecisionSummary>,
}

impl TurnController {
    /// Controller with the standard planner pipeline.
    pub fn new(grid: Grid, policy: Policy) -> Self {
        ControllerBuilder::new(grid, policy)
            .with_default_planners()
            .build()
    }

    pub fn decide(&mut self, input: &TurnInput) -> Result<Action, InputError> {
        self.update(input)?;
        Ok(self.choose())
    }

    /// Replaces the tree set with `input`, migrating tree history and
    /// resetting daily quotas when the day has changed.
    pub fn update(&mut self, input: &TurnInput) -> Result<(), InputError> {
        let state = TurnState::ingest(&self.grid, input, self.state.as_ref())?;

        if self.quotas.roll_over(state.day) {
            self.seed_cache.reset(state.day);
            info!(day = state.day, sun = state.me.sun, "new day");
        } else if !self
            .state
            .as_ref()
            .map_or(false, |previous| previous.same_layout(&state))
        {
            self.seed_cache.clear();
        }

        self.state = Some(state);
        self.phase = Phase::TreesUpdated;
        Ok(())
    }

    /// Runs the planners against the last ingested state. Falls back to
    /// `Wait` when nothing clears its threshold.
    pub fn choose(&mut self) -> Action {
        match self.phase {
            Phase::NotStarted => return Action::Wait,
            Phase::ActionChosen => {
                return self
                    .last_decision
                    .as_ref()
                    .map_or(Action::Wait, |decision| decision.action)
            }
            Phase::TreesUpdated => {}
        }
        let Some(state) = self.state.as_ref() else {
            return Action::Wait;
        };

        let mut ctx = PlannerContext {
            grid: &self.grid,
            state,
            policy: &self.policy,
            quotas: &self.quotas,
            seed_cache: &mut self.seed_cache,
        };

        let mut reports = Vec::with_capacity(self.planners.len());
        let mut chosen = None;
        for planner in self.planners.iter_mut() {
            let start = Instant::now();
            let proposal = planner.propose(&mut ctx);
            let elapsed = start.elapsed();
            debug!(
                planner = planner.name(),
                score = ?proposal.map(|p| p.score),
                "planner ran"
            );
            reports.push(PlannerReport {
                name: planner.name().to_string(),
                score: proposal.map(|p| p.score),
                duration_ms: elapsed.as_secs_f64() * 1_000.0,
            });
            if let Some(proposal) = proposal {
                chosen = Some((planner.name().to_string(), proposal));
                break;
            }
        }

        let action = chosen.as_ref().map_or(Action::Wait, |(_, p)| p.action);
        self.quotas.charge(&action);
        self.turn += 1;

        let summary = DecisionSummary {
            turn: self.turn,
            day: state.day,
            action,
            planner: chosen.as_ref().map(|(name, _)| name.clone()),
            score: chosen.as_ref().map(|(_, p)| p.score),
            sun: state.me.sun,
            my_counts: state.my_counts(),
            quotas: self.quotas.clone(),
            reports,
        };
        info!(turn = self.turn, day = state.day, %action, "decision");

        if let Some(writer) = &self.trace {
            if let Err(err) = writer.maybe_write(state, &summary) {
                warn!(turn = self.turn, error = %err, "failed to write decision trace");
            }
        }

        self.last_decision = Some(summary);
        self.phase = Phase::ActionChosen;
        action
    }

    pub fn state(&self) -> Option<&TurnState> {
        self.state.as_ref()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn quotas(&self) -> &DayQuotas {
        &self.quotas
    }

    pub fn seed_cache(&self) -> &SeedScoreCache {
        &self.seed_cache
    }

    pub fn last_decision(&self) -> Option<&DecisionSummary> {
        self.last_decision.as_ref()
    }
}
