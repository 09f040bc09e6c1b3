use canopy::{
    action::Action,
    controller::{Phase, TurnController},
    grid::{CellId, Grid},
    policy::Policy,
    scoring::Scorer,
    state::{TreeRecord, TurnInput},
};

fn mine(cell: CellId, size: u8) -> TreeRecord {
    TreeRecord {
        cell,
        size,
        is_mine: true,
        is_dormant: false,
    }
}

fn theirs(cell: CellId, size: u8) -> TreeRecord {
    TreeRecord {
        is_mine: false,
        ..mine(cell, size)
    }
}

fn dormant(record: TreeRecord) -> TreeRecord {
    TreeRecord {
        is_dormant: true,
        ..record
    }
}

fn turn(day: u32, sun: u32, trees: Vec<TreeRecord>) -> TurnInput {
    TurnInput {
        day,
        nutrients: 20,
        sun,
        score: 0,
        opp_sun: 0,
        opp_score: 0,
        opp_waiting: false,
        trees,
    }
}

fn controller(policy: Policy) -> TurnController {
    TurnController::new(Grid::standard().unwrap(), policy)
}

#[test]
fn empty_board_on_day_zero_waits() {
    let mut controller = controller(Policy::default());
    let action = controller.decide(&turn(0, 0, vec![])).unwrap();
    assert_eq!(action, Action::Wait);
    assert_eq!(controller.phase(), Phase::ActionChosen);
}

#[test]
fn losing_player_completes_an_unshaded_tree() {
    let mut controller = controller(Policy::default());
    let mut input = turn(12, 10, vec![mine(0, 3), dormant(mine(20, 1))]);
    input.opp_score = 20;

    let action = controller.decide(&input).unwrap();
    assert_eq!(action, Action::Complete { cell: 0 });
    let summary = controller.last_decision().unwrap();
    assert_eq!(summary.planner.as_deref(), Some("complete"));
    assert_eq!(summary.score, Some(24.0));
}

#[test]
fn last_day_completes_even_when_ahead() {
    let mut controller = controller(Policy::default());
    let mut input = turn(23, 10, vec![mine(0, 3), mine(20, 1)]);
    input.score = 50;
    assert_eq!(
        controller.decide(&input).unwrap(),
        Action::Complete { cell: 0 }
    );
}

#[test]
fn never_grows_without_enough_sun() {
    // Costs: seed 1 + 1 = 2, size 1 is 3 + 1 = 4, size 2 is 7 + 0 = 7.
    for sun in 0..2 {
        let mut controller = controller(Policy::default());
        let action = controller
            .decide(&turn(5, sun, vec![mine(1, 1), mine(8, 2), mine(20, 0)]))
            .unwrap();
        assert!(
            !matches!(action, Action::Grow { .. }),
            "sun {sun} produced {action}"
        );
    }
}

#[test]
fn last_days_only_grow_trees_that_can_still_mature() {
    let mut controller = controller(Policy::default());
    let mut input = turn(22, 30, vec![mine(20, 1)]);
    input.score = 50;
    assert_eq!(controller.decide(&input).unwrap(), Action::Wait);

    let mut controller = self::controller(Policy::default());
    let mut input = turn(22, 30, vec![mine(20, 1), mine(26, 2)]);
    input.score = 50;
    assert_eq!(controller.decide(&input).unwrap(), Action::Grow { cell: 26 });
}

#[test]
fn seed_goes_next_to_the_bigger_opponent() {
    let mut policy = Policy::default();
    policy.thresholds.seed = 1.0;
    let mut controller = controller(policy);
    let action = controller
        .decide(&turn(5, 0, vec![mine(0, 1), theirs(7, 3)]))
        .unwrap();
    assert_eq!(
        action,
        Action::Seed {
            source: 0,
            target: 1
        }
    );
}

#[test]
fn grow_quota_holds_for_the_day_and_resets_after() {
    let mut policy = Policy::default();
    policy.limits.max_grows_per_day = 1;
    policy.thresholds.seed = 1e6;
    let mut controller = controller(policy);

    let first = controller
        .decide(&turn(5, 100, vec![mine(0, 1), mine(20, 1)]))
        .unwrap();
    assert_eq!(first, Action::Grow { cell: 0 });
    assert_eq!(controller.quotas().grows, 1);

    let second = controller
        .decide(&turn(5, 97, vec![dormant(mine(0, 2)), mine(20, 1)]))
        .unwrap();
    assert_eq!(second, Action::Wait);

    controller
        .update(&turn(6, 97, vec![mine(0, 2), mine(20, 1)]))
        .unwrap();
    assert_eq!(controller.quotas().grows, 0);
    assert_eq!(controller.phase(), Phase::TreesUpdated);
    assert_eq!(controller.choose(), Action::Grow { cell: 0 });
}

#[test]
fn tree_history_survives_between_days() {
    let mut controller = controller(Policy::default());
    controller.update(&turn(10, 0, vec![mine(0, 3)])).unwrap();
    controller.update(&turn(11, 0, vec![mine(0, 3)])).unwrap();
    controller.update(&turn(11, 0, vec![mine(0, 3)])).unwrap();
    let state = controller.state().unwrap();
    assert_eq!(state.tree_at(0).unwrap().history, vec![3, 3]);
}

#[test]
fn seed_memo_is_dropped_on_a_new_day_or_layout() {
    let mut policy = Policy::default();
    policy.thresholds.seed = 1e6;
    let mut controller = controller(policy);

    controller.decide(&turn(3, 5, vec![mine(0, 1)])).unwrap();
    assert!(!controller.seed_cache().is_empty());
    assert_eq!(controller.seed_cache().day(), Some(3));

    // Same day, same layout: memo kept.
    controller.update(&turn(3, 4, vec![mine(0, 1)])).unwrap();
    assert!(!controller.seed_cache().is_empty());

    // Same day, new layout: memo cleared.
    controller
        .update(&turn(3, 4, vec![mine(0, 1), theirs(30, 0)]))
        .unwrap();
    assert!(controller.seed_cache().is_empty());

    controller.decide(&turn(3, 4, vec![mine(0, 1)])).unwrap();
    controller.update(&turn(4, 4, vec![mine(0, 1)])).unwrap();
    assert!(controller.seed_cache().is_empty());
    assert_eq!(controller.seed_cache().day(), Some(4));
}

#[test]
fn chosen_cells_are_always_legal() {
    let mut records = canopy::grid::standard_records();
    for barren in [9, 14, 23, 31] {
        records[barren].richness = 0;
    }
    let grid = Grid::from_records(&records).unwrap();
    let mut policy = Policy::default();
    policy.thresholds.seed = 0.0;
    policy.limits.max_seeds = 3;
    let mut controller = TurnController::new(grid.clone(), policy);

    let layouts = [
        vec![mine(0, 3), mine(2, 2), theirs(10, 1), mine(16, 1)],
        vec![mine(3, 2), theirs(4, 3), dormant(mine(5, 3)), theirs(12, 2)],
        vec![mine(7, 1), mine(8, 0), theirs(1, 2), mine(22, 3)],
    ];
    for day in 0..24 {
        for layout in &layouts {
            let mut input = turn(day, 30, layout.clone());
            input.opp_score = 5;
            let action = controller.decide(&input).unwrap();
            let own_active = |cell: CellId| {
                layout
                    .iter()
                    .any(|t| t.cell == cell && t.is_mine && !t.is_dormant)
            };
            match action {
                Action::Wait => {}
                Action::Grow { cell } | Action::Complete { cell } => {
                    assert!(own_active(cell), "day {day}: {action}")
                }
                Action::Seed { source, target } => {
                    assert!(own_active(source), "day {day}: {action}");
                    assert!(grid.cell(target).is_usable(), "day {day}: {action}");
                    assert!(
                        layout.iter().all(|t| t.cell != target),
                        "day {day}: {action}"
                    );
                    let reach = layout.iter().find(|t| t.cell == source).unwrap().size;
                    let distance = grid.distance(source, target).unwrap();
                    assert!(distance >= 1 && distance <= reach as usize);
                }
            }
        }
    }
}

/// Own fully grown trees on the outer corners, in cell order.
const CORNERS: [CellId; 6] = [19, 22, 25, 28, 31, 34];

fn ahead_with_corners(count: usize) -> TurnInput {
    let trees = CORNERS.iter().take(count).map(|&cell| mine(cell, 3)).collect();
    let mut input = turn(15, 20, trees);
    input.score = 50;
    input.opp_score = 10;
    input
}

#[test]
fn completion_waits_for_the_opening_day() {
    for (day, expected) in [(7, false), (8, true)] {
        let mut controller = controller(Policy::default());
        let mut input = turn(day, 10, vec![mine(0, 3)]);
        input.opp_score = 20;
        let action = controller.decide(&input).unwrap();
        assert_eq!(
            action == Action::Complete { cell: 0 },
            expected,
            "day {day} produced {action}"
        );
    }
}

#[test]
fn completion_needs_enough_sun() {
    for (sun, expected) in [(3, false), (4, true)] {
        let mut controller = controller(Policy::default());
        let mut input = turn(12, sun, vec![mine(0, 3)]);
        input.opp_score = 20;
        let action = controller.decide(&input).unwrap();
        assert_eq!(
            action == Action::Complete { cell: 0 },
            expected,
            "sun {sun} produced {action}"
        );
    }
}

#[test]
fn leader_keeps_the_minimum_of_fully_grown_trees() {
    let mut controller = controller(Policy::default());
    let action = controller.decide(&ahead_with_corners(3)).unwrap();
    assert!(
        !matches!(action, Action::Complete { .. }),
        "three trees produced {action}"
    );
}

#[test]
fn leader_above_the_minimum_harvests_without_waiting_for_shade() {
    // Four trees is above the minimum and under the cap, so any of them
    // may go; cell 28 wins on its shade bonus.
    let mut controller = controller(Policy::default());
    let action = controller.decide(&ahead_with_corners(4)).unwrap();
    assert_eq!(action, Action::Complete { cell: 28 });
    assert_eq!(controller.last_decision().unwrap().score, Some(30.0));
}

#[test]
fn leader_over_the_cap_harvests_only_trees_shaded_tomorrow() {
    let mut controller = controller(Policy::default());
    let action = controller.decide(&ahead_with_corners(6)).unwrap();
    assert_eq!(action, Action::Complete { cell: 34 });

    let grid = Grid::standard().unwrap();
    let policy = Policy::default();
    let scorer = Scorer::new(&grid, controller.state().unwrap(), &policy);
    assert!(scorer.shadows().is_shadowed_on(34, 16));
    // Cell 25 stays in the sun for the next three days and is kept.
    assert!((16..=18).all(|day| !scorer.shadows().is_shadowed_on(25, day)));
}
