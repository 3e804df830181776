use trailrunner_core::{
    BonusKind, BonusSnapshot, Decision, Direction, GridConfig, PixelPoint, PlayerId,
    PlayerSnapshot, TickSnapshot,
};
use trailrunner_system_strategy::{BotConfig, Strategy};

fn pixel(x: i32, y: i32) -> PixelPoint {
    PixelPoint::new(x * 10 + 5, y * 10 + 5)
}

fn pixels(points: &[(i32, i32)]) -> Vec<PixelPoint> {
    points.iter().map(|&(x, y)| pixel(x, y)).collect()
}

fn block(x: std::ops::RangeInclusive<i32>, y: std::ops::RangeInclusive<i32>) -> Vec<PixelPoint> {
    y.flat_map(|y| x.clone().map(move |x| pixel(x, y))).collect()
}

fn player(
    id: u32,
    at: (i32, i32),
    heading: Option<Direction>,
    trail: &[(i32, i32)],
    territory: Vec<PixelPoint>,
) -> PlayerSnapshot {
    PlayerSnapshot {
        id: PlayerId::new(id),
        position: pixel(at.0, at.1),
        heading,
        trail: pixels(trail),
        territory,
        score: 0,
        bonuses: Vec::new(),
    }
}

fn decide(grid: GridConfig, config: BotConfig, snapshot: &TickSnapshot) -> Decision {
    Strategy::new(grid, config)
        .decide(snapshot)
        .expect("controlled agent present")
}

fn small_grid() -> GridConfig {
    GridConfig::new(10, 10, 5, 10)
}

fn large_grid() -> GridConfig {
    GridConfig::new(20, 20, 5, 10)
}

#[test]
fn missing_controlled_agent_yields_no_decision() {
    let snapshot = TickSnapshot::new(
        3,
        vec![player(2, (4, 4), Some(Direction::Up), &[], Vec::new())],
        Vec::new(),
    );
    let mut strategy = Strategy::new(small_grid(), BotConfig::default());

    assert_eq!(strategy.decide(&snapshot), None);
}

#[test]
fn boxed_in_agent_keeps_its_heading() {
    let snapshot = TickSnapshot::new(
        9,
        vec![player(
            0,
            (0, 0),
            Some(Direction::Down),
            &[(1, 0), (0, 1)],
            Vec::new(),
        )],
        Vec::new(),
    );

    let decision = decide(small_grid(), BotConfig::default(), &snapshot);

    assert_eq!(decision, Decision::new(Direction::Down, "boxed in"));
}

#[test]
fn single_safe_direction_is_taken() {
    let config = BotConfig {
        predictor_depth: 1,
        ..BotConfig::default()
    };
    let snapshot = TickSnapshot::new(
        5,
        vec![
            player(0, (0, 1), Some(Direction::Down), &[(0, 3), (0, 2)], Vec::new()),
            player(
                1,
                (1, 2),
                Some(Direction::Down),
                &[(2, 2), (2, 3), (1, 3)],
                Vec::new(),
            ),
        ],
        Vec::new(),
    );

    let decision = decide(small_grid(), config, &snapshot);

    assert_eq!(decision, Decision::new(Direction::Down, "fleeing"));
}

#[test]
fn threatened_trail_heads_home() {
    let snapshot = TickSnapshot::new(
        11,
        vec![
            player(
                0,
                (5, 5),
                Some(Direction::Right),
                &[(3, 5), (4, 5)],
                block(0..=2, 4..=6),
            ),
            player(1, (6, 9), Some(Direction::Left), &[], Vec::new()),
        ],
        Vec::new(),
    );

    let decision = decide(large_grid(), BotConfig::default(), &snapshot);

    assert_eq!(decision.note, "fleeing");
    assert!(matches!(decision.direction, Direction::Up | Direction::Down));
}

#[test]
fn nearby_opponent_trail_is_attacked() {
    let config = BotConfig {
        predictor_depth: 2,
        ..BotConfig::default()
    };
    let snapshot = TickSnapshot::new(
        20,
        vec![
            player(0, (2, 2), Some(Direction::Right), &[], block(1..=3, 1..=3)),
            player(
                1,
                (4, 6),
                Some(Direction::Up),
                &[(4, 2), (4, 3), (4, 4), (4, 5)],
                Vec::new(),
            ),
        ],
        Vec::new(),
    );

    let decision = decide(large_grid(), config, &snapshot);

    assert_eq!(decision, Decision::new(Direction::Right, "attacking"));
}

#[test]
fn beneficial_bonus_is_collected_and_slow_is_ignored() {
    let snapshot = TickSnapshot::new(
        30,
        vec![player(0, (2, 2), Some(Direction::Right), &[], block(1..=3, 1..=3))],
        vec![
            BonusSnapshot {
                kind: BonusKind::Slow,
                position: pixel(3, 2),
            },
            BonusSnapshot {
                kind: BonusKind::Saw,
                position: pixel(2, 4),
            },
        ],
    );

    let decision = decide(large_grid(), BotConfig::default(), &snapshot);

    assert_eq!(decision, Decision::new(Direction::Up, "collecting bonus"));
}

#[test]
fn idle_agent_sets_out_toward_opponent_territory() {
    let snapshot = TickSnapshot::new(
        40,
        vec![
            player(0, (2, 2), Some(Direction::Right), &[], block(1..=3, 1..=3)),
            player(1, (15, 15), Some(Direction::Left), &[], block(14..=16, 14..=16)),
        ],
        Vec::new(),
    );

    let decision = decide(large_grid(), BotConfig::default(), &snapshot);

    assert_eq!(decision, Decision::new(Direction::Right, "capturing territory"));
}

#[test]
fn short_trail_keeps_moving_away_from_home() {
    let snapshot = TickSnapshot::new(
        41,
        vec![player(
            0,
            (5, 5),
            Some(Direction::Up),
            &[(5, 3), (5, 4)],
            pixels(&[(5, 2), (4, 2), (6, 2)]),
        )],
        Vec::new(),
    );

    let decision = decide(large_grid(), BotConfig::default(), &snapshot);

    assert_eq!(decision, Decision::new(Direction::Up, "capturing territory"));
}

#[test]
fn long_trail_closes_the_loop_next_to_home() {
    let trail: Vec<(i32, i32)> = (1..=11).map(|y| (5, y)).collect();
    let snapshot = TickSnapshot::new(
        42,
        vec![player(
            0,
            (5, 12),
            Some(Direction::Up),
            &trail,
            pixels(&[(5, 13), (6, 13)]),
        )],
        Vec::new(),
    );

    let decision = decide(large_grid(), BotConfig::default(), &snapshot);

    assert_eq!(decision, Decision::new(Direction::Up, "capturing territory"));
}

#[test]
fn decisions_are_reproducible_for_equal_seeds() {
    let snapshot = TickSnapshot::new(
        77,
        vec![player(0, (8, 8), Some(Direction::Left), &[], block(7..=9, 7..=9))],
        Vec::new(),
    );

    let first = decide(large_grid(), BotConfig::default(), &snapshot);
    let second = decide(large_grid(), BotConfig::default(), &snapshot);

    assert_eq!(first, second);
    assert_ne!(first.direction, Direction::Right);
}

#[test]
fn exposed_exit_steps_back_along_home_edge() {
    let snapshot = TickSnapshot::new(
        43,
        vec![
            player(0, (3, 2), Some(Direction::Right), &[], block(1..=3, 1..=3)),
            player(1, (7, 2), Some(Direction::Left), &[], block(15..=17, 15..=17)),
        ],
        Vec::new(),
    );

    let decision = decide(large_grid(), BotConfig::default(), &snapshot);

    assert_eq!(decision, Decision::new(Direction::Down, "capturing territory"));
}

#[test]
fn no_safe_direction_still_heads_home() {
    let snapshot = TickSnapshot::new(
        44,
        vec![
            player(
                0,
                (0, 1),
                Some(Direction::Down),
                &[(0, 3), (0, 2)],
                pixels(&[(1, 0)]),
            ),
            player(
                1,
                (1, 2),
                Some(Direction::Down),
                &[(1, 1), (2, 1), (2, 2), (2, 3), (1, 3)],
                Vec::new(),
            ),
        ],
        Vec::new(),
    );

    let decision = decide(small_grid(), BotConfig::default(), &snapshot);

    assert_eq!(decision, Decision::new(Direction::Down, "fleeing"));
}

#[test]
fn lethal_first_step_is_replaced_by_first_safe_direction() {
    let config = BotConfig {
        predictor_depth: 1,
        ..BotConfig::default()
    };
    let snapshot = TickSnapshot::new(
        45,
        vec![
            player(0, (5, 5), Some(Direction::Up), &[(5, 3), (5, 4)], Vec::new()),
            player(
                1,
                (5, 7),
                Some(Direction::Down),
                &[(4, 7), (4, 8), (5, 8), (6, 8), (6, 7)],
                Vec::new(),
            ),
        ],
        Vec::new(),
    );

    let decision = decide(large_grid(), config, &snapshot);

    assert_eq!(decision, Decision::new(Direction::Left, "attacking"));
}
