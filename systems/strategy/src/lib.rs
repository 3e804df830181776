#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Decision cascade choosing the controlled agent's move for every tick.
//!
//! The cascade runs in a fixed order and the first step with an opinion
//! wins: flee home, attack a nearby trail, collect a bonus, capture
//! territory, and finally any legal direction. Directions the forward
//! simulator marks as lethal are removed before any step looks at them.

mod config;
mod context;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, warn};
use trailrunner_core::{CellCoord, Decision, Direction, GridConfig, TickSnapshot};
use trailrunner_system_navigator::Navigator;
use trailrunner_system_predictor::Predictor;

pub use config::{BotConfig, ConfigError};
use context::TickContext;

/// Golden-ratio increment spreading consecutive ticks across the seed space.
const TICK_SEED_STRIDE: u64 = 0x9E37_79B9_7F4A_7C15;

/// Stateful decision maker for one game.
#[derive(Debug)]
pub struct Strategy {
    config: BotConfig,
    grid: GridConfig,
    predictor: Predictor,
    navigator: Navigator,
    last_heading: Option<Direction>,
}

impl Strategy {
    /// Creates a strategy for a game played on `grid`.
    #[must_use]
    pub fn new(grid: GridConfig, config: BotConfig) -> Self {
        Self {
            predictor: Predictor::new(config.predictor_depth, config.interaction_radius),
            navigator: Navigator::new(grid),
            last_heading: None,
            grid,
            config,
        }
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &BotConfig {
        &self.config
    }

    /// Grid the game is played on.
    #[must_use]
    pub const fn grid(&self) -> &GridConfig {
        &self.grid
    }

    /// Chooses the move for the provided tick.
    ///
    /// Returns `None` when the snapshot does not contain the controlled agent.
    pub fn decide(&mut self, snapshot: &TickSnapshot) -> Option<Decision> {
        let me = snapshot.controlled()?;
        let heading = me.heading.or(self.last_heading);
        let mut context = TickContext::new(self.grid, snapshot, me, heading);

        let decision = if context.legal.is_empty() {
            let direction = heading.unwrap_or(Direction::Left);
            warn!(tick = snapshot.tick(), %direction, "no legal direction left");
            Decision::new(direction, "boxed in")
        } else {
            let lethal = self.predictor.death_directions(&self.grid, snapshot, heading);
            context.safe = context.legal.difference(lethal);
            self.cascade(&context)
        };

        debug!(
            tick = snapshot.tick(),
            direction = %decision.direction,
            note = %decision.note,
            "decided"
        );
        self.last_heading = Some(decision.direction);
        Some(decision)
    }

    fn cascade(&mut self, context: &TickContext<'_>) -> Decision {
        if let Some(direction) = self.flee(context) {
            return Decision::new(direction, "fleeing");
        }
        if let Some(direction) = self.attack(context) {
            return Decision::new(direction, "attacking");
        }
        if let Some(direction) = self.collect_bonus(context) {
            return Decision::new(direction, "collecting bonus");
        }
        if let Some(direction) = self.capture(context) {
            return Decision::new(direction, "capturing territory");
        }
        Decision::new(context.fallback(), "no plan")
    }

    fn flee(&mut self, context: &TickContext<'_>) -> Option<Direction> {
        if context.safe.is_empty() {
            return Some(match context.closest_home() {
                Some((home, _)) => self.steer(context, home),
                None => context.fallback(),
            });
        }
        if context.safe.len() == 1 {
            return context.safe.first();
        }

        let (home, distance) = context.closest_home()?;
        if distance < 2 {
            return None;
        }
        let threshold = distance + self.config.reassurance_distance;
        let threatened = context.opponents().any(|opponent| {
            home.manhattan_distance(opponent.cell) <= threshold
                || context
                    .trail
                    .iter()
                    .any(|cell| cell.manhattan_distance(opponent.cell) <= threshold)
        });

        threatened.then(|| self.steer(context, home))
    }

    fn attack(&mut self, context: &TickContext<'_>) -> Option<Direction> {
        let grid = self.grid;
        let target = context.opponents().find_map(|opponent| {
            opponent
                .player
                .trail
                .iter()
                .map(|point| grid.discretize(*point))
                .map(|cell| (cell, context.cell.manhattan_distance(cell)))
                .min_by_key(|(_, distance)| *distance)
                .filter(|(_, distance)| *distance <= self.config.attack_range)
                .map(|(cell, _)| cell)
        })?;

        Some(self.steer(context, target))
    }

    fn collect_bonus(&mut self, context: &TickContext<'_>) -> Option<Direction> {
        let target = context
            .snapshot
            .bonuses()
            .iter()
            .filter(|bonus| bonus.kind.is_beneficial())
            .map(|bonus| self.grid.discretize(bonus.position))
            .find(|cell| context.cell.manhattan_distance(*cell) <= self.config.bonus_range)?;

        Some(self.steer(context, target))
    }

    fn capture(&mut self, context: &TickContext<'_>) -> Option<Direction> {
        if context.trail.len() > self.config.capture_trail_limit {
            let (closest, distance) = context.closest_home()?;
            let target = if distance == 1 {
                closest
            } else {
                context.furthest_home()?.0
            };
            return Some(self.steer(context, target));
        }

        if !context.trail.is_empty() {
            let (home, _) = context.closest_home()?;
            let mirrored = CellCoord::new(
                2 * context.cell.x() - home.x(),
                2 * context.cell.y() - home.y(),
            );
            return Some(self.steer(context, mirrored));
        }

        let foreign = context.opponents().find_map(|opponent| {
            opponent
                .player
                .territory
                .first()
                .map(|point| self.grid.discretize(*point))
        });
        let Some(target) = foreign else {
            let target = self.exploration_target(context.snapshot.tick());
            return Some(self.steer(context, target));
        };

        let direction = self.steer(context, target);
        let next = context.cell.step(direction);
        let exposed = !context.owns(next)
            && context
                .opponents()
                .any(|opponent| opponent.cell.manhattan_distance(next) <= self.config.evasion_distance);
        if exposed {
            let neighbour = context
                .territory
                .iter()
                .copied()
                .find(|cell| cell.manhattan_distance(context.cell) == 1);
            if let Some(neighbour) = neighbour {
                return Some(self.steer(context, neighbour));
            }
        }

        Some(direction)
    }

    /// Navigates toward `target`, keeping to safe directions when any exist.
    fn steer(&mut self, context: &TickContext<'_>, target: CellCoord) -> Direction {
        let planned = self
            .navigator
            .go_to(context.cell, context.heading, &context.trail, target);
        match planned {
            Some(direction) if context.safe.contains(direction) => direction,
            Some(direction) if context.safe.is_empty() => direction,
            _ => {
                let direction = context.fallback();
                warn!(%target, ?planned, %direction, "navigation fell back");
                direction
            }
        }
    }

    fn exploration_target(&self, tick: u32) -> CellCoord {
        let seed = self
            .config
            .seed
            .wrapping_add(u64::from(tick).wrapping_mul(TICK_SEED_STRIDE));
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let width = i32::try_from(self.grid.x_cells_count()).unwrap_or(i32::MAX).max(1);
        let height = i32::try_from(self.grid.y_cells_count()).unwrap_or(i32::MAX).max(1);
        CellCoord::new(rng.gen_range(0..width), rng.gen_range(0..height))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exploration_targets_stay_on_the_grid() {
        let strategy = Strategy::new(GridConfig::new(7, 3, 5, 10), BotConfig::default());
        for tick in 0..200 {
            let target = strategy.exploration_target(tick);
            assert!(strategy.grid().contains(target), "{target} left the grid");
        }
    }

    #[test]
    fn exploration_targets_depend_on_seed_and_tick() {
        let grid = GridConfig::new(31, 31, 5, 10);
        let first = Strategy::new(grid, BotConfig::default());
        let second = Strategy::new(grid, BotConfig::default());

        assert_eq!(first.exploration_target(12), second.exploration_target(12));
        let spread: std::collections::HashSet<CellCoord> =
            (0..16).map(|tick| first.exploration_target(tick)).collect();
        assert!(spread.len() > 1);
    }
}
