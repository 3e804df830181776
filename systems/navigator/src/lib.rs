#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Uniform-cost navigator that picks the next move toward a target cell.
//!
//! Only the navigating agent's own trail is an obstacle. Continuing straight
//! costs slightly less than turning, which favours long straight runs over
//! zig-zags of the same length without changing which routes are shortest.

use std::{cmp::Reverse, collections::BinaryHeap};

use trailrunner_core::{CellCoord, Direction, GridConfig, RivalHead};

/// Upper bound on reconstructed route length.
pub const STEP_WATCHDOG: usize = 500;

/// Cost of a step that keeps the current heading.
const STRAIGHT_COST: u32 = 99;
/// Cost of a step that changes heading.
const TURN_COST: u32 = 100;

/// Cheapest discovered route toward a target.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Route {
    /// Direction of the first step from the start cell.
    pub first: Direction,
    /// Number of steps from the start cell to the target.
    pub length: usize,
}

#[derive(Clone, Copy, Debug)]
struct Label {
    direction: Option<Direction>,
    cost: u32,
}

/// Grid navigator that reuses its search buffers between requests.
#[derive(Debug)]
pub struct Navigator {
    config: GridConfig,
    labels: Vec<Option<Label>>,
    frontier: BinaryHeap<Reverse<(u32, u64, CellCoord)>>,
    sequence: u64,
}

impl Navigator {
    /// Creates a navigator for the provided grid.
    #[must_use]
    pub fn new(config: GridConfig) -> Self {
        Self {
            config,
            labels: Vec::new(),
            frontier: BinaryHeap::new(),
            sequence: 0,
        }
    }

    /// Grid the navigator plans on.
    #[must_use]
    pub const fn config(&self) -> &GridConfig {
        &self.config
    }

    /// First direction of the cheapest route from `start` to `target`.
    ///
    /// Returns `None` when the target is unreachable, equals the start, or the
    /// reconstructed route exceeds [`STEP_WATCHDOG`] steps.
    pub fn go_to(
        &mut self,
        start: CellCoord,
        heading: Option<Direction>,
        trail: &[CellCoord],
        target: CellCoord,
    ) -> Option<Direction> {
        self.route(start, heading, trail, target, &[])
            .map(|route| route.first)
    }

    /// Like [`Navigator::go_to`], additionally refusing to step onto rival heads
    /// whose trail is no longer than `trail`.
    pub fn go_to_avoiding(
        &mut self,
        start: CellCoord,
        heading: Option<Direction>,
        trail: &[CellCoord],
        target: CellCoord,
        rivals: &[RivalHead],
    ) -> Option<Direction> {
        self.route(start, heading, trail, target, rivals)
            .map(|route| route.first)
    }

    /// Cheapest discovered route from `start` to `target`.
    pub fn route(
        &mut self,
        start: CellCoord,
        heading: Option<Direction>,
        trail: &[CellCoord],
        target: CellCoord,
        rivals: &[RivalHead],
    ) -> Option<Route> {
        if start == target || !self.config.contains(start) {
            return None;
        }

        self.reset();
        self.relax(start, heading, 0);

        while let Some(Reverse((cost, _, cell))) = self.frontier.pop() {
            let Some(label) = self.label(cell) else {
                continue;
            };
            if cost > label.cost {
                continue;
            }
            if cell == target {
                return self.reconstruct(start, target);
            }

            for direction in self
                .config
                .legal_directions_avoiding(cell, label.direction, trail, rivals)
                .iter()
            {
                let step = if label.direction == Some(direction) {
                    STRAIGHT_COST
                } else {
                    TURN_COST
                };
                let next = cell.step(direction);
                let next_cost = cost + step;
                if self.label(next).map_or(true, |existing| next_cost < existing.cost) {
                    self.relax(next, Some(direction), next_cost);
                }
            }
        }

        None
    }

    fn reset(&mut self) {
        let width = usize::try_from(self.config.x_cells_count()).unwrap_or(0);
        let height = usize::try_from(self.config.y_cells_count()).unwrap_or(0);
        let cell_count = width.checked_mul(height).unwrap_or(0);

        if self.labels.len() != cell_count {
            self.labels = vec![None; cell_count];
        } else {
            self.labels.fill(None);
        }
        self.frontier.clear();
        self.sequence = 0;
    }

    fn relax(&mut self, cell: CellCoord, direction: Option<Direction>, cost: u32) {
        let Some(index) = self.index(cell) else {
            return;
        };
        if let Some(slot) = self.labels.get_mut(index) {
            *slot = Some(Label { direction, cost });
            self.frontier.push(Reverse((cost, self.sequence, cell)));
            self.sequence += 1;
        }
    }

    fn label(&self, cell: CellCoord) -> Option<Label> {
        self.index(cell)
            .and_then(|index| self.labels.get(index).copied().flatten())
    }

    fn reconstruct(&self, start: CellCoord, target: CellCoord) -> Option<Route> {
        let mut current = target;
        let mut first = None;
        let mut length = 0;

        while current != start {
            let direction = self.label(current)?.direction?;
            first = Some(direction);
            current = current.step(direction.opposite());
            length += 1;
            if length > STEP_WATCHDOG {
                return None;
            }
        }

        first.map(|first| Route { first, length })
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        if !self.config.contains(cell) {
            return None;
        }
        let width = usize::try_from(self.config.x_cells_count()).ok()?;
        let x = usize::try_from(cell.x()).ok()?;
        let y = usize::try_from(cell.y()).ok()?;
        y.checked_mul(width)?.checked_add(x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_are_sized_to_the_grid() {
        let mut navigator = Navigator::new(GridConfig::new(4, 3, 5, 10));
        navigator.reset();
        assert_eq!(navigator.labels.len(), 12);
        assert_eq!(navigator.index(CellCoord::new(3, 2)), Some(11));
        assert_eq!(navigator.index(CellCoord::new(4, 0)), None);
        assert_eq!(navigator.index(CellCoord::new(0, -1)), None);
    }

    #[test]
    fn straight_runs_are_cheaper_than_turns() {
        let mut navigator = Navigator::new(GridConfig::new(6, 6, 5, 10));
        let _ = navigator.route(
            CellCoord::new(0, 0),
            Some(Direction::Right),
            &[],
            CellCoord::new(2, 0),
            &[],
        );

        let cost = navigator.label(CellCoord::new(2, 0)).map(|label| label.cost);
        assert_eq!(cost, Some(2 * STRAIGHT_COST));
        let turned = navigator.label(CellCoord::new(0, 1)).map(|label| label.cost);
        assert_eq!(turned, Some(TURN_COST));
    }
}
