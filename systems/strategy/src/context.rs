//! Per-tick view of the controlled agent, rebuilt from every snapshot.

use trailrunner_core::{
    CellCoord, Direction, DirectionSet, GridConfig, PlayerSnapshot, TickSnapshot,
};

/// Cells derived once per tick and shared by every cascade step.
#[derive(Debug)]
pub(crate) struct TickContext<'a> {
    pub(crate) snapshot: &'a TickSnapshot,
    pub(crate) grid: GridConfig,
    pub(crate) cell: CellCoord,
    pub(crate) heading: Option<Direction>,
    pub(crate) trail: Vec<CellCoord>,
    pub(crate) territory: Vec<CellCoord>,
    pub(crate) legal: DirectionSet,
    pub(crate) safe: DirectionSet,
}

impl<'a> TickContext<'a> {
    pub(crate) fn new(
        grid: GridConfig,
        snapshot: &'a TickSnapshot,
        me: &'a PlayerSnapshot,
        heading: Option<Direction>,
    ) -> Self {
        let cell = grid.discretize(me.position);
        let trail: Vec<CellCoord> = me.trail.iter().map(|point| grid.discretize(*point)).collect();
        let territory = me
            .territory
            .iter()
            .map(|point| grid.discretize(*point))
            .collect();
        let legal = grid.legal_directions(cell, heading, &trail);

        Self {
            snapshot,
            grid,
            cell,
            heading,
            trail,
            territory,
            legal,
            safe: legal,
        }
    }

    /// Direction used when nothing else applies.
    pub(crate) fn fallback(&self) -> Direction {
        self.safe
            .first()
            .or_else(|| self.legal.first())
            .or(self.heading)
            .unwrap_or(Direction::Left)
    }

    pub(crate) fn owns(&self, cell: CellCoord) -> bool {
        self.territory.contains(&cell)
    }

    /// Nearest owned cell; ties resolve to the earliest reported cell.
    pub(crate) fn closest_home(&self) -> Option<(CellCoord, u32)> {
        self.territory
            .iter()
            .map(|cell| (*cell, self.cell.manhattan_distance(*cell)))
            .min_by_key(|(_, distance)| *distance)
    }

    /// Farthest owned cell; ties resolve to the earliest reported cell.
    pub(crate) fn furthest_home(&self) -> Option<(CellCoord, u32)> {
        self.territory
            .iter()
            .rev()
            .map(|cell| (*cell, self.cell.manhattan_distance(*cell)))
            .max_by_key(|(_, distance)| *distance)
    }

    /// Discretised opponents in identifier order.
    pub(crate) fn opponents(&self) -> impl Iterator<Item = Opponent<'a>> + '_ {
        let grid = self.grid;
        self.snapshot.opponents().map(move |player| Opponent {
            cell: grid.discretize(player.position),
            player,
        })
    }
}

/// Opponent paired with its discretised head cell.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Opponent<'a> {
    pub(crate) cell: CellCoord,
    pub(crate) player: &'a PlayerSnapshot,
}
