#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Trailrunner bot.
//!
//! This crate defines the grid model every other crate reasons about: cell
//! coordinates, headings, movement legality and the immutable per-tick
//! snapshot assembled by the protocol adapter. Systems consume snapshots and
//! respond with a [`Decision`]; nothing in here holds state between ticks.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Location of a single grid cell expressed as integer coordinates.
///
/// `y` grows upwards, matching the protocol's coordinate space.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    x: i32,
    y: i32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Horizontal index of the cell.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// Vertical index of the cell.
    #[must_use]
    pub const fn y(&self) -> i32 {
        self.y
    }

    /// Cell reached by moving one step in the provided direction.
    #[must_use]
    pub const fn step(self, direction: Direction) -> Self {
        match direction {
            Direction::Left => Self::new(self.x - 1, self.y),
            Direction::Up => Self::new(self.x, self.y + 1),
            Direction::Right => Self::new(self.x + 1, self.y),
            Direction::Down => Self::new(self.x, self.y - 1),
        }
    }

    /// Computes the Manhattan distance between two cell coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: CellCoord) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }
}

impl fmt::Display for CellCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Continuous protocol coordinate measured in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PixelPoint {
    /// Horizontal pixel offset.
    pub x: i32,
    /// Vertical pixel offset.
    pub y: i32,
}

impl PixelPoint {
    /// Creates a new pixel point.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Cardinal movement directions available to agents.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Movement toward decreasing `x`.
    Left,
    /// Movement toward increasing `y`.
    Up,
    /// Movement toward increasing `x`.
    Right,
    /// Movement toward decreasing `y`.
    Down,
}

impl Direction {
    /// Every direction in the canonical evaluation order.
    pub const ALL: [Direction; 4] = [
        Direction::Left,
        Direction::Up,
        Direction::Right,
        Direction::Down,
    ];

    /// Direction pointing the opposite way.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Up => Self::Down,
            Self::Right => Self::Left,
            Self::Down => Self::Up,
        }
    }

    /// Lowercase protocol token for the direction.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Up => "up",
            Self::Right => "right",
            Self::Down => "down",
        }
    }

    const fn bit(self) -> u8 {
        match self {
            Self::Left => 0b0001,
            Self::Up => 0b0010,
            Self::Right => 0b0100,
            Self::Down => 0b1000,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Compact set of directions iterated in [`Direction::ALL`] order.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct DirectionSet(u8);

impl DirectionSet {
    /// Set without any direction.
    pub const EMPTY: Self = Self(0);

    /// Reports whether the set holds the direction.
    #[must_use]
    pub const fn contains(self, direction: Direction) -> bool {
        self.0 & direction.bit() != 0
    }

    /// Adds a direction to the set.
    pub fn insert(&mut self, direction: Direction) {
        self.0 |= direction.bit();
    }

    /// Removes a direction from the set.
    pub fn remove(&mut self, direction: Direction) {
        self.0 &= !direction.bit();
    }

    /// Number of directions in the set.
    #[must_use]
    pub const fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Reports whether the set is empty.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Directions present in `self` but not in `other`.
    #[must_use]
    pub const fn difference(self, other: Self) -> Self {
        Self(self.0 & !other.0)
    }

    /// First direction in canonical order, if any.
    #[must_use]
    pub fn first(self) -> Option<Direction> {
        self.iter().next()
    }

    /// Iterator over the contained directions in canonical order.
    pub fn iter(self) -> impl Iterator<Item = Direction> + Clone {
        Direction::ALL
            .into_iter()
            .filter(move |direction| self.contains(*direction))
    }
}

impl FromIterator<Direction> for DirectionSet {
    fn from_iter<I: IntoIterator<Item = Direction>>(iter: I) -> Self {
        let mut set = Self::EMPTY;
        for direction in iter {
            set.insert(direction);
        }
        set
    }
}

impl fmt::Debug for DirectionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

/// Match-wide grid parameters announced when the game starts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridConfig {
    x_cells_count: u32,
    y_cells_count: u32,
    speed: u32,
    cell_size: u32,
}

impl GridConfig {
    /// Creates a new grid description.
    ///
    /// A zero `cell_size` is clamped to one so discretisation never divides by
    /// zero.
    #[must_use]
    pub const fn new(x_cells_count: u32, y_cells_count: u32, speed: u32, cell_size: u32) -> Self {
        let cell_size = if cell_size == 0 { 1 } else { cell_size };
        Self {
            x_cells_count,
            y_cells_count,
            speed,
            cell_size,
        }
    }

    /// Number of cells along the `x` axis.
    #[must_use]
    pub const fn x_cells_count(&self) -> u32 {
        self.x_cells_count
    }

    /// Number of cells along the `y` axis.
    #[must_use]
    pub const fn y_cells_count(&self) -> u32 {
        self.y_cells_count
    }

    /// Per-tick movement speed in pixels.
    #[must_use]
    pub const fn speed(&self) -> u32 {
        self.speed
    }

    /// Edge length of a cell in pixels.
    #[must_use]
    pub const fn cell_size(&self) -> u32 {
        self.cell_size
    }

    /// Converts a pixel point into the cell containing it.
    #[must_use]
    pub fn discretize(&self, point: PixelPoint) -> CellCoord {
        let size = i32::try_from(self.cell_size).unwrap_or(i32::MAX);
        CellCoord::new(point.x.div_euclid(size), point.y.div_euclid(size))
    }

    /// Reports whether the cell lies inside `[0, x_cells) x [0, y_cells)`.
    #[must_use]
    pub fn contains(&self, cell: CellCoord) -> bool {
        u32::try_from(cell.x()).is_ok_and(|x| x < self.x_cells_count)
            && u32::try_from(cell.y()).is_ok_and(|y| y < self.y_cells_count)
    }

    /// Directions an agent may take from `cell`.
    ///
    /// A direction is excluded when it reverses `heading`, leaves the grid, or
    /// enters a cell of `own_trail`. Without a heading no reversal exists yet.
    #[must_use]
    pub fn legal_directions(
        &self,
        cell: CellCoord,
        heading: Option<Direction>,
        own_trail: &[CellCoord],
    ) -> DirectionSet {
        Direction::ALL
            .into_iter()
            .filter(|direction| Some(direction.opposite()) != heading)
            .filter(|direction| {
                let next = cell.step(*direction);
                self.contains(next) && !own_trail.contains(&next)
            })
            .collect()
    }

    /// Stricter variant of [`GridConfig::legal_directions`].
    ///
    /// Additionally excludes cells occupied by a rival head whose trail is no
    /// longer than `own_trail`.
    #[must_use]
    pub fn legal_directions_avoiding(
        &self,
        cell: CellCoord,
        heading: Option<Direction>,
        own_trail: &[CellCoord],
        rivals: &[RivalHead],
    ) -> DirectionSet {
        let own_length = own_trail.len();
        self.legal_directions(cell, heading, own_trail)
            .iter()
            .filter(|direction| {
                let next = cell.step(*direction);
                !rivals
                    .iter()
                    .any(|rival| rival.cell == next && rival.trail_length <= own_length)
            })
            .collect()
    }
}

/// Head position of another agent used by the strict legality mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RivalHead {
    /// Cell currently occupied by the rival.
    pub cell: CellCoord,
    /// Number of cells in the rival's trail.
    pub trail_length: usize,
}

/// Unique identifier assigned to an agent for the duration of a match.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlayerId(u32);

impl PlayerId {
    /// Identifier reserved for the agent this bot controls.
    pub const CONTROLLED: Self = Self(0);

    /// Creates a new player identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Kinds of collectible bonuses placed on the map.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BonusKind {
    /// Temporarily increases movement speed.
    Nitro,
    /// Temporarily decreases movement speed.
    Slow,
    /// Cuts through trails in a straight line.
    Saw,
}

impl BonusKind {
    /// Reports whether the bonus is worth collecting.
    #[must_use]
    pub const fn is_beneficial(self) -> bool {
        matches!(self, Self::Nitro | Self::Saw)
    }
}

/// Bonus lying on the map.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BonusSnapshot {
    /// Kind of bonus.
    pub kind: BonusKind,
    /// Pixel position of the bonus.
    pub position: PixelPoint,
}

/// Bonus currently affecting a player.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ActiveBonus {
    /// Kind of bonus.
    pub kind: BonusKind,
    /// Remaining ticks of the effect.
    pub ticks: u32,
}

/// Immutable representation of a single agent as reported by the server.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlayerSnapshot {
    /// Unique identifier assigned to the agent.
    pub id: PlayerId,
    /// Pixel position of the agent.
    pub position: PixelPoint,
    /// Current heading, absent on the very first tick.
    pub heading: Option<Direction>,
    /// Ordered trail points, oldest first.
    pub trail: Vec<PixelPoint>,
    /// Owned territory points.
    pub territory: Vec<PixelPoint>,
    /// Current score.
    pub score: u32,
    /// Bonuses currently affecting the agent.
    pub bonuses: Vec<ActiveBonus>,
}

impl PlayerSnapshot {
    /// Reports whether this is the agent the bot controls.
    #[must_use]
    pub fn is_controlled(&self) -> bool {
        self.id == PlayerId::CONTROLLED
    }
}

/// Read-only snapshot describing one server tick.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TickSnapshot {
    tick: u32,
    players: Vec<PlayerSnapshot>,
    bonuses: Vec<BonusSnapshot>,
}

impl TickSnapshot {
    /// Creates a new snapshot; players are stored in identifier order.
    #[must_use]
    pub fn new(tick: u32, mut players: Vec<PlayerSnapshot>, bonuses: Vec<BonusSnapshot>) -> Self {
        players.sort_by_key(|player| player.id);
        Self {
            tick,
            players,
            bonuses,
        }
    }

    /// Monotonic tick number.
    #[must_use]
    pub const fn tick(&self) -> u32 {
        self.tick
    }

    /// Every tracked agent in deterministic order.
    #[must_use]
    pub fn players(&self) -> &[PlayerSnapshot] {
        &self.players
    }

    /// Bonuses lying on the map.
    #[must_use]
    pub fn bonuses(&self) -> &[BonusSnapshot] {
        &self.bonuses
    }

    /// The agent this bot controls, if the server reported it.
    #[must_use]
    pub fn controlled(&self) -> Option<&PlayerSnapshot> {
        self.players.iter().find(|player| player.is_controlled())
    }

    /// Every agent except the controlled one.
    pub fn opponents(&self) -> impl Iterator<Item = &PlayerSnapshot> {
        self.players.iter().filter(|player| !player.is_controlled())
    }
}

/// Move chosen for a tick together with a human-readable annotation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Decision {
    /// Direction to emit.
    pub direction: Direction,
    /// Debug annotation echoed to the server.
    pub note: String,
}

impl Decision {
    /// Creates a new decision.
    #[must_use]
    pub fn new(direction: Direction, note: impl Into<String>) -> Self {
        Self {
            direction,
            note: note.into(),
        }
    }
}
