#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Simulated game state used by the forward simulator.
//!
//! A [`GameState`] is one simulated tick: an owned copy of every agent that is
//! close enough to matter. Children are produced by [`apply`], which moves
//! each agent once and then resolves collisions, broadcasting [`Event`]
//! values so callers can observe what happened.

use std::{collections::HashSet, rc::Rc};

use trailrunner_core::{CellCoord, Direction, DirectionSet, GridConfig, PlayerId, TickSnapshot};

mod joint;

pub use joint::{JointMove, JointMoves, PlannedMove};

/// Reasons an agent is removed from a simulated state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Elimination {
    /// Shared a cell with an agent whose trail was at least as long.
    HeadOn,
    /// Another agent stood on one of the agent's trail cells.
    TrailCut,
}

/// Events broadcast while a joint move is applied.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Confirms that an agent moved between two cells.
    AgentMoved {
        /// Identifier of the agent that moved.
        id: PlayerId,
        /// Cell the agent occupied before moving.
        from: CellCoord,
        /// Cell the agent occupies after the move.
        to: CellCoord,
    },
    /// An agent re-entered its own territory and lost its trail.
    TrailCleared {
        /// Identifier of the agent that returned home.
        id: PlayerId,
    },
    /// An agent died and was removed from the state.
    AgentEliminated {
        /// Identifier of the removed agent.
        id: PlayerId,
        /// Collision rule that removed the agent.
        cause: Elimination,
    },
}

/// Single agent tracked inside a simulated state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Agent {
    id: PlayerId,
    cell: CellCoord,
    heading: Option<Direction>,
    trail: Vec<CellCoord>,
    territory: Rc<HashSet<CellCoord>>,
    controlled: bool,
}

impl Agent {
    /// Creates a new simulated agent.
    ///
    /// Territory never changes during a simulation, so sibling states share it
    /// read-only while each state owns its own trail.
    #[must_use]
    pub fn new(
        id: PlayerId,
        cell: CellCoord,
        heading: Option<Direction>,
        trail: Vec<CellCoord>,
        territory: impl IntoIterator<Item = CellCoord>,
        controlled: bool,
    ) -> Self {
        Self {
            id,
            cell,
            heading,
            trail,
            territory: Rc::new(territory.into_iter().collect()),
            controlled,
        }
    }

    /// Identifier of the agent.
    #[must_use]
    pub const fn id(&self) -> PlayerId {
        self.id
    }

    /// Cell currently occupied by the agent.
    #[must_use]
    pub const fn cell(&self) -> CellCoord {
        self.cell
    }

    /// Current heading of the agent.
    #[must_use]
    pub const fn heading(&self) -> Option<Direction> {
        self.heading
    }

    /// Ordered trail cells, oldest first.
    #[must_use]
    pub fn trail(&self) -> &[CellCoord] {
        &self.trail
    }

    /// Reports whether the cell belongs to the agent's territory.
    #[must_use]
    pub fn owns(&self, cell: CellCoord) -> bool {
        self.territory.contains(&cell)
    }

    /// Reports whether this is the agent the simulation protects.
    #[must_use]
    pub const fn is_controlled(&self) -> bool {
        self.controlled
    }

    /// Directions the agent may legally take next.
    #[must_use]
    pub fn legal_directions(&self, config: &GridConfig) -> DirectionSet {
        config.legal_directions(self.cell, self.heading, &self.trail)
    }

    fn advance(&mut self, direction: Direction, out_events: &mut Vec<Event>) {
        let from = self.cell;
        self.heading = Some(direction);
        if !self.owns(from) {
            self.trail.push(from);
        }
        self.cell = from.step(direction);
        out_events.push(Event::AgentMoved {
            id: self.id,
            from,
            to: self.cell,
        });

        if self.owns(self.cell) && !self.trail.is_empty() {
            self.trail.clear();
            out_events.push(Event::TrailCleared { id: self.id });
        }
    }

    fn near(&self, other: &Agent, radius: u32) -> bool {
        std::iter::once(self.cell)
            .chain(self.trail.iter().copied())
            .any(|cell| {
                std::iter::once(other.cell)
                    .chain(other.trail.iter().copied())
                    .any(|candidate| cell.manhattan_distance(candidate) <= radius)
            })
    }
}

/// One simulated tick: the agents still alive, ordered by identifier.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GameState {
    agents: Vec<Agent>,
}

impl GameState {
    /// Creates a state from the provided agents.
    #[must_use]
    pub fn new(mut agents: Vec<Agent>) -> Self {
        agents.sort_by_key(|agent| agent.id);
        Self { agents }
    }

    /// Builds the initial simulation state from a server snapshot.
    ///
    /// Only the controlled agent and agents whose head or trail lies within
    /// `radius` cells of the controlled agent's head or trail are kept. Without
    /// a controlled agent the state is empty.
    #[must_use]
    pub fn from_snapshot(config: &GridConfig, snapshot: &TickSnapshot, radius: u32) -> Self {
        let agents: Vec<Agent> = snapshot
            .players()
            .iter()
            .map(|player| {
                Agent::new(
                    player.id,
                    config.discretize(player.position),
                    player.heading,
                    player
                        .trail
                        .iter()
                        .map(|point| config.discretize(*point))
                        .collect(),
                    player.territory.iter().map(|point| config.discretize(*point)),
                    player.is_controlled(),
                )
            })
            .collect();

        let Some(controlled) = agents.iter().find(|agent| agent.controlled).cloned() else {
            return Self::default();
        };

        Self::new(
            agents
                .into_iter()
                .filter(|agent| agent.controlled || controlled.near(agent, radius))
                .collect(),
        )
    }

    /// Gives the controlled agent `heading` when it has none of its own.
    #[must_use]
    pub fn with_fallback_heading(mut self, heading: Option<Direction>) -> Self {
        if let Some(agent) = self.agents.iter_mut().find(|agent| agent.controlled) {
            agent.heading = agent.heading.or(heading);
        }
        self
    }

    /// Agents alive in this state.
    #[must_use]
    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    /// The protected agent, if it is still alive.
    #[must_use]
    pub fn controlled(&self) -> Option<&Agent> {
        self.agents.iter().find(|agent| agent.controlled)
    }

    /// Reports whether the protected agent has been eliminated.
    #[must_use]
    pub fn controlled_is_dead(&self) -> bool {
        self.controlled().is_none()
    }

    /// Lazily enumerates every combination of legal moves.
    ///
    /// Agents without a legal direction sit the ply out.
    #[must_use]
    pub fn joint_moves(&self, config: &GridConfig) -> JointMoves {
        JointMoves::new(
            self.agents
                .iter()
                .map(|agent| (agent.id, agent.legal_directions(config)))
                .filter(|(_, directions)| !directions.is_empty())
                .collect(),
        )
    }

    /// Produces the child state reached through `joint`.
    #[must_use]
    pub fn child(&self, joint: &JointMove, out_events: &mut Vec<Event>) -> Self {
        let mut next = self.clone();
        apply(&mut next, joint, out_events);
        next
    }

    fn agent_mut(&mut self, id: PlayerId) -> Option<&mut Agent> {
        let index = self.agents.binary_search_by_key(&id, |agent| agent.id).ok()?;
        self.agents.get_mut(index)
    }

    fn resolve_collisions(&mut self, out_events: &mut Vec<Event>) {
        let verdicts: Vec<Option<Elimination>> = self
            .agents
            .iter()
            .enumerate()
            .map(|(index, agent)| {
                let head_on = self.agents.iter().enumerate().any(|(other_index, other)| {
                    other_index != index
                        && other.cell == agent.cell
                        && agent.trail.len() <= other.trail.len()
                });
                if head_on {
                    return Some(Elimination::HeadOn);
                }

                let cut = agent
                    .trail
                    .iter()
                    .any(|cell| self.agents.iter().any(|other| other.cell == *cell));
                cut.then_some(Elimination::TrailCut)
            })
            .collect();

        let mut verdicts = verdicts.into_iter();
        self.agents.retain(|agent| match verdicts.next().flatten() {
            Some(cause) => {
                out_events.push(Event::AgentEliminated {
                    id: agent.id,
                    cause,
                });
                false
            }
            None => true,
        });
    }
}

/// Applies a joint move to the state, then removes every agent that died.
///
/// Moves naming an agent absent from the state are ignored.
pub fn apply(state: &mut GameState, joint: &JointMove, out_events: &mut Vec<Event>) {
    for planned in joint.moves() {
        if let Some(agent) = state.agent_mut(planned.agent) {
            agent.advance(planned.direction, out_events);
        }
    }

    state.resolve_collisions(out_events);
}

#[cfg(test)]
mod tests {
    use super::*;
    use trailrunner_core::{PixelPoint, PlayerSnapshot};

    fn grid() -> GridConfig {
        GridConfig::new(10, 10, 5, 10)
    }

    fn cells(points: &[(i32, i32)]) -> Vec<CellCoord> {
        points.iter().map(|&(x, y)| CellCoord::new(x, y)).collect()
    }

    fn single_move(id: PlayerId, direction: Direction) -> JointMove {
        JointMove::new(vec![PlannedMove {
            agent: id,
            direction,
        }])
    }

    #[test]
    fn advance_outside_territory_extends_trail() {
        let me = Agent::new(
            PlayerId::CONTROLLED,
            CellCoord::new(3, 3),
            Some(Direction::Right),
            cells(&[(2, 3)]),
            cells(&[(0, 0)]),
            true,
        );
        let mut state = GameState::new(vec![me]);
        let mut events = Vec::new();

        apply(&mut state, &single_move(PlayerId::CONTROLLED, Direction::Up), &mut events);

        let me = state.controlled().expect("controlled agent survives");
        assert_eq!(me.cell(), CellCoord::new(3, 4));
        assert_eq!(me.heading(), Some(Direction::Up));
        assert_eq!(me.trail(), cells(&[(2, 3), (3, 3)]).as_slice());
        assert_eq!(
            events,
            vec![Event::AgentMoved {
                id: PlayerId::CONTROLLED,
                from: CellCoord::new(3, 3),
                to: CellCoord::new(3, 4),
            }]
        );
    }

    #[test]
    fn entering_own_territory_clears_trail() {
        let me = Agent::new(
            PlayerId::CONTROLLED,
            CellCoord::new(3, 3),
            Some(Direction::Right),
            cells(&[(1, 3), (2, 3)]),
            cells(&[(4, 3), (4, 4)]),
            true,
        );
        let mut state = GameState::new(vec![me]);
        let mut events = Vec::new();

        apply(&mut state, &single_move(PlayerId::CONTROLLED, Direction::Right), &mut events);

        let me = state.controlled().expect("controlled agent survives");
        assert!(me.trail().is_empty());
        assert!(events.contains(&Event::TrailCleared {
            id: PlayerId::CONTROLLED
        }));
    }

    #[test]
    fn moving_inside_territory_leaves_no_trail() {
        let me = Agent::new(
            PlayerId::CONTROLLED,
            CellCoord::new(3, 3),
            Some(Direction::Right),
            Vec::new(),
            cells(&[(3, 3), (4, 3)]),
            true,
        );
        let mut state = GameState::new(vec![me]);
        let mut events = Vec::new();

        apply(&mut state, &single_move(PlayerId::CONTROLLED, Direction::Right), &mut events);

        assert!(state.controlled().expect("alive").trail().is_empty());
        assert!(!events.contains(&Event::TrailCleared {
            id: PlayerId::CONTROLLED
        }));
    }

    #[test]
    fn head_on_collision_kills_shorter_or_equal_trail() {
        let longer = Agent::new(
            PlayerId::new(2),
            CellCoord::new(5, 5),
            Some(Direction::Right),
            cells(&[(2, 5), (3, 5), (4, 5)]),
            Vec::new(),
            false,
        );
        let shorter = Agent::new(
            PlayerId::CONTROLLED,
            CellCoord::new(5, 5),
            Some(Direction::Left),
            cells(&[(6, 5)]),
            Vec::new(),
            true,
        );
        let mut state = GameState::new(vec![longer, shorter]);
        let mut events = Vec::new();

        state.resolve_collisions(&mut events);

        assert!(state.controlled_is_dead());
        assert_eq!(state.agents().len(), 1);
        assert_eq!(
            events,
            vec![Event::AgentEliminated {
                id: PlayerId::CONTROLLED,
                cause: Elimination::HeadOn,
            }]
        );
    }

    #[test]
    fn head_on_collision_with_equal_trails_kills_both() {
        let first = Agent::new(
            PlayerId::new(1),
            CellCoord::new(5, 5),
            Some(Direction::Right),
            cells(&[(4, 5)]),
            Vec::new(),
            false,
        );
        let second = Agent::new(
            PlayerId::new(2),
            CellCoord::new(5, 5),
            Some(Direction::Left),
            cells(&[(6, 5)]),
            Vec::new(),
            false,
        );
        let mut state = GameState::new(vec![first, second]);
        let mut events = Vec::new();

        state.resolve_collisions(&mut events);

        assert!(state.agents().is_empty());
    }

    #[test]
    fn standing_on_a_trail_cuts_its_owner() {
        let cutter = Agent::new(
            PlayerId::new(3),
            CellCoord::new(4, 4),
            Some(Direction::Up),
            Vec::new(),
            cells(&[(4, 3)]),
            false,
        );
        let victim = Agent::new(
            PlayerId::CONTROLLED,
            CellCoord::new(6, 4),
            Some(Direction::Right),
            cells(&[(4, 4), (5, 4)]),
            Vec::new(),
            true,
        );
        let mut state = GameState::new(vec![cutter, victim]);
        let mut events = Vec::new();

        state.resolve_collisions(&mut events);

        assert!(state.controlled_is_dead());
        assert_eq!(state.agents()[0].id(), PlayerId::new(3));
        assert_eq!(
            events,
            vec![Event::AgentEliminated {
                id: PlayerId::CONTROLLED,
                cause: Elimination::TrailCut,
            }]
        );
    }

    #[test]
    fn child_does_not_mutate_parent() {
        let me = Agent::new(
            PlayerId::CONTROLLED,
            CellCoord::new(3, 3),
            Some(Direction::Right),
            cells(&[(2, 3)]),
            Vec::new(),
            true,
        );
        let parent = GameState::new(vec![me]);
        let before = parent.clone();
        let mut events = Vec::new();

        let child = parent.child(&single_move(PlayerId::CONTROLLED, Direction::Right), &mut events);

        assert_eq!(parent, before);
        assert_ne!(child, parent);
        assert_eq!(child.controlled().expect("alive").trail().len(), 2);
    }

    #[test]
    fn from_snapshot_keeps_only_nearby_agents() {
        let player = |id: u32, x: i32, y: i32, trail: Vec<PixelPoint>| PlayerSnapshot {
            id: PlayerId::new(id),
            position: PixelPoint::new(x * 10 + 5, y * 10 + 5),
            heading: Some(Direction::Left),
            trail,
            territory: Vec::new(),
            score: 0,
            bonuses: Vec::new(),
        };
        let snapshot = TickSnapshot::new(
            12,
            vec![
                player(0, 1, 1, vec![PixelPoint::new(25, 15)]),
                player(1, 5, 1, Vec::new()),
                player(2, 9, 9, Vec::new()),
                player(3, 9, 8, vec![PixelPoint::new(65, 15)]),
            ],
            Vec::new(),
        );

        let state = GameState::from_snapshot(&grid(), &snapshot, 4);
        let ids: Vec<u32> = state.agents().iter().map(|agent| agent.id().get()).collect();

        assert_eq!(ids, vec![0, 1, 3]);
        assert_eq!(state.controlled().expect("controlled").trail(), cells(&[(2, 1)]).as_slice());
    }

    #[test]
    fn fallback_heading_only_fills_a_missing_heading() {
        let state = GameState::new(vec![
            Agent::new(
                PlayerId::CONTROLLED,
                CellCoord::new(3, 3),
                None,
                Vec::new(),
                Vec::new(),
                true,
            ),
            Agent::new(
                PlayerId::new(1),
                CellCoord::new(6, 6),
                None,
                Vec::new(),
                Vec::new(),
                false,
            ),
        ]);

        let state = state.with_fallback_heading(Some(Direction::Right));
        assert_eq!(
            state.controlled().expect("controlled").heading(),
            Some(Direction::Right)
        );
        assert_eq!(state.agents()[1].heading(), None);
        assert!(!state
            .controlled()
            .expect("controlled")
            .legal_directions(&grid())
            .contains(Direction::Left));

        let state = state.with_fallback_heading(Some(Direction::Up));
        assert_eq!(
            state.controlled().expect("controlled").heading(),
            Some(Direction::Right)
        );
    }

    #[test]
    fn from_snapshot_without_controlled_agent_is_empty() {
        let snapshot = TickSnapshot::new(
            1,
            vec![PlayerSnapshot {
                id: PlayerId::new(4),
                position: PixelPoint::new(5, 5),
                heading: None,
                trail: Vec::new(),
                territory: Vec::new(),
                score: 0,
                bonuses: Vec::new(),
            }],
            Vec::new(),
        );

        assert!(GameState::from_snapshot(&grid(), &snapshot, 4).agents().is_empty());
    }
}
