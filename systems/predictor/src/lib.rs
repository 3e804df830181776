#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Forward simulator that classifies the controlled agent's lethal moves.
//!
//! A direction is lethal when every joint response of the nearby agents ends
//! with the controlled agent removed within the configured number of plies.
//! Opponents are unconstrained: a single surviving continuation clears the
//! direction.

use tracing::debug;
use trailrunner_core::{Direction, DirectionSet, GridConfig, TickSnapshot};
use trailrunner_world::{Event, GameState, JointMoves};

/// Plies explored when no depth is configured.
pub const DEFAULT_DEPTH: u32 = 4;

/// Manhattan radius used to pull opponents into the simulation.
pub const DEFAULT_INTERACTION_RADIUS: u32 = 4;

/// Lethal-move classifier that reuses its arena between ticks.
#[derive(Debug)]
pub struct Predictor {
    depth: u32,
    radius: u32,
    arena: Vec<GameState>,
    frames: Vec<Frame>,
    events: Vec<Event>,
    expansions: usize,
    eliminations: usize,
}

#[derive(Debug)]
struct Frame {
    node: usize,
    moves: JointMoves,
    remaining: u32,
}

impl Default for Predictor {
    fn default() -> Self {
        Self::new(DEFAULT_DEPTH, DEFAULT_INTERACTION_RADIUS)
    }
}

impl Predictor {
    /// Creates a predictor exploring `depth` plies around agents within `radius`.
    #[must_use]
    pub fn new(depth: u32, radius: u32) -> Self {
        Self {
            depth,
            radius,
            arena: Vec::new(),
            frames: Vec::new(),
            events: Vec::new(),
            expansions: 0,
            eliminations: 0,
        }
    }

    /// Number of plies explored.
    #[must_use]
    pub const fn depth(&self) -> u32 {
        self.depth
    }

    /// Interaction radius in cells.
    #[must_use]
    pub const fn radius(&self) -> u32 {
        self.radius
    }

    /// Child states generated by the most recent classification.
    #[must_use]
    pub const fn last_expansions(&self) -> usize {
        self.expansions
    }

    /// Agents removed across every child state of the most recent classification.
    #[must_use]
    pub const fn last_eliminations(&self) -> usize {
        self.eliminations
    }

    /// Lethal directions for the controlled agent of a server snapshot.
    ///
    /// The snapshot is first reduced to the agents within the interaction
    /// radius; with no opponent left in scope nothing is simulated. When the
    /// snapshot reports no heading for the controlled agent, `last_heading`
    /// stands in for it so reversing is classified the same way the caller
    /// filters it.
    pub fn death_directions(
        &mut self,
        config: &GridConfig,
        snapshot: &TickSnapshot,
        last_heading: Option<Direction>,
    ) -> DirectionSet {
        let state = GameState::from_snapshot(config, snapshot, self.radius)
            .with_fallback_heading(last_heading);
        let lethal = self.classify(config, &state);
        debug!(
            tick = snapshot.tick(),
            agents = state.agents().len(),
            expansions = self.expansions,
            eliminations = self.eliminations,
            ?lethal,
            "classified controlled moves"
        );
        lethal
    }

    /// Lethal directions for the controlled agent of an already scoped state.
    pub fn classify(&mut self, config: &GridConfig, state: &GameState) -> DirectionSet {
        self.expansions = 0;
        self.eliminations = 0;

        if self.depth == 0 || state.agents().len() < 2 {
            return DirectionSet::EMPTY;
        }
        let Some(controlled) = state.controlled() else {
            return DirectionSet::EMPTY;
        };
        let controlled = controlled.id();

        let mut seen = DirectionSet::EMPTY;
        let mut survivable = DirectionSet::EMPTY;

        for joint in state.joint_moves(config) {
            let Some(direction) = joint.direction_of(controlled) else {
                continue;
            };
            seen.insert(direction);
            if survivable.contains(direction) {
                continue;
            }

            let child = state.child(&joint, &mut self.events);
            self.record_expansion();
            if child.controlled_is_dead() {
                continue;
            }

            if !self.doomed(config, child, self.depth) {
                survivable.insert(direction);
            }
        }

        seen.difference(survivable)
    }

    fn record_expansion(&mut self) {
        self.expansions += 1;
        self.eliminations += self
            .events
            .iter()
            .filter(|event| matches!(event, Event::AgentEliminated { .. }))
            .count();
        self.events.clear();
    }

    /// Reports whether the controlled agent dies in every continuation of
    /// `root` before `remaining` plies run out.
    fn doomed(&mut self, config: &GridConfig, root: GameState, remaining: u32) -> bool {
        if remaining <= 1 {
            return false;
        }

        self.arena.clear();
        self.frames.clear();
        let moves = root.joint_moves(config);
        self.arena.push(root);
        self.frames.push(Frame {
            node: 0,
            moves,
            remaining,
        });

        loop {
            let Some(frame) = self.frames.last_mut() else {
                return true;
            };
            let node = frame.node;
            let remaining = frame.remaining;

            let Some(joint) = frame.moves.next() else {
                let _ = self.frames.pop();
                self.arena.truncate(node);
                continue;
            };

            let child = self.arena[node].child(&joint, &mut self.events);
            self.record_expansion();
            if child.controlled_is_dead() {
                continue;
            }

            if remaining - 1 <= 1 {
                self.arena.clear();
                self.frames.clear();
                return false;
            }

            let moves = child.joint_moves(config);
            self.arena.push(child);
            self.frames.push(Frame {
                node: self.arena.len() - 1,
                moves,
                remaining: remaining - 1,
            });
        }
    }
}

/// Lethal directions for `state` explored `depth` plies deep.
#[must_use]
pub fn death_directions(config: &GridConfig, state: &GameState, depth: u32) -> DirectionSet {
    Predictor::new(depth, DEFAULT_INTERACTION_RADIUS).classify(config, state)
}
