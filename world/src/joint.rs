//! Lazy Cartesian product over the agents' legal directions.

use trailrunner_core::{Direction, DirectionSet, PlayerId};

/// Single agent's move within a joint action.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PlannedMove {
    /// Agent performing the move.
    pub agent: PlayerId,
    /// Direction the agent takes.
    pub direction: Direction,
}

/// One move per participating agent, applied simultaneously.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct JointMove {
    moves: Vec<PlannedMove>,
}

impl JointMove {
    /// Creates a joint move from individual moves.
    #[must_use]
    pub fn new(moves: Vec<PlannedMove>) -> Self {
        Self { moves }
    }

    /// Individual moves in agent order.
    #[must_use]
    pub fn moves(&self) -> &[PlannedMove] {
        &self.moves
    }

    /// Direction chosen by the provided agent, if it participates.
    #[must_use]
    pub fn direction_of(&self, agent: PlayerId) -> Option<Direction> {
        self.moves
            .iter()
            .find(|planned| planned.agent == agent)
            .map(|planned| planned.direction)
    }
}

#[derive(Clone, Debug)]
struct Choices {
    agent: PlayerId,
    directions: Vec<Direction>,
}

/// Restartable odometer yielding one [`JointMove`] at a time.
///
/// The last agent varies fastest. With no participating agent the product
/// holds exactly one empty joint move.
#[derive(Clone, Debug)]
pub struct JointMoves {
    choices: Vec<Choices>,
    counters: Vec<usize>,
    exhausted: bool,
}

impl JointMoves {
    /// Creates the product over the provided per-agent options.
    ///
    /// Agents with an empty option set are skipped rather than collapsing the
    /// whole product.
    #[must_use]
    pub fn new(options: Vec<(PlayerId, DirectionSet)>) -> Self {
        let choices: Vec<Choices> = options
            .into_iter()
            .filter(|(_, directions)| !directions.is_empty())
            .map(|(agent, directions)| Choices {
                agent,
                directions: directions.iter().collect(),
            })
            .collect();
        let counters = vec![0; choices.len()];
        Self {
            choices,
            counters,
            exhausted: false,
        }
    }

    /// Total number of joint moves in the product.
    #[must_use]
    pub fn total(&self) -> usize {
        self.choices
            .iter()
            .map(|choice| choice.directions.len())
            .product()
    }

    /// Rewinds the odometer to the first combination.
    pub fn restart(&mut self) {
        self.counters.fill(0);
        self.exhausted = false;
    }

    fn remaining(&self) -> usize {
        if self.exhausted {
            return 0;
        }

        let mut consumed = 0;
        for (counter, choice) in self.counters.iter().zip(&self.choices) {
            consumed = consumed * choice.directions.len() + counter;
        }
        self.total() - consumed
    }
}

impl Iterator for JointMoves {
    type Item = JointMove;

    fn next(&mut self) -> Option<Self::Item> {
        if self.exhausted {
            return None;
        }

        let current = JointMove::new(
            self.choices
                .iter()
                .zip(&self.counters)
                .map(|(choice, &counter)| PlannedMove {
                    agent: choice.agent,
                    direction: choice.directions[counter],
                })
                .collect(),
        );

        self.exhausted = true;
        for (counter, choice) in self.counters.iter_mut().zip(&self.choices).rev() {
            *counter += 1;
            if *counter < choice.directions.len() {
                self.exhausted = false;
                break;
            }
            *counter = 0;
        }

        Some(current)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.remaining();
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for JointMoves {}
