// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Pass-level retry of vertex welding with shrinking tolerance.

use crate::tolerance::clamp_epsilon;

/// Where the welding passes of a helper stand.
///
/// Input files sometimes declare a precision so coarse that every vertex of
/// a shell collapses into one cluster and no edge survives. Each failed
/// pass retries with a tenth of the epsilon until the attempts run out.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WeldState {
    /// Pass `index` (zero based) is to run with `epsilon`.
    Attempt { index: usize, epsilon: f64 },
    /// Pass `index` produced at least one canonical edge.
    Success { index: usize, epsilon: f64 },
    /// No pass produced an edge.
    Exhausted { attempts: usize, epsilon: f64 },
}

impl WeldState {
    pub fn start(epsilon: f64) -> Self {
        WeldState::Attempt {
            index: 0,
            epsilon: clamp_epsilon(epsilon),
        }
    }

    /// Moves past an attempt given whether it produced any edge.
    /// Terminal states stay where they are.
    pub fn advance(self, produced_edges: bool, max_attempts: usize) -> Self {
        match self {
            WeldState::Attempt { index, epsilon } if produced_edges => {
                WeldState::Success { index, epsilon }
            }
            WeldState::Attempt { index, epsilon } if index + 1 < max_attempts => {
                WeldState::Attempt {
                    index: index + 1,
                    epsilon: clamp_epsilon(epsilon / 10.0),
                }
            }
            WeldState::Attempt { index, epsilon } => WeldState::Exhausted {
                attempts: index + 1,
                epsilon,
            },
            done => done,
        }
    }

    /// Epsilon of the current or last pass.
    pub fn epsilon(&self) -> f64 {
        match *self {
            WeldState::Attempt { epsilon, .. }
            | WeldState::Success { epsilon, .. }
            | WeldState::Exhausted { epsilon, .. } => epsilon,
        }
    }

    /// Passes run so far.
    pub fn attempts(&self) -> usize {
        match *self {
            WeldState::Attempt { index, .. } => index,
            WeldState::Success { index, .. } => index + 1,
            WeldState::Exhausted { attempts, .. } => attempts,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, WeldState::Success { .. })
    }

    pub fn is_exhausted(&self) -> bool {
        matches!(self, WeldState::Exhausted { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn first_productive_pass_succeeds() {
        let state = WeldState::start(1e-4).advance(true, 3);
        assert_eq!(
            state,
            WeldState::Success {
                index: 0,
                epsilon: 1e-4
            }
        );
        assert_eq!(state.attempts(), 1);
        assert_eq!(state.advance(false, 3), state);
    }

    #[test]
    fn failed_passes_divide_epsilon() {
        let state = WeldState::start(1e-2).advance(false, 3);
        let WeldState::Attempt { index, epsilon } = state else {
            panic!("expected another attempt, got {state:?}");
        };
        assert_eq!(index, 1);
        assert_relative_eq!(epsilon, 1e-3, epsilon = 1e-15);

        let state = state.advance(false, 3).advance(false, 3);
        assert!(state.is_exhausted());
        assert_eq!(state.attempts(), 3);
        assert_relative_eq!(state.epsilon(), 1e-4, epsilon = 1e-15);
    }

    #[test]
    fn epsilon_is_clamped_every_pass() {
        let state = WeldState::start(1e-9);
        assert_relative_eq!(state.epsilon(), shellweld_topology::CONFUSION);
        let state = WeldState::start(5e-7).advance(false, 3);
        assert_relative_eq!(state.epsilon(), shellweld_topology::CONFUSION);
    }

    #[test]
    fn single_attempt_limit() {
        let state = WeldState::start(1e-3).advance(false, 1);
        assert!(state.is_exhausted());
        assert_eq!(state.attempts(), 1);
    }
}
