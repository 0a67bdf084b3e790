use serde::{Deserialize, Serialize};

use crate::error::EngineResult;
use crate::reducer::{advance_until_decision, create_table, reduce};
use crate::state::{Action, State, TableConfig};

/// A persisted session: table parameters plus the consumer actions in
/// order. Feeding the same record through `run` reproduces every derived
/// value bit-for-bit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Replay {
    pub seed: u32,
    pub seats: usize,
    pub starting_stack: u64,
    pub big_blind: u64,
    pub actions: Vec<Action>,
}

impl Replay {
    pub fn new(seed: u32, seats: usize, starting_stack: u64, big_blind: u64) -> Replay {
        Replay {
            seed,
            seats,
            starting_stack,
            big_blind,
            actions: Vec::new(),
        }
    }

    pub fn record(&mut self, action: Action) {
        self.actions.push(action);
    }

    fn config(&self) -> TableConfig {
        TableConfig {
            seats: self.seats,
            starting_stack: self.starting_stack,
            big_blind: self.big_blind,
            seed: Some(self.seed),
            ..TableConfig::default()
        }
    }

    /// Replays the session: creates the table, then folds every recorded
    /// action through the reducer, auto-advancing to the next decision
    /// point between actions the way a live consumer would.
    pub fn run(&self) -> EngineResult<State> {
        let mut state = create_table(&self.config())?;
        state = advance_until_decision(&state)?;
        for &action in &self.actions {
            state = reduce(&state, action)?;
            state = advance_until_decision(&state)?;
        }
        Ok(state)
    }

    pub fn to_json(&self) -> EngineResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> EngineResult<Replay> {
        Ok(serde_json::from_str(json)?)
    }
}
