pub mod engine;
pub mod state_transition;

#[cfg(any(test, feature = "mocks"))]
pub mod mocks;

mod layer;

mod state;

pub use layer::Layer;
pub use state::{
    balance, current_round, house, nonce, player_session, player_stats, Adb, Memory, Noncer,
    PrepareError, State, Status,
};
