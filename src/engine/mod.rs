//! Core engine: merging provider datasets into the draft board.

pub mod merge;
pub mod store;

pub use merge::merge_players;
pub use store::PlayerStore;
