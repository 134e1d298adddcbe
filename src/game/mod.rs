// Board game rules: track layout, scoring and per-game ledgers

pub mod board;
pub mod scorer;
pub mod session;

pub use board::{BoardConfig, BoardTile, TileEffect};
pub use scorer::{ScoringEngine, ScoringResult};
pub use session::{GameSession, LeaderboardEntry};
