//! Postgres storage layer: connection helper, record models, one
//! repository per table, and the baseline cache.

pub mod baselines;
pub mod database;
pub mod models;
pub mod repositories;

pub use baselines::BaselineCache;
pub use database::{connect, run_migrations};
pub use models::{
    AlertCandidateRow, CopyTradeRecord, CreatorScoreAgg, HeartbeatRecord, LadderCandidateRow,
    NeighborRow, NewAlert, NewLadderSnapshot, NewPair, PairRecord, ScoreUpdate, ScoringRow,
    SourceTradeRecord,
};
pub use repositories::{
    AlertRepository, BaselineRepository, CopyTradeRepository, CreatorIntelRepository,
    HeartbeatRepository, LadderRepository, PairRepository, SourceTradeRepository,
};
