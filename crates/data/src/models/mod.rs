pub mod ladder;
pub mod misc;
pub mod pair;
pub mod trade;

pub use ladder::{LadderCandidateRow, NeighborRow, NewLadderSnapshot};
pub use misc::{AlertCandidateRow, CreatorScoreAgg, HeartbeatRecord, NewAlert};
pub use pair::{NewPair, PairRecord, ScoreUpdate, ScoringRow};
pub use trade::{CopyTradeRecord, SourceTradeRecord};
