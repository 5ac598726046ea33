pub mod alert_repo;
pub mod baseline_repo;
pub mod copy_trade_repo;
pub mod heartbeat_repo;
pub mod intel_repo;
pub mod ladder_repo;
pub mod pair_repo;
pub mod source_trade_repo;

pub use alert_repo::AlertRepository;
pub use baseline_repo::BaselineRepository;
pub use copy_trade_repo::CopyTradeRepository;
pub use heartbeat_repo::HeartbeatRepository;
pub use intel_repo::CreatorIntelRepository;
pub use ladder_repo::LadderRepository;
pub use pair_repo::PairRepository;
pub use source_trade_repo::SourceTradeRepository;
