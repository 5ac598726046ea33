pub mod config;
pub mod config_loader;
pub mod traits;
pub mod types;

pub use config::{
    AlertsConfig, AppConfig, ChainConfig, DatabaseConfig, LadderConfig, OrchestratorConfig,
    PairingConfig, ScoringConfig,
};
pub use config_loader::ConfigLoader;
pub use traits::{HeartbeatSink, Worker};
pub use types::{Baselines, Confidence, ExecStatus, FeeGrade, Side};
