//! Batch workers that move trades through the pipeline, and the manager
//! that runs them in order on every tick.

pub mod alerts;
pub mod intel;
pub mod ladder;
pub mod manager;
pub mod normalizer;
pub mod pairing;
pub mod scoring;

pub use alerts::AlertsWorker;
pub use intel::CreatorIntelWorker;
pub use ladder::LadderWorker;
pub use manager::WorkerManager;
pub use normalizer::NormalizerWorker;
pub use pairing::PairingWorker;
pub use scoring::ScoringWorker;
