pub mod config;
pub mod engine;
pub mod error;
pub mod filter;
pub mod models;
pub mod sampler;

pub use config::{EngineConfig, Strategy};
pub use engine::{Game, GenerationRequest, GenerationResult, LottoEngine};
pub use error::EngineError;
