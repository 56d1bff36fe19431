pub mod heuristic;
pub mod random;
#[cfg(feature = "torch")]
pub mod torch;

pub use heuristic::HeuristicPolicy;
pub use random::RandomPolicy;
#[cfg(feature = "torch")]
pub use torch::TorchScriptPolicy;
