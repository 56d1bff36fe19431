use thiserror::Error;

#[derive(Debug, Error)]
pub enum GameError {
    /// 配置或归一化统计文件格式错误
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("precondition violated: {0}")]
    Precondition(&'static str),
    #[error("invalid action code {0}, expected 0 (left), 1 (stay) or 2 (right)")]
    InvalidAction(i64),
    #[error("observation has {actual} elements but statistics cover only {expected}")]
    DimensionMismatch { expected: usize, actual: usize },
    #[error("policy inference failed: {0}")]
    Policy(String),
    #[error("plotting failed: {0}")]
    Plot(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, GameError>;
