use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("base rules snapshot not installed; call set_base_rules first")]
    BaseRulesMissing,

    #[error("ordering error: {0}")]
    Order(#[from] muster_order::OrderError),
}

pub type EngineResult<T> = Result<T, EngineError>;
