use ln_core::{CoreError, UnitId};
use ln_lane::LaneError;
use ln_nav::NavError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WorldError {
    #[error("configuration error: {0}")]
    Core(#[from] CoreError),

    #[error("navigation error: {0}")]
    Nav(#[from] NavError),

    #[error("lane error: {0}")]
    Lane(#[from] LaneError),

    #[error("unit {0} stands outside every navigation graph")]
    UnmappedUnit(UnitId),
}

impl WorldError {
    /// `true` when the wrapped error is an ordinary search or movement miss.
    pub fn is_recoverable(&self) -> bool {
        match self {
            WorldError::Nav(e)  => e.is_recoverable(),
            WorldError::Lane(e) => e.is_recoverable(),
            WorldError::Core(_) | WorldError::UnmappedUnit(_) => false,
        }
    }
}

pub type WorldResult<T> = Result<T, WorldError>;
