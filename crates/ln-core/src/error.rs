//! Core error type.
//!
//! Sub-crates define their own error enums and wrap `CoreError` as one
//! variant via `#[from]`.

use thiserror::Error;

use crate::{PathId, RegionId};

/// Errors raised while validating configuration or map input.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("invalid map: {0}")]
    InvalidMap(String),

    #[error("path {path} references unknown region {region}")]
    DanglingPath { path: PathId, region: RegionId },
}

/// Shorthand result type for `ln-core`.
pub type CoreResult<T> = Result<T, CoreError>;
