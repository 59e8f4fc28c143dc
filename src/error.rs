//! Crate-level error type.
//!
//! Each component reports its own error enum; [`DashboardError`] wraps them
//! for callers that drive several components at once (initialization and the
//! CLI).

use thiserror::Error;

use crate::config::error::ConfigError;
use crate::store::StoreError;
use crate::surface::SurfaceError;
use crate::widgets::WidgetError;

/// Errors surfaced to callers of the dashboard engine.
#[derive(Error, Debug)]
pub enum DashboardError {
    /// The layout surface could not be bound.
    #[error(transparent)]
    Surface(#[from] SurfaceError),

    /// A widget could not be materialized.
    #[error(transparent)]
    Widget(#[from] WidgetError),

    /// The layout snapshot could not be written.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The configuration file could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),
}
