//! Error types shared across the engine.
//!
//! The taxonomy follows how each failure is handled:
//!
//! - [`ConfigError`] – fatal configuration problems raised at startup
//!   (invalid collision layers, unreadable config file, unknown key names).
//! - [`SceneLoadError`] – recoverable failures of a background scene load.
//!   The live scene keeps running and the loader reports `Failed`.
//! - [`EntityFault`] – per-entity faults raised inside update/callback
//!   dispatch. They are logged and the faulting behaviour is skipped for the
//!   frame.
//! - [`EngineError`] – anything that prevents the engine from starting.

use std::path::PathBuf;

use thiserror::Error;

use crate::entity::{EntityId, EntityKind};

/// Fatal configuration errors. Never recovered.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid layer for collision given: ({a}, {b}) with {layer_count} declared layers")]
    InvalidLayer {
        a: usize,
        b: usize,
        layer_count: usize,
    },

    #[error("a game must declare at least one collision layer")]
    NoLayers,

    #[error("failed to load config file {path:?}: {reason}")]
    File { path: PathBuf, reason: String },

    #[error("unknown key name '{0}'")]
    UnknownKey(String),

    #[error("invalid value for {key}: {value} ({reason})")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: &'static str,
    },
}

/// Failures while constructing a scene on the loader thread.
#[derive(Error, Debug)]
pub enum SceneLoadError {
    #[error("unknown scene index {0}")]
    UnknownScene(usize),

    #[error("unknown scene name '{0}'")]
    UnknownSceneName(String),

    #[error("failed to read asset {path:?}")]
    Asset {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path:?}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid level layout: {0}")]
    InvalidLayout(String),

    #[error("entity '{name}' uses layer {layer} but only {layer_count} layers are declared")]
    InvalidLayer {
        name: String,
        layer: usize,
        layer_count: usize,
    },

    #[error("scene loader worker panicked")]
    WorkerPanicked,

    #[error("scene loader worker hung up without delivering a scene")]
    Disconnected,
}

/// Recoverable per-entity faults raised by behaviours.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EntityFault {
    #[error("{kind:?} #{entity} has no access to the {capability} capability")]
    MissingCapability {
        entity: EntityId,
        kind: EntityKind,
        capability: &'static str,
    },

    #[error("{kind:?} #{entity} is not damageable")]
    NotDamageable { entity: EntityId, kind: EntityKind },
}

/// Errors that abort engine startup.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("failed to build the starting scene: {0}")]
    StartupScene(#[from] SceneLoadError),
}
