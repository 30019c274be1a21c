// Copyright 2025 John Brosnihan
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//! Engine error types
//!
//! Every fallible operation in the crate returns [`Result`]. Systems propagate
//! failures with `?`; the scheduler does not recover from them, so one failing
//! system aborts the frame and the error surfaces to the scene controller.

use crate::ecs::Entity;

/// Errors raised by the ECS runtime, asset boundary, session loading and configuration.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// A system asked for a component the entity does not carry.
    #[error("{entity} has no {component} component")]
    MissingComponent {
        /// Entity that was queried
        entity: Entity,
        /// Short name of the requested component type
        component: &'static str,
    },

    /// A storage was requested for a component type never attached to anything.
    #[error("component type {0} has not been registered")]
    UnregisteredComponent(&'static str),

    /// The world ran out of signature bits for new component kinds.
    #[error("cannot register {0}: component kind limit of {1} reached")]
    TooManyComponentKinds(&'static str, usize),

    /// A component storage was already mutably borrowed elsewhere.
    #[error("storage for {0} is already borrowed")]
    StorageBorrowed(&'static str),

    /// The entity has already been destroyed.
    #[error("{0} is not alive")]
    DeadEntity(Entity),

    /// An image or audio payload could not be decoded.
    #[error("failed to decode asset: {0}")]
    AssetDecodeFailure(String),

    /// Rhythm session data failed validation.
    #[error("invalid session data: {0}")]
    InvalidSessionData(String),

    /// Rhythm session data was written by an incompatible format version.
    #[error("session format {found} is not compatible with {supported}")]
    IncompatibleSessionVersion {
        /// Version recorded in the session
        found: semver::Version,
        /// Versions this build can read
        supported: semver::VersionReq,
    },

    /// A configuration value is out of range.
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// Failed to read the config file from disk.
    #[error("failed to read config: {0}")]
    ConfigRead(#[source] std::io::Error),

    /// Failed to write the config file to disk.
    #[error("failed to write config: {0}")]
    ConfigWrite(#[source] std::io::Error),

    /// Failed to parse RON content.
    #[error("failed to parse config: {0}")]
    ConfigParse(#[source] ron::error::SpannedError),

    /// Failed to serialize config to RON.
    #[error("failed to serialize config: {0}")]
    ConfigSerialize(#[source] ron::Error),

    /// The scene factory cannot build the requested scene.
    #[error("scene {0} is not available")]
    SceneNotAvailable(String),
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, EngineError>;
