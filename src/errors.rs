// src/errors.rs

//! Crate-wide error type and result alias.
//!
//! Every fatal session outcome (setup failure, launch failure, unexpected
//! exit of the supervised service) is a `HostError`. A cancelled session is
//! *not* an error; see [`crate::engine::SessionOutcome`].

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum HostError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("setup step '{step}' failed with exit code {exit_code}")]
    SetupStep { step: String, exit_code: i32 },

    #[error("failed to prepare install directory {}: {source}", path.display())]
    SetupIo {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    #[error("failed to write setup marker {}: {source}", path.display())]
    Marker {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    #[error("failed to start '{program}': {source}")]
    Launch {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("MinerU API process exited unexpectedly with code {exit_code}")]
    UnexpectedExit { exit_code: i32 },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl HostError {
    /// Process exit code reported by the binary for this error.
    pub fn exit_code(&self) -> u8 {
        1
    }

    /// True for errors that end a running (or starting) supervisory session,
    /// as opposed to problems found before a session begins.
    pub fn is_session_failure(&self) -> bool {
        matches!(
            self,
            HostError::SetupStep { .. }
                | HostError::SetupIo { .. }
                | HostError::Marker { .. }
                | HostError::Launch { .. }
                | HostError::UnexpectedExit { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, HostError>;
