// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Error types for probe geometry, channel maps and electrode selection.
*/

use crate::channelmap::ChannelConflict;
use crate::probe_type::NpxProbeType;

/// Result type for probe operations
pub type NpxResult<T> = Result<T, NpxError>;

/// Errors that can occur while addressing electrodes or building channel maps
#[derive(Debug, Clone, thiserror::Error)]
pub enum NpxError {
    /// Shank, column, row or electrode index outside the variant's range.
    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    /// Two distinct electrodes resolve to the same hardware channel.
    #[error("{0}")]
    ChannelConflict(ChannelConflict),

    /// Selector invoked for a probe variant it does not support.
    #[error("Selector '{selector}' does not support probe type {probe}")]
    UnsupportedVariant {
        selector: String,
        probe: NpxProbeType,
    },

    #[error("Unknown Neuropixels probe code: {0}")]
    UnknownProbeCode(String),

    #[error("Unknown electrode selector: {0}")]
    UnknownSelector(String),

    #[error("Illegal reference value {reference} (valid range 0..{max})")]
    InvalidReference { reference: u32, max: u32 },

    #[error("Invalid value '{value}' for selector option '{name}'")]
    InvalidOption { name: String, value: String },

    #[error("Bad blueprint: {0}")]
    BadBlueprint(String),
}

impl From<ChannelConflict> for NpxError {
    fn from(conflict: ChannelConflict) -> Self {
        NpxError::ChannelConflict(conflict)
    }
}

impl NpxError {
    /// The channel conflict carried by this error, if any.
    pub fn as_conflict(&self) -> Option<&ChannelConflict> {
        match self {
            NpxError::ChannelConflict(conflict) => Some(conflict),
            _ => None,
        }
    }

    /// Consume the error, yielding the channel conflict if this is one.
    pub fn into_conflict(self) -> Result<ChannelConflict, NpxError> {
        match self {
            NpxError::ChannelConflict(conflict) => Ok(conflict),
            other => Err(other),
        }
    }
}
