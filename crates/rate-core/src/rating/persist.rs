//! Saved widget state.
//!
//! Only the rating survives a save/restore cycle. The record is encoded with
//! `postcard`, so it is a couple of bytes on the wire.

extern crate alloc;

use alloc::vec::Vec;
use serde::{Deserialize, Serialize};
use thiserror_no_std::Error;

use super::selection::Rating;

/// Failure to encode or decode a [`SavedState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PersistError {
    #[error("Failed to encode saved state")]
    Encode,

    #[error("Failed to decode saved state")]
    Decode,
}

/// Persisted rating record.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct SavedState {
    /// 0-based rating, or [`SavedState::UNRATED`]
    pub rating: i16,
}

impl SavedState {
    pub const UNRATED: i16 = -1;

    pub fn from_rating(rating: Rating) -> Self {
        let rating = match rating {
            Rating::Unrated => Self::UNRATED,
            Rating::Rated(index) => i16::try_from(index).unwrap_or(i16::MAX),
        };
        Self { rating }
    }

    /// Stored rating, `None` for unrated or any other negative value.
    pub fn index(&self) -> Option<usize> {
        usize::try_from(self.rating).ok()
    }

    pub fn encode(&self) -> Result<Vec<u8>, PersistError> {
        postcard::to_allocvec(self).map_err(|_| PersistError::Encode)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, PersistError> {
        postcard::from_bytes(bytes).map_err(|_| PersistError::Decode)
    }
}

impl Default for SavedState {
    fn default() -> Self {
        Self {
            rating: Self::UNRATED,
        }
    }
}
