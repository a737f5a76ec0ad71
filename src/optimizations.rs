use serde::{Deserialize, Serialize};

use crate::WavefrontError;

pub const DEFAULT_MIN_WAVEFRONT_LENGTH: u32 = 10;
pub const DEFAULT_MAX_DISTANCE_THRESHOLD: u32 = 50;

/// Pruning policy bounding wavefront width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "kebab-case")]
pub enum ReductionStrategy {
    #[default]
    None,
    /// Drop diagonals lagging more than `max_distance_threshold` behind the
    /// best one, once the wavefront is at least `min_wavefront_length` wide.
    Adaptive {
        min_wavefront_length: u32,
        max_distance_threshold: u32,
    },
}

impl ReductionStrategy {
    pub fn adaptive() -> Self {
        ReductionStrategy::Adaptive {
            min_wavefront_length: DEFAULT_MIN_WAVEFRONT_LENGTH,
            max_distance_threshold: DEFAULT_MAX_DISTANCE_THRESHOLD,
        }
    }

    /// Reduction may discard the optimal path.
    pub fn is_heuristic(&self) -> bool {
        !matches!(self, ReductionStrategy::None)
    }

    pub fn validate(&self) -> Result<(), WavefrontError> {
        if let ReductionStrategy::Adaptive {
            min_wavefront_length,
            max_distance_threshold,
        } = *self
        {
            if min_wavefront_length == 0 || max_distance_threshold == 0 {
                return Err(WavefrontError::InvalidReduction(format!(
                    "adaptive reduction needs positive parameters (min_wavefront_length={}, max_distance_threshold={})",
                    min_wavefront_length, max_distance_threshold
                )));
            }
        }
        Ok(())
    }
}

/// Wavefront storage layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MemoryModel {
    /// Keep every wavefront.
    #[default]
    High,
    /// Modular wavefronts with piggybacked backtrace.
    Low,
}

impl MemoryModel {
    pub fn from_low_memory(low_memory: bool) -> Self {
        if low_memory {
            MemoryModel::Low
        } else {
            MemoryModel::High
        }
    }

    pub fn is_low_memory(&self) -> bool {
        *self == MemoryModel::Low
    }
}
