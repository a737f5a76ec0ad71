use log::warn;
use serde::{Deserialize, Serialize};

use crate::WavefrontError;

// Default penalties
pub const DEFAULT_MISMATCH: i32 = 4;
pub const DEFAULT_INDEL: i32 = 2;
pub const DEFAULT_GAP_OPENING: i32 = 6;
pub const DEFAULT_GAP_EXTENSION: i32 = 2;
pub const DEFAULT_GAP_OPENING2: i32 = 24;
pub const DEFAULT_GAP_EXTENSION2: i32 = 1;

/// Which scoring scheme the engine runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DistanceMetric {
    Indel,    // Gaps only, unit cost
    Edit,     // Levenshtein, unit cost
    Linear,   // Gap-linear
    Affine,   // Gap-affine
    Affine2p, // Gap-affine 2-pieces
}

impl std::str::FromStr for DistanceMetric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "indel" => Ok(DistanceMetric::Indel),
            "edit" | "levenshtein" => Ok(DistanceMetric::Edit),
            "linear" | "gap-linear" => Ok(DistanceMetric::Linear),
            "affine" | "gap-affine" => Ok(DistanceMetric::Affine),
            "affine2p" | "affine-2p" | "gap-affine-2p" => Ok(DistanceMetric::Affine2p),
            _ => Err(format!("Unknown distance metric: {}", s)),
        }
    }
}

/// Gap-linear penalties. All values are costs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinearPenalties {
    pub mismatch: i32,
    pub indel: i32,
}

impl Default for LinearPenalties {
    fn default() -> Self {
        Self {
            mismatch: DEFAULT_MISMATCH,
            indel: DEFAULT_INDEL,
        }
    }
}

/// Gap-affine penalties. A gap of length `l` costs `gap_opening + l * gap_extension`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AffinePenalties {
    pub mismatch: i32,
    pub gap_opening: i32,
    pub gap_extension: i32,
}

impl Default for AffinePenalties {
    fn default() -> Self {
        Self {
            mismatch: DEFAULT_MISMATCH,
            gap_opening: DEFAULT_GAP_OPENING,
            gap_extension: DEFAULT_GAP_EXTENSION,
        }
    }
}

/// Two-piece gap-affine penalties. A gap costs the cheaper of the two pieces,
/// so the first piece usually prices short gaps and the second long ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Affine2pPenalties {
    pub mismatch: i32,
    pub gap_opening1: i32,
    pub gap_extension1: i32,
    pub gap_opening2: i32,
    pub gap_extension2: i32,
}

impl Default for Affine2pPenalties {
    fn default() -> Self {
        Self {
            mismatch: DEFAULT_MISMATCH,
            gap_opening1: DEFAULT_GAP_OPENING,
            gap_extension1: DEFAULT_GAP_EXTENSION,
            gap_opening2: DEFAULT_GAP_OPENING2,
            gap_extension2: DEFAULT_GAP_EXTENSION2,
        }
    }
}

impl Affine2pPenalties {
    /// Both pieces price every gap length the same.
    pub fn is_degenerate(&self) -> bool {
        self.gap_opening1 == self.gap_opening2 && self.gap_extension1 == self.gap_extension2
    }
}

/// Non-fatal findings raised while building a configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigWarning {
    /// Two-piece affine with identical pieces. Scores are unaffected but the
    /// engine pays for a second gap component it never needs.
    DegenerateAffine2p,
}

impl std::fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigWarning::DegenerateAffine2p => {
                write!(f, "gap-affine-2p pieces are identical; use gap-affine instead")
            }
        }
    }
}

/// The active penalty representation. Only the variant matching the metric
/// exists, so penalties cannot be read through the wrong metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "metric", rename_all = "kebab-case")]
pub enum DistanceModel {
    Indel,
    Edit,
    Linear(LinearPenalties),
    Affine(AffinePenalties),
    Affine2p(Affine2pPenalties),
}

impl Default for DistanceModel {
    fn default() -> Self {
        DistanceModel::Affine(AffinePenalties::default())
    }
}

impl DistanceModel {
    /// Model for `metric` carrying that metric's default penalties.
    pub fn with_default_penalties(metric: DistanceMetric) -> Self {
        match metric {
            DistanceMetric::Indel => DistanceModel::Indel,
            DistanceMetric::Edit => DistanceModel::Edit,
            DistanceMetric::Linear => DistanceModel::Linear(LinearPenalties::default()),
            DistanceMetric::Affine => DistanceModel::Affine(AffinePenalties::default()),
            DistanceMetric::Affine2p => DistanceModel::Affine2p(Affine2pPenalties::default()),
        }
    }

    pub fn metric(&self) -> DistanceMetric {
        match self {
            DistanceModel::Indel => DistanceMetric::Indel,
            DistanceModel::Edit => DistanceMetric::Edit,
            DistanceModel::Linear(_) => DistanceMetric::Linear,
            DistanceModel::Affine(_) => DistanceMetric::Affine,
            DistanceModel::Affine2p(_) => DistanceMetric::Affine2p,
        }
    }

    pub fn linear(&self) -> Option<&LinearPenalties> {
        match self {
            DistanceModel::Linear(p) => Some(p),
            _ => None,
        }
    }

    pub fn affine(&self) -> Option<&AffinePenalties> {
        match self {
            DistanceModel::Affine(p) => Some(p),
            _ => None,
        }
    }

    pub fn affine2p(&self) -> Option<&Affine2pPenalties> {
        match self {
            DistanceModel::Affine2p(p) => Some(p),
            _ => None,
        }
    }

    /// Checks that every cost is non-negative. Pushes a warning for a
    /// degenerate two-piece model instead of failing.
    pub fn validate(&self, warnings: &mut Vec<ConfigWarning>) -> Result<(), WavefrontError> {
        match self {
            DistanceModel::Indel | DistanceModel::Edit => Ok(()),
            DistanceModel::Linear(p) => {
                non_negative("mismatch", p.mismatch)?;
                non_negative("indel", p.indel)
            }
            DistanceModel::Affine(p) => {
                non_negative("mismatch", p.mismatch)?;
                non_negative("gap_opening", p.gap_opening)?;
                non_negative("gap_extension", p.gap_extension)
            }
            DistanceModel::Affine2p(p) => {
                non_negative("mismatch", p.mismatch)?;
                non_negative("gap_opening1", p.gap_opening1)?;
                non_negative("gap_extension1", p.gap_extension1)?;
                non_negative("gap_opening2", p.gap_opening2)?;
                non_negative("gap_extension2", p.gap_extension2)?;
                if p.is_degenerate() {
                    warn!("{}", ConfigWarning::DegenerateAffine2p);
                    warnings.push(ConfigWarning::DegenerateAffine2p);
                }
                Ok(())
            }
        }
    }
}

fn non_negative(field: &'static str, value: i32) -> Result<(), WavefrontError> {
    if value < 0 {
        return Err(WavefrontError::InvalidPenalty { field, value });
    }
    Ok(())
}
