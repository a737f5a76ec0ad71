//! File form of an aligner configuration.
//!
//! ```toml
//! scope = "full-alignment"
//! low_memory = false
//!
//! [distance]
//! metric = "affine"
//! mismatch = 4
//! gap_opening = 6
//! gap_extension = 2
//!
//! [form]
//! span = "ends-free"
//! text_begin_free = true
//! text_end_free = true
//!
//! [system]
//! global_probe_interval = 3000
//! max_memory_used = 4294967296
//! max_memory_resident = "unbounded"
//! ```
//!
//! Omitted sections and keys take their defaults, so a `[system]` section
//! without `max_memory_resident` keeps the 256 MiB resident ceiling. Memory
//! ceilings take a byte count or `"unbounded"`. An omitted
//! `max_alignment_score` means unbounded, which is also its default.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{
    AlignerConfiguration, AlignmentForm, AlignmentScope, DistanceModel, PlotParams,
    ReductionStrategy, SystemLimits, WavefrontError,
};

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AlignerSettings {
    pub distance: DistanceModel,
    pub scope: AlignmentScope,
    pub form: AlignmentForm,
    pub reduction: ReductionStrategy,
    pub low_memory: bool,
    pub plot: PlotParams,
    pub system: SystemSettings,
}

/// [`SystemLimits`] as written in a settings file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemSettings {
    pub global_probe_interval: u32,
    pub bt_compact_probe_interval: u32,
    pub bt_compact_max_memory: u64,
    #[serde(with = "ceiling")]
    pub max_memory_used: Option<u64>,
    #[serde(with = "ceiling")]
    pub max_memory_resident: Option<u64>,
    pub verbose: bool,
}

/// A memory ceiling: a byte count, or the keyword `"unbounded"` for `None`.
mod ceiling {
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    const UNBOUNDED: &str = "unbounded";

    #[derive(Serialize, Deserialize)]
    #[serde(untagged)]
    enum Ceiling {
        Bytes(u64),
        Keyword(String),
    }

    pub fn serialize<S: Serializer>(value: &Option<u64>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(bytes) => Ceiling::Bytes(*bytes),
            None => Ceiling::Keyword(UNBOUNDED.to_string()),
        }
        .serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u64>, D::Error> {
        match Ceiling::deserialize(deserializer)? {
            Ceiling::Bytes(bytes) => Ok(Some(bytes)),
            Ceiling::Keyword(word) if word == UNBOUNDED => Ok(None),
            Ceiling::Keyword(word) => Err(D::Error::custom(format!(
                "expected a byte count or \"{}\", found \"{}\"",
                UNBOUNDED, word
            ))),
        }
    }
}

impl Default for SystemSettings {
    fn default() -> Self {
        SystemLimits::default().into()
    }
}

impl From<SystemLimits> for SystemSettings {
    fn from(limits: SystemLimits) -> Self {
        Self {
            global_probe_interval: limits.global_probe_interval,
            bt_compact_probe_interval: limits.bt_compact_probe_interval,
            bt_compact_max_memory: limits.bt_compact_max_memory,
            max_memory_used: limits.max_memory_used,
            max_memory_resident: limits.max_memory_resident,
            verbose: limits.verbose,
        }
    }
}

impl From<SystemSettings> for SystemLimits {
    fn from(settings: SystemSettings) -> Self {
        Self {
            global_probe_interval: settings.global_probe_interval,
            bt_compact_probe_interval: settings.bt_compact_probe_interval,
            bt_compact_max_memory: settings.bt_compact_max_memory,
            max_memory_used: settings.max_memory_used,
            max_memory_resident: settings.max_memory_resident,
            verbose: settings.verbose,
        }
    }
}

impl AlignerSettings {
    pub fn from_toml_str(content: &str) -> Result<Self, WavefrontError> {
        toml::from_str(content).map_err(|e| WavefrontError::Settings(e.to_string()))
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, WavefrontError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| WavefrontError::Settings(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&content)
    }

    pub fn to_toml_string(&self) -> Result<String, WavefrontError> {
        toml::to_string_pretty(self).map_err(|e| WavefrontError::Settings(e.to_string()))
    }

    /// Unvalidated configuration; call `build()` on the result.
    pub fn into_configuration(self) -> AlignerConfiguration<'static> {
        AlignerConfiguration {
            distance_model: self.distance,
            alignment_scope: self.scope,
            alignment_form: self.form,
            reduction: self.reduction,
            low_memory: self.low_memory,
            plot_params: self.plot,
            system: self.system.into(),
            ..AlignerConfiguration::default()
        }
    }
}

impl From<&AlignerConfiguration<'_>> for AlignerSettings {
    fn from(config: &AlignerConfiguration<'_>) -> Self {
        Self {
            distance: config.distance_model,
            scope: config.alignment_scope,
            form: config.alignment_form,
            reduction: config.reduction,
            low_memory: config.low_memory,
            plot: config.plot_params,
            system: config.system.into(),
        }
    }
}
