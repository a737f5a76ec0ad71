//! Configuration and resource limits for a wavefront alignment engine.
//!
//! An [`AlignerConfiguration`] is built up by the caller, checked with
//! [`AlignerConfiguration::build`], and handed to an [`AlignmentEngine`] as a
//! read-only [`ValidatedConfiguration`] for the duration of one run.
//!
//! ```
//! use wavefront_config::{AlignerConfiguration, AffinePenalties, DistanceModel};
//!
//! let config = AlignerConfiguration::default()
//!     .with_distance_model(DistanceModel::Affine(AffinePenalties {
//!         mismatch: 4,
//!         gap_opening: 6,
//!         gap_extension: 2,
//!     }))
//!     .build()
//!     .unwrap();
//! assert!(config.requires_backtrace());
//! ```

use log::{debug, info};
use thiserror::Error;

pub mod alignment_mode;
pub mod config;
pub mod display;
pub mod memory;
pub mod monitor;
pub mod optimizations;
pub mod scoring;
pub mod settings;

pub use crate::alignment_mode::{AlignmentForm, AlignmentScope, AlignmentSpan, Boundary};
pub use crate::config::SystemLimits;
pub use crate::display::{Checkpoint, ObserverHandle, PlotParams, PlotRecorder, WavefrontObserver};
pub use crate::memory::{AllocatorHandle, MemoryArena, RunArena, ScratchArena};
pub use crate::monitor::{MemoryUsage, ProbeOutcome, RunMonitor};
pub use crate::optimizations::{MemoryModel, ReductionStrategy};
pub use crate::scoring::{
    Affine2pPenalties, AffinePenalties, ConfigWarning, DistanceMetric, DistanceModel,
    LinearPenalties,
};
pub use crate::settings::AlignerSettings;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WavefrontError {
    #[error("Invalid penalty: {field} = {value} (penalties are non-negative costs)")]
    InvalidPenalty { field: &'static str, value: i32 },
    #[error("Invalid alignment form: {0}")]
    InvalidForm(String),
    #[error("Invalid system limit: {0}")]
    InvalidLimit(String),
    #[error("Invalid reduction strategy: {0}")]
    InvalidReduction(String),
    #[error("Invalid display parameters: {0}")]
    InvalidDisplay(String),
    #[error("Alignment aborted: score {score} exceeded max_alignment_score {limit}")]
    AbortedScore { score: i32, limit: i32 },
    #[error("Alignment aborted: {used} bytes in use exceeded max_memory_used {limit}")]
    AbortedMemory { used: u64, limit: u64 },
    #[error("Settings error: {0}")]
    Settings(String),
}

impl WavefrontError {
    /// Raised by [`AlignerConfiguration::build`] or a validating setter.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            WavefrontError::InvalidPenalty { .. }
                | WavefrontError::InvalidForm(_)
                | WavefrontError::InvalidLimit(_)
                | WavefrontError::InvalidReduction(_)
                | WavefrontError::InvalidDisplay(_)
        )
    }

    /// Raised by the engine when a run hits a hard limit.
    pub fn is_abort(&self) -> bool {
        matches!(
            self,
            WavefrontError::AbortedScore { .. } | WavefrontError::AbortedMemory { .. }
        )
    }
}

/// Everything an alignment run is parameterized by.
///
/// Fields are public and unchecked until [`build`](Self::build). The
/// `with_*` and `set_*` helpers validate eagerly where they can fail.
/// `'a` bounds the caller-owned allocator and observer, if any.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AlignerConfiguration<'a> {
    pub distance_model: DistanceModel,
    pub alignment_scope: AlignmentScope,
    pub alignment_form: AlignmentForm,
    pub reduction: ReductionStrategy,
    pub low_memory: bool,
    pub allocator: Option<AllocatorHandle<'a>>,
    pub plot_params: PlotParams,
    pub observer: Option<ObserverHandle<'a>>,
    pub system: SystemLimits,
}

impl<'a> AlignerConfiguration<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn distance_metric(&self) -> DistanceMetric {
        self.distance_model.metric()
    }

    /// Selects `metric` with its default penalties.
    pub fn set_distance_metric(&mut self, metric: DistanceMetric) {
        self.distance_model = DistanceModel::with_default_penalties(metric);
    }

    /// Selects the metric and penalties in one step.
    pub fn set_distance_model(&mut self, model: DistanceModel) -> Result<(), WavefrontError> {
        model.validate(&mut Vec::new())?;
        self.distance_model = model;
        Ok(())
    }

    pub fn memory_model(&self) -> MemoryModel {
        MemoryModel::from_low_memory(self.low_memory)
    }

    pub fn with_distance_model(mut self, model: DistanceModel) -> Self {
        self.distance_model = model;
        self
    }

    pub fn with_scope(mut self, scope: AlignmentScope) -> Self {
        self.alignment_scope = scope;
        self
    }

    pub fn with_form(mut self, form: AlignmentForm) -> Self {
        self.alignment_form = form;
        self
    }

    pub fn with_max_score(mut self, limit: Option<i32>) -> Result<Self, WavefrontError> {
        self.alignment_form.set_max_score(limit)?;
        Ok(self)
    }

    pub fn with_reduction(mut self, reduction: ReductionStrategy) -> Self {
        self.reduction = reduction;
        self
    }

    pub fn with_low_memory(mut self, low_memory: bool) -> Self {
        self.low_memory = low_memory;
        self
    }

    pub fn with_allocator(mut self, arena: &'a dyn MemoryArena) -> Self {
        self.allocator = Some(AllocatorHandle::new(arena));
        self
    }

    pub fn with_plot(mut self, params: PlotParams) -> Self {
        self.plot_params = params;
        self
    }

    pub fn with_observer(mut self, observer: &'a dyn WavefrontObserver) -> Self {
        self.observer = Some(ObserverHandle::new(observer));
        self
    }

    pub fn with_system(mut self, system: SystemLimits) -> Self {
        self.system = system;
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.system.verbose = verbose;
        self
    }

    /// Validates every field and returns a frozen copy.
    ///
    /// Checks run in a fixed order and the first failure is returned:
    /// penalties, alignment form, system limits, scope, reduction, display.
    pub fn build(&self) -> Result<ValidatedConfiguration<'a>, WavefrontError> {
        let mut warnings = Vec::new();

        self.distance_model.validate(&mut warnings)?;
        self.alignment_form.validate()?;
        self.system.validate()?;
        if self.alignment_scope == AlignmentScope::ScoreOnly && self.system.has_custom_compaction() {
            debug!("Score-only scope: backtrace compaction limits have no effect");
        }
        self.reduction.validate()?;
        self.plot_params.validate()?;

        let validated = ValidatedConfiguration {
            config: self.clone(),
            warnings,
        };
        if self.system.verbose {
            info!("Aligner configuration: {}", validated.summary());
        }
        Ok(validated)
    }
}

/// A configuration that passed [`AlignerConfiguration::build`].
///
/// Offers read access only; call [`into_configuration`](Self::into_configuration)
/// to edit and rebuild.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedConfiguration<'a> {
    config: AlignerConfiguration<'a>,
    warnings: Vec<ConfigWarning>,
}

impl<'a> ValidatedConfiguration<'a> {
    pub fn distance_metric(&self) -> DistanceMetric {
        self.config.distance_model.metric()
    }

    pub fn distance_model(&self) -> &DistanceModel {
        &self.config.distance_model
    }

    pub fn alignment_scope(&self) -> AlignmentScope {
        self.config.alignment_scope
    }

    pub fn alignment_form(&self) -> &AlignmentForm {
        &self.config.alignment_form
    }

    pub fn reduction(&self) -> &ReductionStrategy {
        &self.config.reduction
    }

    pub fn memory_model(&self) -> MemoryModel {
        self.config.memory_model()
    }

    pub fn allocator(&self) -> Option<AllocatorHandle<'a>> {
        self.config.allocator
    }

    pub fn plot_params(&self) -> &PlotParams {
        &self.config.plot_params
    }

    pub fn observer(&self) -> Option<&'a dyn WavefrontObserver> {
        self.config.observer.map(|handle| handle.observer())
    }

    pub fn system(&self) -> &SystemLimits {
        &self.config.system
    }

    pub fn verbose(&self) -> bool {
        self.config.system.verbose
    }

    pub fn warnings(&self) -> &[ConfigWarning] {
        &self.warnings
    }

    /// The engine must keep a backtrace buffer.
    pub fn requires_backtrace(&self) -> bool {
        self.config.alignment_scope == AlignmentScope::FullAlignment
    }

    /// Read-only view of the underlying fields.
    pub fn as_configuration(&self) -> &AlignerConfiguration<'a> {
        &self.config
    }

    pub fn into_configuration(self) -> AlignerConfiguration<'a> {
        self.config
    }

    /// Arena for one run: the caller's allocator, or a run-owned one.
    pub fn run_arena(&self) -> RunArena<'a> {
        RunArena::for_run(self.config.allocator)
    }

    /// Limit poller for one run. Derived afresh so the effective compaction
    /// threshold reflects the current settings and `arena`.
    pub fn monitor(&self, arena: &dyn MemoryArena) -> RunMonitor {
        RunMonitor::new(self, arena.overhead())
    }

    pub fn summary(&self) -> String {
        let form = &self.config.alignment_form;
        let max_score = form
            .max_alignment_score
            .map_or("unbounded".to_string(), |s| s.to_string());
        format!(
            "metric={:?} scope={:?} span={:?} max_score={} reduction={:?} memory={:?} external_allocator={}",
            self.distance_metric(),
            self.config.alignment_scope,
            form.span,
            max_score,
            self.config.reduction,
            self.memory_model(),
            self.config.allocator.is_some(),
        )
    }
}

/// An alignment engine driven by a validated configuration. The engine
/// only ever sees a shared borrow, so the configuration cannot change
/// mid-run.
pub trait AlignmentEngine {
    type Output;

    fn align(
        &mut self,
        config: &ValidatedConfiguration<'_>,
        pattern: &[u8],
        text: &[u8],
    ) -> Result<Self::Output, WavefrontError>;
}
