use std::fmt;
use std::sync::{Mutex, MutexGuard};

use serde::{Deserialize, Serialize};

use crate::WavefrontError;

pub const DEFAULT_RESOLUTION_POINTS: u32 = 2000;

/// Plot settings. A `None` window covers the whole sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlotParams {
    pub enabled: bool,
    pub resolution_points: u32,
    pub pattern_window: Option<(u32, u32)>,
    pub text_window: Option<(u32, u32)>,
}

impl Default for PlotParams {
    fn default() -> Self {
        Self {
            enabled: false,
            resolution_points: DEFAULT_RESOLUTION_POINTS,
            pattern_window: None,
            text_window: None,
        }
    }
}

impl PlotParams {
    pub fn validate(&self) -> Result<(), WavefrontError> {
        if self.enabled && self.resolution_points == 0 {
            return Err(WavefrontError::InvalidDisplay(
                "resolution_points must be positive when plotting".to_string(),
            ));
        }
        for (name, window) in [("pattern", self.pattern_window), ("text", self.text_window)] {
            if let Some((lo, hi)) = window {
                if lo > hi {
                    return Err(WavefrontError::InvalidDisplay(format!(
                        "{} window is empty ({}..{})",
                        name, lo, hi
                    )));
                }
            }
        }
        Ok(())
    }

    fn contains(&self, pattern_pos: u32, text_pos: u32) -> bool {
        let inside = |window: Option<(u32, u32)>, pos: u32| {
            window.map_or(true, |(lo, hi)| lo <= pos && pos <= hi)
        };
        inside(self.pattern_window, pattern_pos) && inside(self.text_window, text_pos)
    }
}

/// State of the search after one score step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Checkpoint {
    pub score: i32,
    pub lo: i32, // Lowest diagonal
    pub hi: i32, // Highest diagonal
    pub pattern_pos: u32,
    pub text_pos: u32,
    pub memory_used: u64,
}

/// Hooks the engine calls at fixed points of a run. Observers may be shared
/// by concurrent runs.
pub trait WavefrontObserver: Sync {
    /// After each score step.
    fn on_step(&self, checkpoint: &Checkpoint);

    /// Once, when the run completes or aborts.
    fn on_finish(&self, _final_score: Option<i32>) {}
}

/// Non-owning observer reference held by a configuration.
#[derive(Clone, Copy)]
pub struct ObserverHandle<'a> {
    observer: &'a dyn WavefrontObserver,
}

impl<'a> ObserverHandle<'a> {
    pub fn new(observer: &'a dyn WavefrontObserver) -> Self {
        Self { observer }
    }

    pub fn observer(&self) -> &'a dyn WavefrontObserver {
        self.observer
    }
}

impl fmt::Debug for ObserverHandle<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObserverHandle({:p})", self.observer)
    }
}

impl PartialEq for ObserverHandle<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::addr_eq(self.observer, other.observer)
    }
}

impl Eq for ObserverHandle<'_> {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlotPoint {
    pub score: i32,
    pub pattern_pos: u32,
    pub text_pos: u32,
}

/// Observer collecting the wavefront trajectory for plotting. Keeps at most
/// `resolution_points` points by halving the sampling rate when full.
#[derive(Debug)]
pub struct PlotRecorder {
    params: PlotParams,
    state: Mutex<RecorderState>,
}

#[derive(Debug)]
struct RecorderState {
    points: Vec<PlotPoint>,
    stride: u64,
    seen: u64,
    final_score: Option<i32>,
}

impl Default for RecorderState {
    fn default() -> Self {
        Self {
            points: Vec::new(),
            stride: 1,
            seen: 0,
            final_score: None,
        }
    }
}

impl RecorderState {
    fn record(&mut self, point: PlotPoint, capacity: usize) {
        let seen = self.seen;
        self.seen = seen.saturating_add(1);
        if seen % self.stride != 0 {
            return;
        }

        self.points.push(point);
        if self.points.len() > capacity {
            let mut index = 0;
            self.points.retain(|_| {
                index += 1;
                index % 2 == 1
            });
            self.stride = self.stride.saturating_mul(2);
        }
    }
}

impl PlotRecorder {
    pub fn new(params: PlotParams) -> Self {
        Self {
            params,
            state: Mutex::new(RecorderState::default()),
        }
    }

    // A panic in another run's observer call leaves the points intact.
    fn state(&self) -> MutexGuard<'_, RecorderState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn points(&self) -> Vec<PlotPoint> {
        self.state().points.clone()
    }

    pub fn final_score(&self) -> Option<i32> {
        self.state().final_score
    }
}

impl WavefrontObserver for PlotRecorder {
    fn on_step(&self, checkpoint: &Checkpoint) {
        if !self.params.enabled || !self.params.contains(checkpoint.pattern_pos, checkpoint.text_pos) {
            return;
        }
        let point = PlotPoint {
            score: checkpoint.score,
            pattern_pos: checkpoint.pattern_pos,
            text_pos: checkpoint.text_pos,
        };
        self.state().record(point, self.params.resolution_points as usize);
    }

    fn on_finish(&self, final_score: Option<i32>) {
        self.state().final_score = final_score;
    }
}
