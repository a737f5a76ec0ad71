use log::{info, trace};

use crate::memory::MemoryArena;
use crate::{ValidatedConfiguration, WavefrontError};

/// Memory snapshot passed to [`RunMonitor::probe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MemoryUsage {
    pub used: u64,
    pub resident: u64,
    pub backtrace: u64, // Backtrace-buffer bytes
}

impl MemoryUsage {
    pub fn from_arena(arena: &dyn MemoryArena, backtrace: u64) -> Self {
        Self {
            used: arena.bytes_used(),
            resident: arena.bytes_resident(),
            backtrace,
        }
    }
}

/// Soft actions requested by a probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProbeOutcome {
    /// Resident memory passed `max_memory_resident`.
    pub reap: bool,
    /// Backtrace buffer passed the effective compaction threshold.
    pub compact: bool,
}

impl ProbeOutcome {
    pub fn is_continue(&self) -> bool {
        !self.reap && !self.compact
    }
}

/// Polls the limits of one run. Create one per run with
/// [`ValidatedConfiguration::monitor`] and call [`probe`](Self::probe) once
/// per score step.
#[derive(Debug, Clone)]
pub struct RunMonitor {
    ticks: u64,
    max_score: Option<i32>,
    global_probe_interval: u64,
    bt_compact_probe_interval: u64,
    bt_compact_max_memory_eff: u64,
    max_memory_used: Option<u64>,
    max_memory_resident: Option<u64>,
    backtrace: bool,
    verbose: bool,
}

impl RunMonitor {
    pub fn new(config: &ValidatedConfiguration<'_>, allocator_overhead: u64) -> Self {
        let system = config.system();
        Self {
            ticks: 0,
            max_score: config.alignment_form().max_alignment_score,
            global_probe_interval: u64::from(system.global_probe_interval),
            bt_compact_probe_interval: u64::from(system.bt_compact_probe_interval),
            bt_compact_max_memory_eff: system.bt_compact_max_memory_eff(allocator_overhead),
            max_memory_used: system.max_memory_used,
            max_memory_resident: system.max_memory_resident,
            backtrace: config.requires_backtrace(),
            verbose: system.verbose,
        }
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn bt_compact_max_memory_eff(&self) -> u64 {
        self.bt_compact_max_memory_eff
    }

    /// Records one score step at `score`.
    ///
    /// The score ceiling is checked on every call. Memory ceilings are
    /// checked every `global_probe_interval` ticks and backtrace compaction
    /// every `bt_compact_probe_interval` ticks (full-alignment runs only).
    pub fn probe(&mut self, score: i32, usage: MemoryUsage) -> Result<ProbeOutcome, WavefrontError> {
        self.ticks += 1;
        trace!("probe tick={} score={} used={}", self.ticks, score, usage.used);

        if let Some(limit) = self.max_score {
            if score > limit {
                if self.verbose {
                    info!("Aborting at score {} (max_alignment_score {})", score, limit);
                }
                return Err(WavefrontError::AbortedScore { score, limit });
            }
        }

        let mut outcome = ProbeOutcome::default();
        if self.ticks % self.global_probe_interval == 0 {
            if let Some(limit) = self.max_memory_used {
                if usage.used > limit {
                    if self.verbose {
                        info!("Aborting with {} bytes in use (max_memory_used {})", usage.used, limit);
                    }
                    return Err(WavefrontError::AbortedMemory {
                        used: usage.used,
                        limit,
                    });
                }
            }
            if let Some(limit) = self.max_memory_resident {
                outcome.reap = usage.resident > limit;
            }
        }
        if self.backtrace && self.ticks % self.bt_compact_probe_interval == 0 {
            outcome.compact = usage.backtrace > self.bt_compact_max_memory_eff;
        }
        if self.verbose && !outcome.is_continue() {
            info!("tick {}: reap={} compact={}", self.ticks, outcome.reap, outcome.compact);
        }
        Ok(outcome)
    }
}
