use crate::WavefrontError;

pub const BUFFER_SIZE_256M: u64 = 256 << 20;
pub const BUFFER_SIZE_1G: u64 = 1 << 30;

pub const DEFAULT_GLOBAL_PROBE_INTERVAL: u32 = 3000;
pub const DEFAULT_BT_COMPACT_PROBE_INTERVAL: u32 = 6000;

/// Resource limits polled by the engine during a run.
///
/// Memory ceilings use `None` for unbounded. `max_memory_used` is a hard
/// ceiling (the run aborts), `max_memory_resident` a soft one (buffered
/// memory is reaped).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SystemLimits {
    pub global_probe_interval: u32,     // Score-ticks between limit checks
    pub bt_compact_probe_interval: u32, // Score-ticks between BT-buffer compaction checks
    pub bt_compact_max_memory: u64,     // BT-buffer bytes allowed before compacting
    pub max_memory_used: Option<u64>,
    pub max_memory_resident: Option<u64>,
    pub verbose: bool,
}

impl Default for SystemLimits {
    fn default() -> Self {
        Self {
            global_probe_interval: DEFAULT_GLOBAL_PROBE_INTERVAL,
            bt_compact_probe_interval: DEFAULT_BT_COMPACT_PROBE_INTERVAL,
            bt_compact_max_memory: BUFFER_SIZE_1G,
            max_memory_used: None,
            max_memory_resident: Some(BUFFER_SIZE_256M),
            verbose: false,
        }
    }
}

impl SystemLimits {
    pub fn set_global_probe_interval(&mut self, interval: u32) -> Result<(), WavefrontError> {
        positive_interval("global_probe_interval", interval)?;
        self.global_probe_interval = interval;
        Ok(())
    }

    pub fn set_bt_compact_probe_interval(&mut self, interval: u32) -> Result<(), WavefrontError> {
        positive_interval("bt_compact_probe_interval", interval)?;
        self.bt_compact_probe_interval = interval;
        Ok(())
    }

    pub fn set_bt_compact_max_memory(&mut self, bytes: u64) {
        self.bt_compact_max_memory = bytes;
    }

    /// Sets both memory ceilings at once so the pair is never observed
    /// half-updated.
    pub fn set_memory_limits(
        &mut self,
        max_memory_resident: Option<u64>,
        max_memory_used: Option<u64>,
    ) -> Result<(), WavefrontError> {
        check_resident_within_used(max_memory_resident, max_memory_used)?;
        self.max_memory_resident = max_memory_resident;
        self.max_memory_used = max_memory_used;
        Ok(())
    }

    /// Compaction threshold for one run: the configured budget minus what the
    /// allocator itself holds. Derived on demand, never stored.
    pub fn bt_compact_max_memory_eff(&self, allocator_overhead: u64) -> u64 {
        self.bt_compact_max_memory.saturating_sub(allocator_overhead)
    }

    pub fn validate(&self) -> Result<(), WavefrontError> {
        positive_interval("global_probe_interval", self.global_probe_interval)?;
        positive_interval("bt_compact_probe_interval", self.bt_compact_probe_interval)?;
        check_resident_within_used(self.max_memory_resident, self.max_memory_used)
    }

    /// Compaction settings differ from the defaults.
    pub(crate) fn has_custom_compaction(&self) -> bool {
        self.bt_compact_probe_interval != DEFAULT_BT_COMPACT_PROBE_INTERVAL
            || self.bt_compact_max_memory != BUFFER_SIZE_1G
    }
}

fn positive_interval(field: &'static str, interval: u32) -> Result<(), WavefrontError> {
    if interval == 0 {
        return Err(WavefrontError::InvalidLimit(format!("{} must be positive", field)));
    }
    Ok(())
}

fn check_resident_within_used(
    resident: Option<u64>,
    used: Option<u64>,
) -> Result<(), WavefrontError> {
    if let (Some(resident), Some(used)) = (resident, used) {
        if resident > used {
            return Err(WavefrontError::InvalidLimit(format!(
                "max_memory_resident ({}) exceeds max_memory_used ({})",
                resident, used
            )));
        }
    }
    Ok(())
}
