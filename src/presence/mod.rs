// Public API - what other modules can use
pub use reaper::{start_reaper_task, sweep_inactive_participants, ReaperConfig, SweepReport};

// Internal modules
mod reaper;
