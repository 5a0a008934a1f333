//! Configurable cutoffs consulted by the router.

/// Router-level cutoffs. Kept distinct from the dispatcher's own
/// season-submission cutoff (see `arbor-runtime`): both are present,
/// separately, in the system this crate was distilled from, and resolving
/// that asymmetry by unifying them would change observable behavior.
#[derive(Debug, Clone, Copy)]
pub struct Thresholds {
    /// Number of whole-season scrape attempts after which the router stops
    /// submitting the season as a unit and instead fans out to its
    /// individual incomplete episodes.
    pub season_episode_fanout_at: u32,
}

impl Thresholds {
    /// Default episode fan-out cutoff, matching the original source.
    pub const DEFAULT_FANOUT_AT: u32 = 4;
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            season_episode_fanout_at: Self::DEFAULT_FANOUT_AT,
        }
    }
}
