// Leveling: the XP curve and the in-memory aggregator that feeds the store.

pub mod leveling_curve;
pub mod xp_manager;

pub use leveling_curve::{level_for_xp, xp_threshold, LevelProgress};
pub use xp_manager::{FlushReport, XpConfig, XpManager};
