//! Duration rules — the hard scheduling constants.
//!
//! Passed around as an explicit value (held on `AppState`) rather than read
//! from module-level consts, so tests can run with shorter limits.

/// All durations are whole minutes.
#[derive(Debug, Clone)]
pub struct SchedulingConfig {
    pub min_task_duration: i64,
    pub max_task_duration: i64,
    pub short_break_duration: i64,
    pub long_break_duration: i64,
    /// No story may schedule more continuous work than this.
    pub max_work_without_break: i64,
    /// How much a short break credits back to the continuous-work counter.
    /// Deliberately decoupled from `short_break_duration`; see DESIGN.md.
    pub short_break_work_credit: i64,
    /// A session longer than this is rejected before any generation call.
    pub max_session_duration: i64,
}

impl Default for SchedulingConfig {
    fn default() -> Self {
        Self {
            min_task_duration: 5,
            max_task_duration: 90,
            short_break_duration: 5,
            long_break_duration: 15,
            max_work_without_break: 90,
            short_break_work_credit: 25,
            max_session_duration: 24 * 60,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_rules() {
        let rules = SchedulingConfig::default();
        assert_eq!(rules.max_work_without_break, 90);
        assert_eq!(rules.long_break_duration, 15);
        assert_eq!(rules.short_break_work_credit, 25);
        assert_eq!(rules.max_session_duration, 1440);
    }
}
