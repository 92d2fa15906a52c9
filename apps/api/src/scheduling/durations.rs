//! Duration Calculator — pure aggregation over scheduled segments.

use crate::scheduling::models::{TimeBox, TimeBoxType};

/// Minute totals for one sequence of segments. `total` includes debrief
/// segments; `work + breaks` does not.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DurationBreakdown {
    pub work: i64,
    pub breaks: i64,
    pub total: i64,
}

/// Sums segment durations by type. Cheap and idempotent — the revalidation
/// pass calls this repeatedly.
pub fn compute_durations(boxes: &[TimeBox]) -> DurationBreakdown {
    let mut breakdown = DurationBreakdown {
        work: 0,
        breaks: 0,
        total: 0,
    };
    for tb in boxes {
        match tb.box_type {
            TimeBoxType::Work => breakdown.work += tb.duration,
            TimeBoxType::ShortBreak | TimeBoxType::LongBreak => breakdown.breaks += tb.duration,
            TimeBoxType::Debrief => {}
        }
        breakdown.total += tb.duration;
    }
    breakdown
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::scheduling::models::TimeBox;

    fn boxed(box_type: TimeBoxType, duration: i64) -> TimeBox {
        TimeBox {
            box_type,
            duration,
            tasks: Vec::new(),
            start_time: Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_empty_sequence_is_zero() {
        let breakdown = compute_durations(&[]);
        assert_eq!(breakdown.work, 0);
        assert_eq!(breakdown.breaks, 0);
        assert_eq!(breakdown.total, 0);
    }

    #[test]
    fn test_work_and_breaks_split() {
        let boxes = vec![
            boxed(TimeBoxType::Work, 50),
            boxed(TimeBoxType::ShortBreak, 5),
            boxed(TimeBoxType::Work, 40),
            boxed(TimeBoxType::LongBreak, 15),
        ];
        let breakdown = compute_durations(&boxes);
        assert_eq!(breakdown.work, 90);
        assert_eq!(breakdown.breaks, 20);
        assert_eq!(breakdown.total, 110);
    }

    #[test]
    fn test_debrief_counts_toward_total_only() {
        let boxes = vec![boxed(TimeBoxType::Work, 60), boxed(TimeBoxType::Debrief, 10)];
        let breakdown = compute_durations(&boxes);
        assert_eq!(breakdown.work, 60);
        assert_eq!(breakdown.breaks, 0);
        assert_eq!(breakdown.total, 70);
    }

    #[test]
    fn test_idempotent() {
        let boxes = vec![boxed(TimeBoxType::Work, 25), boxed(TimeBoxType::ShortBreak, 5)];
        assert_eq!(compute_durations(&boxes), compute_durations(&boxes));
    }
}
