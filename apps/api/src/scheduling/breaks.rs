//! Break-Insertion Engine.
//!
//! Guarantees no story block schedules more continuous work than
//! `max_work_without_break`, even when the upstream generator violated it.
//! Single forward scan, no backtracking: segments already emitted are never
//! revisited, and every segment is restamped from a running clock so the
//! block ends up contiguous.

use chrono::{DateTime, Duration, Utc};
use tracing::info;

use crate::scheduling::durations::compute_durations;
use crate::scheduling::models::{StoryBlock, TimeBox, TimeBoxType};
use crate::scheduling::rules::SchedulingConfig;

/// Walks the block's segments left to right, inserting a long break before
/// any work segment that would push the continuous-work counter past the
/// limit. The clock seeds from the first segment's start time, or
/// `fallback_start` when the block is empty of timing information.
///
/// Counter transitions: work adds its duration; a long break resets to 0; a
/// short break credits back a fixed `short_break_work_credit` minutes,
/// floored at 0, independent of the short break's own duration.
pub fn enforce_break_limits(
    block: &mut StoryBlock,
    rules: &SchedulingConfig,
    fallback_start: DateTime<Utc>,
) {
    let mut current_time: DateTime<Utc> = block
        .time_boxes
        .first()
        .map(|tb| tb.start_time)
        .unwrap_or(fallback_start);
    let mut consecutive_work: i64 = 0;
    let mut inserted = 0usize;

    let incoming = std::mem::take(&mut block.time_boxes);
    let mut out: Vec<TimeBox> = Vec::with_capacity(incoming.len());

    for mut tb in incoming {
        if tb.box_type == TimeBoxType::Work
            && consecutive_work > 0
            && consecutive_work + tb.duration > rules.max_work_without_break
        {
            out.push(TimeBox::break_box(rules.long_break_duration, current_time));
            current_time += Duration::minutes(rules.long_break_duration);
            consecutive_work = 0;
            inserted += 1;
        }

        tb.start_time = current_time;
        current_time += Duration::minutes(tb.duration);

        match tb.box_type {
            TimeBoxType::Work => consecutive_work += tb.duration,
            TimeBoxType::LongBreak => consecutive_work = 0,
            TimeBoxType::ShortBreak => {
                consecutive_work = (consecutive_work - rules.short_break_work_credit).max(0)
            }
            TimeBoxType::Debrief => {}
        }

        out.push(tb);
    }

    block.time_boxes = out;
    block.total_duration = compute_durations(&block.time_boxes).total;

    if inserted > 0 {
        info!(
            "inserted {inserted} long break(s) into block '{}' to cap continuous work",
            block.title
        );
    }
}

/// Longest run of consecutive work minutes, using the same counter rules as
/// insertion. The revalidation pass asserts this never exceeds the limit
/// after `enforce_break_limits` has run.
pub fn longest_work_run(boxes: &[TimeBox], rules: &SchedulingConfig) -> i64 {
    let mut longest: i64 = 0;
    let mut consecutive: i64 = 0;
    for tb in boxes {
        match tb.box_type {
            TimeBoxType::Work => {
                consecutive += tb.duration;
                longest = longest.max(consecutive);
            }
            TimeBoxType::LongBreak => consecutive = 0,
            TimeBoxType::ShortBreak => {
                consecutive = (consecutive - rules.short_break_work_credit).max(0)
            }
            TimeBoxType::Debrief => {}
        }
    }
    longest
}
