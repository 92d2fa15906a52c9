//! Repair & parse pipeline: generator text → structured `SessionPlan`.
//!
//! The generation service returns free text that should contain one JSON
//! object but may wrap it in prose or code fences, truncate it at the token
//! budget, or leave trailing commas. This module is a pure function over the
//! text so it can be exercised with synthetic garbled inputs — no live
//! service involved.
//!
//! Pipeline order: fence strip → first balanced `{...}` extraction →
//! truncation repair → strict parse → lenient parse → structural check →
//! per-block placeholder fill.

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::Deserialize;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::llm_client::strip_json_fences;
use crate::scheduling::durations::compute_durations;
use crate::scheduling::models::{
    PlanSummary, SessionPlan, StoryBlock, Task, TimeBox, TimeBoxType,
};

const PLACEHOLDER_TITLE: &str = "Untitled block";
const PLACEHOLDER_ICON: &str = "📋";

// ────────────────────────────────────────────────────────────────────────────
// Raw generator shapes — every field optional, repaired during finalize
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPlan {
    summary: Option<RawSummary>,
    #[serde(alias = "stories")]
    story_blocks: Option<Vec<RawBlock>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSummary {
    total_sessions: Option<usize>,
    start_time: Option<String>,
    end_time: Option<String>,
    #[allow(dead_code)]
    total_duration: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawBlock {
    title: Option<String>,
    summary: Option<String>,
    icon: Option<String>,
    time_boxes: Option<Vec<RawTimeBox>>,
    #[allow(dead_code)]
    total_duration: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTimeBox {
    #[serde(rename = "type")]
    box_type: Option<String>,
    duration: Option<f64>,
    tasks: Option<Vec<Task>>,
    start_time: Option<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Span extraction
// ────────────────────────────────────────────────────────────────────────────

struct ExtractedSpan<'a> {
    text: &'a str,
    /// Delimiters still open when the text ran out; empty means balanced.
    open_stack: Vec<char>,
    in_string: bool,
}

/// Finds the first `{` and scans string-aware until its matching `}`.
/// If the text ends first, returns the remainder with the unclosed-delimiter
/// stack so the caller can attempt a truncation repair.
fn extract_json_span(text: &str) -> Option<ExtractedSpan<'_>> {
    let start = text.find('{')?;
    let body = &text[start..];

    let mut open_stack: Vec<char> = Vec::new();
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in body.char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' | '[' => open_stack.push(c),
            '}' | ']' => {
                open_stack.pop();
                if open_stack.is_empty() {
                    return Some(ExtractedSpan {
                        text: &body[..i + c.len_utf8()],
                        open_stack,
                        in_string: false,
                    });
                }
            }
            _ => {}
        }
    }

    Some(ExtractedSpan {
        text: body,
        open_stack,
        in_string,
    })
}

/// Whether an unbalanced span still looks like the expected top-level shape —
/// worth a best-effort close rather than an outright failure.
fn resembles_plan(span: &str) -> bool {
    (span.contains("\"storyBlocks\"") || span.contains("\"stories\""))
        && span.contains("\"summary\"")
}

/// Closes a truncated span: trims a dangling comma or colon, closes an open
/// string, then appends closers for every delimiter still on the stack.
fn repair_truncated(span: &ExtractedSpan<'_>) -> String {
    let mut repaired = span.text.trim_end().to_string();

    if span.in_string {
        repaired.push('"');
    }
    if repaired.ends_with(',') {
        repaired.pop();
    } else if repaired.ends_with(':') {
        repaired.push_str(" null");
    }
    for opener in span.open_stack.iter().rev() {
        repaired.push(if *opener == '{' { '}' } else { ']' });
    }
    repaired
}

/// Second-chance fixes for near-valid JSON: trailing commas before a closer
/// and empty value slots after a colon. Applied only to the text between
/// string literals, so a title containing the same punctuation is never
/// rewritten. Both patterns are pure punctuation and whitespace, so no match
/// can span a string literal.
fn fix_common_json_faults(text: &str) -> String {
    let trailing_comma = Regex::new(r",\s*([}\]])").expect("static regex");
    let empty_value = Regex::new(r":\s*([,}\]])").expect("static regex");
    let fix = |segment: &str| -> String {
        let pass_one = trailing_comma.replace_all(segment, "$1");
        empty_value.replace_all(&pass_one, ": null$1").into_owned()
    };

    let mut out = String::with_capacity(text.len());
    let mut segment = String::new();
    let mut in_string = false;
    let mut escaped = false;
    for c in text.chars() {
        if in_string {
            out.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
        } else if c == '"' {
            out.push_str(&fix(&segment));
            segment.clear();
            out.push(c);
            in_string = true;
        } else {
            segment.push(c);
        }
    }
    out.push_str(&fix(&segment));
    out
}

// ────────────────────────────────────────────────────────────────────────────
// Finalization — placeholders over failure for single malformed blocks
// ────────────────────────────────────────────────────────────────────────────

fn parse_box_type(raw: Option<&str>) -> TimeBoxType {
    match raw {
        Some("work") => TimeBoxType::Work,
        Some("short-break") | Some("short_break") => TimeBoxType::ShortBreak,
        Some("long-break") | Some("long_break") => TimeBoxType::LongBreak,
        Some("debrief") => TimeBoxType::Debrief,
        other => {
            if let Some(other) = other {
                warn!("unknown time box type '{other}', treating as work");
            }
            TimeBoxType::Work
        }
    }
}

fn parse_time(raw: Option<&str>, fallback: DateTime<Utc>) -> DateTime<Utc> {
    raw.and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|t| t.with_timezone(&Utc))
        .unwrap_or(fallback)
}

/// A partially-malformed single block should not void an otherwise-valid
/// plan: missing title/summary/icon/time-box list are filled with
/// placeholders instead of failing the request.
fn finalize_block(raw: RawBlock, fallback_start: DateTime<Utc>) -> StoryBlock {
    let time_boxes: Vec<TimeBox> = raw
        .time_boxes
        .unwrap_or_default()
        .into_iter()
        .map(|tb| TimeBox {
            box_type: parse_box_type(tb.box_type.as_deref()),
            duration: tb.duration.map(|d| d.round() as i64).unwrap_or(0),
            tasks: tb.tasks.unwrap_or_default(),
            start_time: parse_time(tb.start_time.as_deref(), fallback_start),
        })
        .collect();

    let total_duration = compute_durations(&time_boxes).total;

    StoryBlock {
        title: raw
            .title
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| PLACEHOLDER_TITLE.to_string()),
        summary: raw.summary.unwrap_or_default(),
        icon: raw
            .icon
            .filter(|i| !i.trim().is_empty())
            .unwrap_or_else(|| PLACEHOLDER_ICON.to_string()),
        time_boxes,
        total_duration,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Entry point
// ────────────────────────────────────────────────────────────────────────────

/// Parses generator output into a `SessionPlan`, repairing what it can.
///
/// Raises `JSON_PARSE_ERROR` when no usable JSON object can be recovered and
/// `INVALID_DATA_STRUCTURE` (with the missing-field list) when the recovered
/// object lacks the required top-level shape. The summary is provisional:
/// the orchestrator rebuilds it after break insertion.
pub fn parse_session_plan(
    raw_text: &str,
    fallback_start: DateTime<Utc>,
) -> Result<SessionPlan, AppError> {
    info!(stage = "repairing-json", "session planning stage");
    let text = strip_json_fences(raw_text);

    let span = extract_json_span(text)
        .ok_or_else(|| AppError::JsonParse("no JSON object found in response".to_string()))?;

    let candidate: String = if span.open_stack.is_empty() {
        span.text.to_string()
    } else if resembles_plan(span.text) {
        warn!(
            "generator output truncated ({} unclosed delimiter(s)), attempting repair",
            span.open_stack.len()
        );
        repair_truncated(&span)
    } else {
        return Err(AppError::JsonParse(
            "response JSON is truncated and does not resemble a session plan".to_string(),
        ));
    };

    let raw_plan: RawPlan = match serde_json::from_str(&candidate) {
        Ok(plan) => plan,
        Err(first_err) => {
            let relaxed = fix_common_json_faults(&candidate);
            serde_json::from_str(&relaxed).map_err(|second_err| {
                AppError::JsonParse(format!(
                    "strict parse failed ({first_err}); lenient parse failed ({second_err})"
                ))
            })?
        }
    };

    info!(stage = "structural-check", "session planning stage");
    let mut missing_fields = Vec::new();
    if raw_plan.summary.is_none() {
        missing_fields.push("summary".to_string());
    }
    if raw_plan.story_blocks.is_none() {
        missing_fields.push("storyBlocks".to_string());
    }
    if !missing_fields.is_empty() {
        return Err(AppError::InvalidDataStructure { missing_fields });
    }

    let raw_summary = raw_plan.summary.unwrap_or(RawSummary {
        total_sessions: None,
        start_time: None,
        end_time: None,
        total_duration: None,
    });

    let story_blocks: Vec<StoryBlock> = raw_plan
        .story_blocks
        .unwrap_or_default()
        .into_iter()
        .map(|b| finalize_block(b, fallback_start))
        .collect();

    let total_duration: i64 = story_blocks.iter().map(|b| b.total_duration).sum();
    let start_time = parse_time(raw_summary.start_time.as_deref(), fallback_start);

    Ok(SessionPlan {
        summary: PlanSummary {
            total_sessions: raw_summary
                .total_sessions
                .unwrap_or(story_blocks.len()),
            start_time,
            end_time: parse_time(
                raw_summary.end_time.as_deref(),
                start_time + chrono::Duration::minutes(total_duration),
            ),
            total_duration,
        },
        story_blocks,
    })
}
