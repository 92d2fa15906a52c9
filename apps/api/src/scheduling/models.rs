//! Data model for the session-scheduling engine.
//!
//! These types appear on three boundaries: the client request, the prompt sent
//! to the generation service, and the parsed plan coming back from it. The
//! generator echoes tasks, so task-level serde is deliberately lenient
//! (defaults instead of hard failures); structural problems are caught by the
//! repair and validation passes, not by deserialization.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Metadata attached to each part of a task that was split for scheduling.
/// All parts of one logical task share the parent's id.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SplitInfo {
    pub original_title: String,
    #[serde(default)]
    pub is_parent: bool,
    #[serde(default)]
    pub part_number: u32,
    #[serde(default)]
    pub total_parts: u32,
}

/// A break the user asked for at a specific point inside a task.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestedBreak {
    /// Minutes into the task after which the break should land.
    pub after: i64,
    pub duration: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// An atomic unit of work with an estimated duration.
///
/// Ids are opaque client-issued strings; a task id may appear on multiple
/// scheduled segments only when those segments are declared parts of the same
/// split task.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    /// Minutes. Must be > 0 on input; checked at `validating-input`.
    #[serde(default)]
    pub duration: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Priority marker — schedule as early as possible.
    #[serde(default)]
    pub is_frog: bool,
    #[serde(default)]
    pub is_flexible: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub split_info: Option<SplitInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggested_breaks: Option<Vec<SuggestedBreak>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoryType {
    Timeboxed,
    Flexible,
    Milestone,
}

/// A user-defined group of related tasks to be scheduled together.
/// `estimated_duration` is advisory: the realized schedule is recomputed and
/// never trusted from input.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Story {
    #[serde(default)]
    pub id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub story_type: StoryType,
    #[serde(default)]
    pub estimated_duration: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    pub tasks: Vec<Task>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeBoxType {
    #[serde(rename = "work")]
    Work,
    #[serde(rename = "short-break")]
    ShortBreak,
    #[serde(rename = "long-break")]
    LongBreak,
    #[serde(rename = "debrief")]
    Debrief,
}

/// One scheduled segment: work or break, with an absolute start time.
/// Break segments carry no tasks.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeBox {
    #[serde(rename = "type")]
    pub box_type: TimeBoxType,
    pub duration: i64,
    #[serde(default)]
    pub tasks: Vec<Task>,
    pub start_time: DateTime<Utc>,
}

impl TimeBox {
    pub fn break_box(duration: i64, start_time: DateTime<Utc>) -> Self {
        Self {
            box_type: TimeBoxType::LongBreak,
            duration,
            tasks: Vec::new(),
            start_time,
        }
    }
}

/// The realized schedule for one story: ordered segments plus a recomputed
/// total. `total_duration` is never trusted from the generator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryBlock {
    pub title: String,
    pub summary: String,
    pub icon: String,
    pub time_boxes: Vec<TimeBox>,
    pub total_duration: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanSummary {
    pub total_sessions: usize,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub total_duration: i64,
}

/// The full plan for one request. Constructed fresh from generator output,
/// mutated in place by the repair and validation passes, then returned —
/// never persisted by this subsystem.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionPlan {
    pub summary: PlanSummary,
    pub story_blocks: Vec<StoryBlock>,
}

/// Maps an alternate spelling the generator may use back to an original
/// story title.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryMapping {
    pub possible_title: String,
    pub original_title: String,
}

/// Request body for POST /api/v1/sessions/plan.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanSessionRequest {
    pub stories: Vec<Story>,
    pub start_time: DateTime<Utc>,
    #[serde(default)]
    pub story_mapping: Vec<StoryMapping>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timebox_type_wire_names() {
        assert_eq!(
            serde_json::to_string(&TimeBoxType::ShortBreak).unwrap(),
            "\"short-break\""
        );
        assert_eq!(
            serde_json::to_string(&TimeBoxType::Work).unwrap(),
            "\"work\""
        );
        let parsed: TimeBoxType = serde_json::from_str("\"long-break\"").unwrap();
        assert_eq!(parsed, TimeBoxType::LongBreak);
    }

    #[test]
    fn test_task_tolerates_minimal_json() {
        // Generator-echoed tasks often carry only a title.
        let task: Task = serde_json::from_str(r#"{"title": "Draft intro"}"#).unwrap();
        assert_eq!(task.title, "Draft intro");
        assert_eq!(task.duration, 0);
        assert!(!task.is_frog);
        assert!(task.split_info.is_none());
    }

    #[test]
    fn test_request_deserializes_camel_case() {
        let json = r#"{
            "stories": [{
                "id": "s-1",
                "title": "Morning admin",
                "type": "timeboxed",
                "estimatedDuration": 60,
                "tasks": [{
                    "id": "t-1",
                    "title": "Inbox zero",
                    "duration": 30,
                    "isFrog": true
                }]
            }],
            "startTime": "2026-03-02T09:00:00Z",
            "storyMapping": [
                {"possibleTitle": "Admin", "originalTitle": "Morning admin"}
            ]
        }"#;
        let request: PlanSessionRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.stories.len(), 1);
        assert_eq!(request.stories[0].story_type, StoryType::Timeboxed);
        assert!(request.stories[0].tasks[0].is_frog);
        assert_eq!(request.story_mapping[0].original_title, "Morning admin");
    }

    #[test]
    fn test_split_info_round_trips_with_shared_id() {
        let json = r#"{
            "id": "t-9",
            "title": "Design review (Part 2 of 2)",
            "duration": 45,
            "splitInfo": {
                "originalTitle": "Design review",
                "isParent": false,
                "partNumber": 2,
                "totalParts": 2
            }
        }"#;
        let task: Task = serde_json::from_str(json).unwrap();
        let split = task.split_info.unwrap();
        assert_eq!(split.original_title, "Design review");
        assert_eq!(split.part_number, 2);
    }
}
