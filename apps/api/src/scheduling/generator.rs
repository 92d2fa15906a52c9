//! Plan Generator — one completion call under the retry policy, then the
//! repair/parse pipeline.

use anyhow::anyhow;
use chrono::{DateTime, Utc};
use tracing::info;

use crate::errors::AppError;
use crate::llm_client::retry::RetryPolicy;
use crate::llm_client::{CompletionError, CompletionRequest, TextCompletionPort, MAX_TOKENS, MODEL};
use crate::scheduling::models::{SessionPlan, Story};
use crate::scheduling::prompts::{PLAN_PROMPT_TEMPLATE, PLAN_SYSTEM};
use crate::scheduling::repair::parse_session_plan;
use crate::scheduling::rules::SchedulingConfig;

/// Calls the generation service and parses its output into a `SessionPlan`.
///
/// Only the transient "overloaded" signal is retried (3 retries, exponential
/// backoff capped at 10s); any other completion failure propagates
/// immediately, and parse failures are never retried — they are
/// deterministic.
pub async fn generate_plan(
    llm: &dyn TextCompletionPort,
    rules: &SchedulingConfig,
    stories: &[Story],
    start_time: DateTime<Utc>,
) -> Result<SessionPlan, AppError> {
    let prompt = build_plan_prompt(rules, stories, start_time)?;
    let request = CompletionRequest {
        model: MODEL,
        max_tokens: MAX_TOKENS,
        system: PLAN_SYSTEM.to_string(),
        prompt,
    };

    let policy = RetryPolicy::default();
    let text = policy
        .run(|| llm.complete(&request), CompletionError::is_retryable)
        .await
        .map_err(|e| match e {
            CompletionError::Overloaded => AppError::Overloaded {
                retries: policy.max_retries,
            },
            other => AppError::Processing(format!("plan generation failed: {other}")),
        })?;

    info!("received {} chars of generator output", text.len());
    parse_session_plan(&text, start_time)
}

/// Fills the prompt template with the serialized story set and the
/// constraint numbers the generator must respect.
pub fn build_plan_prompt(
    rules: &SchedulingConfig,
    stories: &[Story],
    start_time: DateTime<Utc>,
) -> Result<String, AppError> {
    let task_count: usize = stories.iter().map(|s| s.tasks.len()).sum();
    let stories_json = serde_json::to_string_pretty(stories)
        .map_err(|e| AppError::Internal(anyhow!("Failed to serialize stories: {e}")))?;

    Ok(PLAN_PROMPT_TEMPLATE
        .replace("{story_count}", &stories.len().to_string())
        .replace("{task_count}", &task_count.to_string())
        .replace("{start_time}", &start_time.to_rfc3339())
        .replace("{min_task}", &rules.min_task_duration.to_string())
        .replace("{max_task}", &rules.max_task_duration.to_string())
        .replace("{max_work}", &rules.max_work_without_break.to_string())
        .replace("{long_break}", &rules.long_break_duration.to_string())
        .replace("{short_break}", &rules.short_break_duration.to_string())
        .replace("{stories_json}", &stories_json))
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicU32;

    use chrono::TimeZone;

    use super::*;
    use crate::scheduling::models::{StoryType, Task};
    use crate::scheduling::testutil::{ScriptedFailure, ScriptedPort};

    fn stories() -> Vec<Story> {
        vec![Story {
            id: "s-1".to_string(),
            title: "Writing".to_string(),
            story_type: StoryType::Timeboxed,
            estimated_duration: 60,
            category: None,
            project: None,
            tasks: vec![Task {
                id: "t-1".to_string(),
                title: "Draft intro".to_string(),
                duration: 60,
                category: None,
                is_frog: false,
                is_flexible: false,
                split_info: None,
                suggested_breaks: None,
            }],
        }]
    }

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap()
    }

    const PLAN_TEXT: &str = r#"{
        "summary": {"totalSessions": 1, "startTime": "2026-03-02T09:00:00Z"},
        "storyBlocks": [{
            "title": "Writing",
            "icon": "📝",
            "timeBoxes": [{
                "type": "work", "duration": 60,
                "startTime": "2026-03-02T09:00:00Z",
                "tasks": [{"id": "t-1", "title": "Draft intro", "duration": 60}]
            }]
        }]
    }"#;

    #[tokio::test(start_paused = true)]
    async fn test_always_overloaded_attempts_four_times_then_529_class_error() {
        let port = ScriptedPort {
            calls: AtomicU32::new(0),
            script: vec![Err(ScriptedFailure::Overloaded)],
        };

        let err = generate_plan(&port, &SchedulingConfig::default(), &stories(), start())
            .await
            .unwrap_err();

        assert_eq!(port.call_count(), 4); // 1 initial + 3 retries
        assert_eq!(err.code(), "OVERLOADED");
    }

    #[tokio::test(start_paused = true)]
    async fn test_recovers_after_transient_overload() {
        let port = ScriptedPort {
            calls: AtomicU32::new(0),
            script: vec![
                Err(ScriptedFailure::Overloaded),
                Ok(PLAN_TEXT.to_string()),
            ],
        };

        let plan = generate_plan(&port, &SchedulingConfig::default(), &stories(), start())
            .await
            .unwrap();

        assert_eq!(port.call_count(), 2);
        assert_eq!(plan.story_blocks[0].title, "Writing");
    }

    #[tokio::test(start_paused = true)]
    async fn test_non_retryable_failure_is_not_retried() {
        let port = ScriptedPort {
            calls: AtomicU32::new(0),
            script: vec![Err(ScriptedFailure::Empty)],
        };

        let err = generate_plan(&port, &SchedulingConfig::default(), &stories(), start())
            .await
            .unwrap_err();

        assert_eq!(port.call_count(), 1);
        assert_eq!(err.code(), "PROCESSING_ERROR");
    }

    #[test]
    fn test_prompt_carries_counts_and_limits() {
        let prompt = build_plan_prompt(&SchedulingConfig::default(), &stories(), start()).unwrap();
        assert!(prompt.contains("ALL 1 stories and ALL 1 tasks"));
        assert!(prompt.contains("more than 90 consecutive minutes"));
        assert!(prompt.contains("15-minute \"long-break\""));
        assert!(prompt.contains("\"Draft intro\""));
        assert!(prompt.contains("2026-03-02T09:00:00"));
    }
}
