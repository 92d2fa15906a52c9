//! Scheduling Orchestrator — the end-to-end request cycle.
//!
//! Forward-only stage pipeline; any failure short-circuits with the
//! `AppError` for that stage and no partial plan is ever returned.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use tracing::{error, info};

use crate::errors::AppError;
use crate::llm_client::TextCompletionPort;
use crate::scheduling::breaks::{enforce_break_limits, longest_work_run};
use crate::scheduling::completeness::{is_break_placeholder, verify_all_tasks_scheduled};
use crate::scheduling::durations::compute_durations;
use crate::scheduling::generator::generate_plan;
use crate::scheduling::matching::{match_title, normalize_title};
use crate::scheduling::models::{PlanSessionRequest, SessionPlan};
use crate::scheduling::rules::SchedulingConfig;

/// Orchestrator-visible stages. The repairing-json and structural-check
/// stages run inside the generation call and surface here as its errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PlanStage {
    ValidatingInput,
    Generating,
    BreakInsertion,
    DurationRevalidation,
    CompletenessCheck,
    Done,
}

impl PlanStage {
    fn as_str(self) -> &'static str {
        match self {
            PlanStage::ValidatingInput => "validating-input",
            PlanStage::Generating => "generating",
            PlanStage::BreakInsertion => "break-insertion",
            PlanStage::DurationRevalidation => "duration-revalidation",
            PlanStage::CompletenessCheck => "completeness-check",
            PlanStage::Done => "done",
        }
    }
}

fn enter(stage: PlanStage) {
    info!(stage = stage.as_str(), "session planning stage");
}

/// Runs the full pipeline: input validation, generation (with the
/// repairing-json and structural-check stages inside the generator call),
/// story reconciliation, break insertion, duration revalidation, and the
/// completeness check, then rebuilds the summary from the realized schedule.
pub async fn plan_session(
    llm: &dyn TextCompletionPort,
    rules: &SchedulingConfig,
    request: PlanSessionRequest,
) -> Result<SessionPlan, AppError> {
    enter(PlanStage::ValidatingInput);
    validate_input(rules, &request)?;

    // An unschedulable request must never spend a generation call.
    enter(PlanStage::Generating);
    let mut plan = generate_plan(llm, rules, &request.stories, request.start_time).await?;
    info!(
        "generator proposed {} block(s), {} total minutes",
        plan.story_blocks.len(),
        plan.summary.total_duration
    );

    reconcile_story_identity(&request, &plan)?;

    enter(PlanStage::BreakInsertion);
    for block in &mut plan.story_blocks {
        enforce_break_limits(block, rules, request.start_time);
    }

    enter(PlanStage::DurationRevalidation);
    revalidate_durations(rules, &plan)?;

    enter(PlanStage::CompletenessCheck);
    let report = verify_all_tasks_scheduled(&request.stories, &plan);
    if !report.is_complete() {
        return Err(AppError::MissingTasks {
            missing_titles: report.missing_titles,
            expected: report.expected,
            scheduled: report.scheduled,
        });
    }

    rebuild_summary(&mut plan, request.start_time);
    enter(PlanStage::Done);
    Ok(plan)
}

fn validate_input(rules: &SchedulingConfig, request: &PlanSessionRequest) -> Result<(), AppError> {
    if request.stories.is_empty() {
        return Err(AppError::Validation(
            "at least one story is required".to_string(),
        ));
    }

    // Stable ids are what the completeness check accounts by; an empty or
    // reused id would let distinct tasks collapse onto one identity and a
    // dropped task slip through. An id may repeat only across declared parts
    // of the same split task.
    let mut seen_ids: HashMap<&str, bool> = HashMap::new();
    let mut total_minutes: i64 = 0;
    for story in &request.stories {
        for task in &story.tasks {
            if task.id.trim().is_empty() {
                return Err(AppError::Validation(format!(
                    "task '{}' is missing a stable id",
                    task.title
                )));
            }
            if task.duration <= 0 {
                return Err(AppError::Validation(format!(
                    "task '{}' has non-positive duration {}",
                    task.title, task.duration
                )));
            }
            let is_split_part = task.split_info.is_some();
            if let Some(previous_was_split) = seen_ids.insert(task.id.as_str(), is_split_part) {
                if !(previous_was_split && is_split_part) {
                    return Err(AppError::Validation(format!(
                        "task id '{}' is shared by tasks that are not parts of one split task",
                        task.id
                    )));
                }
            }
            total_minutes += task.duration;
        }
    }

    if total_minutes > rules.max_session_duration {
        return Err(AppError::DurationExceeded {
            requested_minutes: total_minutes,
            max_minutes: rules.max_session_duration,
        });
    }

    Ok(())
}

/// Every emitted non-break block must map back to a submitted story, either
/// directly or through the request's title mapping.
fn reconcile_story_identity(
    request: &PlanSessionRequest,
    plan: &SessionPlan,
) -> Result<(), AppError> {
    let story_titles: Vec<String> = request.stories.iter().map(|s| s.title.clone()).collect();

    for block in &plan.story_blocks {
        if is_break_placeholder(&block.title) {
            continue;
        }

        let effective_title = request
            .story_mapping
            .iter()
            .find(|m| normalize_title(&m.possible_title) == normalize_title(&block.title))
            .map(|m| m.original_title.as_str())
            .unwrap_or(block.title.as_str());

        if match_title(effective_title, &story_titles).is_none() {
            return Err(AppError::UnknownStory(block.title.clone()));
        }
    }

    Ok(())
}

fn revalidate_durations(rules: &SchedulingConfig, plan: &SessionPlan) -> Result<(), AppError> {
    for block in &plan.story_blocks {
        let breakdown = compute_durations(&block.time_boxes);

        // Break-only blocks legitimately have zero work minutes.
        if breakdown.work > 0 && breakdown.total != breakdown.work + breakdown.breaks {
            return Err(AppError::BlockDuration {
                block: block.title.clone(),
                reported: block.total_duration,
                computed: breakdown.work + breakdown.breaks,
            });
        }

        let run = longest_work_run(&block.time_boxes, rules);
        if run > rules.max_work_without_break {
            // Break insertion already ran; this firing means a defect in the
            // insertion pass, not a generator error.
            error!(
                "block '{}' still has a {run}-minute work run after break insertion",
                block.title
            );
            return Err(AppError::ExcessiveWorkTime {
                block: block.title.clone(),
                run_minutes: run,
                limit: rules.max_work_without_break,
            });
        }
    }
    Ok(())
}

/// The response summary is derived from the realized schedule, never from
/// generator-reported numbers.
fn rebuild_summary(plan: &mut SessionPlan, start_time: DateTime<Utc>) {
    let total_duration: i64 = plan.story_blocks.iter().map(|b| b.total_duration).sum();
    let total_sessions = plan
        .story_blocks
        .iter()
        .filter(|b| !is_break_placeholder(&b.title))
        .count();
    let end_time = plan
        .story_blocks
        .iter()
        .flat_map(|b| &b.time_boxes)
        .map(|tb| tb.start_time + Duration::minutes(tb.duration))
        .max()
        .unwrap_or(start_time + Duration::minutes(total_duration));

    plan.summary.total_sessions = total_sessions;
    plan.summary.start_time = start_time;
    plan.summary.end_time = end_time;
    plan.summary.total_duration = total_duration;
}
