//! Prompt templates for session-plan generation.
//!
//! Placeholders are `{name}` and filled by `generator::build_plan_prompt`.

pub const PLAN_SYSTEM: &str = "You are a scheduling assistant that arranges \
work sessions into a realistic, time-boxed daily plan. You respond with a \
single JSON object and no other text.";

pub const PLAN_PROMPT_TEMPLATE: &str = r#"Build a time-boxed session plan from the stories and tasks below.

Rules:
1. Include ALL {story_count} stories and ALL {task_count} tasks. Never drop, merge, or rename a task.
2. Preserve the given story and task ordering. Tasks flagged "isFrog" stay earliest within their story.
3. The plan starts at {start_time}. Segments within a story are contiguous: each segment starts exactly when the previous one ends.
4. Round every duration to a multiple of 5 minutes. No work segment shorter than {min_task} minutes.
5. Never schedule more than {max_work} consecutive minutes of work. Insert a {long_break}-minute "long-break" segment when a story would exceed it; use {short_break}-minute "short-break" segments between shorter stretches.
6. Split any task longer than {max_task} minutes into parts titled "<task title> (Part N of M)" that keep the task's "id" and carry "splitInfo" with the original title.
7. Echo each task's "id" and "splitInfo" unchanged on the segment that schedules it.

Return exactly one JSON object with this shape:
{
  "summary": {"totalSessions": <number>, "startTime": "<ISO-8601>", "endTime": "<ISO-8601>", "totalDuration": <minutes>},
  "storyBlocks": [{
    "title": "<story title>",
    "summary": "<one sentence>",
    "icon": "<single emoji>",
    "totalDuration": <minutes>,
    "timeBoxes": [{"type": "work" | "short-break" | "long-break" | "debrief", "duration": <minutes>, "startTime": "<ISO-8601>", "tasks": [...]}]
  }]
}

Stories and tasks:
{stories_json}
"#;
