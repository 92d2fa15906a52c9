//! Completeness Validator — detects tasks the generator silently dropped.
//!
//! Accounting is keyed by original task id, never by title text alone: two
//! distinct tasks can share a normalized title, and one split task can appear
//! under several titled parts that share one id.

use std::collections::{HashMap, HashSet};

use crate::scheduling::matching::normalize_title;
use crate::scheduling::models::{SessionPlan, Story, Task};

/// Result of comparing the emitted plan against the submitted task set.
#[derive(Debug, Clone)]
pub struct CompletenessReport {
    /// Distinct logical tasks submitted (split parts collapse to one).
    pub expected: usize,
    /// How many of those the plan accounts for.
    pub scheduled: usize,
    /// Titles of tasks never accounted for, deduplicated.
    pub missing_titles: Vec<String>,
}

impl CompletenessReport {
    pub fn is_complete(&self) -> bool {
        self.missing_titles.is_empty()
    }
}

/// Block titles the generator uses for standalone break filler; they have no
/// corresponding original task and are excluded from the comparison (and
/// from story reconciliation in the orchestrator).
pub fn is_break_placeholder(title: &str) -> bool {
    matches!(
        normalize_title(title).as_str(),
        "break" | "short break" | "long break"
    )
}

fn register_task(task: &Task, titles_to_id: &mut HashMap<String, String>) {
    let stem = normalize_title(&task.title);
    if !stem.is_empty() {
        titles_to_id.entry(stem).or_insert_with(|| task.id.clone());
    }
    if let Some(split) = &task.split_info {
        let origin = normalize_title(&split.original_title);
        if !origin.is_empty() {
            titles_to_id
                .entry(origin)
                .or_insert_with(|| task.id.clone());
        }
    }
}

/// Walks the emitted plan and marks each original task id accounted for when
/// an emitted task's title, split-info origin, or id resolves to it.
pub fn verify_all_tasks_scheduled(stories: &[Story], plan: &SessionPlan) -> CompletenessReport {
    let mut known_ids: Vec<String> = Vec::new();
    let mut known_id_set: HashSet<String> = HashSet::new();
    let mut titles_to_id: HashMap<String, String> = HashMap::new();
    // Reported titles prefer the pre-split original over a part title.
    let mut report_title: HashMap<String, String> = HashMap::new();

    for story in stories {
        for task in &story.tasks {
            if known_id_set.insert(task.id.clone()) {
                known_ids.push(task.id.clone());
            }
            register_task(task, &mut titles_to_id);
            let preferred = task
                .split_info
                .as_ref()
                .map(|s| s.original_title.clone())
                .unwrap_or_else(|| task.title.clone());
            report_title.entry(task.id.clone()).or_insert(preferred);
        }
    }

    let mut accounted: HashSet<&str> = HashSet::new();
    for block in &plan.story_blocks {
        if is_break_placeholder(&block.title) {
            continue;
        }
        for tb in &block.time_boxes {
            for task in &tb.tasks {
                let resolved = titles_to_id
                    .get(&normalize_title(&task.title))
                    .or_else(|| {
                        task.split_info
                            .as_ref()
                            .and_then(|s| titles_to_id.get(&normalize_title(&s.original_title)))
                    })
                    .map(String::as_str)
                    .or_else(|| known_id_set.get(task.id.as_str()).map(String::as_str));
                if let Some(id) = resolved {
                    accounted.insert(id);
                }
            }
        }
    }

    let mut missing_titles: Vec<String> = Vec::new();
    let mut seen_titles: HashSet<String> = HashSet::new();
    for id in &known_ids {
        if accounted.contains(id.as_str()) {
            continue;
        }
        let title = report_title
            .get(id)
            .cloned()
            .unwrap_or_else(|| id.clone());
        if seen_titles.insert(normalize_title(&title)) {
            missing_titles.push(title);
        }
    }

    CompletenessReport {
        expected: known_ids.len(),
        scheduled: accounted.len(),
        missing_titles,
    }
}
