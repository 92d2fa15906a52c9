//! Session-scheduling engine.
//!
//! Turns user-defined stories (groups of tasks) into a time-boxed daily plan:
//! a completion call proposes the layout, then the repair, break-insertion,
//! duration-revalidation, and completeness passes reconcile the proposal
//! against the hard scheduling constraints in `rules`.

pub mod breaks;
pub mod completeness;
pub mod durations;
pub mod generator;
pub mod handlers;
pub mod matching;
pub mod models;
pub mod orchestrator;
pub mod prompts;
pub mod repair;
pub mod rules;

#[cfg(test)]
pub(crate) mod testutil {
    use std::sync::atomic::{AtomicU32, Ordering};

    use async_trait::async_trait;

    use crate::llm_client::{CompletionError, CompletionRequest, TextCompletionPort};

    /// Scripted completion port: plays canned results in order (repeating the
    /// last entry) and counts calls.
    pub struct ScriptedPort {
        pub calls: AtomicU32,
        pub script: Vec<Result<String, ScriptedFailure>>,
    }

    #[derive(Clone)]
    pub enum ScriptedFailure {
        Overloaded,
        Empty,
    }

    impl ScriptedPort {
        pub fn returning(text: &str) -> Self {
            Self {
                calls: AtomicU32::new(0),
                script: vec![Ok(text.to_string())],
            }
        }

        pub fn call_count(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl TextCompletionPort for ScriptedPort {
        async fn complete(&self, _req: &CompletionRequest) -> Result<String, CompletionError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) as usize;
            let step = self.script.get(n).or_else(|| self.script.last());
            match step {
                Some(Ok(text)) => Ok(text.clone()),
                Some(Err(ScriptedFailure::Overloaded)) => Err(CompletionError::Overloaded),
                Some(Err(ScriptedFailure::Empty)) | None => Err(CompletionError::EmptyContent),
            }
        }
    }
}
