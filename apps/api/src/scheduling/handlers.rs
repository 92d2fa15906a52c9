//! Axum route handlers for the Session Planning API.

use axum::{extract::State, Json};

use crate::errors::AppError;
use crate::scheduling::models::{PlanSessionRequest, SessionPlan};
use crate::scheduling::orchestrator::plan_session;
use crate::state::AppState;

/// POST /api/v1/sessions/plan
///
/// Full planning pipeline: input validation → generation → repair →
/// break insertion → duration revalidation → completeness check.
/// Returns the reconciled plan, or an error body with a stable code —
/// never a partial schedule.
pub async fn handle_plan_session(
    State(state): State<AppState>,
    Json(request): Json<PlanSessionRequest>,
) -> Result<Json<SessionPlan>, AppError> {
    if request.stories.is_empty() {
        return Err(AppError::Validation("stories cannot be empty".to_string()));
    }

    let plan = plan_session(state.llm.as_ref(), &state.rules, request).await?;

    Ok(Json(plan))
}
