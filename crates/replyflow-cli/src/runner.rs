//! Replays a script through a flow controller, writing one JSON record per action

use anyhow::{Context, Result};
use replyflow_core::{CoreError, FlowController, StepKind, SubmitOutcome};
use replyflow_monitoring::LogExt;
use serde_json::{json, Value};
use std::io::Write;
use tracing::{info, warn};

use crate::script::{Script, ScriptAction};

/// What a replay ended with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplaySummary {
    /// Actions replayed
    pub actions: usize,
    /// Final progress
    pub progress: u8,
    /// Id of the last automation created
    pub created: Option<String>,
    /// Failures of the last rejected submission
    pub rejected: Vec<String>,
}

/// Replay `script` on `controller`, writing JSON lines to `out`.
///
/// Topology errors abort the replay. Submission failures are recorded and
/// the replay continues, since a submit can be retried.
pub async fn replay<W: Write>(controller: &mut FlowController, script: &Script, out: &mut W) -> Result<ReplaySummary> {
    let mut summary = ReplaySummary {
        actions: 0,
        progress: controller.progress(),
        created: None,
        rejected: Vec::new(),
    };

    for (index, action) in script.actions.iter().enumerate() {
        let record = run_action(controller, action, &mut summary)
            .await
            .log_err("Replay aborted")
            .with_context(|| format!("Action {} ({:?}) failed", index + 1, action))?;
        writeln!(out, "{}", record).context("Failed to write replay output")?;
        summary.actions += 1;
    }

    summary.progress = controller.progress();
    info!(
        script = script.name.as_deref().unwrap_or("unnamed"),
        actions = summary.actions,
        progress = summary.progress,
        "Replay finished"
    );
    Ok(summary)
}

async fn run_action(
    controller: &mut FlowController,
    action: &ScriptAction,
    summary: &mut ReplaySummary,
) -> Result<Value, CoreError> {
    let record = match action {
        ScriptAction::Complete { step, data } => {
            let snapshot = controller.complete_step_json(step, data.clone())?;
            json!({"action": "complete", "step": step, "snapshot": snapshot})
        }
        ScriptAction::Merge { step, patch } => {
            let snapshot = controller.merge_step(step, patch.clone())?;
            json!({"action": "merge", "step": step, "snapshot": snapshot})
        }
        ScriptAction::Delete { step } => {
            let kind: StepKind = step.parse()?;
            let snapshot = controller.delete_step(kind)?;
            json!({"action": "delete", "step": step, "snapshot": snapshot})
        }
        ScriptAction::Options { step } => {
            let kind: StepKind = step.parse()?;
            let options = controller.options_for(kind).await?;
            json!({"action": "options", "step": step, "options": options})
        }
        ScriptAction::Submit => {
            let (payload, _) = controller.assemble()?;
            match controller.submit().await {
                Ok(outcome) => {
                    match &outcome {
                        SubmitOutcome::Created(created) => {
                            summary.created = Some(created.id.clone());
                            summary.rejected.clear();
                        }
                        SubmitOutcome::Rejected(report) => {
                            summary.rejected = report.messages().iter().map(|m| m.to_string()).collect();
                        }
                    }
                    json!({"action": "submit", "payload": payload, "result": outcome})
                }
                Err(CoreError::SubmissionError(message)) => {
                    warn!(%message, "Submission failed");
                    json!({"action": "submit", "payload": payload, "error": message})
                }
                Err(e) => return Err(e),
            }
        }
    };

    for event in controller.take_events() {
        tracing::debug!(event_type = event.event_type(), "Replayed event");
    }
    Ok(record)
}
