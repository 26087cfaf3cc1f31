use crate::labels;
use crate::models::{ModelChoice, PredictionOutcome};
use crate::workflow::{Phase, Workflow};

pub const UPLOAD_PROMPT: &str = "UPLOAD FRUIT IMAGE";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderedOutcome {
    Success { label: String, confidence: String },
    Failure { message: String },
}

/// Display form of an outcome. The only place outcomes are turned into text.
pub fn render_outcome(outcome: &PredictionOutcome) -> RenderedOutcome {
    match outcome {
        PredictionOutcome::Success {
            class_index,
            confidence,
        } => RenderedOutcome::Success {
            label: labels::label_or_unknown(*class_index).to_string(),
            confidence: format_confidence(*confidence),
        },
        PredictionOutcome::Failure { message } => RenderedOutcome::Failure {
            message: message.clone(),
        },
    }
}

/// `0.87` -> `"87.00%"`.
pub fn format_confidence(confidence: f64) -> String {
    format!("{:.2}%", confidence * 100.0)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowView {
    pub phase: Phase,
    pub upload_label: String,
    pub preview: Option<String>,
    pub model: ModelChoice,
    pub outcome: Option<RenderedOutcome>,
    pub can_predict: bool,
}

impl WorkflowView {
    pub fn of(workflow: &Workflow) -> Self {
        let image = workflow.selected_image();
        Self {
            phase: workflow.phase(),
            upload_label: image
                .map(|i| i.name.clone())
                .unwrap_or_else(|| UPLOAD_PROMPT.to_string()),
            preview: image.map(|i| i.preview.clone()),
            model: workflow.model(),
            outcome: workflow.outcome().map(render_outcome),
            can_predict: workflow.can_predict(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_renders_label_and_percent() {
        let out = render_outcome(&PredictionOutcome::Success {
            class_index: 4,
            confidence: 0.87,
        });
        assert_eq!(
            out,
            RenderedOutcome::Success {
                label: "Banana (Good)".into(),
                confidence: "87.00%".into()
            }
        );
    }

    #[test]
    fn unknown_index_still_shows_confidence() {
        let out = render_outcome(&PredictionOutcome::Success {
            class_index: 42,
            confidence: 0.1234,
        });
        assert_eq!(
            out,
            RenderedOutcome::Success {
                label: "Unknown".into(),
                confidence: "12.34%".into()
            }
        );
    }

    #[test]
    fn confidence_edges() {
        assert_eq!(format_confidence(0.0), "0.00%");
        assert_eq!(format_confidence(1.0), "100.00%");
    }

    #[test]
    fn idle_view_prompts_for_upload() {
        let view = WorkflowView::of(&Workflow::new());
        assert_eq!(view.phase, Phase::Idle);
        assert_eq!(view.upload_label, UPLOAD_PROMPT);
        assert!(view.preview.is_none());
        assert!(!view.can_predict);
    }
}
