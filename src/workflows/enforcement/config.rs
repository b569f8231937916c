use serde::{Deserialize, Serialize};

use super::collaborators::DeliveryMethod;

/// Policy dials backing the enforcement workflow.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Statutory investigation window scheduled after a submission.
    pub follow_up_window_days: i64,
    /// Horizon quoted when a workflow is created.
    pub estimated_completion_days: i64,
    /// Minimum enhanced/original length ratio before an enhancement replaces
    /// the templated draft.
    pub enhancement_min_ratio: f32,
    /// Neutral probability assumed when the external estimator is absent or
    /// failing.
    pub fallback_success_probability: f32,
    /// Transport used for letters generated by automatic escalation.
    pub default_delivery_method: DeliveryMethod,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            follow_up_window_days: 30,
            estimated_completion_days: 120,
            enhancement_min_ratio: 0.8,
            fallback_success_probability: 0.5,
            default_delivery_method: DeliveryMethod::Mail,
        }
    }
}
