use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::aggregation::PeriodTotals;
use crate::models::{AlertEvent, PeriodKind, PeriodLimit};

use super::templates::render;

/// When an over-limit period sum turns into an alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AlertPolicy {
    /// Alert on every ingested reading while the sum is over the limit.
    #[default]
    EveryEvent,
    /// Alert only for the reading that pushes the sum over the limit.
    OncePerPeriod,
}

impl AlertPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertPolicy::EveryEvent => "every-event",
            AlertPolicy::OncePerPeriod => "once-per-period",
        }
    }
}

impl FromStr for AlertPolicy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "every-event" | "fire-every-event-while-over" => Ok(AlertPolicy::EveryEvent),
            "once-per-period" | "fire-once-per-period" => Ok(AlertPolicy::OncePerPeriod),
            other => Err(format!(
                "expected `every-event` or `once-per-period`, got `{other}`"
            )),
        }
    }
}

/// Stateless limit check.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThresholdEvaluator {
    policy: AlertPolicy,
}

impl ThresholdEvaluator {
    pub fn new(policy: AlertPolicy) -> Self {
        Self { policy }
    }

    /// Alert for `kind` when `sum` exceeds the limit, regardless of policy.
    pub fn evaluate(&self, kind: PeriodKind, sum: f64, limit: &PeriodLimit) -> Option<AlertEvent> {
        (sum > limit.max_weight).then(|| render(kind))
    }

    /// Policy-aware check after one ingestion. `totals.before` is the sum of
    /// the readings that precede the one just written.
    pub fn evaluate_ingestion(
        &self,
        kind: PeriodKind,
        totals: &PeriodTotals,
        limit: &PeriodLimit,
    ) -> Option<AlertEvent> {
        let alert = self.evaluate(kind, totals.total, limit)?;
        match self.policy {
            AlertPolicy::EveryEvent => Some(alert),
            AlertPolicy::OncePerPeriod => (totals.before <= limit.max_weight).then_some(alert),
        }
    }
}
