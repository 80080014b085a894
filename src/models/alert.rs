use serde::Serialize;

use super::PeriodKind;

/// Rendered notification for one period, produced by the threshold evaluator.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertEvent {
    pub kind: PeriodKind,
    pub subject: String,
    pub body: String,
}
