mod dispatcher;
mod evaluator;
mod smtp;
pub mod templates;

pub use dispatcher::{AlertDispatcher, Notifier, OutboundMessage};
pub use evaluator::{AlertPolicy, ThresholdEvaluator};
pub use smtp::SmtpNotifier;
