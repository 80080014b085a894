mod alert;
mod event;
mod period;

pub use alert::AlertEvent;
pub use event::DeviceEvent;
pub use period::{PeriodKind, PeriodLimit, PeriodLimits, PeriodWindow};
