pub mod weight_reading;

pub use weight_reading::WeightReading;
