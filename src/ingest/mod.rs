pub mod raw;
pub mod service;

pub use raw::{MotionFlag, NumberField, RawReading};
pub use service::IngestionService;
