pub mod assessment;
pub mod cases;
pub mod payload;

pub use assessment::*;
pub use cases::*;
pub use payload::payload_from_schema;
