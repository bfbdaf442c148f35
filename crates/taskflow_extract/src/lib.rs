pub mod engine;
pub mod mode;

pub use engine::extract;
pub use mode::ExtractMode;
