pub mod logging;
pub mod pacing;

pub use logging::truncate_text;
pub use pacing::{DelayRange, HumanPacing, KeystrokePace};
