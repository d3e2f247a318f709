pub mod classify;
pub mod extract;
pub mod json_repair;
pub mod pipeline;
pub mod prefilter;
pub mod profiles;
pub mod prompts;
pub mod quality;
pub mod report;
pub mod runner;
pub mod sink;
#[cfg(any(test, feature = "test-support"))]
pub mod testing;
pub mod traits;
pub mod types;
pub mod util;
pub mod validate;
