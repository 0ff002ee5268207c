pub mod config;
pub mod constants;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod pipeline;
pub mod types;

pub use config::Config;
pub use error::{NormalizeError, Result};
pub use pipeline::normalize::{NormalizeContext, NormalizedRecord, UnclassifiedEnding};
pub use pipeline::{Pipeline, PipelineResult};
pub use types::{Ending, Increment, Outcome, TagMap, TagValue, TimeCategory};
