pub mod pipeline;

pub use pipeline::InsightPipeline;
