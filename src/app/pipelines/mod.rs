pub mod sale_pipeline;

pub use sale_pipeline::SalePipeline;
