pub mod analysis_logger;
pub mod analyze_segment_use_case;
pub mod engine;
pub mod model_cache;
