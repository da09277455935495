pub mod config;
pub mod constants;
pub mod device;
pub mod model_resolver;
