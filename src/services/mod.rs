pub mod capture;
pub mod destination;
pub mod override_engine;
pub mod pipeline;
pub mod post_process;
pub mod process_resolver;
pub mod window_locator;

#[cfg(test)]
pub mod testing;

pub use capture::{
    convert_image, create_capture_service, select_region, CaptureJob, CaptureTarget, ConvertOptions,
};
pub use destination::{destination_path, relative_to_root, OUTPUT_EXTENSION};
pub use override_engine::CommandDelegateRunner;
pub use pipeline::{ResolutionPipeline, ResolutionRequest};
pub use process_resolver::ProcfsTable;
pub use window_locator::WindowLocator;
