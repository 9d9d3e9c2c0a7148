pub mod registry;
pub mod task_record;

pub use registry::{Registry, RegistryPaths};
pub use task_record::TaskRecord;
