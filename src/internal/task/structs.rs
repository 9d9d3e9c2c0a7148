pub mod download_task;
pub mod executer;
pub mod task_progress;
pub mod task_state;
pub mod task_status;
pub mod validation;
pub mod verification;

pub use download_task::DownloadTask;
pub use executer::{ExecuteOn, Executer, MainQueue};
pub use task_progress::TaskProgress;
pub use task_status::TaskStatus;
pub use validation::Validation;
pub use verification::VerificationType;
