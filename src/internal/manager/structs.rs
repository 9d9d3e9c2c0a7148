pub(crate) mod control_command;
pub(crate) mod manager_core;
pub(crate) mod manager_state;
pub mod session_configuration;
pub(crate) mod session_context;
pub mod session_event;
pub mod session_manager;
pub mod session_manager_builder;

pub use session_configuration::SessionConfiguration;
pub use session_event::SessionEvent;
pub use session_manager::SessionManager;
pub use session_manager_builder::SessionManagerBuilder;
