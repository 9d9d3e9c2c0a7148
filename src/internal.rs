pub mod errors;
pub mod logging;
pub mod manager;
pub mod registry;
pub mod states;
pub mod task;
pub mod transport;
pub mod utils;
