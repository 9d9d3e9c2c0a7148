pub mod artifact_hook;
pub mod transport;

pub use artifact_hook::{ArtifactHook, ArtifactHookAdapter};
pub use transport::{Transport, TransportContext, TransportFactory};
