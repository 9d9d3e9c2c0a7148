pub mod event_sink;
pub mod transfer_request;
pub mod transport_event;

pub use event_sink::EventSink;
pub use transfer_request::{Headers, LiveTransfer, TransferHandle, TransferRequest};
pub use transport_event::{Continuation, FailureKind, TransferFailure, TransportEvent};
