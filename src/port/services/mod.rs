//! Application services for listening, sending and delivery fan-out.

mod context;
mod dispatch;
mod guard;
mod message_port;
mod observers;

pub use context::MessagePortContext;
pub use dispatch::MessageDispatcher;
pub use guard::ListeningGuard;
pub use message_port::{MessagePort, MessagePortError, MessagePortResult};
pub use observers::{
    FnObserver, MessageObserver, NotifyOutcome, ObserverError, ObserverId, ObserverList,
    ObserverResult,
};
