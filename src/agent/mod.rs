//! Agent Coordinator
//!
//! A single task owns the instance registry, the debounce timer and the
//! collector supervisor. Registry changes arrive as events and re-arm the
//! timer; when the timer fires the collector is stopped, its configuration is
//! rendered from the registry and a fresh collector is started.
//!
//! ```text
//! Idle --event--> PendingRefresh --quiet period--> Refreshing --> Idle
//!                    ^      |
//!                    +event-+ (deadline reset)
//! ```

mod coordinator;
mod event;
mod timer;

pub use coordinator::*;
pub(crate) use event::*;
pub use timer::*;
