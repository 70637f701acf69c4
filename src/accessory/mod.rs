//! Composter sensor accessory
//!
//! - `selector`: Nickname (startup) and device-id (refresh) lookup
//! - `presentation`: Cycle time → sensor value mapping
//! - `poller`: Periodic refresh loop with cancellable handle

pub mod poller;
pub mod presentation;
pub mod selector;

pub use poller::{PollerHandle, RefreshOutcome, StatusPoller};
pub use presentation::PresentationAdapter;
