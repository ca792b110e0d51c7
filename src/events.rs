mod event_list;
mod handlers;

pub use event_list::{EventKind, EventList};
pub(crate) use handlers::{arrive, depart};
