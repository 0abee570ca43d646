//! Domain Events
//!
//! Events broadcast by [`LocalityService`](crate::services::LocalityService)
//! after a successful write. Subscribers typically use them as the signal to
//! reload their snapshot.

use crate::db::UpsertResult;
use crate::models::Locality;

/// Broadcast channel capacity for domain events.
///
/// Lagging subscribers lose old events; they only need the latest signal to
/// reload.
pub(crate) const EVENT_CHANNEL_CAPACITY: usize = 128;

/// Domain events emitted by the service layer
#[derive(Debug, Clone, PartialEq)]
pub enum LocalityEvent {
    /// New localities were inserted
    Created(Vec<Locality>),

    /// A locality was replaced
    Updated(Locality),

    /// Localities were removed
    Deleted { ids: Vec<i64> },

    /// An import finished committing every chunk
    Imported(UpsertResult),
}

impl LocalityEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            LocalityEvent::Created(_) => "created",
            LocalityEvent::Updated(_) => "updated",
            LocalityEvent::Deleted { .. } => "deleted",
            LocalityEvent::Imported(_) => "imported",
        }
    }
}
