//! Navigation requests from the editor toward the host shell.

use tokio::sync::broadcast;
use tracing::debug;

use crate::models::EntityKind;

/// A request for the host to open one entity's page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenEntity {
    pub entity_type: EntityKind,
    pub entity_id: String,
}

/// Fan-out channel carrying [`OpenEntity`] requests.
///
/// Controllers publish, the host shell subscribes. With no subscriber the
/// request is dropped, which is fine for surfaces embedded outside a full
/// shell.
pub struct EntityGateway {
    sender: broadcast::Sender<OpenEntity>,
}

impl EntityGateway {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(32);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<OpenEntity> {
        self.sender.subscribe()
    }

    pub fn open(&self, entity_type: EntityKind, entity_id: impl Into<String>) {
        let request = OpenEntity {
            entity_type,
            entity_id: entity_id.into(),
        };
        debug!(?request, "open entity requested");
        let _ = self.sender.send(request);
    }
}

impl Default for EntityGateway {
    fn default() -> Self {
        Self::new()
    }
}
