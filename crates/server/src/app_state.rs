use chrono::Utc;
use control_api::ApiContext;
use shared::{
    domain::{CategoryId, PerformerId},
    protocol::ServerEvent,
};
use tokio::sync::broadcast;
use tracing::{debug, warn};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) api: ApiContext,
    pub(crate) events: broadcast::Sender<ServerEvent>,
}

impl AppState {
    pub(crate) fn new(api: ApiContext) -> Self {
        let (events, _) = broadcast::channel(64);
        Self { api, events }
    }

    fn publish(&self, event: ServerEvent) {
        // No subscribers is the normal case when no screen is connected.
        if self.events.send(event).is_err() {
            debug!("no websocket subscribers for event");
        }
    }

    /// Re-reads the pointer so subscribers see what was actually committed.
    pub(crate) async fn announce_display(&self) {
        match self.api.storage.display_pointer().await {
            Ok(pointer) => self.publish(ServerEvent::DisplayChanged {
                pointer,
                at: Utc::now(),
            }),
            Err(error) => warn!(%error, "could not read display pointer for event"),
        }
    }

    pub(crate) fn announce_settings(&self) {
        self.publish(ServerEvent::SettingsChanged { at: Utc::now() });
    }

    pub(crate) fn announce_roster(
        &self,
        category_id: Option<CategoryId>,
        performer_id: Option<PerformerId>,
    ) {
        self.publish(ServerEvent::RosterChanged {
            category_id,
            performer_id,
            at: Utc::now(),
        });
    }
}
