use std::sync::Arc;
use std::time::Instant;

use crate::broadcast::EmergencyBroadcaster;
use crate::config::Settings;
use crate::directory::ParticipantDirectory;
use crate::notification::NotificationDispatcher;
use crate::push::{create_push_transport, PushTransport};
use crate::store::{create_document_store, DocumentStore};

#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub store: Arc<dyn DocumentStore>,
    pub transport: Arc<dyn PushTransport>,
    pub dispatcher: Arc<NotificationDispatcher>,
    pub broadcaster: Arc<EmergencyBroadcaster>,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(settings: Settings) -> Self {
        let store = create_document_store(&settings.store);
        let transport = create_push_transport(&settings.push);
        Self::with_backends(settings, store, transport)
    }

    /// Wire the state around externally constructed backends. Tests use
    /// this to inject seeded stores and recording transports.
    pub fn with_backends(
        settings: Settings,
        store: Arc<dyn DocumentStore>,
        transport: Arc<dyn PushTransport>,
    ) -> Self {
        let directory = Arc::new(ParticipantDirectory::new(
            store.clone(),
            settings.broadcast.token_batch_size,
        ));
        let dispatcher = Arc::new(NotificationDispatcher::new(
            store.clone(),
            directory.clone(),
            transport.clone(),
        ));
        let broadcaster = Arc::new(EmergencyBroadcaster::new(
            store.clone(),
            directory,
            transport.clone(),
            &settings.broadcast,
        ));

        Self {
            settings: Arc::new(settings),
            store,
            transport,
            dispatcher,
            broadcaster,
            start_time: Instant::now(),
        }
    }
}
