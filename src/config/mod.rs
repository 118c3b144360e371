mod settings;

pub use settings::{BroadcastConfig, PushConfig, ServerConfig, Settings, StoreConfig};
