//! Service context bundling the collaborators a command needs.

use std::sync::Arc;

use crate::adapters::live::{LiveClock, LiveFileSystem, LiveIdGenerator, LogNotifier, WebhookNotifier};
use crate::aggregator::TaskAggregator;
use crate::config::Config;
use crate::ports::clock::Clock;
use crate::ports::notify::Notifier;
use crate::store::FileTaskStore;
use crate::task::FilterSet;

/// Bundles the port trait objects and settings for one run.
///
/// Constructors wire up different adapter implementations; commands only
/// see the ports.
pub struct ServiceContext {
    /// Clock for obtaining the current time.
    pub clock: Arc<dyn Clock>,
    /// Task store backing both sources and the project directory.
    pub store: Arc<FileTaskStore>,
    /// Sink for task-created notifications.
    pub notifier: Arc<dyn Notifier>,
    /// Resolved configuration.
    pub config: Config,
}

impl ServiceContext {
    /// Creates a live context: system clock, on-disk store and either a
    /// webhook or log notifier.
    #[must_use]
    pub fn live(config: Config) -> Self {
        let store = FileTaskStore::new(
            Box::new(LiveFileSystem),
            Box::new(LiveIdGenerator::new()),
            &config.store_root,
        );
        let notifier: Arc<dyn Notifier> = match &config.notify_url {
            Some(url) => Arc::new(WebhookNotifier::new(url.clone())),
            None => Arc::new(LogNotifier),
        };
        Self { clock: Arc::new(LiveClock), store: Arc::new(store), notifier, config }
    }

    /// Opens an aggregator over this context's store for the configured
    /// identity.
    #[must_use]
    pub fn aggregator(&self) -> TaskAggregator {
        let mut builder =
            TaskAggregator::builder(self.config.identity.clone(), self.clock.clone(), self.store.clone())
                .projects(self.store.clone())
                .notifier(self.notifier.clone())
                .local_offset(self.config.utc_offset.unwrap_or_else(LiveClock::local_offset))
                .unknown_id_policy(self.config.unknown_id_policy)
                .filters(FilterSet::with_hidden(&self.config.hidden_categories));
        if self.config.workspace_tasks {
            builder = builder.workspace(self.store.clone());
        }
        builder.build()
    }
}
