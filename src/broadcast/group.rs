//! Broadcast group lifecycle and delivery

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use super::audience::Audience;
use super::error::StartError;
use super::message::{Message, MessageCatalog, Rendering};
use super::rotation::Rotation;
use crate::config::GroupConfig;
use crate::host::Proxy;
use crate::metrics;
use crate::scheduler::{ScheduledTask, Scheduler};

/// What one tick handed to the proxy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// One proxy-wide send of a precomputed message
    Broadcast,
    /// Individually rendered sends, one per recipient
    Players(usize),
}

impl Delivery {
    /// Metric label for the delivery mode
    pub fn mode(&self) -> &'static str {
        match self {
            Self::Broadcast => "broadcast",
            Self::Players(_) => "players",
        }
    }

    /// Number of sends performed
    pub fn sends(&self) -> usize {
        match self {
            Self::Broadcast => 1,
            Self::Players(count) => *count,
        }
    }
}

/// One independently scheduled rotating broadcaster
///
/// A group is built from already-parsed configuration. Its audience and
/// catalog are fixed at construction; [`BroadcastGroup::start`] validates
/// them and installs the repeating task, [`BroadcastGroup::stop`] removes it.
/// Rotation state survives a stop, so a restarted group continues where it
/// left off.
pub struct BroadcastGroup {
    name: String,
    proxy: Arc<dyn Proxy>,
    audience: Audience,
    catalog: Arc<MessageCatalog>,
    interval_secs: i64,
    shuffle: bool,
    rotation: Arc<Mutex<Rotation>>,
    task: Option<ScheduledTask>,
}

impl BroadcastGroup {
    /// Build a group, resolving its servers against the proxy now
    pub fn new<S, I, M>(
        name: impl Into<String>,
        proxy: Arc<dyn Proxy>,
        servers: &[S],
        interval_secs: i64,
        shuffle: bool,
        messages: I,
    ) -> Self
    where
        S: AsRef<str>,
        I: IntoIterator<Item = M>,
        M: Into<String>,
    {
        let audience = Audience::resolve(servers, proxy.as_ref());
        let catalog = MessageCatalog::new(messages);
        let rotation = Rotation::new(catalog.len(), shuffle);

        Self {
            name: name.into(),
            proxy,
            audience,
            catalog: Arc::new(catalog),
            interval_secs,
            shuffle,
            rotation: Arc::new(Mutex::new(rotation)),
            task: None,
        }
    }

    /// Build a group from a configuration section
    pub fn from_config(name: impl Into<String>, proxy: Arc<dyn Proxy>, config: &GroupConfig) -> Self {
        Self::new(
            name,
            proxy,
            config.servers.as_slice(),
            config.interval,
            config.random,
            config.messages.iter().cloned(),
        )
    }

    /// Make shuffles reproducible
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rotation = Arc::new(Mutex::new(Rotation::with_seed(
            self.catalog.len(),
            self.shuffle,
            seed,
        )));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn audience(&self) -> &Audience {
        &self.audience
    }

    pub fn catalog(&self) -> &MessageCatalog {
        &self.catalog
    }

    pub fn shuffle(&self) -> bool {
        self.shuffle
    }

    /// Configured interval, `None` when it is not positive
    pub fn interval(&self) -> Option<Duration> {
        u64::try_from(self.interval_secs)
            .ok()
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }

    pub fn is_running(&self) -> bool {
        self.task.is_some()
    }

    /// Position of the rotation cursor, `None` before the first tick
    pub fn cursor(&self) -> Option<usize> {
        lock(&self.rotation).cursor()
    }

    /// Check the group can run without starting it
    pub fn validate(&self) -> Result<Duration, StartError> {
        if self.catalog.is_empty() {
            return Err(StartError::NoMessages);
        }
        if self.audience.is_empty() {
            return Err(StartError::NoServers);
        }
        self.interval().ok_or(StartError::IntervalNotSet)
    }

    /// Validate and install the repeating task
    ///
    /// The first message goes out one full interval after this call.
    pub fn start(&mut self, scheduler: &Scheduler) -> Result<(), StartError> {
        let period = self.validate()?;
        if self.task.is_some() {
            return Err(StartError::AlreadyRunning);
        }

        let broadcaster = Arc::new(Broadcaster {
            name: self.name.clone(),
            proxy: Arc::clone(&self.proxy),
            audience: self.audience.clone(),
            catalog: Arc::clone(&self.catalog),
            rotation: Arc::clone(&self.rotation),
        });

        let task = scheduler
            .schedule_repeating(period, move || {
                let broadcaster = Arc::clone(&broadcaster);
                async move { broadcaster.tick() }
            })
            .map_err(StartError::Scheduler)?;

        self.task = Some(task);
        tracing::debug!(
            group = %self.name,
            audience = %self.audience,
            messages = self.catalog.len(),
            interval_secs = period.as_secs(),
            shuffle = self.shuffle,
            "Broadcast group started"
        );
        Ok(())
    }

    /// Cancel the repeating task; does nothing when idle
    ///
    /// A tick has no await point, so one already delivering finishes and
    /// advances the rotation.
    pub fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.cancel();
            tracing::debug!(group = %self.name, "Broadcast group stopped");
        }
    }
}

impl std::fmt::Debug for BroadcastGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BroadcastGroup")
            .field("name", &self.name)
            .field("audience", &self.audience)
            .field("messages", &self.catalog.len())
            .field("interval_secs", &self.interval_secs)
            .field("shuffle", &self.shuffle)
            .field("running", &self.is_running())
            .finish()
    }
}

fn lock(rotation: &Mutex<Rotation>) -> MutexGuard<'_, Rotation> {
    rotation.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// State owned by a running group's task
struct Broadcaster {
    name: String,
    proxy: Arc<dyn Proxy>,
    audience: Audience,
    catalog: Arc<MessageCatalog>,
    rotation: Arc<Mutex<Rotation>>,
}

impl Broadcaster {
    fn tick(&self) {
        let selected = lock(&self.rotation).select();
        let Some(index) = selected else {
            return;
        };
        let Some(message) = self.catalog.get(index) else {
            return;
        };

        let delivery = {
            let _timer = metrics::start_delivery_timer(&self.name);
            self.deliver(message)
        };
        lock(&self.rotation).advance();

        metrics::record_tick(&self.name, delivery.mode(), delivery.sends());
        tracing::trace!(
            group = %self.name,
            index,
            mode = delivery.mode(),
            sends = delivery.sends(),
            "Auto message sent"
        );
    }

    fn deliver(&self, message: &Message) -> Delivery {
        match &self.audience {
            Audience::Everyone => match message.rendering() {
                Rendering::Precomputed(component) => {
                    self.proxy.broadcast(component);
                    Delivery::Broadcast
                }
                Rendering::PerRecipient => {
                    let players = self.proxy.all_players();
                    for player in &players {
                        player.send_message(&message.render(Some(player.as_ref())));
                    }
                    Delivery::Players(players.len())
                }
            },
            Audience::Servers(servers) => {
                let mut sends = 0;
                for server in servers {
                    for player in server.connected_players() {
                        player.send_message(&message.render(Some(player.as_ref())));
                        sends += 1;
                    }
                }
                Delivery::Players(sends)
            }
        }
    }
}
