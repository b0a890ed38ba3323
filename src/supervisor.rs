//! Group supervisor
//!
//! Loads the configuration file, builds one [`BroadcastGroup`] per section
//! and keeps the ones that started. Reloading stops every running group and
//! replaces the whole set in one swap.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::time::Duration;

use crate::broadcast::{BroadcastGroup, StartError};
use crate::config::{self, AutoMessagesConfig, ConfigError};
use crate::error::Result;
use crate::host::Proxy;
use crate::metrics;
use crate::scheduler::{ScheduledTask, Scheduler};

/// Delay applied to the first start so the proxy can register its servers
pub const STARTUP_DELAY: Duration = Duration::from_secs(3);

/// Owns every running broadcast group
pub struct Supervisor {
    inner: Arc<Inner>,
}

struct Inner {
    proxy: Arc<dyn Proxy>,
    config_path: PathBuf,
    scheduler: Scheduler,
    state: Mutex<State>,
}

#[derive(Default)]
struct State {
    groups: Vec<BroadcastGroup>,
    pending: Option<ScheduledTask>,
    generation: u64,
}

impl State {
    /// Cancel a pending startup and stop every group
    fn disable(&mut self) {
        if let Some(pending) = self.pending.take() {
            pending.cancel();
        }
        for mut group in self.groups.drain(..) {
            group.stop();
        }
        self.generation += 1;
        metrics::set_running_groups(0);
    }
}

impl Supervisor {
    pub fn new(proxy: Arc<dyn Proxy>, config_path: impl Into<PathBuf>, scheduler: Scheduler) -> Self {
        Self {
            inner: Arc::new(Inner {
                proxy,
                config_path: config_path.into(),
                scheduler,
                state: Mutex::new(State::default()),
            }),
        }
    }

    /// Create a supervisor on the runtime of the calling context
    pub fn current(proxy: Arc<dyn Proxy>, config_path: impl Into<PathBuf>) -> Result<Self> {
        Ok(Self::new(proxy, config_path, Scheduler::current()?))
    }

    pub fn config_path(&self) -> &Path {
        &self.inner.config_path
    }

    /// Load the configuration and (re)start groups
    ///
    /// When the file cannot be loaded the error is logged and returned and
    /// the running groups are left untouched. Otherwise a reload first stops
    /// every running group and cancels a pending startup. Groups are then
    /// started right away, or after `delay` when one is given.
    ///
    /// Returns the number of sections in the configuration.
    pub fn enable(&self, reload: bool, delay: Option<Duration>) -> Result<usize> {
        tracing::info!("{}", if reload { "Reloading config..." } else { "Loading config..." });

        let config = config::load(&self.inner.config_path).map_err(|e| {
            tracing::error!(
                error = %e,
                "{}",
                if reload { "Failed to reload config" } else { "Failed to load config" }
            );
            e
        })?;
        tracing::info!("Config successfully loaded");
        let sections = config.len();

        let mut state = self.inner.lock_state();
        if reload {
            state.disable();
        }

        match delay {
            Some(delay) => {
                tracing::info!(
                    "AutoMessages enabling will be delayed for {} sec.",
                    delay.as_secs()
                );
                let generation = state.generation;
                let inner = Arc::downgrade(&self.inner);
                let task = self
                    .inner
                    .scheduler
                    .schedule_delayed(delay, async move { install(inner, config, generation) });
                state.pending = Some(task);
            }
            None => {
                let groups = self.inner.build_groups(&config);
                self.inner.replace_groups(&mut state, groups);
            }
        }

        tracing::info!("{}", if reload { "AutoMessages reloaded" } else { "AutoMessages loaded" });
        Ok(sections)
    }

    /// Reload the configuration and restart all groups immediately
    pub fn reload(&self) -> Result<usize> {
        self.enable(true, None)
    }

    /// Stop all groups and any pending startup
    pub fn shutdown(&self) {
        tracing::info!("Disabling automessages");
        self.inner.lock_state().disable();
        tracing::info!("Automessages disabled");
    }

    /// Names of the running groups, in configuration order
    pub fn running_groups(&self) -> Vec<String> {
        self.inner
            .lock_state()
            .groups
            .iter()
            .filter(|g| g.is_running())
            .map(|g| g.name().to_string())
            .collect()
    }

    /// True while a delayed startup has not fired yet
    pub fn is_pending(&self) -> bool {
        self.inner
            .lock_state()
            .pending
            .as_ref()
            .is_some_and(|task| !task.is_finished())
    }
}

impl Drop for Supervisor {
    fn drop(&mut self) {
        self.inner.lock_state().disable();
    }
}

impl std::fmt::Debug for Supervisor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Supervisor")
            .field("config_path", &self.inner.config_path)
            .field("running_groups", &self.running_groups())
            .finish()
    }
}

/// Body of a delayed startup
fn install(inner: Weak<Inner>, config: AutoMessagesConfig, generation: u64) {
    let Some(inner) = inner.upgrade() else {
        return;
    };

    let mut state = inner.lock_state();
    // a reload or shutdown happened after this startup was scheduled
    if state.generation != generation {
        return;
    }
    state.pending = None;

    let groups = inner.build_groups(&config);
    inner.replace_groups(&mut state, groups);
}

impl Inner {
    fn lock_state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn replace_groups(&self, state: &mut State, groups: Vec<BroadcastGroup>) {
        for mut old in std::mem::replace(&mut state.groups, groups) {
            old.stop();
        }
        metrics::set_running_groups(state.groups.len());
    }

    /// Build and start one group per section, keeping those that started
    fn build_groups(&self, config: &AutoMessagesConfig) -> Vec<BroadcastGroup> {
        tracing::info!("Starting AutoMessages tasks");

        for error in config.invalid() {
            if let ConfigError::InvalidSection { name, reason } = error {
                tracing::warn!(group = %name, "Failed to start '{}' {}", name, reason);
                metrics::record_start_failure("invalid_section");
            }
        }

        let mut groups = Vec::with_capacity(config.groups().len());
        for (name, section) in config.groups() {
            let mut group =
                BroadcastGroup::from_config(name.clone(), Arc::clone(&self.proxy), section);

            match group.start(&self.scheduler) {
                Ok(()) => {
                    tracing::info!(group = %name, "'{}' was started", name);
                    groups.push(group);
                }
                Err(reason) => {
                    match &reason {
                        StartError::IntervalNotSet => {
                            tracing::warn!(group = %name, "Interval for '{}' is not specified or <=0", name)
                        }
                        StartError::NoMessages => {
                            tracing::warn!(group = %name, "Messages for '{}' are not specified or empty", name)
                        }
                        StartError::NoServers => {
                            tracing::warn!(group = %name, "Servers for '{}' are not specified or empty", name)
                        }
                        StartError::AlreadyRunning => {
                            tracing::warn!(group = %name, "'{}' is already running", name)
                        }
                        StartError::Scheduler(e) => {
                            tracing::warn!(group = %name, error = %e, "Failed to schedule '{}'", name)
                        }
                    }
                    metrics::record_start_failure(reason.label());
                    tracing::warn!(group = %name, "'{}' was not started", name);
                }
            }
        }

        tracing::info!(running = groups.len(), "Done");
        groups
    }
}
