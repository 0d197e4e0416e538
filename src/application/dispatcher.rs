//! Command dispatcher - fans a normalized message out to enabled modules

use tracing::{debug, warn};

use crate::application::errors::BotError;
use crate::domain::entities::Message;
use crate::domain::traits::{ChatTransport, SettingsStore};
use crate::modules::{ModuleRegistry, ADMIN_MODULE};

/// What to do when a handler (or its gate lookup) fails.
///
/// Dispatch is deliberately best-effort broadcast: multiple modules may react
/// to the same message, so the default policy keeps iterating past failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DispatchPolicy {
    /// Log the failure and keep invoking the remaining handlers
    #[default]
    ContinueOnError,
    /// Propagate the first failure to the caller
    AbortOnError,
}

/// Iterates registered handlers in registry order, consulting the settings
/// gate for every module except `admin`.
pub struct Dispatcher {
    policy: DispatchPolicy,
}

impl Dispatcher {
    pub fn new(policy: DispatchPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> DispatchPolicy {
        self.policy
    }

    /// Dispatch one message. Handlers run sequentially, each awaited to
    /// completion before the next begins; handler N's side effects are
    /// observable before handler N+1 starts.
    pub async fn dispatch(
        &self,
        client: &dyn ChatTransport,
        message: &Message,
        registry: &ModuleRegistry,
        store: &dyn SettingsStore,
    ) -> Result<(), BotError> {
        for module in registry.handlers() {
            let name = module.name();

            // The admin module must never be disable-able from inside the
            // gated system itself.
            if name != ADMIN_MODULE {
                match store.is_module_enabled(message.room(), name).await {
                    Ok(true) => {}
                    Ok(false) => {
                        debug!(module = name, room = %message.room(), "module disabled, skipping");
                        continue;
                    }
                    Err(e) => {
                        if self.policy == DispatchPolicy::AbortOnError {
                            return Err(e.into());
                        }
                        warn!(module = name, "settings lookup failed: {}", e);
                        continue;
                    }
                }
            }

            // Fresh copy per invocation so modules cannot interfere with
            // each other through the shared config.
            let extra = registry.extra().clone();
            if let Err(e) = module.handle(client, message, extra).await {
                if self.policy == DispatchPolicy::AbortOnError {
                    return Err(e.into());
                }
                warn!(module = name, "handler failed: {}", e);
            }
        }
        Ok(())
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new(DispatchPolicy::default())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use tokio::sync::mpsc;

    use super::*;
    use crate::application::errors::{ModuleError, StorageError};
    use crate::domain::entities::{EventContent, RoomEvent, TransportEvent};
    use crate::domain::traits::PresenceState;
    use crate::infrastructure::config::Config;
    use crate::modules::{Extra, Module};

    const ROOM: &str = "!lobby:example.org";

    /// Transport stub; dispatch tests never exercise the wire.
    struct NullTransport;

    #[async_trait]
    impl ChatTransport for NullTransport {
        async fn start(&self) -> Result<(), BotError> {
            Ok(())
        }
        async fn stop(&self) -> Result<(), BotError> {
            Ok(())
        }
        fn subscribe(&self) -> mpsc::Receiver<TransportEvent> {
            mpsc::channel(1).1
        }
        async fn send_message(&self, _room: &str, _text: &str) -> Result<(), BotError> {
            Ok(())
        }
        async fn set_presence(
            &self,
            _state: PresenceState,
            _message: Option<&str>,
        ) -> Result<(), BotError> {
            Ok(())
        }
        async fn presence(&self) -> Result<PresenceState, BotError> {
            Ok(PresenceState::Online)
        }
        fn user_id(&self) -> &str {
            "@bot:example.org"
        }
    }

    /// Settings store that records which modules were consulted
    struct RecordingStore {
        disabled: Vec<&'static str>,
        consulted: Mutex<Vec<String>>,
    }

    impl RecordingStore {
        fn with_disabled(disabled: Vec<&'static str>) -> Self {
            Self {
                disabled,
                consulted: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl SettingsStore for RecordingStore {
        async fn is_module_enabled(&self, _room: &str, module: &str) -> Result<bool, StorageError> {
            self.consulted.lock().unwrap().push(module.to_string());
            Ok(!self.disabled.contains(&module))
        }

        async fn set_module_enabled(
            &self,
            _room: &str,
            _module: &str,
            _enabled: bool,
        ) -> Result<(), StorageError> {
            Ok(())
        }
    }

    /// Module that counts invocations and appends to a shared call log
    struct CountingModule {
        name: &'static str,
        calls: Arc<AtomicUsize>,
        log: Arc<Mutex<Vec<&'static str>>>,
        fail: bool,
    }

    #[async_trait]
    impl Module for CountingModule {
        fn name(&self) -> &str {
            self.name
        }

        async fn handle(
            &self,
            _client: &dyn ChatTransport,
            _message: &Message,
            _extra: Extra,
        ) -> Result<(), ModuleError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.log.lock().unwrap().push(self.name);
            if self.fail {
                Err(ModuleError::ExecutionFailed("deliberate".to_string()))
            } else {
                Ok(())
            }
        }
    }

    struct Harness {
        calls: HashMap<&'static str, Arc<AtomicUsize>>,
        log: Arc<Mutex<Vec<&'static str>>>,
        registry: ModuleRegistry,
    }

    async fn harness(defs: Vec<(&'static str, bool)>) -> Harness {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut calls = HashMap::new();
        let mut builder = ModuleRegistry::builder();
        for (name, fail) in defs {
            let counter = Arc::new(AtomicUsize::new(0));
            calls.insert(name, counter.clone());
            builder = builder
                .register(CountingModule {
                    name,
                    calls: counter,
                    log: log.clone(),
                    fail,
                })
                .unwrap();
        }
        let registry = builder
            .build(&Config::for_tests("@owner:example.org"))
            .await
            .unwrap();
        Harness {
            calls,
            log,
            registry,
        }
    }

    fn message() -> Message {
        let event = RoomEvent::new(ROOM, "@alice:example.org", 100, EventContent::text("!go"));
        crate::application::normalizer::normalize(event, 0, &HashMap::new(), "@bot:example.org")
            .unwrap()
    }

    #[tokio::test]
    async fn invokes_handlers_in_registry_order() {
        let h = harness(vec![("bravo", false), ("alpha", false)]).await;
        let store = RecordingStore::with_disabled(vec![]);
        Dispatcher::default()
            .dispatch(&NullTransport, &message(), &h.registry, &store)
            .await
            .unwrap();
        assert_eq!(*h.log.lock().unwrap(), vec!["alpha", "bravo"]);
    }

    #[tokio::test]
    async fn disabled_module_is_never_invoked() {
        let h = harness(vec![("alpha", false), ("bravo", false)]).await;
        let store = RecordingStore::with_disabled(vec!["alpha"]);
        Dispatcher::default()
            .dispatch(&NullTransport, &message(), &h.registry, &store)
            .await
            .unwrap();
        assert_eq!(h.calls["alpha"].load(Ordering::SeqCst), 0);
        assert_eq!(h.calls["bravo"].load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn admin_bypasses_the_gate() {
        let h = harness(vec![("admin", false), ("echo", false)]).await;
        // Even an explicit disable entry for admin is ignored.
        let store = RecordingStore::with_disabled(vec!["admin"]);
        Dispatcher::default()
            .dispatch(&NullTransport, &message(), &h.registry, &store)
            .await
            .unwrap();
        assert_eq!(h.calls["admin"].load(Ordering::SeqCst), 1);
        // The gate was only ever asked about the non-admin module.
        assert_eq!(*store.consulted.lock().unwrap(), vec!["echo"]);
    }

    #[tokio::test]
    async fn failing_handler_does_not_stop_iteration() {
        let h = harness(vec![("alpha", true), ("bravo", false)]).await;
        let store = RecordingStore::with_disabled(vec![]);
        Dispatcher::default()
            .dispatch(&NullTransport, &message(), &h.registry, &store)
            .await
            .unwrap();
        assert_eq!(*h.log.lock().unwrap(), vec!["alpha", "bravo"]);
        assert_eq!(h.calls["bravo"].load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn abort_policy_propagates_handler_failure() {
        let h = harness(vec![("alpha", true), ("bravo", false)]).await;
        let store = RecordingStore::with_disabled(vec![]);
        let result = Dispatcher::new(DispatchPolicy::AbortOnError)
            .dispatch(&NullTransport, &message(), &h.registry, &store)
            .await;
        assert!(result.is_err());
        assert_eq!(h.calls["bravo"].load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn handlers_cannot_leak_extra_mutations() {
        struct Mutator;
        struct Checker;

        #[async_trait]
        impl Module for Mutator {
            fn name(&self) -> &str {
                "a-mutator"
            }
            async fn handle(
                &self,
                _client: &dyn ChatTransport,
                _message: &Message,
                mut extra: Extra,
            ) -> Result<(), ModuleError> {
                extra.handler_names.clear();
                extra.owner = "@hijacked:example.org".to_string();
                Ok(())
            }
        }

        #[async_trait]
        impl Module for Checker {
            fn name(&self) -> &str {
                "b-checker"
            }
            async fn handle(
                &self,
                _client: &dyn ChatTransport,
                _message: &Message,
                extra: Extra,
            ) -> Result<(), ModuleError> {
                assert_eq!(extra.handler_names, vec!["a-mutator", "b-checker"]);
                assert_eq!(extra.owner, "@owner:example.org");
                Ok(())
            }
        }

        let registry = ModuleRegistry::builder()
            .register(Mutator)
            .unwrap()
            .register(Checker)
            .unwrap()
            .build(&Config::for_tests("@owner:example.org"))
            .await
            .unwrap();
        let store = RecordingStore::with_disabled(vec![]);
        Dispatcher::default()
            .dispatch(&NullTransport, &message(), &registry, &store)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn gate_error_skips_module_under_default_policy() {
        struct FailingStore;

        #[async_trait]
        impl SettingsStore for FailingStore {
            async fn is_module_enabled(
                &self,
                _room: &str,
                _module: &str,
            ) -> Result<bool, StorageError> {
                Err(StorageError::Io(std::io::Error::new(
                    std::io::ErrorKind::Other,
                    "store down",
                )))
            }
            async fn set_module_enabled(
                &self,
                _room: &str,
                _module: &str,
                _enabled: bool,
            ) -> Result<(), StorageError> {
                Ok(())
            }
        }

        let h = harness(vec![("admin", false), ("echo", false)]).await;
        Dispatcher::default()
            .dispatch(&NullTransport, &message(), &h.registry, &FailingStore)
            .await
            .unwrap();
        // Gated module skipped, exempt module still ran.
        assert_eq!(h.calls["echo"].load(Ordering::SeqCst), 0);
        assert_eq!(h.calls["admin"].load(Ordering::SeqCst), 1);
    }
}
