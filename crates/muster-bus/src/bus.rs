use std::sync::{OnceLock, RwLock};

use serde_json::{Map, Value};
use tokio::sync::broadcast;
use tracing::{debug, info};

use muster_types::AppliedPatch;

/// Configuration for the [`PatchBus`].
#[derive(Clone, Debug)]
pub struct BusConfig {
    /// Capacity of per-topic broadcast channels.
    pub channel_capacity: usize,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            channel_capacity: 64,
        }
    }
}

#[derive(Default)]
struct BusState {
    confirmed: Vec<AppliedPatch>,
    locale_map: Map<String, Value>,
    rules_map: Map<String, Value>,
}

/// The process-wide store of the confirmed patch set and its derived caches.
///
/// Mutated only by the confirm path: [`set_confirmed`] replaces the applied
/// set, while [`set_locale_map`] and [`set_rules_map`] shallow-merge into
/// their caches. Concurrent confirms are last-write-wins, not merged.
///
/// [`set_confirmed`]: PatchBus::set_confirmed
/// [`set_locale_map`]: PatchBus::set_locale_map
/// [`set_rules_map`]: PatchBus::set_rules_map
pub struct PatchBus {
    state: RwLock<BusState>,
    confirmed_tx: broadcast::Sender<Vec<AppliedPatch>>,
    locale_tx: broadcast::Sender<Map<String, Value>>,
    rules_tx: broadcast::Sender<Map<String, Value>>,
}

impl PatchBus {
    /// Create a bus with the given configuration.
    pub fn new(config: BusConfig) -> Self {
        let (confirmed_tx, _) = broadcast::channel(config.channel_capacity);
        let (locale_tx, _) = broadcast::channel(config.channel_capacity);
        let (rules_tx, _) = broadcast::channel(config.channel_capacity);
        Self {
            state: RwLock::new(BusState::default()),
            confirmed_tx,
            locale_tx,
            rules_tx,
        }
    }

    /// The process-wide bus instance.
    ///
    /// Consumers that need the one authoritative selection share this;
    /// tests and embedders construct their own with [`PatchBus::new`].
    pub fn global() -> &'static PatchBus {
        static GLOBAL: OnceLock<PatchBus> = OnceLock::new();
        GLOBAL.get_or_init(|| PatchBus::new(BusConfig::default()))
    }

    // ---------------------------------------------------------------
    // Writes (confirm path only)
    // ---------------------------------------------------------------

    /// Replace the confirmed patch set.
    pub fn set_confirmed(&self, patches: Vec<AppliedPatch>) {
        {
            let mut state = self.state.write().expect("bus lock poisoned");
            state.confirmed = patches.clone();
        }
        info!(count = patches.len(), "confirmed patch set published");
        let _ = self.confirmed_tx.send(patches);
    }

    /// Shallow-merge entries into the locale cache; later entries win.
    pub fn set_locale_map(&self, entries: Map<String, Value>) {
        let snapshot = {
            let mut state = self.state.write().expect("bus lock poisoned");
            for (key, value) in entries {
                state.locale_map.insert(key, value);
            }
            state.locale_map.clone()
        };
        debug!(keys = snapshot.len(), "locale map published");
        let _ = self.locale_tx.send(snapshot);
    }

    /// Shallow-merge entries into the rules cache; later entries win.
    pub fn set_rules_map(&self, entries: Map<String, Value>) {
        let snapshot = {
            let mut state = self.state.write().expect("bus lock poisoned");
            for (key, value) in entries {
                state.rules_map.insert(key, value);
            }
            state.rules_map.clone()
        };
        debug!(keys = snapshot.len(), "rules map published");
        let _ = self.rules_tx.send(snapshot);
    }

    // ---------------------------------------------------------------
    // Reads (defensive copies)
    // ---------------------------------------------------------------

    /// The confirmed patch set. Returns an owned copy.
    pub fn confirmed(&self) -> Vec<AppliedPatch> {
        self.state.read().expect("bus lock poisoned").confirmed.clone()
    }

    /// The merged locale cache. Returns an owned copy.
    pub fn locale_map(&self) -> Map<String, Value> {
        self.state.read().expect("bus lock poisoned").locale_map.clone()
    }

    /// The merged rules cache. Returns an owned copy.
    pub fn rules_map(&self) -> Map<String, Value> {
        self.state.read().expect("bus lock poisoned").rules_map.clone()
    }

    // ---------------------------------------------------------------
    // Subscriptions
    // ---------------------------------------------------------------

    /// Subscribe to confirmed-set changes. Dropping the receiver
    /// unsubscribes.
    pub fn subscribe_confirmed(&self) -> broadcast::Receiver<Vec<AppliedPatch>> {
        self.confirmed_tx.subscribe()
    }

    /// Subscribe to locale cache changes.
    pub fn subscribe_locale(&self) -> broadcast::Receiver<Map<String, Value>> {
        self.locale_tx.subscribe()
    }

    /// Subscribe to rules cache changes.
    pub fn subscribe_rules(&self) -> broadcast::Receiver<Map<String, Value>> {
        self.rules_tx.subscribe()
    }

    /// Number of live confirmed-set subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.confirmed_tx.receiver_count()
    }
}

impl Default for PatchBus {
    fn default() -> Self {
        Self::new(BusConfig::default())
    }
}

impl std::fmt::Debug for PatchBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.read().expect("bus lock poisoned");
        f.debug_struct("PatchBus")
            .field("confirmed", &state.confirmed.len())
            .field("locale_keys", &state.locale_map.len())
            .field("rules_keys", &state.rules_map.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use muster_types::PatchKind;
    use serde_json::json;

    fn applied(id: &str) -> AppliedPatch {
        AppliedPatch::new(id, PatchKind::Patch, json!({"some": "data"}))
    }

    fn map_of(pairs: &[(&str, Value)]) -> Map<String, Value> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), v.clone()))
            .collect()
    }

    // -----------------------------------------------------------------------
    // Confirm / read round trip
    // -----------------------------------------------------------------------

    #[test]
    fn confirm_read_round_trip_is_a_copy() {
        let bus = PatchBus::default();
        let patches = vec![applied("p1"), applied("p2")];
        bus.set_confirmed(patches.clone());

        let mut read_back = bus.confirmed();
        assert_eq!(read_back, patches);

        // Mutating the copy must not leak into the bus.
        read_back.pop();
        assert_eq!(bus.confirmed().len(), 2);
    }

    #[test]
    fn concurrent_confirms_are_last_write_wins() {
        let bus = PatchBus::default();
        bus.set_confirmed(vec![applied("p1")]);
        bus.set_confirmed(vec![applied("p2")]);
        let confirmed = bus.confirmed();
        assert_eq!(confirmed.len(), 1);
        assert_eq!(confirmed[0].id.as_str(), "p2");
    }

    // -----------------------------------------------------------------------
    // Shallow merge semantics
    // -----------------------------------------------------------------------

    #[test]
    fn locale_map_shallow_merges() {
        let bus = PatchBus::default();
        bus.set_locale_map(map_of(&[("greeting", json!("hello")), ("farewell", json!("bye"))]));
        bus.set_locale_map(map_of(&[("greeting", json!("hail"))]));

        let locale = bus.locale_map();
        assert_eq!(locale.get("greeting"), Some(&json!("hail")));
        assert_eq!(locale.get("farewell"), Some(&json!("bye")));
    }

    #[test]
    fn rules_map_shallow_merges() {
        let bus = PatchBus::default();
        bus.set_rules_map(map_of(&[("empire", json!({"limit": 1}))]));
        bus.set_rules_map(map_of(&[("dwarfs", json!({"limit": 2}))]));

        let rules = bus.rules_map();
        assert_eq!(rules.len(), 2);
        assert_eq!(rules.get("empire"), Some(&json!({"limit": 1})));
    }

    #[test]
    fn reads_return_fresh_copies() {
        let bus = PatchBus::default();
        bus.set_locale_map(map_of(&[("key", json!("value"))]));
        let mut copy = bus.locale_map();
        copy.insert("sneaky".into(), json!(true));
        assert!(bus.locale_map().get("sneaky").is_none());
    }

    // -----------------------------------------------------------------------
    // Subscriptions
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn subscriber_receives_confirmed_publish() {
        let bus = PatchBus::default();
        let mut stream = bus.subscribe_confirmed();
        assert_eq!(bus.subscriber_count(), 1);

        bus.set_confirmed(vec![applied("p1")]);
        let received = stream.recv().await.unwrap();
        assert_eq!(received.len(), 1);
        assert_eq!(received[0].id.as_str(), "p1");
    }

    #[tokio::test]
    async fn notification_is_consumed_on_subscriber_turn() {
        let bus = std::sync::Arc::new(PatchBus::default());
        let mut stream = bus.subscribe_confirmed();

        let subscriber = {
            let bus = std::sync::Arc::clone(&bus);
            tokio::spawn(async move {
                let received = stream.recv().await.unwrap();
                // The subscriber observes the already-committed state; the
                // setter returned long before this runs.
                assert_eq!(bus.confirmed(), received);
                received.len()
            })
        };

        bus.set_confirmed(vec![applied("p1"), applied("p2")]);
        assert_eq!(subscriber.await.unwrap(), 2);
    }

    #[tokio::test]
    async fn locale_and_rules_topics_are_independent() {
        let bus = PatchBus::default();
        let mut locale_stream = bus.subscribe_locale();
        let mut rules_stream = bus.subscribe_rules();

        bus.set_locale_map(map_of(&[("greeting", json!("hello"))]));
        let locale = locale_stream.recv().await.unwrap();
        assert_eq!(locale.get("greeting"), Some(&json!("hello")));
        assert!(rules_stream.try_recv().is_err());
    }

    #[tokio::test]
    async fn dropped_receiver_unsubscribes() {
        let bus = PatchBus::default();
        let stream = bus.subscribe_confirmed();
        assert_eq!(bus.subscriber_count(), 1);
        drop(stream);
        assert_eq!(bus.subscriber_count(), 0);
        // Publishing without subscribers is harmless.
        bus.set_confirmed(vec![applied("p1")]);
        assert_eq!(bus.confirmed().len(), 1);
    }

    #[test]
    fn global_instance_is_shared() {
        let a = PatchBus::global() as *const PatchBus;
        let b = PatchBus::global() as *const PatchBus;
        assert_eq!(a, b);
    }
}
