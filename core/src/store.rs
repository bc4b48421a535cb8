//! `RegistryStore` — Mutable holder with subscribe/notify
//!
//! The store wraps one immutable [`MatcherRegistry`] and replaces it
//! wholesale on every mutation, synchronously notifying listeners with the
//! new registry. Reactive consumers (a rendering component, a playground
//! UI) subscribe once and re-render per notification.
//!
//! Mutation requires `&mut self`, so a store is single-threaded (or
//! externally synchronized) by construction; the registries it hands out
//! are immutable and freely shareable.

use std::sync::Arc;

use crate::{
    EmbedOptions, EmbedOutput, MatchResult, Matcher, MatcherEntry, MatcherRegistry,
};

/// A registered listener callback.
pub type Listener = Box<dyn Fn(&MatcherRegistry) + Send + Sync>;

/// Opaque handle returned by [`RegistryStore::subscribe`]; pass it to
/// [`RegistryStore::unsubscribe`] to remove the listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Subscription(usize);

/// Mutable wrapper around an immutable [`MatcherRegistry`].
pub struct RegistryStore {
    registry: MatcherRegistry,
    listeners: Vec<(usize, Listener)>,
    next_id: usize,
}

impl RegistryStore {
    /// A store holding the given registry.
    #[must_use]
    pub fn new(registry: MatcherRegistry) -> Self {
        Self {
            registry,
            listeners: Vec::new(),
            next_id: 0,
        }
    }

    /// A store holding the built-in provider set.
    #[cfg(feature = "providers")]
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(MatcherRegistry::with_defaults())
    }

    /// The currently-held registry.
    #[must_use]
    pub fn registry(&self) -> &MatcherRegistry {
        &self.registry
    }

    // ── Mutation (replace + notify) ──────────────────────────────────────

    /// Register a matcher at priority 0, replacing any same-named entry,
    /// then notify listeners.
    pub fn register(&mut self, matcher: impl Matcher + 'static) {
        self.register_arc(Arc::new(matcher), 0);
    }

    /// Register a matcher at an explicit priority, replacing any same-named
    /// entry, then notify listeners.
    pub fn register_with_priority(&mut self, matcher: impl Matcher + 'static, priority: i32) {
        self.register_arc(Arc::new(matcher), priority);
    }

    /// Register an already-shared matcher.
    pub fn register_arc(&mut self, matcher: Arc<dyn Matcher>, priority: i32) {
        let name = matcher.name().to_owned();
        let next = self.registry.without(&name).with_entry(matcher, priority);
        self.replace(next);
    }

    /// Remove the named matcher and notify listeners. A no-op returning
    /// `false` when the name is not registered (listeners are not notified).
    pub fn unregister(&mut self, name: &str) -> bool {
        if !self.registry.contains(name) {
            return false;
        }
        let next = self.registry.without(name);
        self.replace(next);
        true
    }

    /// Swap in a different registry wholesale and notify listeners.
    pub fn set_registry(&mut self, registry: MatcherRegistry) {
        self.replace(registry);
    }

    fn replace(&mut self, next: MatcherRegistry) {
        self.registry = next;
        for (_, listener) in &self.listeners {
            listener(&self.registry);
        }
    }

    // ── Listeners ────────────────────────────────────────────────────────

    /// Add a listener invoked synchronously after every replacement.
    ///
    /// Listeners receive the new registry by reference and cannot re-enter
    /// the store during notification (mutation requires `&mut self`), so
    /// notification is not reentrant by construction.
    pub fn subscribe(
        &mut self,
        listener: impl Fn(&MatcherRegistry) + Send + Sync + 'static,
    ) -> Subscription {
        let id = self.next_id;
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        Subscription(id)
    }

    /// Remove a listener. Returns `false` when the subscription was already
    /// removed.
    pub fn unsubscribe(&mut self, subscription: Subscription) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(id, _)| *id != subscription.0);
        self.listeners.len() != before
    }

    // ── Delegation to the held registry ──────────────────────────────────

    /// See [`MatcherRegistry::match_url`].
    pub fn match_url(&self, url: &str) -> MatchResult {
        self.registry.match_url(url)
    }

    /// See [`MatcherRegistry::embed_url`].
    #[must_use]
    pub fn embed_url(&self, url: &str, options: &EmbedOptions) -> Option<String> {
        self.registry.embed_url(url, options)
    }

    /// See [`MatcherRegistry::output`].
    #[must_use]
    pub fn output(&self, url: &str, options: &EmbedOptions) -> Option<EmbedOutput> {
        self.registry.output(url, options)
    }

    /// See [`MatcherRegistry::list`].
    #[must_use]
    pub fn list(&self) -> &[MatcherEntry] {
        self.registry.list()
    }

    /// See [`MatcherRegistry::get`].
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Arc<dyn Matcher>> {
        self.registry.get(name)
    }

    /// See [`MatcherRegistry::contains`].
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.registry.contains(name)
    }

    /// See [`MatcherRegistry::len`].
    #[must_use]
    pub fn len(&self) -> usize {
        self.registry.len()
    }

    /// See [`MatcherRegistry::is_empty`].
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }
}

impl std::fmt::Debug for RegistryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistryStore")
            .field("registry", &self.registry)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PatternMatcher;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn vimeo() -> PatternMatcher {
        PatternMatcher::builder("Vimeo")
            .domain("vimeo.com")
            .pattern(r"vimeo\.com/(?P<id>\d+)")
            .embed("https://player.vimeo.com/video/{id}")
            .build()
            .unwrap()
    }

    #[test]
    fn register_makes_urls_matchable() {
        let mut store = RegistryStore::new(MatcherRegistry::empty());
        assert!(store.match_url("https://vimeo.com/76979871").is_err());

        store.register(vimeo());
        let hit = store.match_url("https://vimeo.com/76979871").unwrap();
        assert_eq!(hit.matcher.name(), "Vimeo");
    }

    #[test]
    fn register_replaces_same_name() {
        let mut store = RegistryStore::new(MatcherRegistry::empty());
        store.register(vimeo());

        let replacement = PatternMatcher::builder("Vimeo")
            .domain("vimeo.example")
            .pattern(r"vimeo\.example/(?P<id>\d+)")
            .embed("https://replacement.example/{id}")
            .build()
            .unwrap();
        store.register(replacement);

        assert_eq!(store.len(), 1);
        assert!(store.match_url("https://vimeo.com/76979871").is_err());
        assert!(store.match_url("https://vimeo.example/1").is_ok());
    }

    #[test]
    fn listeners_notified_synchronously_per_replacement() {
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&calls);

        let mut store = RegistryStore::new(MatcherRegistry::empty());
        store.subscribe(move |registry| {
            seen.fetch_add(1, Ordering::SeqCst);
            assert!(registry.len() <= 1);
        });

        store.register(vimeo());
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        assert!(store.unregister("Vimeo"));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn unregister_absent_is_silent_noop() {
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&calls);

        let mut store = RegistryStore::new(MatcherRegistry::empty());
        store.subscribe(move |_| {
            seen.fetch_add(1, Ordering::SeqCst);
        });

        assert!(!store.unregister("Vimeo"));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn unsubscribe_stops_notifications() {
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&calls);

        let mut store = RegistryStore::new(MatcherRegistry::empty());
        let sub = store.subscribe(move |_| {
            seen.fetch_add(1, Ordering::SeqCst);
        });

        store.register(vimeo());
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        assert!(store.unsubscribe(sub));
        assert!(!store.unsubscribe(sub));

        store.unregister("Vimeo");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn set_registry_swaps_wholesale() {
        let mut store = RegistryStore::new(MatcherRegistry::empty());
        let other = MatcherRegistry::builder().matcher(vimeo()).build();
        store.set_registry(other);
        assert_eq!(store.len(), 1);
        assert!(store.contains("Vimeo"));
    }

    #[test]
    fn delegation_forwards_to_held_registry() {
        let mut store = RegistryStore::new(MatcherRegistry::empty());
        assert!(store.is_empty());
        store.register(vimeo());

        assert_eq!(store.list().len(), 1);
        assert!(store.get("Vimeo").is_some());
        assert_eq!(
            store.embed_url("https://vimeo.com/76979871", &EmbedOptions::new()),
            Some("https://player.vimeo.com/video/76979871".to_owned())
        );
        assert!(store
            .output("https://vimeo.com/76979871", &EmbedOptions::new())
            .is_some());
    }
}
