//! Font availability service.
//!
//! Process-wide registry of type families already requested/loaded.
//! Availability is best-effort: a fetch that fails or times out still
//! registers the family, because a missing glyph must fall back to a
//! default face rather than block editing. The loaded set is the one
//! piece of process-wide mutable state in the system: append-only, and
//! safe under interleaved calls.

use crate::error::FontFetchError;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{LazyLock, Mutex};
use std::time::Duration;

/// How long `ensure_font` waits for a fetch before giving up and
/// registering the family anyway.
pub const DEFAULT_FONT_WAIT: Duration = Duration::from_secs(3);

/// The families offered in the editor's text palette, with the weights
/// the layouts use.
pub const FONT_CATALOG: &[(&str, &[u16])] = &[
    ("Lato", &[400, 700]),
    ("Playfair Display", &[400, 700]),
    ("Montserrat", &[400, 600]),
    ("Cormorant Garamond", &[400, 500]),
    ("Dancing Script", &[400]),
];

/// Capability trait for the external font source.
///
/// Implemented differently by each host environment:
/// - browser: injects stylesheet links and awaits the load signal
/// - tests: records calls, succeeds/fails/hangs on demand
pub trait FontProvider {
    fn fetch(
        &self,
        family: &str,
        weights: &[u16],
    ) -> impl Future<Output = Result<(), FontFetchError>> + Send;
}

/// Registry of families confirmed (or assumed) available.
pub struct FontRegistry {
    loaded: Mutex<HashSet<String>>,
    catalog_requested: AtomicBool,
    wait: Duration,
}

impl Default for FontRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl FontRegistry {
    pub fn new() -> Self {
        Self::with_wait(DEFAULT_FONT_WAIT)
    }

    /// Registry with a custom fetch wait, for tests and slow hosts.
    pub fn with_wait(wait: Duration) -> Self {
        Self {
            loaded: Mutex::new(HashSet::new()),
            catalog_requested: AtomicBool::new(false),
            wait,
        }
    }

    /// The process-wide instance the editor shares.
    pub fn global() -> &'static FontRegistry {
        static REGISTRY: LazyLock<FontRegistry> = LazyLock::new(FontRegistry::new);
        &REGISTRY
    }

    pub fn is_loaded(&self, family: &str) -> bool {
        self.loaded_set().contains(family)
    }

    /// Make `family` available for measurement/rendering before use.
    ///
    /// No-op when already registered. Otherwise fetches through the
    /// provider with a bounded wait and registers the family whether the
    /// wait succeeds, fails, or times out.
    pub async fn ensure_font<P: FontProvider>(&self, provider: &P, family: &str, weights: &[u16]) {
        if self.is_loaded(family) {
            return;
        }

        match tokio::time::timeout(self.wait, provider.fetch(family, weights)).await {
            Ok(Ok(())) => log::debug!("font family {family:?} loaded"),
            Ok(Err(e)) => log::warn!("registering {family:?} without faces: {e}"),
            Err(_) => log::warn!(
                "font fetch for {family:?} still pending after {:?}, registering best-effort",
                self.wait
            ),
        }

        self.loaded_set().insert(family.to_string());
    }

    /// Fire-and-forget bulk registration of the whole catalog. The once
    /// marker guarantees the bulk fetch is issued at most once per
    /// registry (so at most once per process through `global()`),
    /// however often this is called.
    pub async fn ensure_catalog_fonts<P: FontProvider>(&self, provider: &P) {
        if self.catalog_requested.swap(true, Ordering::SeqCst) {
            return;
        }
        for (family, weights) in FONT_CATALOG {
            self.ensure_font(provider, family, weights).await;
        }
    }

    fn loaded_set(&self) -> std::sync::MutexGuard<'_, HashSet<String>> {
        // The set stays usable even if a holder panicked mid-insert.
        self.loaded.lock().unwrap_or_else(|e| e.into_inner())
    }
}
