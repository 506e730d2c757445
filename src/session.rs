//! Language switching and live translation for one caller.
//!
//! A [`Session`] owns the active lexicon snapshot. Loading a language builds
//! a new lexicon on a blocking worker and swaps it in as a whole, so
//! translations never observe a half-loaded dictionary. Every load request
//! takes a generation number; a load that completes after a newer request was
//! made is discarded instead of replacing the newer snapshot.
//!
//! Typed input goes through [`Session::submit_input`], which waits for a quiet
//! period and drops requests that a newer input has superseded.

use crate::config::Config;
use crate::engine::Translator;
use crate::error::{Error, Result};
use crate::language::Language;
use crate::loader::Loader;
use crate::report::LoadReport;
use crate::source::LineSource;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};
use std::time::Duration;
use tracing::{debug, info};

#[derive(Debug, Default)]
struct LoadState {
    generation: u64,
    requested: Option<Language>,
}

#[derive(Debug, Default)]
struct InputState {
    ticket: u64,
    text: String,
}

/// Result of a debounced [`Session::submit_input`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputOutcome {
    Translated(String),
    /// A newer input replaced this one
    Superseded,
    /// No language is loaded, or a switch is still in progress
    NotReady,
}

impl InputOutcome {
    pub fn translated(self) -> Option<String> {
        match self {
            InputOutcome::Translated(text) => Some(text),
            _ => None,
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

pub struct Session {
    source: Arc<dyn LineSource>,
    active: RwLock<Option<Translator>>,
    loads: Mutex<LoadState>,
    input: Mutex<InputState>,
    debounce: Duration,
}

impl Session {
    pub fn new(source: Arc<dyn LineSource>) -> Self {
        Session {
            source,
            active: RwLock::new(None),
            loads: Mutex::new(LoadState::default()),
            input: Mutex::new(InputState::default()),
            debounce: Duration::ZERO,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(Arc::new(config.source())).with_debounce(config.debounce())
    }

    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    /// Load `language` and make it active.
    ///
    /// Returns [`Error::Superseded`] if another load was requested while this
    /// one ran; the snapshot is then left to the newer request.
    pub async fn load_language(&self, language: Language) -> Result<LoadReport> {
        let generation = {
            let mut loads = lock(&self.loads);
            loads.generation += 1;
            loads.requested = Some(language);
            loads.generation
        };
        debug!("Load #{} requested for '{}'", generation, language);

        let source = Arc::clone(&self.source);
        let (lexicon, report) =
            tokio::task::spawn_blocking(move || Loader::new(source.as_ref()).load(language))
                .await
                .map_err(|e| Error::Task(e.to_string()))?;

        let loads = lock(&self.loads);
        if loads.generation != generation {
            info!(
                "Discarding load #{} of '{}': superseded by #{}",
                generation, language, loads.generation
            );
            return Err(Error::Superseded(language.to_string()));
        }
        let translator = Translator::new(Arc::new(lexicon));
        *self.active.write().unwrap_or_else(PoisonError::into_inner) = Some(translator);
        drop(loads);

        info!("'{}' is active ({} words)", language, report.words);
        Ok(report)
    }

    /// The language whose lexicon is currently active
    pub fn active_language(&self) -> Option<Language> {
        self.active
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|t| t.lexicon().language())
    }

    /// True once the most recently requested language is active
    pub fn is_ready(&self) -> bool {
        self.translator().is_some()
    }

    /// Snapshot of the active translator, if the requested language is ready
    pub fn translator(&self) -> Option<Translator> {
        let loads = lock(&self.loads);
        let active = self.active.read().unwrap_or_else(PoisonError::into_inner);
        active
            .as_ref()
            .filter(|t| loads.requested == Some(t.lexicon().language()))
            .cloned()
    }

    /// Translate with the active lexicon; `None` while a language switch is
    /// still loading
    pub fn translate(&self, text: &str) -> Option<String> {
        self.translator().map(|t| t.translate(text))
    }

    /// Record `text` as the latest input and translate it after the debounce
    /// period, unless a newer input arrives meanwhile.
    pub async fn submit_input(&self, text: &str) -> InputOutcome {
        let ticket = {
            let mut input = lock(&self.input);
            input.ticket += 1;
            input.text = text.to_string();
            input.ticket
        };

        if !self.debounce.is_zero() {
            tokio::time::sleep(self.debounce).await;
        }
        if lock(&self.input).ticket != ticket {
            debug!("Input #{} superseded before translation", ticket);
            return InputOutcome::Superseded;
        }

        let Some(translated) = self.translate(text) else {
            return InputOutcome::NotReady;
        };
        if lock(&self.input).ticket != ticket {
            debug!("Input #{} superseded during translation", ticket);
            return InputOutcome::Superseded;
        }
        InputOutcome::Translated(translated)
    }

    /// Translate the latest submitted input again, e.g. after a language switch
    pub fn retranslate(&self) -> Option<String> {
        let text = lock(&self.input).text.clone();
        if text.is_empty() {
            return None;
        }
        self.translate(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{Lines, MemorySource};
    use std::io;
    use std::sync::Condvar;

    fn dictionaries() -> MemorySource {
        MemorySource::new()
            .with_file("en/VietPhrase.txt", "hello=xin chào\nworld=thế giới\n")
            .with_file("zh/VietPhrase.txt", "你好=xin chào\n")
            .with_file("zh/Mark.txt", "。=.\n")
    }

    /// Blocks every open of `zh/` files until released
    struct GatedSource {
        inner: MemorySource,
        gate: Arc<(Mutex<bool>, Condvar)>,
    }

    impl LineSource for GatedSource {
        fn open(&self, path: &str) -> io::Result<Option<Lines>> {
            if path.starts_with("zh/") {
                let (open, cvar) = &*self.gate;
                let mut released = lock(open);
                while !*released {
                    released = cvar.wait(released).unwrap_or_else(PoisonError::into_inner);
                }
            }
            self.inner.open(path)
        }

        fn list(&self, dir: &str) -> Vec<String> {
            self.inner.list(dir)
        }
    }

    #[tokio::test]
    async fn test_translate_requires_a_loaded_language() {
        let session = Session::new(Arc::new(dictionaries()));
        assert!(!session.is_ready());
        assert_eq!(session.translate("hello"), None);

        let report = session.load_language(Language::English).await.unwrap();
        assert_eq!(report.words, 2);
        assert!(session.is_ready());
        assert_eq!(session.translate("hello world").as_deref(), Some("Xin chào thế giới"));
    }

    #[tokio::test]
    async fn test_switching_language_swaps_snapshot() {
        let session = Session::new(Arc::new(dictionaries()));
        session.load_language(Language::English).await.unwrap();
        session.load_language(Language::Chinese).await.unwrap();

        assert_eq!(session.active_language(), Some(Language::Chinese));
        assert_eq!(session.translate("你好。").as_deref(), Some("Xin chào."));
        assert_eq!(session.translate("hello").as_deref(), Some("Hello"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_stale_load_is_discarded() {
        let gate = Arc::new((Mutex::new(false), Condvar::new()));
        let source = GatedSource {
            inner: dictionaries(),
            gate: Arc::clone(&gate),
        };
        let session = Arc::new(Session::new(Arc::new(source)));

        let slow = {
            let session = Arc::clone(&session);
            tokio::spawn(async move { session.load_language(Language::Chinese).await })
        };
        // let the Chinese load reach the gate before the newer request
        tokio::time::sleep(Duration::from_millis(50)).await;

        session.load_language(Language::English).await.unwrap();
        assert!(session.is_ready());

        {
            let (open, cvar) = &*gate;
            *lock(open) = true;
            cvar.notify_all();
        }
        let stale = slow.await.unwrap();
        assert!(matches!(stale, Err(Error::Superseded(_))));
        assert_eq!(session.active_language(), Some(Language::English));
        assert_eq!(session.translate("hello").as_deref(), Some("Xin chào"));
    }

    #[tokio::test]
    async fn test_not_ready_while_newer_language_loads() {
        let session = Session::new(Arc::new(dictionaries()));
        session.load_language(Language::English).await.unwrap();
        lock(&session.loads).requested = Some(Language::Chinese);
        assert!(!session.is_ready());
        assert_eq!(session.translate("hello"), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_superseded_input_returns_none() {
        let session = Arc::new(
            Session::new(Arc::new(dictionaries())).with_debounce(Duration::from_millis(200)),
        );
        session.load_language(Language::English).await.unwrap();

        let first = {
            let session = Arc::clone(&session);
            tokio::spawn(async move { session.submit_input("hello").await })
        };
        tokio::time::sleep(Duration::from_millis(50)).await;
        let second = session.submit_input("world").await;

        assert_eq!(first.await.unwrap(), InputOutcome::Superseded);
        assert_eq!(second, InputOutcome::Translated("Thế giới".to_string()));
    }

    #[tokio::test]
    async fn test_input_while_switching_is_not_ready() {
        let session = Session::new(Arc::new(dictionaries()));
        assert_eq!(session.submit_input("hello").await, InputOutcome::NotReady);

        session.load_language(Language::English).await.unwrap();
        lock(&session.loads).requested = Some(Language::Chinese);
        assert_eq!(session.submit_input("hello").await, InputOutcome::NotReady);
        assert!(session.translator().is_none());
    }

    #[tokio::test]
    async fn test_retranslate_uses_latest_input() {
        let session = Session::new(Arc::new(dictionaries()));
        assert_eq!(session.retranslate(), None);

        session.load_language(Language::English).await.unwrap();
        assert_eq!(
            session.submit_input("你好").await.translated().as_deref(),
            Some("你好")
        );

        session.load_language(Language::Chinese).await.unwrap();
        assert_eq!(session.retranslate().as_deref(), Some("Xin chào"));
    }

    #[tokio::test]
    async fn test_from_config_with_missing_directories() {
        let config = Config {
            bundled_dir: "/nonexistent/vietphrase".into(),
            ..Config::default()
        };
        let session = Session::from_config(&config);
        let report = session.load_language(Language::Chinese).await.unwrap();
        assert_eq!(report.words, crate::loader::FORCED_IGNORES.len());
        assert_eq!(session.translate("的").as_deref(), Some(""));
    }
}
