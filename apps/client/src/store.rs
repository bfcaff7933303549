//! Client application state store: the latest known values presentation
//! code needs, decoupled from how they were fetched.
//!
//! The store is an explicit, injectable container — constructed once and
//! passed to whoever needs it, never a module-level global. Setters are
//! synchronous single-step replacements, so no reader ever observes a torn
//! value; the store enforces no cross-slot invariants (a caller that
//! replaces the CV is responsible for clearing any stale analysis).

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::models::{AtsAnalysis, CvAnalysis, CvData, PortfolioConfig, PortfolioConfigPatch, Theme};

/// Durable backing for the persisted subset of slots. `save` is called
/// after every mutation of a persisted slot; failures are logged by the
/// store and never surfaced through setters.
pub trait StateStorage: Send + Sync {
    fn load(&self) -> Result<Option<PersistedState>>;
    fn save(&self, state: &PersistedState) -> Result<()>;
}

/// Disables persistence.
pub struct NoStorage;

impl StateStorage for NoStorage {
    fn load(&self) -> Result<Option<PersistedState>> {
        Ok(None)
    }

    fn save(&self, _state: &PersistedState) -> Result<()> {
        Ok(())
    }
}

/// JSON file on disk, the client-side analog of browser local storage.
pub struct JsonFileStorage {
    path: PathBuf,
}

impl JsonFileStorage {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl StateStorage for JsonFileStorage {
    fn load(&self) -> Result<Option<PersistedState>> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(e).with_context(|| format!("reading state file {:?}", self.path))
            }
        };
        let state = serde_json::from_str(&raw)
            .with_context(|| format!("parsing state file {:?}", self.path))?;
        Ok(Some(state))
    }

    fn save(&self, state: &PersistedState) -> Result<()> {
        let raw = serde_json::to_string_pretty(state).context("serializing state")?;
        std::fs::write(&self.path, raw)
            .with_context(|| format!("writing state file {:?}", self.path))
    }
}

/// The slots that survive a restart. The partition is fixed here at the
/// type level, not inferred at runtime: ephemeral results (analysis, ATS
/// score, template selection) are deliberately absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersistedState {
    pub cv_data: Option<CvData>,
    pub portfolio_config: Option<PortfolioConfig>,
    pub theme: Option<Theme>,
}

#[derive(Debug, Clone, Default)]
struct Slots {
    cv_data: Option<CvData>,
    analysis: Option<CvAnalysis>,
    ats_analysis: Option<AtsAnalysis>,
    selected_template: Option<String>,
    portfolio_config: Option<PortfolioConfig>,
    theme: Option<Theme>,
}

pub struct AppStore {
    slots: Mutex<Slots>,
    storage: Arc<dyn StateStorage>,
}

impl AppStore {
    /// Builds a store over the given storage, seeding persisted slots from
    /// it. An unreadable state file logs a warning and starts empty.
    pub fn new(storage: Arc<dyn StateStorage>) -> Self {
        let mut slots = Slots::default();
        match storage.load() {
            Ok(Some(persisted)) => {
                slots.cv_data = persisted.cv_data;
                slots.portfolio_config = persisted.portfolio_config;
                slots.theme = persisted.theme;
            }
            Ok(None) => {}
            Err(e) => warn!("failed to load persisted client state: {e:#}"),
        }
        Self {
            slots: Mutex::new(slots),
            storage,
        }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(NoStorage))
    }

    pub fn cv_data(&self) -> Option<CvData> {
        self.slots.lock().unwrap().cv_data.clone()
    }

    pub fn set_cv_data(&self, cv_data: CvData) {
        let persisted = {
            let mut slots = self.slots.lock().unwrap();
            slots.cv_data = Some(cv_data);
            persisted_view(&slots)
        };
        self.persist(&persisted);
    }

    pub fn analysis(&self) -> Option<CvAnalysis> {
        self.slots.lock().unwrap().analysis.clone()
    }

    pub fn set_analysis(&self, analysis: CvAnalysis) {
        self.slots.lock().unwrap().analysis = Some(analysis);
    }

    pub fn ats_analysis(&self) -> Option<AtsAnalysis> {
        self.slots.lock().unwrap().ats_analysis.clone()
    }

    pub fn set_ats_analysis(&self, analysis: AtsAnalysis) {
        self.slots.lock().unwrap().ats_analysis = Some(analysis);
    }

    pub fn selected_template(&self) -> Option<String> {
        self.slots.lock().unwrap().selected_template.clone()
    }

    pub fn set_selected_template(&self, template_id: String) {
        self.slots.lock().unwrap().selected_template = Some(template_id);
    }

    pub fn portfolio_config(&self) -> Option<PortfolioConfig> {
        self.slots.lock().unwrap().portfolio_config.clone()
    }

    /// Whole-value replacement, like every other setter.
    pub fn set_portfolio_config(&self, config: PortfolioConfig) {
        let persisted = {
            let mut slots = self.slots.lock().unwrap();
            slots.portfolio_config = Some(config);
            persisted_view(&slots)
        };
        self.persist(&persisted);
    }

    /// One-level merge into the current config; an empty slot starts from
    /// the defaults. The only slot with patch semantics.
    pub fn merge_portfolio_config(&self, patch: PortfolioConfigPatch) {
        let persisted = {
            let mut slots = self.slots.lock().unwrap();
            let mut config = slots.portfolio_config.take().unwrap_or_default();
            config.apply(patch);
            slots.portfolio_config = Some(config);
            persisted_view(&slots)
        };
        self.persist(&persisted);
    }

    pub fn theme(&self) -> Option<Theme> {
        self.slots.lock().unwrap().theme
    }

    pub fn set_theme(&self, theme: Theme) {
        let persisted = {
            let mut slots = self.slots.lock().unwrap();
            slots.theme = Some(theme);
            persisted_view(&slots)
        };
        self.persist(&persisted);
    }

    /// Restores every slot to its initial empty value in one step. Readers
    /// see either the old state or the cleared state, nothing in between.
    pub fn reset(&self) {
        let persisted = {
            let mut slots = self.slots.lock().unwrap();
            *slots = Slots::default();
            persisted_view(&slots)
        };
        self.persist(&persisted);
    }

    fn persist(&self, state: &PersistedState) {
        if let Err(e) = self.storage.save(state) {
            warn!("failed to persist client state: {e:#}");
        }
    }
}

fn persisted_view(slots: &Slots) -> PersistedState {
    PersistedState {
        cv_data: slots.cv_data.clone(),
        portfolio_config: slots.portfolio_config.clone(),
        theme: slots.theme.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ContactInfo;
    use uuid::Uuid;

    fn sample_cv() -> CvData {
        CvData {
            cv_id: Uuid::new_v4(),
            file_name: "resume.pdf".to_string(),
            contact: ContactInfo {
                name: "Dana Smith".to_string(),
                email: Some("dana@example.com".to_string()),
                ..ContactInfo::default()
            },
            summary: None,
            experience: vec![],
            education: vec![],
            skills: vec!["rust".to_string()],
        }
    }

    #[test]
    fn test_setters_fully_replace_slot_values() {
        let store = AppStore::in_memory();
        assert!(store.cv_data().is_none());

        let cv = sample_cv();
        store.set_cv_data(cv.clone());
        assert_eq!(store.cv_data(), Some(cv));

        store.set_selected_template("minimal".to_string());
        store.set_selected_template("bold".to_string());
        assert_eq!(store.selected_template().as_deref(), Some("bold"));
    }

    #[test]
    fn test_reset_clears_all_slots_and_is_idempotent() {
        let store = AppStore::in_memory();
        store.set_cv_data(sample_cv());
        store.set_theme(Theme::Dark);
        store.set_selected_template("minimal".to_string());

        store.reset();
        assert!(store.cv_data().is_none());
        assert!(store.theme().is_none());
        assert!(store.selected_template().is_none());

        // Resetting again leaves state identical to one reset.
        store.reset();
        assert!(store.cv_data().is_none());
        assert!(store.theme().is_none());
    }

    #[test]
    fn test_merge_patch_preserves_untouched_keys() {
        let store = AppStore::in_memory();
        store.set_portfolio_config(PortfolioConfig {
            color_scheme: "blue".to_string(),
            included_sections: vec!["about".to_string(), "skills".to_string()],
            ..PortfolioConfig::default()
        });

        store.merge_portfolio_config(PortfolioConfigPatch {
            color_scheme: Some("green".to_string()),
            ..PortfolioConfigPatch::default()
        });

        let config = store.portfolio_config().unwrap();
        assert_eq!(config.color_scheme, "green");
        assert_eq!(
            config.included_sections,
            vec!["about".to_string(), "skills".to_string()]
        );
    }

    #[test]
    fn test_merge_into_empty_slot_starts_from_defaults() {
        let store = AppStore::in_memory();
        store.merge_portfolio_config(PortfolioConfigPatch {
            color_scheme: Some("green".to_string()),
            ..PortfolioConfigPatch::default()
        });

        let config = store.portfolio_config().unwrap();
        assert_eq!(config.color_scheme, "green");
        assert!(!config.included_sections.is_empty());
    }

    #[test]
    fn test_persisted_slots_survive_a_restart() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");

        let store = AppStore::new(Arc::new(JsonFileStorage::new(path.clone())));
        let cv = sample_cv();
        store.set_cv_data(cv.clone());
        store.set_theme(Theme::Dark);
        store.set_analysis(CvAnalysis {
            cv_id: cv.cv_id,
            overall_score: 72,
            strengths: vec![],
            improvements: vec![],
            suggested_roles: vec![],
        });
        drop(store);

        let reloaded = AppStore::new(Arc::new(JsonFileStorage::new(path)));
        assert_eq!(reloaded.cv_data(), Some(cv));
        assert_eq!(reloaded.theme(), Some(Theme::Dark));
        // Analysis is not in the persisted partition.
        assert!(reloaded.analysis().is_none());
    }

    #[test]
    fn test_storage_failure_never_reaches_the_caller() {
        struct BrokenStorage;
        impl StateStorage for BrokenStorage {
            fn load(&self) -> Result<Option<PersistedState>> {
                anyhow::bail!("disk on fire")
            }
            fn save(&self, _state: &PersistedState) -> Result<()> {
                anyhow::bail!("disk on fire")
            }
        }

        let store = AppStore::new(Arc::new(BrokenStorage));
        store.set_theme(Theme::Light); // must not panic or error
        assert_eq!(store.theme(), Some(Theme::Light));
    }

    #[test]
    fn test_missing_state_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = AppStore::new(Arc::new(JsonFileStorage::new(dir.path().join("none.json"))));
        assert!(store.cv_data().is_none());
    }
}
