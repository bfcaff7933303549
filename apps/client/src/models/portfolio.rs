use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioTemplate {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub preview_url: Option<String>,
}

/// Rendering options for a generated portfolio site.
///
/// This is the one composite slot in the client store: updates arrive as a
/// `PortfolioConfigPatch` and merge one level deep — a field present in the
/// patch replaces its counterpart, absent fields are preserved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioConfig {
    pub template_id: Option<String>,
    pub color_scheme: String,
    pub font_family: String,
    pub included_sections: Vec<String>,
    pub custom_domain: Option<String>,
}

impl Default for PortfolioConfig {
    fn default() -> Self {
        Self {
            template_id: None,
            color_scheme: "blue".to_string(),
            font_family: "Inter".to_string(),
            included_sections: vec![
                "about".to_string(),
                "experience".to_string(),
                "projects".to_string(),
                "skills".to_string(),
                "contact".to_string(),
            ],
            custom_domain: None,
        }
    }
}

impl PortfolioConfig {
    /// One-level merge: `{...previous, ...patch}`.
    pub fn apply(&mut self, patch: PortfolioConfigPatch) {
        if let Some(template_id) = patch.template_id {
            self.template_id = Some(template_id);
        }
        if let Some(color_scheme) = patch.color_scheme {
            self.color_scheme = color_scheme;
        }
        if let Some(font_family) = patch.font_family {
            self.font_family = font_family;
        }
        if let Some(included_sections) = patch.included_sections {
            self.included_sections = included_sections;
        }
        if let Some(custom_domain) = patch.custom_domain {
            self.custom_domain = Some(custom_domain);
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PortfolioConfigPatch {
    pub template_id: Option<String>,
    pub color_scheme: Option<String>,
    pub font_family: Option<String>,
    pub included_sections: Option<Vec<String>>,
    pub custom_domain: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioSite {
    pub portfolio_id: Uuid,
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioPreview {
    pub preview_url: String,
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeployResult {
    pub url: String,
    pub deployed_at: DateTime<Utc>,
}

/// Display theme. Persisted across sessions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    System,
    Light,
    Dark,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patch_overwrites_only_present_fields() {
        let mut config = PortfolioConfig {
            color_scheme: "blue".to_string(),
            included_sections: vec!["about".to_string(), "projects".to_string()],
            ..PortfolioConfig::default()
        };

        config.apply(PortfolioConfigPatch {
            color_scheme: Some("green".to_string()),
            ..PortfolioConfigPatch::default()
        });

        assert_eq!(config.color_scheme, "green");
        assert_eq!(
            config.included_sections,
            vec!["about".to_string(), "projects".to_string()]
        );
    }

    #[test]
    fn test_empty_patch_changes_nothing() {
        let mut config = PortfolioConfig::default();
        let before = config.clone();
        config.apply(PortfolioConfigPatch::default());
        assert_eq!(config, before);
    }
}
