use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// ATS compatibility report for a CV, optionally against a job description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AtsAnalysis {
    pub cv_id: Uuid,
    /// 0 – 100
    pub score: u32,
    #[serde(default)]
    pub matched_keywords: Vec<String>,
    #[serde(default)]
    pub missing_keywords: Vec<String>,
    #[serde(default)]
    pub format_issues: Vec<String>,
    #[serde(default)]
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AtsOptimization {
    pub cv_id: Uuid,
    #[serde(default)]
    pub suggestions: Vec<String>,
    pub optimized_summary: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AtsTemplate {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
}

/// An ATS-friendly resume rendered by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AtsResume {
    pub resume_id: Uuid,
    pub download_url: String,
    pub generated_at: DateTime<Utc>,
}
