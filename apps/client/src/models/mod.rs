pub mod analytics;
pub mod ats;
pub mod cv;
pub mod portfolio;
pub mod user;

pub use analytics::{EngagementStats, PerformanceReport, PortfolioMetrics, TrackEvent};
pub use ats::{AtsAnalysis, AtsOptimization, AtsResume, AtsTemplate};
pub use cv::{ContactInfo, CvAnalysis, CvData, CvUploadResponse, EducationEntry, ExperienceEntry};
pub use portfolio::{
    DeployResult, PortfolioConfig, PortfolioConfigPatch, PortfolioPreview, PortfolioSite,
    PortfolioTemplate, Theme,
};
pub use user::{AuthResponse, LoginRequest, RegisterRequest, UserProfile};
