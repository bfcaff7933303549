use crate::errors::ApiError;
use crate::http::transport::Method;
use crate::http::{ApiClient, Call};
use crate::models::{AuthResponse, LoginRequest, RegisterRequest, UserProfile};

pub async fn register(
    client: &ApiClient,
    request: &RegisterRequest,
) -> Result<AuthResponse, ApiError> {
    client.post_typed("users/register", request).await
}

pub async fn login(client: &ApiClient, request: &LoginRequest) -> Result<AuthResponse, ApiError> {
    client.post_typed("users/login", request).await
}

/// Fetches the authenticated profile. Session management lives with the
/// caller; the token is passed per call.
pub async fn profile(client: &ApiClient, token: &str) -> Result<UserProfile, ApiError> {
    client
        .send(
            Call::new(Method::Get, "users/profile")
                .with_header("Authorization", &format!("Bearer {token}")),
        )
        .await?
        .into_typed()
}
