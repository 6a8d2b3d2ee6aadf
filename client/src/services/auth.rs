//! Authentication and account settings

use serde_json::json;
use tracing::info;

use crate::api::ApiClient;
use crate::models::user::{AuthResponse, LoginRequest, PasswordChange, ProfileUpdate, RegisterRequest};
use crate::models::User;
use crate::utils::error::{ApiError, ApiResult};
use crate::utils::validation::{is_blank, is_valid_email};

const MIN_PASSWORD_LEN: usize = 8;

/// Logs in and stores the returned token.
pub async fn login(client: &ApiClient, email: &str, password: &str) -> ApiResult<User> {
    if !is_valid_email(email) {
        return Err(ApiError::validation("Please enter a valid email address"));
    }
    if password.is_empty() {
        return Err(ApiError::validation("Password is required"));
    }

    let body = LoginRequest {
        email: email.trim().to_string(),
        password: password.to_string(),
    };
    let auth: AuthResponse = client.post("/auth/login", &body).await?;
    client.set_token(&auth.token);
    info!(user_id = %auth.user.id, "Logged in");
    Ok(auth.user)
}

pub async fn register(client: &ApiClient, request: RegisterRequest) -> ApiResult<User> {
    if is_blank(&request.name) || is_blank(&request.username) {
        return Err(ApiError::validation("Name and username are required"));
    }
    if !is_valid_email(&request.email) {
        return Err(ApiError::validation("Please enter a valid email address"));
    }
    check_password(&request.password)?;

    let auth: AuthResponse = client.post("/auth/register", &request).await?;
    client.set_token(&auth.token);
    info!(user_id = %auth.user.id, "Registered");
    Ok(auth.user)
}

/// Clears the local session. The server call is best effort: the token is
/// dropped even if it fails.
pub async fn logout(client: &ApiClient) {
    if client.is_authenticated() {
        if let Err(e) = client.post_unit("/auth/logout", &json!({})).await {
            tracing::debug!(error = %e, "Logout request failed; clearing token anyway");
        }
    }
    client.clear_token();
}

pub async fn current_user(client: &ApiClient) -> ApiResult<User> {
    client.get("/auth/me").await
}

pub async fn forgot_password(client: &ApiClient, email: &str) -> ApiResult<()> {
    if !is_valid_email(email) {
        return Err(ApiError::validation("Please enter a valid email address"));
    }
    client
        .post_unit("/auth/forgot-password", &json!({ "email": email.trim() }))
        .await
}

pub async fn reset_password(client: &ApiClient, token: &str, new_password: &str) -> ApiResult<()> {
    check_password(new_password)?;
    client
        .post_unit(
            "/auth/reset-password",
            &json!({ "token": token, "password": new_password }),
        )
        .await
}

pub async fn update_profile(client: &ApiClient, update: &ProfileUpdate) -> ApiResult<User> {
    if update.name.as_deref().is_some_and(is_blank) || update.username.as_deref().is_some_and(is_blank) {
        return Err(ApiError::validation("Name and username cannot be empty"));
    }
    client.patch("/users/me", update).await
}

pub async fn change_password(client: &ApiClient, change: &PasswordChange) -> ApiResult<()> {
    check_password(&change.new_password)?;
    if change.current_password == change.new_password {
        return Err(ApiError::validation(
            "New password must differ from the current one",
        ));
    }
    client.post_unit("/users/me/password", change).await
}

/// Deletes the account and ends the session.
pub async fn delete_account(client: &ApiClient) -> ApiResult<()> {
    client.delete("/users/me").await?;
    client.clear_token();
    Ok(())
}

fn check_password(password: &str) -> ApiResult<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ApiError::validation(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }
    Ok(())
}
