//! Auth and account REST calls.
//!
//! Each method is one verb + path against the backend. Paths are built by
//! small pure helpers so they can be checked without a transport.
//!
//! ERROR HANDLING
//! ==============
//! Every call returns `Result<_, ApiError>`. Calls whose UI shows the
//! backend's message code (register, password flows) return the whole
//! [`Envelope`]; the rest return only `data`.

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;

use serde_json::Value;

use super::http::{ApiClient, ApiError};
use super::transport::{Method, Transport};
use super::types::{
    Account, AccountInfo, AccountUpdate, AuthTokens, ChangePasswordRequest, DeleteAccountRequest, Envelope,
    ForgotPasswordRequest, LoginRequest, RefreshTokenRequest, RegisterRequest, UpgradeToFarmerRequest,
    UpgradeToFarmerResponse, VerifyForgotPasswordRequest,
};

const LOGIN_PATH: &str = "/login";
const REGISTER_PATH: &str = "/register";
const REFRESH_TOKEN_PATH: &str = "/refresh-token";
const LOGOUT_PATH: &str = "/logout";
const CHANGE_PASSWORD_PATH: &str = "/change-password";
const FORGOT_PASSWORD_PATH: &str = "/forgot-password";
const VERIFY_FORGOT_PASSWORD_PATH: &str = "/forgot-password/verify";
const INFO_PATH: &str = "/info";
const ACCOUNTS_PATH: &str = "/accounts";

fn accounts_endpoint(suffix: &str) -> String {
    format!("{ACCOUNTS_PATH}{suffix}")
}

impl<T: Transport> ApiClient<T> {
    // =========================================================================
    // AUTH
    // =========================================================================

    /// `POST /auth/login`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on failure (`auth-e-02`/`auth-e-04` for bad credentials).
    pub async fn login(&self, body: &LoginRequest) -> Result<AuthTokens, ApiError> {
        let request = self.request_json(Method::Post, self.config().auth_url(LOGIN_PATH), body)?;
        self.data(request).await
    }

    /// `POST /auth/register`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on failure.
    pub async fn register(&self, body: &RegisterRequest) -> Result<Envelope<Value>, ApiError> {
        let request = self.request_json(Method::Post, self.config().auth_url(REGISTER_PATH), body)?;
        self.envelope(request).await
    }

    /// `POST /auth/refresh-token`: exchange the refresh token for a new pair.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on failure.
    pub async fn refresh_token(&self, refresh_token: &str) -> Result<AuthTokens, ApiError> {
        let body = RefreshTokenRequest { refresh_token: refresh_token.to_owned() };
        let request = self.request_json(Method::Post, self.config().auth_url(REFRESH_TOKEN_PATH), &body)?;
        self.data(request).await
    }

    /// `POST /auth/logout`: revoke the refresh token server-side.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on failure.
    pub async fn logout(&self, refresh_token: &str) -> Result<(), ApiError> {
        let body = RefreshTokenRequest { refresh_token: refresh_token.to_owned() };
        let request = self.request_json(Method::Post, self.config().auth_url(LOGOUT_PATH), &body)?;
        self.execute(request).await.map(|_| ())
    }

    /// `POST /auth/change-password`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on failure (`auth-e-07` for a wrong current password).
    pub async fn change_password(&self, body: &ChangePasswordRequest) -> Result<Envelope<Value>, ApiError> {
        let request = self.request_json(Method::Post, self.config().auth_url(CHANGE_PASSWORD_PATH), body)?;
        self.envelope(request).await
    }

    /// `POST /auth/forgot-password`: email a reset code.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on failure.
    pub async fn forgot_password(&self, email: &str) -> Result<Envelope<Value>, ApiError> {
        let body = ForgotPasswordRequest { email: email.to_owned() };
        let request = self.request_json(Method::Post, self.config().auth_url(FORGOT_PASSWORD_PATH), &body)?;
        self.envelope(request).await
    }

    /// `POST /auth/forgot-password/verify`: set a new password and sign in.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on failure (`auth-e-05` for an unknown code).
    pub async fn verify_forgot_password(
        &self,
        body: &VerifyForgotPasswordRequest,
    ) -> Result<Envelope<AuthTokens>, ApiError> {
        let request = self.request_json(Method::Post, self.config().auth_url(VERIFY_FORGOT_PASSWORD_PATH), body)?;
        self.envelope(request).await
    }

    /// `GET /auth/info`: the signed-in user's profile and roles.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on failure.
    pub async fn account_info(&self) -> Result<AccountInfo, ApiError> {
        let request = self.request(Method::Get, self.config().auth_url(INFO_PATH));
        self.data(request).await
    }

    // =========================================================================
    // ACCOUNTS
    // =========================================================================

    /// `GET /api/accounts`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on failure.
    pub async fn get_account(&self) -> Result<Account, ApiError> {
        let request = self.request(Method::Get, self.config().api_url(ACCOUNTS_PATH));
        self.data(request).await
    }

    /// `PUT /api/accounts`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on failure.
    pub async fn update_account(&self, body: &AccountUpdate) -> Result<Account, ApiError> {
        let request = self.request_json(Method::Put, self.config().api_url(ACCOUNTS_PATH), body)?;
        self.data(request).await
    }

    /// `PATCH /api/accounts`. Unset fields are left unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on failure.
    pub async fn patch_account(&self, body: &AccountUpdate) -> Result<Account, ApiError> {
        let request = self.request_json(Method::Patch, self.config().api_url(ACCOUNTS_PATH), body)?;
        self.data(request).await
    }

    /// `DELETE /api/accounts`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on failure.
    pub async fn delete_account(&self, id: &str) -> Result<Envelope<Value>, ApiError> {
        let body = DeleteAccountRequest { id: id.to_owned() };
        let request = self.request_json(Method::Delete, self.config().api_url(ACCOUNTS_PATH), &body)?;
        self.envelope(request).await
    }

    /// `POST /api/accounts/upgradeToFarmer`. The response carries a fresh
    /// token pair with the `FARMER` role.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on failure.
    pub async fn upgrade_to_farmer(&self, body: &UpgradeToFarmerRequest) -> Result<UpgradeToFarmerResponse, ApiError> {
        let url = self.config().api_url(&accounts_endpoint("/upgradeToFarmer"));
        let request = self.request_json(Method::Post, url, body)?;
        self.data(request).await
    }

    /// `GET /api/accounts/all` (admin only).
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on failure.
    pub async fn all_accounts(&self) -> Result<Vec<Account>, ApiError> {
        let request = self.request(Method::Get, self.config().api_url(&accounts_endpoint("/all")));
        self.data::<Option<Vec<Account>>>(request).await.map(Option::unwrap_or_default)
    }
}
