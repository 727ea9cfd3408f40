//! ログイン・サインアップ・パスワード再設定・興味関心の各フォーム

use crate::scope::ViewScope;
use crate::ui::{Navigator, Notifier};
use crate::{lock, message_or, FormOutcome};
use forest_api::{ApiError, AuthApi};
use forest_core::{LoginRequest, SignupRequest};
use regex::Regex;
use std::sync::{Arc, Mutex, OnceLock};

const REQUIRED_FIELDS: &str = "Please fill in all required fields";
const MIN_INTERESTS: usize = 3;

pub const REGISTERED_BANNER: &str =
    "Please check your inbox for an activation email and activate your account before logging in.";

fn email_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$",
        )
        .expect("Invalid email regex")
    })
}

pub fn is_valid_email(email: &str) -> bool {
    email_regex().is_match(email.trim())
}

pub struct LoginForm {
    auth: Arc<dyn AuthApi>,
    notifier: Arc<dyn Notifier>,
    navigator: Arc<dyn Navigator>,
    scope: ViewScope,
    is_error: Mutex<bool>,
}

impl LoginForm {
    pub fn new(
        auth: Arc<dyn AuthApi>,
        notifier: Arc<dyn Notifier>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            auth,
            notifier,
            navigator,
            scope: ViewScope::new(),
            is_error: Mutex::new(false),
        }
    }

    /// `registered=true` で開かれた場合は、案内文を返す
    pub fn open(&self, registered: bool) -> Option<&'static str> {
        if registered {
            self.notifier.success("Signup Successful");
            Some(REGISTERED_BANNER)
        } else {
            None
        }
    }

    pub fn is_error(&self) -> bool {
        *lock(&self.is_error)
    }

    pub async fn submit(&self, username: &str, password: &str) -> FormOutcome {
        if username.trim().is_empty() || password.is_empty() {
            self.notifier.warning(REQUIRED_FIELDS);
            return FormOutcome::Invalid;
        }

        let req = LoginRequest {
            username: username.trim().to_string(),
            password: password.to_string(),
        };
        match self.scope.run(self.auth.login(&req)).await {
            Ok(()) => {
                *lock(&self.is_error) = false;
                self.notifier.success("Login Successful");
                self.navigator.navigate_by_url("/");
                FormOutcome::Submitted
            }
            Err(ApiError::Cancelled) => FormOutcome::Cancelled,
            Err(e) => {
                *lock(&self.is_error) = true;
                tracing::error!("Login error: {}", e);
                self.notifier.error("Invalid username or password");
                FormOutcome::Failed
            }
        }
    }
}

pub struct SignupForm {
    auth: Arc<dyn AuthApi>,
    notifier: Arc<dyn Notifier>,
    navigator: Arc<dyn Navigator>,
    scope: ViewScope,
}

impl SignupForm {
    pub fn new(
        auth: Arc<dyn AuthApi>,
        notifier: Arc<dyn Notifier>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            auth,
            notifier,
            navigator,
            scope: ViewScope::new(),
        }
    }

    pub async fn submit(&self, req: &SignupRequest) -> FormOutcome {
        if req.email.trim().is_empty() || req.username.trim().is_empty() || req.password.is_empty()
        {
            self.notifier.warning(REQUIRED_FIELDS);
            return FormOutcome::Invalid;
        }
        if !is_valid_email(&req.email) {
            self.notifier.warning("Please enter a valid email address.");
            return FormOutcome::Invalid;
        }
        if req.interests.len() < MIN_INTERESTS {
            self.notifier
                .warning(&format!("Please select at least {} interests.", MIN_INTERESTS));
            return FormOutcome::Invalid;
        }

        match self.scope.run(self.auth.signup(req)).await {
            Ok(body) => {
                tracing::info!("Registered {}: {}", req.username, body);
                self.navigator.navigate_by_url("/login?registered=true");
                FormOutcome::Submitted
            }
            Err(ApiError::Cancelled) => FormOutcome::Cancelled,
            Err(e) => {
                tracing::error!("Signup error: {}", e);
                self.notifier
                    .error(&message_or(&e, "Registration failed. Please try again."));
                FormOutcome::Failed
            }
        }
    }
}

pub struct ForgotPasswordForm {
    auth: Arc<dyn AuthApi>,
    notifier: Arc<dyn Notifier>,
    scope: ViewScope,
}

impl ForgotPasswordForm {
    pub fn new(auth: Arc<dyn AuthApi>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            auth,
            notifier,
            scope: ViewScope::new(),
        }
    }

    pub async fn submit(&self, email: &str) -> FormOutcome {
        if !is_valid_email(email) {
            self.notifier.warning("Please enter a valid email address.");
            return FormOutcome::Invalid;
        }

        match self.scope.run(self.auth.forgot_password(email.trim())).await {
            Ok(_) => {
                self.notifier.success("Password reset link sent to your email.");
                FormOutcome::Submitted
            }
            Err(ApiError::Cancelled) => FormOutcome::Cancelled,
            Err(e) => {
                tracing::error!("Forgot password failed: {}", e);
                self.notifier
                    .error("Failed to send password reset link. Please try again.");
                FormOutcome::Failed
            }
        }
    }
}

pub struct ResetPasswordForm {
    token: String,
    auth: Arc<dyn AuthApi>,
    notifier: Arc<dyn Notifier>,
    navigator: Arc<dyn Navigator>,
    scope: ViewScope,
}

impl ResetPasswordForm {
    /// `token` はリセットメールのリンク `/reset-password/:token` から渡される
    pub fn new(
        token: &str,
        auth: Arc<dyn AuthApi>,
        notifier: Arc<dyn Notifier>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            token: token.to_string(),
            auth,
            notifier,
            navigator,
            scope: ViewScope::new(),
        }
    }

    pub async fn submit(&self, password: &str, confirm_password: &str) -> FormOutcome {
        if password.is_empty() || confirm_password.is_empty() {
            self.notifier.warning(REQUIRED_FIELDS);
            return FormOutcome::Invalid;
        }
        if password != confirm_password {
            self.notifier.warning("Passwords do not match.");
            return FormOutcome::Invalid;
        }

        match self
            .scope
            .run(self.auth.reset_password(&self.token, password))
            .await
        {
            Ok(_) => {
                self.notifier.success(
                    "Password reset successfully. You can now log in with your new password.",
                );
                self.navigator.navigate_by_url("/login");
                FormOutcome::Submitted
            }
            Err(ApiError::Cancelled) => FormOutcome::Cancelled,
            Err(e) => {
                tracing::error!("Reset password failed: {}", e);
                self.notifier.error("Failed to reset password. Please try again.");
                FormOutcome::Failed
            }
        }
    }
}

pub struct InterestsForm {
    auth: Arc<dyn AuthApi>,
    notifier: Arc<dyn Notifier>,
    navigator: Arc<dyn Navigator>,
    scope: ViewScope,
    selected: Mutex<Vec<String>>,
}

impl InterestsForm {
    pub fn new(
        auth: Arc<dyn AuthApi>,
        notifier: Arc<dyn Notifier>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            auth,
            notifier,
            navigator,
            scope: ViewScope::new(),
            selected: Mutex::new(Vec::new()),
        }
    }

    pub fn catalogue(&self) -> &'static [&'static str] {
        &forest_core::INTEREST_CATALOGUE
    }

    /// 選択順を保ったまま付け外しする
    pub fn toggle(&self, interest: &str) {
        let mut selected = lock(&self.selected);
        if let Some(pos) = selected.iter().position(|i| i == interest) {
            selected.remove(pos);
        } else {
            selected.push(interest.to_string());
        }
    }

    pub fn selected(&self) -> Vec<String> {
        lock(&self.selected).clone()
    }

    pub async fn submit(&self) -> FormOutcome {
        let interests = self.selected();
        match self.scope.run(self.auth.save_interests(&interests)).await {
            Ok(_) => {
                self.notifier.success("Your interests have been saved.");
                self.navigator.navigate_by_url("/");
                FormOutcome::Submitted
            }
            Err(ApiError::Cancelled) => FormOutcome::Cancelled,
            Err(e) => {
                tracing::error!("Saving interests failed: {}", e);
                self.notifier.error("Failed to save interests. Please try again.");
                FormOutcome::Failed
            }
        }
    }
}
