//! Login and registration form validation.
//!
//! Messages are the user-facing Vietnamese strings shown under each field.
//! Validation reports at most one error per field, in field order.

#[cfg(test)]
#[path = "validate_test.rs"]
mod validate_test;

pub const MIN_PASSWORD_LEN: usize = 8;

pub const EMAIL_REQUIRED: &str = "Email là bắt buộc";
pub const EMAIL_INVALID: &str = "Email chưa đúng";
pub const PASSWORD_REQUIRED: &str = "Mật khẩu là bắt buộc";
pub const PASSWORD_TOO_SHORT: &str = "Mật khẩu phải có ít nhất 8 ký tự";
pub const CONFIRM_REQUIRED: &str = "Xác nhận mật khẩu là bắt buộc";
pub const CONFIRM_MISMATCH: &str = "Xác nhận mật khẩu phải trùng với mật khẩu";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Field {
    Email,
    Password,
    ConfirmPassword,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldError {
    pub field: Field,
    pub message: &'static str,
}

impl FieldError {
    fn new(field: Field, message: &'static str) -> Self {
        Self { field, message }
    }
}

/// Loose address check: `local@domain.tld`, no whitespace, any TLD.
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && domain.split('.').all(|label| !label.is_empty())
}

fn check_email(email: &str) -> Option<FieldError> {
    let email = email.trim();
    if email.is_empty() {
        Some(FieldError::new(Field::Email, EMAIL_REQUIRED))
    } else if !is_valid_email(email) {
        Some(FieldError::new(Field::Email, EMAIL_INVALID))
    } else {
        None
    }
}

fn check_password(password: &str) -> Option<FieldError> {
    if password.is_empty() {
        Some(FieldError::new(Field::Password, PASSWORD_REQUIRED))
    } else if password.chars().count() < MIN_PASSWORD_LEN {
        Some(FieldError::new(Field::Password, PASSWORD_TOO_SHORT))
    } else {
        None
    }
}

/// Validate the login form.
pub fn validate_login(email: &str, password: &str) -> Vec<FieldError> {
    [check_email(email), check_password(password)].into_iter().flatten().collect()
}

/// Validate the registration form.
pub fn validate_register(email: &str, password: &str, confirm_password: &str) -> Vec<FieldError> {
    let confirm = if confirm_password.is_empty() {
        Some(FieldError::new(Field::ConfirmPassword, CONFIRM_REQUIRED))
    } else if confirm_password != password {
        Some(FieldError::new(Field::ConfirmPassword, CONFIRM_MISMATCH))
    } else {
        None
    };
    [check_email(email), check_password(password), confirm].into_iter().flatten().collect()
}
