use crate::shared::error::AppError;

pub const MIN_PASSWORD_LENGTH: usize = 8;

pub fn validate_credentials(email: &str, password: &str) -> Result<(), AppError> {
    if email.trim().is_empty() {
        return Err(AppError::validation("Email is required"));
    }
    if !email.contains('@') {
        return Err(AppError::validation("Email address is not valid"));
    }
    if password.is_empty() {
        return Err(AppError::validation("Password is required"));
    }
    Ok(())
}

pub fn validate_new_password(current: &str, new: &str, confirm: &str) -> Result<(), AppError> {
    if new.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AppError::validation(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    if new != confirm {
        return Err(AppError::validation("Passwords do not match"));
    }
    if new == current {
        return Err(AppError::validation(
            "New password must differ from the current one",
        ));
    }
    Ok(())
}

pub fn validate_latitude(value: f64) -> Result<(), AppError> {
    if !value.is_finite() || !(-90.0..=90.0).contains(&value) {
        return Err(AppError::validation(format!(
            "Latitude {value} is out of range [-90, 90]"
        )));
    }
    Ok(())
}

pub fn validate_longitude(value: f64) -> Result<(), AppError> {
    if !value.is_finite() || !(-180.0..=180.0).contains(&value) {
        return Err(AppError::validation(format!(
            "Longitude {value} is out of range [-180, 180]"
        )));
    }
    Ok(())
}

pub fn require_non_empty(field: &str, value: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::validation(format!("{field} is required")));
    }
    Ok(())
}
