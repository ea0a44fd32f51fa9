use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

const PASSWORD_SPECIALS: &str = "!@#$%^&*(),.?\":{}|<>";

fn validate_password(password: &str) -> Result<(), ValidationError> {
    let rule = |code: &'static str, message: &'static str| {
        let mut err = ValidationError::new(code);
        err.message = Some(message.into());
        err
    };

    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(rule(
            "digit",
            "The password must contain at least one numeric digit.",
        ));
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        return Err(rule(
            "uppercase",
            "The password must contain at least one uppercase letter.",
        ));
    }
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        return Err(rule(
            "lowercase",
            "The password must contain at least one lowercase letter.",
        ));
    }
    if !password.chars().any(|c| PASSWORD_SPECIALS.contains(c)) {
        return Err(rule(
            "special",
            "The password must contain at least one special character (e.g., !@#$%^&*).",
        ));
    }
    Ok(())
}

#[derive(Validate, Debug, Default, Clone, Serialize, Deserialize)]
pub struct AuthRequestDto {
    #[validate(
        length(min = 1, message = "Email is required"),
        email(
            message = "The provided email address is invalid. Please ensure it is properly formatted."
        )
    )]
    pub email: String,
    #[validate(
        length(min = 8, message = "Password must be at least 8 characters"),
        custom(function = "validate_password")
    )]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct TokenData {
    pub access_token: String,
}
