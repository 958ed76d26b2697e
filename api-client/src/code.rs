//! Backend return codes (`header.rtcd`).

use std::fmt;

/// Return code carried in the envelope header.
///
/// `S00` is the only success value. Unrecognised codes are preserved in
/// [`ResponseCode::Unknown`] so they can still be logged verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ResponseCode {
    Success,
    LoginRequired,
    ValidationError,
    BusinessError,
    EntityNotFound,
    UpdateFailed,
    WithdrawFailed,
    UserNotFound,
    UserAlreadyExists,
    InvalidPassword,
    NicknameAlreadyExists,
    BizRegNoAlreadyExists,
    LoginFailed,
    AccessDenied,
    ServerError,
    InternalServerError,
    Unknown(String),
}

impl ResponseCode {
    /// The success sentinel.
    pub const SUCCESS: &'static str = "S00";

    /// Exact match; `" S00 "` is not the success sentinel.
    pub fn parse(rtcd: &str) -> Self {
        match rtcd {
            "S00" => Self::Success,
            "A01" => Self::LoginRequired,
            "E01" => Self::ValidationError,
            "E02" => Self::BusinessError,
            "E03" => Self::EntityNotFound,
            "E04" => Self::UpdateFailed,
            "E05" => Self::WithdrawFailed,
            "U01" => Self::UserNotFound,
            "U02" => Self::UserAlreadyExists,
            "U03" => Self::InvalidPassword,
            "U04" => Self::NicknameAlreadyExists,
            "U05" => Self::BizRegNoAlreadyExists,
            "U06" => Self::LoginFailed,
            "A02" => Self::AccessDenied,
            "S01" => Self::ServerError,
            "999" => Self::InternalServerError,
            other => Self::Unknown(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Success => Self::SUCCESS,
            Self::LoginRequired => "A01",
            Self::ValidationError => "E01",
            Self::BusinessError => "E02",
            Self::EntityNotFound => "E03",
            Self::UpdateFailed => "E04",
            Self::WithdrawFailed => "E05",
            Self::UserNotFound => "U01",
            Self::UserAlreadyExists => "U02",
            Self::InvalidPassword => "U03",
            Self::NicknameAlreadyExists => "U04",
            Self::BizRegNoAlreadyExists => "U05",
            Self::LoginFailed => "U06",
            Self::AccessDenied => "A02",
            Self::ServerError => "S01",
            Self::InternalServerError => "999",
            Self::Unknown(code) => code,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }

    /// Message the server pairs with this code when it omits `rtmsg`.
    pub fn default_message(&self) -> Option<&'static str> {
        let message = match self {
            Self::Success => "Success",
            Self::LoginRequired => "Login required",
            Self::ValidationError => "Validation error occurred",
            Self::BusinessError => "Business error occurred",
            Self::EntityNotFound => "Entity not found",
            Self::UpdateFailed => "Update failed",
            Self::WithdrawFailed => "Withdraw failed",
            Self::UserNotFound => "User not found",
            Self::UserAlreadyExists => "User already exists",
            Self::InvalidPassword => "Invalid password",
            Self::NicknameAlreadyExists => "Nickname already exists",
            Self::BizRegNoAlreadyExists => "Business registration number already exists",
            Self::LoginFailed => "Login failed",
            Self::AccessDenied => "Access denied",
            Self::ServerError => "Server error",
            Self::InternalServerError => "Internal server error",
            Self::Unknown(_) => return None,
        };
        Some(message)
    }
}

impl fmt::Display for ResponseCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
