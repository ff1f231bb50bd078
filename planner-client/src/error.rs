use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// Failure of a single API call.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("server returned {status}: {message}")]
    Api {
        status: u16,
        code: Option<String>,
        message: String,
    },
    #[error("invalid API URL: {0}")]
    InvalidUrl(String),
    #[error("not logged in")]
    NotAuthenticated,
}

/// What went wrong, from the user's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Network,
    Validation,
    InvalidCredentials,
    SessionExpired,
    Unauthorized,
    Forbidden,
    NotFound,
    Conflict,
    Unprocessable,
    RateLimited,
    Server,
    Unknown,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Ko,
}

impl FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" | "en-us" | "en_us" => Ok(Self::En),
            "ko" | "ko-kr" | "ko_kr" => Ok(Self::Ko),
            other => Err(format!("unsupported locale: {other}")),
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::En => f.write_str("en"),
            Self::Ko => f.write_str("ko"),
        }
    }
}

impl ClientError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Transport(_) | Self::InvalidUrl(_) => ErrorKind::Network,
            Self::NotAuthenticated => ErrorKind::Unauthorized,
            Self::Api { status, code, .. } => classify(*status, code.as_deref()),
        }
    }

    /// True when the stored session should be discarded and the user sent
    /// back to login.
    pub fn requires_login(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::SessionExpired | ErrorKind::Unauthorized
        )
    }

    pub fn user_message(&self, locale: Locale) -> String {
        let kind = self.kind();
        let base = match locale {
            Locale::En => english(kind),
            Locale::Ko => korean(kind),
        };

        match (kind, self) {
            (ErrorKind::Validation | ErrorKind::Conflict, Self::Api { message, .. })
                if !message.is_empty() =>
            {
                format!("{base} ({message})")
            }
            _ => base.to_string(),
        }
    }
}

fn classify(status: u16, code: Option<&str>) -> ErrorKind {
    match (status, code) {
        (401, Some("INVALID_CREDENTIALS")) => ErrorKind::InvalidCredentials,
        (401, Some("TOKEN_EXPIRED")) => ErrorKind::SessionExpired,
        (400, _) => ErrorKind::Validation,
        (401, _) => ErrorKind::Unauthorized,
        (403, _) => ErrorKind::Forbidden,
        (404, _) => ErrorKind::NotFound,
        (409, _) => ErrorKind::Conflict,
        (422, _) => ErrorKind::Unprocessable,
        (429, _) => ErrorKind::RateLimited,
        (500..=599, _) => ErrorKind::Server,
        _ => ErrorKind::Unknown,
    }
}

fn english(kind: ErrorKind) -> &'static str {
    match kind {
        ErrorKind::Network => "Could not reach the server. Check your connection.",
        ErrorKind::Validation => "Some of the input is invalid.",
        ErrorKind::InvalidCredentials => "Invalid username or password.",
        ErrorKind::SessionExpired => "Your session has expired. Please log in again.",
        ErrorKind::Unauthorized => "You need to log in first.",
        ErrorKind::Forbidden => "You are not allowed to do that.",
        ErrorKind::NotFound => "The requested item was not found.",
        ErrorKind::Conflict => "That item already exists.",
        ErrorKind::Unprocessable => "The request could not be processed.",
        ErrorKind::RateLimited => "Too many requests. Try again later.",
        ErrorKind::Server => "The server ran into a problem. Try again later.",
        ErrorKind::Unknown => "Something went wrong.",
    }
}

fn korean(kind: ErrorKind) -> &'static str {
    match kind {
        ErrorKind::Network => "서버에 연결할 수 없습니다. 네트워크 상태를 확인하세요.",
        ErrorKind::Validation => "입력값이 올바르지 않습니다.",
        ErrorKind::InvalidCredentials => "아이디 또는 비밀번호가 올바르지 않습니다.",
        ErrorKind::SessionExpired => "세션이 만료되었습니다. 다시 로그인하세요.",
        ErrorKind::Unauthorized => "로그인이 필요합니다.",
        ErrorKind::Forbidden => "권한이 없습니다.",
        ErrorKind::NotFound => "요청한 항목을 찾을 수 없습니다.",
        ErrorKind::Conflict => "이미 존재하는 항목입니다.",
        ErrorKind::Unprocessable => "요청을 처리할 수 없습니다.",
        ErrorKind::RateLimited => "요청이 너무 많습니다. 잠시 후 다시 시도하세요.",
        ErrorKind::Server => "서버 오류가 발생했습니다. 잠시 후 다시 시도하세요.",
        ErrorKind::Unknown => "알 수 없는 오류가 발생했습니다.",
    }
}
