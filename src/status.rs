//! FTP reply codes and how negative replies map onto [`FtpError`].

use regex::Regex;

use crate::types::FtpError;

lazy_static! {
    // Reply codes show up as "550 ..." or "[550] ..." depending on how the
    // transport formats its errors.
    static ref REPLY_CODE_RE: Regex = Regex::new(r"\b([1-5]\d\d)\b").unwrap();
}

// 4xx: Transient Negative Completion Reply
pub const NOT_AVAILABLE: u32 = 421;
pub const CANNOT_OPEN_DATA_CONNECTION: u32 = 425;
pub const INVALID_CREDENTIALS: u32 = 430;
pub const REQUEST_FILE_ACTION_IGNORED: u32 = 450;

// 5xx: Permanent Negative Completion Reply
pub const NOT_LOGGED_IN: u32 = 530;
pub const FILE_UNAVAILABLE: u32 = 550;
pub const BAD_FILENAME: u32 = 553;

/// Finds the first reply code in a server message.
pub fn reply_code(message: &str) -> Option<u32> {
    REPLY_CODE_RE
        .captures(message)
        .and_then(|caps| caps[1].parse().ok())
}

/// Turns a negative server reply into the matching error kind.
pub fn classify(message: String) -> FtpError {
    match reply_code(&message) {
        Some(NOT_LOGGED_IN) | Some(INVALID_CREDENTIALS) => FtpError::Authentication(message),
        Some(FILE_UNAVAILABLE) | Some(REQUEST_FILE_ACTION_IGNORED) | Some(BAD_FILENAME) => {
            FtpError::NotFound(message)
        }
        Some(code) if code >= 400 => FtpError::Unavailable(message),
        _ => FtpError::InvalidResponse(message),
    }
}
