//! Shared error and credential types

use std::fmt;
use std::io;

use thiserror::Error;

/// A shorthand for a Result whose error type is always an FtpError.
pub type Result<T> = ::std::result::Result<T, FtpError>;

/// `FtpError` is a library-global error type to describe the different kinds of
/// errors that might occur while talking to the server or the console.
#[derive(Debug, Error)]
pub enum FtpError {
    /// The control or data connection could not be established or broke down.
    #[error("FTP ConnectionError: {0}")]
    Connection(#[source] io::Error),
    /// The server refused the credentials.
    #[error("FTP AuthenticationError: {0}")]
    Authentication(String),
    /// The remote file or directory does not exist, or is not accessible.
    #[error("FTP NotFound: {0}")]
    NotFound(String),
    /// Any other negative reply from the server.
    #[error("FTP Unavailable: {0}")]
    Unavailable(String),
    /// The server replied with something we could not interpret.
    #[error("FTP InvalidResponse: {0}")]
    InvalidResponse(String),
    /// A local file or directory could not be read or written.
    #[error("Local IoError: {0}")]
    Local(#[source] io::Error),
    /// Reading from or writing to the console failed.
    #[error("Console IoError: {0}")]
    Io(#[from] io::Error),
}

/// Username and password presented on every request.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new<U: Into<String>, P: Into<String>>(username: U, password: P) -> Credentials {
        Credentials {
            username: username.into(),
            password: password.into(),
        }
    }
}

// Keep the password out of debug logs.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"********")
            .finish()
    }
}
