#![crate_name = "agileftp"]
#![crate_type = "lib"]

//! agileftp is an interactive FTP client.
//!
//! The library holds everything but the process entry point: path resolution
//! against a tracked remote directory, `LIST` parsing, a session running
//! remote operations over a pluggable [`Transport`], and the console
//! [`Shell`].
//!
//! ### Usage
//!
//! ```rust,no_run
//! use agileftp::{FtpSession, FtpTransport};
//!
//! let mut session = FtpSession::new(FtpTransport::default(), "127.0.0.1", "anonymous", "");
//! if session.validate() {
//!     session.change_directory("pub");
//!     println!("{}", session.list_files("."));
//! }
//! ```
//!

#[macro_use]
extern crate lazy_static;

pub mod dispatch;
pub mod listing;
pub mod path;
pub mod session;
pub mod status;
pub mod transport;
pub mod types;

pub use self::dispatch::{Command, CommandError, Flow, Shell};
pub use self::listing::{FileEntry, ListingError};
pub use self::session::FtpSession;
pub use self::transport::{FtpTransport, Request, Transport};
pub use self::types::{Credentials, FtpError, Result};
