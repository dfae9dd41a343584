//! A logged in user: credentials, the tracked working directory and the
//! remote operations built on a [`Transport`].
//!
//! Operations never return errors to the caller. Failures are logged with a
//! diagnostic and collapse to `false`, `0` or a sentinel string, so a single
//! bad command never ends the session.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Cursor, ErrorKind, Read};
use std::path::Path;

use log::{debug, error, info};

use crate::listing::{self, FileEntry};
use crate::path::{self, ROOT};
use crate::transport::{Request, Transport};
use crate::types::{Credentials, FtpError, Result};

/// Host used by the `?` test login.
pub const DEFAULT_HOST: &str = "pigs.land";
/// Username used by the `?` test login.
pub const DEFAULT_USERNAME: &str = "agile_ftp";
/// Password used by the `?` test login.
pub const DEFAULT_PASSWORD: &str = "gilmore";

/// What [`FtpSession::list_files`] returns when the listing fails.
pub const LIST_FAILED: &str = "could not list files from remote host";

/// One login against one server.
#[derive(Debug)]
pub struct FtpSession<T> {
    transport: T,
    host: String,
    credentials: Credentials,
    cwd: String,
}

impl<T: Transport> FtpSession<T> {
    /// Creates a session starting at the server root. Nothing is sent until
    /// the first operation.
    pub fn new<H, U, P>(transport: T, host: H, username: U, password: P) -> FtpSession<T>
    where
        H: Into<String>,
        U: Into<String>,
        P: Into<String>,
    {
        FtpSession {
            transport,
            host: host.into(),
            credentials: Credentials::new(username, password),
            cwd: ROOT.to_owned(),
        }
    }

    /// Creates a session with the built-in test login.
    pub fn with_defaults(transport: T) -> FtpSession<T> {
        FtpSession::new(transport, DEFAULT_HOST, DEFAULT_USERNAME, DEFAULT_PASSWORD)
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn username(&self) -> &str {
        &self.credentials.username
    }

    /// The tracked remote working directory, always ending with `/`.
    pub fn cwd(&self) -> &str {
        &self.cwd
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    fn resolve(&self, token: &str) -> String {
        path::resolve(token, &self.cwd)
    }

    // Splits the borrow so the transport can be used with a request built
    // from the other fields.
    fn call<R, F>(&mut self, target: &str, op: F) -> Result<R>
    where
        F: FnOnce(&mut T, &Request) -> Result<R>,
    {
        let req = Request {
            host: &self.host,
            credentials: &self.credentials,
            path: target,
        };
        op(&mut self.transport, &req)
    }

    /// Checks the credentials with a name listing of the working directory.
    pub fn validate(&mut self) -> bool {
        let target = self.resolve("");
        match self.call(&target, |t, req| t.name_list(req)) {
            Ok(names) => {
                debug!("logged in to {}, {} names in {}", self.host, names.len(), target);
                true
            }
            Err(err) => {
                error!("{}", err);
                false
            }
        }
    }

    /// Moves the working directory. Purely local: the server is not asked
    /// whether the directory exists.
    pub fn change_directory(&mut self, dir: &str) -> bool {
        self.cwd = path::with_trailing_separator(self.resolve(dir));
        debug!("cwd is now {}", self.cwd);
        true
    }

    /// Uploads `local_path` to `remote_dir/filename`.
    ///
    /// A local directory is recreated remotely and its children uploaded
    /// depth first. The walk stops at the first failure, including a remote
    /// directory that already exists. `remote_dir` is used as given.
    pub fn upload(&mut self, filename: &str, remote_dir: &str, local_path: &str) -> bool {
        match self.upload_tree(filename, remote_dir, Path::new(local_path)) {
            Ok(()) => true,
            Err(err) => {
                error!("Error: {}", err);
                false
            }
        }
    }

    fn upload_tree(&mut self, filename: &str, remote_dir: &str, local: &Path) -> Result<()> {
        let target = path::join(remote_dir, filename);
        let metadata = fs::metadata(local).map_err(FtpError::Local)?;
        if !metadata.is_dir() {
            return self.upload_file(&target, local);
        }

        self.call(&target, |t, req| t.make_directory(req))?;
        info!("created remote directory {}", target);

        let mut children = Vec::new();
        for entry in fs::read_dir(local).map_err(FtpError::Local)? {
            children.push(entry.map_err(FtpError::Local)?.path());
        }
        children.sort();

        for child in children {
            let name = child
                .file_name()
                .and_then(|name| name.to_str())
                .map(str::to_owned)
                .ok_or_else(|| {
                    FtpError::Local(io::Error::new(
                        ErrorKind::InvalidData,
                        format!("{} is not valid UTF-8", child.display()),
                    ))
                })?;
            self.upload_tree(&name, &target, &child)?;
        }
        Ok(())
    }

    // The remote size is taken as the number of bytes already uploaded and
    // only the rest of the local file is sent, appended to the remote file.
    // A remote file longer than the local one cannot be a partial upload.
    fn upload_file(&mut self, target: &str, local: &Path) -> Result<()> {
        let offset = self
            .call(target, |t, req| t.file_size(req))
            .unwrap_or(0);

        let mut buffer = Vec::new();
        File::open(local)
            .and_then(|mut file| file.read_to_end(&mut buffer))
            .map_err(FtpError::Local)?;

        let start = offset as usize;
        if start > buffer.len() {
            return Err(FtpError::Local(io::Error::new(
                ErrorKind::InvalidInput,
                format!(
                    "remote file {} is larger than local file {} ({} > {} bytes)",
                    target,
                    local.display(),
                    start,
                    buffer.len()
                ),
            )));
        }
        let mut rest = Cursor::new(&buffer[start..]);
        let sent = if start == 0 {
            self.call(target, |t, req| t.store(req, &mut rest))?
        } else {
            debug!("{} already holds {} bytes, appending the rest", target, start);
            self.call(target, |t, req| t.append(req, &mut rest))?
        };
        info!("uploaded {} ({} bytes) to {}", local.display(), sent, target);
        Ok(())
    }

    /// Downloads `remote_dir/filename` into `local_dir/filename`.
    ///
    /// An existing local file is treated as a partial download: it is opened
    /// for append and the transfer restarts at its current length.
    pub fn download(&mut self, filename: &str, remote_dir: &str, local_dir: &str) -> bool {
        let target = path::join(remote_dir, filename);
        let local = Path::new(local_dir).join(filename);

        let opened = match fs::metadata(&local) {
            Ok(metadata) => OpenOptions::new()
                .append(true)
                .open(&local)
                .map(|file| (file, metadata.len())),
            Err(_) => File::create(&local).map(|file| (file, 0)),
        };
        let (mut file, offset) = match opened {
            Ok(opened) => opened,
            Err(ref err) if err.kind() == ErrorKind::NotFound => {
                error!("Local Directory Not Found");
                return false;
            }
            Err(err) => {
                error!("Local file {} unavailable: {}", local.display(), err);
                return false;
            }
        };

        match self.call(&target, |t, req| t.retrieve(req, offset, &mut file)) {
            Ok(copied) => {
                info!(
                    "Successfully Downloaded {} to {} ({} bytes from offset {})",
                    filename, local_dir, copied, offset
                );
                true
            }
            Err(FtpError::InvalidResponse(msg)) => {
                error!("Remote Path Not Found: {}", msg);
                false
            }
            Err(FtpError::Local(err)) => {
                error!("Local write failed: {}", err);
                false
            }
            Err(err) => {
                error!("File Unavailable (e.g. File Not Found, No Access): {}", err);
                false
            }
        }
    }

    /// Renames `remote_dir/old_name` to `remote_dir/new_name`.
    pub fn rename(&mut self, new_name: &str, old_name: &str, remote_dir: &str) -> bool {
        let dir = self.resolve(remote_dir);
        let from = format!("{}{}", dir, old_name);
        let to = format!("{}{}", dir, new_name);
        match self.call(&from, |t, req| t.rename(req, &to)) {
            Ok(()) => {
                info!("Successfully Renamed {} to {}", old_name, new_name);
                true
            }
            Err(err) => unavailable(err),
        }
    }

    /// Deletes `remote_dir/filename`.
    pub fn delete(&mut self, filename: &str, remote_dir: &str) -> bool {
        let target = format!("{}{}", self.resolve(remote_dir), filename);
        match self.call(&target, |t, req| t.delete_file(req)) {
            Ok(()) => {
                info!("Successfully removed {}", filename);
                true
            }
            Err(err) => unavailable(err),
        }
    }

    /// Removes an empty remote directory.
    pub fn delete_directory(&mut self, remote_dir: &str) -> bool {
        let target = self.resolve(remote_dir);
        match self.call(&target, |t, req| t.remove_directory(req)) {
            Ok(()) => {
                info!("Successfully removed {}", remote_dir);
                true
            }
            Err(err) => unavailable(err),
        }
    }

    pub fn make_directory(&mut self, remote_path: &str) -> bool {
        let target = self.resolve(remote_path);
        match self.call(&target, |t, req| t.make_directory(req)) {
            Ok(()) => true,
            Err(err) => {
                error!("could not create {}: {}", target, err);
                false
            }
        }
    }

    /// Size in bytes of a remote file, `0` if it cannot be determined.
    pub fn file_size(&mut self, remote_path: &str) -> u64 {
        let target = self.resolve(remote_path);
        self.call(&target, |t, req| t.file_size(req))
            .unwrap_or_else(|err| {
                debug!("SIZE {} failed: {}", target, err);
                0
            })
    }

    /// The raw `LIST` output for `remote_path`, or [`LIST_FAILED`].
    pub fn list_files(&mut self, remote_path: &str) -> String {
        self.list_raw(remote_path).unwrap_or_else(|err| {
            error!("{}", err);
            LIST_FAILED.to_owned()
        })
    }

    /// The parsed listing for `remote_path`.
    pub fn list_entries(&mut self, remote_path: &str) -> Result<Vec<FileEntry>> {
        self.list_raw(remote_path).map(|raw| listing::parse(&raw))
    }

    fn list_raw(&mut self, remote_path: &str) -> Result<String> {
        let target = self.resolve(remote_path);
        self.call(&target, |t, req| t.list_details(req))
    }
}

fn unavailable(err: FtpError) -> bool {
    error!("File Unavailable (e.g. File Not Found, No Access): {}", err);
    false
}
