//! The interactive front end: login prompts and the `>` command loop.

use std::io::{BufRead, Write};
use std::path::Path;

use log::{info, warn};
use thiserror::Error;

use crate::listing;
use crate::session::{FtpSession, LIST_FAILED};
use crate::transport::Transport;
use crate::types::Result;

const HELP: &str = "\
cd <path>                 change the remote directory
ls                        list a remote directory
upload                    upload a local file or directory into the remote directory
download <file>           download a remote file into a local directory
rename <old> <new>        rename a remote file
rm <file>                 delete a remote file
mkdir <dir>               create a remote directory
rmdir <dir>               remove a remote directory
size <file>               print the size of a remote file
pwd                       print the remote directory
help                      print this text
exit                      leave";

const DOWNLOAD_PROMPT: &str = "Download into (Eg. /home/frank, empty for .): ";

/// Why a command line could not be turned into a [`Command`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("{0}: missing argument")]
    MissingArgument(&'static str),
    #[error("Command was not found.")]
    NotFound(String),
}

/// A parsed command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Cd(String),
    Upload,
    Ls,
    Download {
        file: String,
    },
    Rename {
        from: String,
        to: String,
    },
    Rm(String),
    Mkdir(String),
    Rmdir(String),
    Size(String),
    Pwd,
    Help,
    Exit,
}

impl Command {
    /// Parses one line of input.
    ///
    /// The line is lower-cased and split on single spaces, so `"cd  x"` has an
    /// empty first argument and remote paths lose their case. Local paths are
    /// asked for in follow-up prompts, which keep theirs.
    pub fn parse(line: &str) -> ::std::result::Result<Command, CommandError> {
        let line = line.to_lowercase();
        let args: Vec<&str> = line.split(' ').collect();
        let arg = |index: usize, name: &'static str| {
            args.get(index)
                .map(|value| value.to_string())
                .ok_or(CommandError::MissingArgument(name))
        };

        match args[0] {
            "cd" => Ok(Command::Cd(arg(1, "cd")?)),
            "upload" => Ok(Command::Upload),
            "ls" => Ok(Command::Ls),
            "download" => Ok(Command::Download {
                file: arg(1, "download")?,
            }),
            "rename" => Ok(Command::Rename {
                from: arg(1, "rename")?,
                to: arg(2, "rename")?,
            }),
            "rm" => Ok(Command::Rm(arg(1, "rm")?)),
            "mkdir" => Ok(Command::Mkdir(arg(1, "mkdir")?)),
            "rmdir" => Ok(Command::Rmdir(arg(1, "rmdir")?)),
            "size" => Ok(Command::Size(arg(1, "size")?)),
            "pwd" => Ok(Command::Pwd),
            "help" => Ok(Command::Help),
            "exit" | "quit" => Ok(Command::Exit),
            other => Err(CommandError::NotFound(other.to_owned())),
        }
    }
}

/// Whether the command loop keeps going.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// Console front end reading from `input` and writing prompts and results
/// to `output`.
pub struct Shell<R, W> {
    input: R,
    output: W,
    max_login_attempts: Option<u32>,
}

impl<R: BufRead, W: Write> Shell<R, W> {
    pub fn new(input: R, output: W) -> Shell<R, W> {
        Shell {
            input,
            output,
            max_login_attempts: None,
        }
    }

    /// Bounds the number of login attempts. Unbounded by default.
    pub fn max_login_attempts(mut self, limit: Option<u32>) -> Shell<R, W> {
        self.max_login_attempts = limit;
        self
    }

    pub fn into_output(self) -> W {
        self.output
    }

    /// Reads one line without its line terminator. `None` at end of input.
    fn read_line(&mut self) -> Result<Option<String>> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        let trimmed = line.trim_end_matches(&['\r', '\n'][..]).len();
        line.truncate(trimmed);
        Ok(Some(line))
    }

    fn prompt(&mut self, text: &str) -> Result<Option<String>> {
        write!(self.output, "{}", text)?;
        self.output.flush()?;
        self.read_line()
    }

    /// Prompts for a login until one validates.
    ///
    /// A hostname of `?` skips the username and password prompts and uses the
    /// built-in test login. Returns `None` if input ends first or the attempt
    /// limit is reached.
    pub fn login<T, F>(&mut self, mut transport: F) -> Result<Option<FtpSession<T>>>
    where
        T: Transport,
        F: FnMut() -> T,
    {
        let mut attempts = 0;
        loop {
            if let Some(limit) = self.max_login_attempts {
                if attempts >= limit {
                    writeln!(self.output, "Giving up after {} failed logins", attempts)?;
                    return Ok(None);
                }
            }
            attempts += 1;

            let host = match self.prompt("Enter hostname:")? {
                Some(host) => host,
                None => return Ok(None),
            };
            let (mut session, failure) = if host == "?" {
                (FtpSession::with_defaults(transport()), "Test Login Failed")
            } else {
                let username = match self.prompt("Enter username:")? {
                    Some(username) => username,
                    None => return Ok(None),
                };
                let password = match self.prompt("Enter password:")? {
                    Some(password) => password,
                    None => return Ok(None),
                };
                (
                    FtpSession::new(transport(), host, username, password),
                    "Login Failed",
                )
            };

            if session.validate() {
                info!("logged in to {} as {}", session.host(), session.username());
                return Ok(Some(session));
            }
            warn!("login attempt {} to {} failed", attempts, session.host());
            writeln!(self.output, "{}", failure)?;
        }
    }

    /// Runs the command loop until `exit` or end of input.
    pub fn run<T: Transport>(&mut self, session: &mut FtpSession<T>) -> Result<()> {
        loop {
            let line = match self.prompt(">")? {
                Some(line) => line,
                None => return Ok(()),
            };
            if self.execute(session, &line)? == Flow::Exit {
                return Ok(());
            }
        }
    }

    /// Parses and runs a single command line.
    pub fn execute<T: Transport>(
        &mut self,
        session: &mut FtpSession<T>,
        line: &str,
    ) -> Result<Flow> {
        match Command::parse(line) {
            Ok(command) => self.apply(session, command),
            Err(err) => {
                writeln!(self.output, "{}", err)?;
                Ok(Flow::Continue)
            }
        }
    }

    fn apply<T: Transport>(
        &mut self,
        session: &mut FtpSession<T>,
        command: Command,
    ) -> Result<Flow> {
        match command {
            Command::Cd(dir) => {
                session.change_directory(&dir);
            }
            Command::Upload => {
                let local = match self.prompt("File to upload (Eg. /home/frank/something.txt): ")? {
                    Some(local) => local,
                    None => return Ok(Flow::Exit),
                };
                let name = match Path::new(&local).file_name().and_then(|name| name.to_str()) {
                    Some(name) => name.to_owned(),
                    None => {
                        writeln!(self.output, "Nothing to upload in {:?}", local)?;
                        return Ok(Flow::Continue);
                    }
                };
                let remote_dir = transfer_dir(session.cwd()).to_owned();
                let ok = session.upload(&name, &remote_dir, &local);
                self.report(ok, &format!("Uploaded {}", name), "Upload failed")?;
            }
            Command::Ls => {
                writeln!(self.output, "Directory to list (Eg. /home)")?;
                let dir = match self.read_line()? {
                    Some(dir) => dir,
                    None => return Ok(Flow::Exit),
                };
                let raw = session.list_files(&format!("./{}", dir));
                if raw == LIST_FAILED {
                    writeln!(self.output, "{}", raw)?;
                } else {
                    for entry in listing::parse(&raw) {
                        writeln!(self.output, "{}", entry)?;
                    }
                }
            }
            Command::Download { file } => {
                let local_dir = match self.prompt(DOWNLOAD_PROMPT)? {
                    Some(dir) if dir.is_empty() => ".".to_owned(),
                    Some(dir) => dir,
                    None => return Ok(Flow::Exit),
                };
                let remote_dir = transfer_dir(session.cwd()).to_owned();
                let ok = session.download(&file, &remote_dir, &local_dir);
                let success = format!("Downloaded {} to {}", file, local_dir);
                self.report(ok, &success, "Download failed")?;
            }
            Command::Rename { from, to } => {
                let ok = session.rename(&to, &from, "");
                self.report(ok, &format!("Renamed {} to {}", from, to), "Rename failed")?;
            }
            Command::Rm(file) => {
                let ok = session.delete(&file, "");
                self.report(ok, &format!("Removed {}", file), "Delete failed")?;
            }
            Command::Mkdir(dir) => {
                let ok = session.make_directory(&dir);
                self.report(ok, &format!("Created {}", dir), "Could not create directory")?;
            }
            Command::Rmdir(dir) => {
                let ok = session.delete_directory(&dir);
                self.report(ok, &format!("Removed {}", dir), "Could not remove directory")?;
            }
            Command::Size(file) => {
                let size = session.file_size(&file);
                writeln!(self.output, "{} bytes", size)?;
            }
            Command::Pwd => writeln!(self.output, "{}", session.cwd())?,
            Command::Help => writeln!(self.output, "{}", HELP)?,
            Command::Exit => return Ok(Flow::Exit),
        }
        Ok(Flow::Continue)
    }

    fn report(&mut self, ok: bool, success: &str, failure: &str) -> Result<()> {
        let message = if ok { success } else { failure };
        writeln!(self.output, "{}", message)?;
        Ok(())
    }
}

// Transfers build their targets as `dir + "/" + name`.
fn transfer_dir(cwd: &str) -> &str {
    cwd.trim_end_matches('/')
}
