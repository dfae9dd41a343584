//! The request/response primitives a session is built on.
//!
//! [`Transport`] exposes one method per FTP verb. Every call carries a
//! [`Request`] with everything needed to authenticate, so implementations are
//! free to open a fresh control connection per call, which is what
//! [`FtpTransport`] does.

use std::io::{ErrorKind, Read, Write};
use std::net::Ipv6Addr;

use log::{debug, trace};
use suppaftp::types::FileType;
use suppaftp::FtpStream;

use crate::status;
use crate::types::{Credentials, FtpError, Result};

/// Size of the buffer used when copying a download to disk.
pub const CHUNK_SIZE: usize = 1024;

/// Default FTP control port.
pub const DEFAULT_PORT: u16 = 21;

/// Target and identity of a single remote operation.
#[derive(Debug, Clone, Copy)]
pub struct Request<'a> {
    pub host: &'a str,
    pub credentials: &'a Credentials,
    pub path: &'a str,
}

/// Request/response primitives, one per FTP verb.
pub trait Transport {
    /// `NLST`: names only.
    fn name_list(&mut self, req: &Request) -> Result<Vec<String>>;

    /// `LIST`: the raw detailed listing, rows separated by `\n`.
    fn list_details(&mut self, req: &Request) -> Result<String>;

    /// `STOR`: replaces the remote file with `data`.
    fn store(&mut self, req: &Request, data: &mut dyn Read) -> Result<u64>;

    /// `APPE`: appends `data` to the remote file.
    fn append(&mut self, req: &Request, data: &mut dyn Read) -> Result<u64>;

    /// `RETR`, preceded by `REST offset` when `offset` is not zero. The
    /// content is written to `sink` and the number of bytes copied returned.
    fn retrieve(&mut self, req: &Request, offset: u64, sink: &mut dyn Write) -> Result<u64>;

    /// `RNFR req.path` / `RNTO to`.
    fn rename(&mut self, req: &Request, to: &str) -> Result<()>;

    /// `DELE`.
    fn delete_file(&mut self, req: &Request) -> Result<()>;

    /// `RMD`.
    fn remove_directory(&mut self, req: &Request) -> Result<()>;

    /// `MKD`.
    fn make_directory(&mut self, req: &Request) -> Result<()>;

    /// `SIZE`.
    fn file_size(&mut self, req: &Request) -> Result<u64>;
}

/// Copies `src` into `dst` through a fixed size buffer until `src` is
/// exhausted. Read failures are connection errors, write failures are local.
pub fn copy_chunked(src: &mut dyn Read, dst: &mut dyn Write) -> Result<u64> {
    let mut buffer = [0u8; CHUNK_SIZE];
    let mut copied = 0u64;
    loop {
        let read = match src.read(&mut buffer) {
            Ok(0) => break,
            Ok(read) => read,
            Err(ref err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(FtpError::Connection(err)),
        };
        dst.write_all(&buffer[..read]).map_err(FtpError::Local)?;
        copied += read as u64;
    }
    dst.flush().map_err(FtpError::Local)?;
    Ok(copied)
}

/// [`Transport`] backed by a real FTP server.
///
/// Each call connects, logs in, switches to binary mode, runs its verb and
/// quits.
#[derive(Debug, Clone)]
pub struct FtpTransport {
    port: u16,
}

impl Default for FtpTransport {
    fn default() -> FtpTransport {
        FtpTransport::new(DEFAULT_PORT)
    }
}

impl FtpTransport {
    /// Uses `port` for hosts given without an explicit `host:port`.
    pub fn new(port: u16) -> FtpTransport {
        FtpTransport { port }
    }

    // Accepts `host`, `host:port`, `[v6]`, `[v6]:port` and bare IPv6
    // literals such as `::1`.
    fn address(&self, host: &str) -> String {
        if host.parse::<Ipv6Addr>().is_ok() {
            format!("[{}]:{}", host, self.port)
        } else if host.starts_with('[') {
            if host.contains("]:") {
                host.to_owned()
            } else {
                format!("{}:{}", host, self.port)
            }
        } else if host.contains(':') {
            host.to_owned()
        } else {
            format!("{}:{}", host, self.port)
        }
    }

    fn open(&self, req: &Request) -> Result<FtpStream> {
        let addr = self.address(req.host);
        debug!("connecting to {} as {}", addr, req.credentials.username);
        let mut stream = FtpStream::connect(addr.as_str()).map_err(from_suppaftp)?;
        stream
            .login(
                req.credentials.username.as_str(),
                req.credentials.password.as_str(),
            )
            .map_err(from_suppaftp)?;
        stream
            .transfer_type(FileType::Binary)
            .map_err(from_suppaftp)?;
        Ok(stream)
    }

    fn with_stream<T, F>(&self, req: &Request, verb: &str, op: F) -> Result<T>
    where
        F: FnOnce(&mut FtpStream) -> Result<T>,
    {
        let mut stream = self.open(req)?;
        trace!("CMD {} {}", verb, req.path);
        let result = op(&mut stream);
        if let Err(err) = stream.quit() {
            debug!("QUIT after {} failed: {}", verb, err);
        }
        result
    }
}

fn from_suppaftp(err: suppaftp::FtpError) -> FtpError {
    match err {
        suppaftp::FtpError::ConnectionError(ioerr) => FtpError::Connection(ioerr),
        other => status::classify(other.to_string()),
    }
}

impl Transport for FtpTransport {
    fn name_list(&mut self, req: &Request) -> Result<Vec<String>> {
        self.with_stream(req, "NLST", |stream| {
            stream.nlst(Some(req.path)).map_err(from_suppaftp)
        })
    }

    fn list_details(&mut self, req: &Request) -> Result<String> {
        self.with_stream(req, "LIST", |stream| {
            stream
                .list(Some(req.path))
                .map(|lines| lines.join("\n"))
                .map_err(from_suppaftp)
        })
    }

    fn store(&mut self, req: &Request, mut data: &mut dyn Read) -> Result<u64> {
        self.with_stream(req, "STOR", |stream| {
            stream.put_file(req.path, &mut data).map_err(from_suppaftp)
        })
    }

    fn append(&mut self, req: &Request, mut data: &mut dyn Read) -> Result<u64> {
        self.with_stream(req, "APPE", |stream| {
            stream.append_file(req.path, &mut data).map_err(from_suppaftp)
        })
    }

    fn retrieve(&mut self, req: &Request, offset: u64, sink: &mut dyn Write) -> Result<u64> {
        self.with_stream(req, "RETR", |stream| {
            if offset > 0 {
                trace!("CMD REST {}", offset);
                stream
                    .resume_transfer(offset as usize)
                    .map_err(from_suppaftp)?;
            }
            let mut data = stream.retr_as_stream(req.path).map_err(from_suppaftp)?;
            let copied = copy_chunked(&mut data, sink)?;
            stream.finalize_retr_stream(data).map_err(from_suppaftp)?;
            Ok(copied)
        })
    }

    fn rename(&mut self, req: &Request, to: &str) -> Result<()> {
        self.with_stream(req, "RNFR", |stream| {
            stream.rename(req.path, to).map_err(from_suppaftp)
        })
    }

    fn delete_file(&mut self, req: &Request) -> Result<()> {
        self.with_stream(req, "DELE", |stream| {
            stream.rm(req.path).map_err(from_suppaftp)
        })
    }

    fn remove_directory(&mut self, req: &Request) -> Result<()> {
        self.with_stream(req, "RMD", |stream| {
            stream.rmdir(req.path).map_err(from_suppaftp)
        })
    }

    fn make_directory(&mut self, req: &Request) -> Result<()> {
        self.with_stream(req, "MKD", |stream| {
            stream.mkdir(req.path).map_err(from_suppaftp)
        })
    }

    fn file_size(&mut self, req: &Request) -> Result<u64> {
        self.with_stream(req, "SIZE", |stream| {
            stream
                .size(req.path)
                .map(|size| size as u64)
                .map_err(from_suppaftp)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{self, Cursor};

    struct FailingReader;

    impl Read for FailingReader {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::new(ErrorKind::ConnectionReset, "reset"))
        }
    }

    #[test]
    fn copies_in_chunks_until_exhausted() {
        let content: Vec<u8> = (0..(CHUNK_SIZE * 3 + 17)).map(|i| i as u8).collect();
        let mut src = Cursor::new(content.clone());
        let mut dst = Vec::new();
        assert_eq!(copy_chunked(&mut src, &mut dst).unwrap(), content.len() as u64);
        assert_eq!(dst, content);
    }

    #[test]
    fn read_failure_is_a_connection_error() {
        let mut dst = Vec::new();
        let err = copy_chunked(&mut FailingReader, &mut dst).unwrap_err();
        assert!(matches!(err, FtpError::Connection(_)));
    }

    #[test]
    fn address_uses_default_port() {
        let transport = FtpTransport::default();
        assert_eq!(transport.address("pigs.land"), "pigs.land:21");
        assert_eq!(FtpTransport::new(2121).address("pigs.land"), "pigs.land:2121");
        assert_eq!(transport.address("127.0.0.1:10021"), "127.0.0.1:10021");
    }

    #[test]
    fn address_handles_ipv6_literals() {
        let transport = FtpTransport::default();
        assert_eq!(transport.address("::1"), "[::1]:21");
        assert_eq!(transport.address("fe80::2"), "[fe80::2]:21");
        assert_eq!(transport.address("[::1]"), "[::1]:21");
        assert_eq!(transport.address("[::1]:2121"), "[::1]:2121");
    }
}
