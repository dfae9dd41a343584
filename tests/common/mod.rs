#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::io::{Read, Write};

use agileftp::{FtpError, Request, Result, Transport};

/// One recorded transport call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    NameList(String),
    ListDetails(String),
    Store(String, Vec<u8>),
    Append(String, Vec<u8>),
    Retrieve(String, u64),
    Rename(String, String),
    DeleteFile(String),
    RemoveDirectory(String),
    MakeDirectory(String),
    FileSize(String),
}

/// In-memory server.
#[derive(Debug, Default)]
pub struct FakeTransport {
    pub calls: Vec<Call>,
    pub reject_login: bool,
    pub listings: HashMap<String, String>,
    pub files: HashMap<String, Vec<u8>>,
    pub dirs: HashSet<String>,
    pub missing: HashSet<String>,
}

impl FakeTransport {
    pub fn new() -> FakeTransport {
        FakeTransport::default()
    }

    pub fn rejecting() -> FakeTransport {
        FakeTransport {
            reject_login: true,
            ..FakeTransport::default()
        }
    }

    pub fn with_file(mut self, path: &str, content: &[u8]) -> FakeTransport {
        self.files.insert(path.to_owned(), content.to_vec());
        self
    }

    pub fn with_listing(mut self, path: &str, raw: &str) -> FakeTransport {
        self.listings.insert(path.to_owned(), raw.to_owned());
        self
    }

    pub fn with_dir(mut self, path: &str) -> FakeTransport {
        self.dirs.insert(path.to_owned());
        self
    }

    pub fn with_missing(mut self, path: &str) -> FakeTransport {
        self.missing.insert(path.to_owned());
        self
    }

    fn check(&self, req: &Request) -> Result<()> {
        if self.reject_login {
            return Err(FtpError::Authentication("530 Login incorrect.".to_owned()));
        }
        if self.missing.contains(req.path) {
            return Err(FtpError::NotFound(format!("550 {}: No such file", req.path)));
        }
        Ok(())
    }
}

impl Transport for FakeTransport {
    fn name_list(&mut self, req: &Request) -> Result<Vec<String>> {
        self.calls.push(Call::NameList(req.path.to_owned()));
        self.check(req)?;
        Ok(self.files.keys().cloned().collect())
    }

    fn list_details(&mut self, req: &Request) -> Result<String> {
        self.calls.push(Call::ListDetails(req.path.to_owned()));
        self.check(req)?;
        self.listings
            .get(req.path)
            .cloned()
            .ok_or_else(|| FtpError::NotFound(format!("550 {}", req.path)))
    }

    fn store(&mut self, req: &Request, data: &mut dyn Read) -> Result<u64> {
        let mut content = Vec::new();
        data.read_to_end(&mut content).map_err(FtpError::Local)?;
        self.calls.push(Call::Store(req.path.to_owned(), content.clone()));
        self.check(req)?;
        let len = content.len() as u64;
        self.files.insert(req.path.to_owned(), content);
        Ok(len)
    }

    fn append(&mut self, req: &Request, data: &mut dyn Read) -> Result<u64> {
        let mut content = Vec::new();
        data.read_to_end(&mut content).map_err(FtpError::Local)?;
        self.calls.push(Call::Append(req.path.to_owned(), content.clone()));
        self.check(req)?;
        let len = content.len() as u64;
        self.files
            .entry(req.path.to_owned())
            .or_insert_with(Vec::new)
            .extend(content);
        Ok(len)
    }

    fn retrieve(&mut self, req: &Request, offset: u64, sink: &mut dyn Write) -> Result<u64> {
        self.calls.push(Call::Retrieve(req.path.to_owned(), offset));
        self.check(req)?;
        let content = self
            .files
            .get(req.path)
            .ok_or_else(|| FtpError::NotFound(format!("550 {}", req.path)))?;
        let rest = &content[(offset as usize).min(content.len())..];
        sink.write_all(rest).map_err(FtpError::Local)?;
        Ok(rest.len() as u64)
    }

    fn rename(&mut self, req: &Request, to: &str) -> Result<()> {
        self.calls.push(Call::Rename(req.path.to_owned(), to.to_owned()));
        self.check(req)
    }

    fn delete_file(&mut self, req: &Request) -> Result<()> {
        self.calls.push(Call::DeleteFile(req.path.to_owned()));
        self.check(req)
    }

    fn remove_directory(&mut self, req: &Request) -> Result<()> {
        self.calls.push(Call::RemoveDirectory(req.path.to_owned()));
        self.check(req)
    }

    fn make_directory(&mut self, req: &Request) -> Result<()> {
        self.calls.push(Call::MakeDirectory(req.path.to_owned()));
        self.check(req)?;
        if !self.dirs.insert(req.path.to_owned()) {
            return Err(FtpError::NotFound(format!("550 {}: File exists", req.path)));
        }
        Ok(())
    }

    fn file_size(&mut self, req: &Request) -> Result<u64> {
        self.calls.push(Call::FileSize(req.path.to_owned()));
        self.check(req)?;
        self.files
            .get(req.path)
            .map(|content| content.len() as u64)
            .ok_or_else(|| FtpError::NotFound(format!("550 {}", req.path)))
    }
}
