//! Output sinks.
//!
//! A [`ConfigSink`] receives one finished, self-contained command sequence per
//! router. It is the hand-off point to whatever delivers configuration to
//! devices (a CLI pusher, a startup-config mapper); the compiler itself only
//! knows router names and text.

use crate::error::CompileError;
use log::info;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Extension of generated configuration files
pub const CONFIG_EXTENSION: &str = "cfg";

/// Receiver of generated router configurations
pub trait ConfigSink {
    fn deliver(&mut self, router: &str, text: &str) -> Result<(), CompileError>;
}

/// Writes `<router>.cfg` files into a directory
#[derive(Debug)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    /// Create the sink, creating the directory if needed
    pub fn create(dir: &Path) -> Result<Self, CompileError> {
        fs::create_dir_all(dir)?;
        Ok(Self { dir: dir.to_path_buf() })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file a router's configuration is written to
    pub fn path_for(&self, router: &str) -> PathBuf {
        self.dir.join(format!("{}.{}", router, CONFIG_EXTENSION))
    }
}

impl ConfigSink for DirectorySink {
    fn deliver(&mut self, router: &str, text: &str) -> Result<(), CompileError> {
        let path = self.path_for(router);
        fs::write(&path, text)?;
        info!("Wrote configuration of {} to {:?}", router, path);
        Ok(())
    }
}

/// Writes every configuration to one stream, one after the other
#[derive(Debug)]
pub struct StreamSink<W: Write> {
    out: W,
}

impl<W: Write> StreamSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> ConfigSink for StreamSink<W> {
    fn deliver(&mut self, _router: &str, text: &str) -> Result<(), CompileError> {
        self.out.write_all(text.as_bytes())?;
        self.out.flush()?;
        Ok(())
    }
}

/// Keeps delivered configurations in memory, in delivery order
#[derive(Debug, Default)]
pub struct MemorySink {
    pub delivered: Vec<(String, String)>,
}

impl ConfigSink for MemorySink {
    fn deliver(&mut self, router: &str, text: &str) -> Result<(), CompileError> {
        self.delivered.push((router.to_string(), text.to_string()));
        Ok(())
    }
}
