//! Frame sinks
//!
//! A sink receives each finished frame and tells the loop when the viewer
//! has gone away. Closing is a normal way for a session to end.

use crate::render::Frame;
use log::debug;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SinkError {
    #[error("Failed to create output directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write frame {path}: {source}")]
    Write {
        path: PathBuf,
        source: image::ImageError,
    },
}

/// Consumer of rendered frames
pub trait DisplaySink {
    /// Show one frame
    fn present(&mut self, frame: Frame) -> Result<(), SinkError>;

    /// Whether the viewer asked to stop
    fn poll_closed(&mut self) -> bool;
}

/// Writes every frame as `frame_NNNNN.png` into a directory
pub struct PngSequenceSink {
    dir: PathBuf,
    written: usize,
    max_frames: Option<usize>,
}

impl PngSequenceSink {
    /// # Arguments
    /// * `dir` - Output directory, created if missing
    /// * `max_frames` - Report closed after this many frames
    pub fn new<P: AsRef<Path>>(dir: P, max_frames: Option<usize>) -> Result<Self, SinkError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir).map_err(|source| SinkError::CreateDir {
            path: dir.clone(),
            source,
        })?;

        Ok(Self {
            dir,
            written: 0,
            max_frames,
        })
    }

    pub fn frames_written(&self) -> usize {
        self.written
    }

    fn frame_path(&self, index: usize) -> PathBuf {
        self.dir.join(format!("frame_{:05}.png", index))
    }
}

impl DisplaySink for PngSequenceSink {
    fn present(&mut self, frame: Frame) -> Result<(), SinkError> {
        let path = self.frame_path(self.written);
        frame
            .to_image()
            .save(&path)
            .map_err(|source| SinkError::Write {
                path: path.clone(),
                source,
            })?;

        debug!("wrote {}", path.display());
        self.written += 1;
        Ok(())
    }

    fn poll_closed(&mut self) -> bool {
        self.max_frames.is_some_and(|max| self.written >= max)
    }
}

/// Keeps presented frames in memory
#[derive(Default)]
pub struct MemorySink {
    frames: Vec<Frame>,
    close_after: Option<usize>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sink that reports closed once `count` frames have been presented
    pub fn closing_after(count: usize) -> Self {
        Self {
            frames: Vec::new(),
            close_after: Some(count),
        }
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn into_frames(self) -> Vec<Frame> {
        self.frames
    }
}

impl DisplaySink for MemorySink {
    fn present(&mut self, frame: Frame) -> Result<(), SinkError> {
        self.frames.push(frame);
        Ok(())
    }

    fn poll_closed(&mut self) -> bool {
        self.close_after.is_some_and(|n| self.frames.len() >= n)
    }
}
