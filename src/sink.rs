//! Render sinks - the host surface playback repaints from.
//!
//! The playback core never decodes pixels itself. Each rendered frame or
//! opened stream turns into exactly one [`RenderSink::replace`] call; the sink
//! clears whatever it showed and installs the new content in one step.

use anyhow::{Context, Result};
use crossbeam_channel::Sender;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Placement of rendered content on the host surface
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Origin {
    pub left: i32,
    pub top: i32,
}

impl Origin {
    pub fn new(left: i32, top: i32) -> Self {
        Self { left, top }
    }
}

/// Content handed to a sink
#[derive(Debug, Clone, PartialEq)]
pub enum Drawable {
    /// Still frame `index` of a frame sequence
    Image {
        index: usize,
        path: PathBuf,
        origin: Origin,
    },
    /// Video surface bound to the media engine's current source
    Video { path: PathBuf, origin: Origin },
}

impl Drawable {
    pub fn path(&self) -> &Path {
        match self {
            Drawable::Image { path, .. } | Drawable::Video { path, .. } => path,
        }
    }

    pub fn origin(&self) -> Origin {
        match self {
            Drawable::Image { origin, .. } | Drawable::Video { origin, .. } => *origin,
        }
    }
}

/// Host-owned drawable surface.
///
/// `replace` must be all-or-nothing: on error the previous content stays.
pub trait RenderSink: Send {
    fn replace(&mut self, content: Drawable) -> Result<()>;
}

impl<F> RenderSink for F
where
    F: FnMut(Drawable) -> Result<()> + Send,
{
    fn replace(&mut self, content: Drawable) -> Result<()> {
        self(content)
    }
}

/// Forwards every drawable to a channel, for hosts that paint on another thread.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    sender: Sender<Drawable>,
}

impl ChannelSink {
    pub fn new(sender: Sender<Drawable>) -> Self {
        Self { sender }
    }
}

impl RenderSink for ChannelSink {
    fn replace(&mut self, content: Drawable) -> Result<()> {
        self.sender
            .send(content)
            .context("Render surface receiver dropped")
    }
}

/// Headless sink: reads image headers with the `image` crate and logs what
/// would be drawn. Used by the `reel` binary.
#[derive(Debug, Default)]
pub struct ProbeSink {
    current: Option<(Drawable, Option<(u32, u32)>)>,
    frames_drawn: usize,
}

impl ProbeSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Content currently on the surface with its pixel size (None for video)
    pub fn current(&self) -> Option<&(Drawable, Option<(u32, u32)>)> {
        self.current.as_ref()
    }

    pub fn frames_drawn(&self) -> usize {
        self.frames_drawn
    }
}

impl RenderSink for ProbeSink {
    fn replace(&mut self, content: Drawable) -> Result<()> {
        let size = match &content {
            Drawable::Image { index, path, origin } => {
                let (w, h) = image::image_dimensions(path)
                    .with_context(|| format!("Failed to read image header: {}", path.display()))?;
                info!(
                    "Frame {}: {} ({}x{}) at ({}, {})",
                    index,
                    path.display(),
                    w,
                    h,
                    origin.left,
                    origin.top
                );
                Some((w, h))
            }
            Drawable::Video { path, origin } => {
                info!(
                    "Video surface: {} at ({}, {})",
                    path.display(),
                    origin.left,
                    origin.top
                );
                None
            }
        };

        // Clear-then-add happens as one assignment
        self.current = Some((content, size));
        self.frames_drawn += 1;
        debug!("ProbeSink: {} frames drawn", self.frames_drawn);
        Ok(())
    }
}
