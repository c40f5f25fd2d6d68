//! Sprite loading and caching
//!
//! Sprites are plain text files: one row per line, any non-space character
//! is an opaque pixel and spaces are transparent. A missing sprite is a hard
//! failure at load time.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::error::{GameError, Result};

/// A decoded sprite
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    pub width: usize,
    pub height: usize,
    rows: Vec<Vec<char>>,
}

impl Image {
    /// Parse sprite text; `None` when there is nothing visible
    pub fn parse(text: &str) -> Option<Self> {
        let mut rows: Vec<Vec<char>> = text
            .lines()
            .map(|line| line.trim_end_matches('\r').chars().collect())
            .collect();

        while rows
            .last()
            .is_some_and(|row| row.iter().all(|c| *c == ' '))
        {
            rows.pop();
        }
        if rows.is_empty() {
            return None;
        }

        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        for row in &mut rows {
            row.resize(width, ' ');
        }
        Some(Self {
            width,
            height: rows.len(),
            rows,
        })
    }

    /// Pixel at (x, y); `None` for transparent or out of range
    pub fn pixel(&self, x: usize, y: usize) -> Option<char> {
        self.rows
            .get(y)
            .and_then(|row| row.get(x))
            .copied()
            .filter(|c| *c != ' ')
    }

    /// Any opaque pixel inside the normalized region `[u0, u1) x [v0, v1)`
    ///
    /// Used when a sprite is drawn smaller than its pixel size.
    pub fn covers(&self, u0: f32, v0: f32, u1: f32, v1: f32) -> bool {
        let span = |a: f32, b: f32, n: usize| {
            let start = (a.clamp(0.0, 1.0) * n as f32).floor() as usize;
            let end = (b.clamp(0.0, 1.0) * n as f32).ceil() as usize;
            start.min(n.saturating_sub(1))..end.max(start + 1).min(n)
        };
        let xs = span(u0, u1, self.width);
        span(v0, v1, self.height)
            .any(|y| xs.clone().any(|x| self.pixel(x, y).is_some()))
    }
}

/// Loads sprites from a root directory, keeping each one after first use
#[derive(Debug)]
pub struct Assets {
    root: PathBuf,
    cache: HashMap<String, Rc<Image>>,
}

impl Assets {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            cache: HashMap::new(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Load (or fetch from cache) the sprite at `path`, relative to the root
    pub fn load_image(&mut self, path: &str) -> Result<Rc<Image>> {
        if let Some(image) = self.cache.get(path) {
            return Ok(Rc::clone(image));
        }

        let full = self.root.join(path);
        let text = std::fs::read_to_string(&full).map_err(|e| GameError::asset(&full, e))?;
        let image = Rc::new(Image::parse(&text).ok_or_else(|| GameError::EmptySprite(full.clone()))?);
        log::debug!(
            "Loaded sprite {} ({}x{})",
            full.display(),
            image.width,
            image.height
        );

        self.cache.insert(path.to_owned(), Rc::clone(&image));
        Ok(image)
    }

    /// Load every frame of an animation, in order
    pub fn load_frames(&mut self, paths: &[&str]) -> Result<Vec<Rc<Image>>> {
        paths.iter().map(|path| self.load_image(path)).collect()
    }

    pub fn cached(&self) -> usize {
        self.cache.len()
    }
}
