// File: ./src/context.rs
//! Where the courier keeps its files.
//!
//! Anything that touches disk takes a `&dyn AppContext`. The CLI and the
//! mobile binding use `StandardContext`; tests use a throwaway `TestContext`.
use anyhow::{Context, Result};
use directories::ProjectDirs;
use std::fs;
use std::path::{Path, PathBuf};

pub trait AppContext: Send + Sync + std::fmt::Debug {
    fn get_config_dir(&self) -> Result<PathBuf>;
    fn get_cache_dir(&self) -> Result<PathBuf>;

    fn get_config_file_path(&self) -> Result<PathBuf> {
        Ok(self.get_config_dir()?.join("config.toml"))
    }

    /// `None` when the cache dir cannot be created; logging then stays on stderr.
    fn get_log_path(&self) -> Option<PathBuf> {
        self.get_cache_dir().ok().map(|p| p.join("courier.log"))
    }
}

fn make_dir(path: PathBuf) -> Result<PathBuf> {
    fs::create_dir_all(&path).with_context(|| format!("Cannot create {}", path.display()))?;
    Ok(path)
}

/// Platform directories, or `config/` and `cache/` under an explicit root
/// (`--root` on the CLI, the app files dir on Android).
#[derive(Clone, Debug, Default)]
pub struct StandardContext {
    root: Option<PathBuf>,
}

impl StandardContext {
    pub fn new(root: Option<PathBuf>) -> Self {
        Self { root }
    }

    fn resolve(&self, sub: &str, platform: fn(&ProjectDirs) -> &Path) -> Result<PathBuf> {
        let dir = match &self.root {
            Some(root) => root.join(sub),
            None => {
                let dirs = ProjectDirs::from("com", "courier", "courier")
                    .context("Cannot resolve a home directory")?;
                platform(&dirs).to_path_buf()
            }
        };
        make_dir(dir)
    }
}

impl AppContext for StandardContext {
    fn get_config_dir(&self) -> Result<PathBuf> {
        self.resolve("config", ProjectDirs::config_dir)
    }

    fn get_cache_dir(&self) -> Result<PathBuf> {
        self.resolve("cache", ProjectDirs::cache_dir)
    }
}

/// A `StandardContext` rooted in a fresh temp directory, deleted on drop.
#[derive(Debug)]
pub struct TestContext {
    root: PathBuf,
    inner: StandardContext,
}

impl TestContext {
    pub fn new() -> Self {
        let root =
            std::env::temp_dir().join(format!("courier-ctx-{}", uuid::Uuid::new_v4().simple()));
        Self {
            inner: StandardContext::new(Some(root.clone())),
            root,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

impl AppContext for TestContext {
    fn get_config_dir(&self) -> Result<PathBuf> {
        self.inner.get_config_dir()
    }

    fn get_cache_dir(&self) -> Result<PathBuf> {
        self.inner.get_cache_dir()
    }
}

impl Drop for TestContext {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.root);
    }
}
