//! # Script Registry
//!
//! Scripts are opaque, host-loadable units of behavior code. The core
//! validates that each declared script file exists and that its id is
//! unique within a game type, resolves which engine would run it from the
//! file extension, and otherwise never looks inside. Execution belongs to
//! the host's script engine, behind the [`ScriptCallable`] capability.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::{GameError, Result};

/// Engines this core knows how to hand scripts to. Resolution is by file
/// extension only; the engine itself lives on the host side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptEngine {
    Groovy,
    JavaScript,
}

impl ScriptEngine {
    pub fn from_extension(ext: &str) -> Option<ScriptEngine> {
        match ext.to_ascii_lowercase().as_str() {
            "groovy" | "gvy" => Some(ScriptEngine::Groovy),
            "js" => Some(ScriptEngine::JavaScript),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ScriptEngine::Groovy => "groovy",
            ScriptEngine::JavaScript => "javascript",
        }
    }
}

/// One resolved script resource. Content is never interpreted here.
#[derive(Debug, Clone)]
pub struct Script {
    pub id: String,
    pub path: PathBuf,
    pub engine: ScriptEngine,
}

impl Script {
    /// Resolve a declared script to a loadable resource.
    ///
    /// A missing file is fatal (`FaultyConfiguration`); a permission
    /// failure is a wrapped I/O error; an unsupported extension is
    /// `ScriptEngineNotFound`, which callers downgrade to a warning.
    /// The file check runs first so a missing script is always fatal even
    /// when its extension is also unknown.
    pub async fn resolve(id: &str, path: &Path) -> Result<Script> {
        match tokio::fs::metadata(path).await {
            Ok(meta) if meta.is_file() => {}
            Ok(_) => {
                return Err(GameError::faulty(format!(
                    "script path is not a file: {}",
                    path.display()
                )))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(GameError::faulty(format!(
                    "unable to locate the script: {}",
                    path.display()
                )))
            }
            Err(e) => return Err(GameError::io(path, e)),
        }

        let engine = path
            .extension()
            .and_then(|e| e.to_str())
            .and_then(ScriptEngine::from_extension)
            .ok_or_else(|| GameError::ScriptEngineNotFound {
                path: path.to_path_buf(),
            })?;

        Ok(Script {
            id: id.to_string(),
            path: path.to_path_buf(),
            engine,
        })
    }
}

/// Capability the host's engine implements to run a loaded script. The
/// core passes scripts through this seam and never depends on a concrete
/// engine type.
pub trait ScriptCallable: Send + Sync {
    /// Invoke the named hook inside the script.
    fn call(&self, hook: &str) -> Result<()>;
}

/// Scripts of one resource bundle, keyed by id.
#[derive(Debug, Clone, Default)]
pub struct ScriptRegistry {
    scripts: HashMap<String, Script>,
}

impl ScriptRegistry {
    pub fn get(&self, id: &str) -> Option<&Script> {
        self.scripts.get(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.scripts.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.scripts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scripts.is_empty()
    }

    /// Register a resolved script. Duplicate ids are a configuration
    /// error, not a silent overwrite.
    pub(crate) fn insert(&mut self, script: Script) -> Result<()> {
        if self.scripts.contains_key(&script.id) {
            return Err(GameError::faulty(format!(
                "duplicate script id '{}'",
                script.id
            )));
        }
        self.scripts.insert(script.id.clone(), script);
        Ok(())
    }
}
