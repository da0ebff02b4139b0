use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use crate::build::cast::CastConfig;
use crate::build::readiness::ReadinessThresholds;
use crate::foundation::error::{ReelError, ReelResult};
use crate::render::host::{HostConfig, OutputLayout};
use crate::render::scheduler::RenderThreading;
use crate::scene::state::SceneSettings;
use crate::timeline::lint::LintConfig;
use crate::timeline::map::{DEFAULT_SEGMENTS, Segment, TimelineMap};

/// Project-level configuration, read from a JSON file.
///
/// Every field has a default, so `{}` is a valid project.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    /// Project root; renders go under `{root}/renders/{category}`.
    pub root: PathBuf,
    /// Render category.
    pub category: String,
    /// External host settings.
    pub host: HostConfig,
    /// Worker pool size for parallel renders; `None` uses every CPU.
    pub threads: Option<usize>,
    /// JSON segment table replacing the built-in timeline.
    pub timeline_path: Option<PathBuf>,
    /// Linter settings.
    pub lint: LintConfig,
    /// Readiness oracle thresholds.
    pub readiness: ReadinessThresholds,
    /// Characters and props loaded by the build.
    pub cast: CastConfig,
    /// Scene-wide settings.
    pub scene: SceneSettings,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            category: "preview".to_string(),
            host: HostConfig::default(),
            threads: None,
            timeline_path: None,
            lint: LintConfig::default(),
            readiness: ReadinessThresholds::default(),
            cast: CastConfig::default(),
            scene: SceneSettings::default(),
        }
    }
}

impl ProjectConfig {
    /// Load configuration from a JSON file.
    ///
    /// A relative `timeline_path` is resolved against the directory holding the config file.
    pub fn from_path(path: impl AsRef<Path>) -> ReelResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            ReelError::validation(format!("open project config '{}': {e}", path.display()))
        })?;
        let mut cfg = Self::from_reader(BufReader::new(f))?;
        if let (Some(tl), Some(dir)) = (cfg.timeline_path.as_mut(), path.parent())
            && tl.is_relative()
        {
            *tl = dir.join(&*tl);
        }
        Ok(cfg)
    }

    /// Parse configuration JSON from `reader`.
    pub fn from_reader(reader: impl Read) -> ReelResult<Self> {
        serde_json::from_reader(reader).map_err(|e| ReelError::serde(format!("project config: {e}")))
    }

    /// The timeline this project builds against: the override table if set, else the built-in one.
    ///
    /// Either way the table passes the contiguity check before it is returned.
    pub fn timeline(&self) -> ReelResult<TimelineMap> {
        match &self.timeline_path {
            Some(p) => TimelineMap::from_path(p),
            None => TimelineMap::builtin(),
        }
    }

    /// The segment table as written, without the contiguity check.
    ///
    /// The linter reports contiguity problems instead of failing on the first one, so it starts
    /// from the raw table.
    pub fn raw_segments(&self) -> ReelResult<Vec<Segment>> {
        let Some(p) = &self.timeline_path else {
            return Ok(DEFAULT_SEGMENTS
                .iter()
                .map(|&(name, start, end)| Segment::new(name, start, end))
                .collect());
        };
        let f = File::open(p).map_err(|e| {
            ReelError::validation(format!("open timeline JSON '{}': {e}", p.display()))
        })?;
        serde_json::from_reader(BufReader::new(f))
            .map_err(|e| ReelError::serde(format!("timeline JSON: {e}")))
    }

    /// Where renders for this project are written.
    pub fn output_layout(&self) -> OutputLayout {
        OutputLayout {
            root: self.root.clone(),
            category: self.category.clone(),
        }
    }

    /// Threading settings for a render run.
    pub fn threading(&self, parallel: bool) -> RenderThreading {
        RenderThreading {
            parallel,
            threads: self.threads,
        }
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
