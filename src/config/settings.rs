//! Configuration settings for the Rikudo solver and generator

use crate::graph::{load_graph_from_file, Graph};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub graph: GraphConfig,
    pub puzzle: PuzzleConfig,
    pub solver: SolverConfig,
    pub generator: GeneratorConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphConfig {
    pub topology: Topology,
    /// Vertex count for complete and cycle graphs
    pub size: usize,
    pub width: usize,
    pub height: usize,
    pub adjacency_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Topology {
    Complete,
    Cycle,
    Grid,
    File,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PuzzleConfig {
    pub start: usize,
    pub end: usize,
    pub puzzle_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolverConfig {
    pub method: SolveMethod,
    pub backend: SolverBackend,
    /// 0 disables the timeout
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SolveMethod {
    Sat,
    Backtracking,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SolverBackend {
    Cadical,
    Varisat,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorConfig {
    pub seed: Option<u64>,
    /// Random hint attempts before every remaining position gets pinned
    pub max_attempts: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub output_directory: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    Text,
    Json,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            graph: GraphConfig {
                topology: Topology::Grid,
                size: 9,
                width: 3,
                height: 3,
                adjacency_file: None,
            },
            puzzle: PuzzleConfig {
                start: 0,
                end: 8,
                puzzle_file: None,
            },
            solver: SolverConfig {
                method: SolveMethod::Sat,
                backend: SolverBackend::Cadical,
                timeout_seconds: 60,
            },
            generator: GeneratorConfig {
                seed: None,
                max_attempts: None,
            },
            output: OutputConfig {
                format: OutputFormat::Text,
                output_directory: PathBuf::from("output/puzzles"),
            },
        }
    }
}

impl SolverConfig {
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_seconds > 0).then(|| Duration::from_secs(self.timeout_seconds))
    }
}

impl Settings {
    /// Load settings from a YAML file
    pub fn from_file(path: &PathBuf) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let settings: Settings = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        settings.validate()?;
        Ok(settings)
    }

    /// Save settings to a YAML file
    pub fn to_file(&self, path: &PathBuf) -> Result<()> {
        let content = serde_yaml::to_string(self).context("Failed to serialize settings")?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Validate the settings
    pub fn validate(&self) -> Result<()> {
        match self.graph.topology {
            Topology::Complete | Topology::Cycle => {
                if self.graph.size == 0 {
                    anyhow::bail!("Graph size must be positive");
                }
            }
            Topology::Grid => {
                if self.graph.width == 0 || self.graph.height == 0 {
                    anyhow::bail!("Grid width and height must be positive");
                }
            }
            Topology::File => match &self.graph.adjacency_file {
                None => anyhow::bail!("File topology requires graph.adjacency_file"),
                Some(file) if !file.exists() => {
                    anyhow::bail!("Adjacency file does not exist: {}", file.display())
                }
                Some(_) => {}
            },
        }

        if let Some(n) = self.vertex_count() {
            if self.puzzle.start >= n || self.puzzle.end >= n {
                anyhow::bail!(
                    "Endpoints ({}, {}) out of range for a graph with {} vertices",
                    self.puzzle.start,
                    self.puzzle.end,
                    n
                );
            }
            if n > 1 && self.puzzle.start == self.puzzle.end {
                anyhow::bail!("Start and end must differ on graphs with more than one vertex");
            }
        }

        if self.generator.max_attempts == Some(0) {
            anyhow::bail!("generator.max_attempts must be positive when set");
        }

        Ok(())
    }

    /// Vertex count implied by the graph section, when known without I/O
    pub fn vertex_count(&self) -> Option<usize> {
        match self.graph.topology {
            Topology::Complete | Topology::Cycle => Some(self.graph.size),
            Topology::Grid => Some(self.graph.width * self.graph.height),
            Topology::File => None,
        }
    }

    /// Build the configured graph
    pub fn build_graph(&self) -> Result<Graph> {
        match self.graph.topology {
            Topology::Complete => Graph::complete(self.graph.size),
            Topology::Cycle => Graph::cycle(self.graph.size),
            Topology::Grid => Graph::grid(self.graph.width, self.graph.height),
            Topology::File => {
                let file = self
                    .graph
                    .adjacency_file
                    .as_ref()
                    .context("File topology requires graph.adjacency_file")?;
                load_graph_from_file(file)
            }
        }
    }

    /// Merge settings with command line overrides
    pub fn merge_with_cli(&mut self, cli_overrides: &CliOverrides) {
        if let Some(start) = cli_overrides.start {
            self.puzzle.start = start;
        }
        if let Some(end) = cli_overrides.end {
            self.puzzle.end = end;
        }
        if let Some(seed) = cli_overrides.seed {
            self.generator.seed = Some(seed);
        }
        if let Some(method) = cli_overrides.method {
            self.solver.method = method;
        }
        if let Some(ref puzzle_file) = cli_overrides.puzzle_file {
            self.puzzle.puzzle_file = Some(puzzle_file.clone());
        }
        if let Some(ref output_dir) = cli_overrides.output_dir {
            self.output.output_directory = output_dir.clone();
        }
    }
}

/// Command line overrides for settings
#[derive(Debug, Default)]
pub struct CliOverrides {
    pub start: Option<usize>,
    pub end: Option<usize>,
    pub seed: Option<u64>,
    pub method: Option<SolveMethod>,
    pub puzzle_file: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_settings_are_valid() {
        let settings = Settings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.vertex_count(), Some(9));
        assert_eq!(settings.solver.timeout(), Some(Duration::from_secs(60)));
    }

    #[test]
    fn test_yaml_roundtrip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config/default.yaml");

        let mut settings = Settings::default();
        settings.solver.backend = SolverBackend::Varisat;
        settings.generator.seed = Some(7);
        settings.to_file(&path).unwrap();

        let loaded = Settings::from_file(&path).unwrap();
        assert_eq!(loaded.solver.backend, SolverBackend::Varisat);
        assert_eq!(loaded.generator.seed, Some(7));
        assert_eq!(loaded.graph.topology, Topology::Grid);
    }

    #[test]
    fn test_validation_failures() {
        let mut settings = Settings::default();
        settings.puzzle.end = 9;
        assert!(settings.validate().is_err());

        let mut settings = Settings::default();
        settings.puzzle.end = 0;
        assert!(settings.validate().is_err());

        let mut settings = Settings::default();
        settings.graph.topology = Topology::File;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_cli_overrides() {
        let mut settings = Settings::default();
        settings.merge_with_cli(&CliOverrides {
            start: Some(2),
            end: Some(6),
            seed: Some(11),
            method: Some(SolveMethod::Backtracking),
            ..Default::default()
        });

        assert_eq!(settings.puzzle.start, 2);
        assert_eq!(settings.puzzle.end, 6);
        assert_eq!(settings.generator.seed, Some(11));
        assert_eq!(settings.solver.method, SolveMethod::Backtracking);
    }

    #[test]
    fn test_build_graph() {
        let mut settings = Settings::default();
        assert_eq!(settings.build_graph().unwrap().vertex_count(), 9);

        settings.graph.topology = Topology::Cycle;
        settings.graph.size = 5;
        assert_eq!(settings.build_graph().unwrap().edge_count(), 5);
    }
}
