//! Configuration management for the Rikudo solver

pub mod settings;

pub use settings::{
    CliOverrides, GeneratorConfig, GraphConfig, OutputConfig, OutputFormat, PuzzleConfig, Settings,
    SolveMethod, SolverBackend, SolverConfig, Topology,
};
