//! Display and output formatting utilities

use crate::config::OutputFormat;
use crate::rikudo::{HamiltonianPath, Puzzle, Solution};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Width and height of a rectangular grid graph, used to draw boards
pub type BoardLayout = (usize, usize);

/// Format puzzles and solutions for display
pub struct PuzzleFormatter;

impl PuzzleFormatter {
    /// Format a puzzle: its hints, and a board when the layout is known
    pub fn format_puzzle(puzzle: &Puzzle, layout: Option<BoardLayout>) -> String {
        let mut output = String::new();
        let n = puzzle.vertex_count();

        output.push_str(&format!(
            "Puzzle: {} vertices, {} edges\n",
            n,
            puzzle.graph().edge_count()
        ));

        let pins: Vec<String> = puzzle
            .partial_map()
            .assigned()
            .map(|(i, v)| format!("{}@{}", v, i))
            .collect();
        output.push_str(&format!("Pinned ({}): {}\n", pins.len(), pins.join(" ")));

        let diamonds: Vec<String> = puzzle
            .diamonds()
            .pairs()
            .iter()
            .map(|(u, v)| format!("{}-{}", u, v))
            .collect();
        output.push_str(&format!("Diamonds ({}): {}\n", diamonds.len(), diamonds.join(" ")));

        if let Some((width, height)) = layout.filter(|&(w, h)| w * h == n) {
            let mut labels = vec![None; n];
            for (position, vertex) in puzzle.partial_map().assigned() {
                labels[vertex] = Some(position);
            }
            output.push('\n');
            output.push_str(&Self::format_board(&labels, width, height));
        }

        output
    }

    /// Format a path as an arrow list, plus a board of visit positions
    pub fn format_path(path: &HamiltonianPath, layout: Option<BoardLayout>) -> String {
        let mut output = format!("Path: {}\n", path);

        if let Some((width, height)) = layout.filter(|&(w, h)| w * h == path.len()) {
            let mut labels = vec![None; path.len()];
            for (position, &vertex) in path.vertices().iter().enumerate() {
                if let Some(label) = labels.get_mut(vertex) {
                    *label = Some(position);
                }
            }
            output.push('\n');
            output.push_str(&Self::format_board(&labels, width, height));
        }

        output
    }

    /// Format a solved puzzle
    pub fn format_solution(solution: &Solution, layout: Option<BoardLayout>) -> String {
        let mut output = String::new();
        output.push_str(&format!("=== Solution {} ===\n", solution.metadata.id));
        output.push_str(&format!("Method: {:?}\n", solution.method));
        output.push_str(&format!("Solve Time: {:.3}s\n", solution.solve_time.as_secs_f64()));
        output.push_str(&format!(
            "Hints: {} pinned, {} diamonds\n",
            solution.metadata.pinned_positions, solution.metadata.diamonds
        ));
        output.push_str(&Self::format_path(&solution.path, layout));
        output
    }

    /// Row-major board; each cell shows its label or `··` when unknown
    pub fn format_board(labels: &[Option<usize>], width: usize, height: usize) -> String {
        let cell_width = labels.len().saturating_sub(1).to_string().len().max(2);
        let mut output = String::new();

        for y in 0..height {
            let row: Vec<String> = (0..width)
                .map(|x| match labels.get(y * width + x).copied().flatten() {
                    Some(label) => format!("{:>w$}", label, w = cell_width),
                    None => format!("{:>w$}", "··", w = cell_width),
                })
                .collect();
            output.push_str(&row.join(" "));
            output.push('\n');
        }

        output
    }

    /// Save a puzzle under `output_dir`, returning the written file
    pub fn save_puzzle<P: AsRef<Path>>(
        puzzle: &Puzzle,
        output_dir: P,
        name: &str,
        format: OutputFormat,
        layout: Option<BoardLayout>,
    ) -> Result<PathBuf> {
        let output_dir = output_dir.as_ref();
        std::fs::create_dir_all(output_dir)
            .with_context(|| format!("Failed to create directory: {}", output_dir.display()))?;

        let filepath = match format {
            OutputFormat::Json => {
                let filepath = output_dir.join(format!("{}.json", name));
                puzzle.save_to_file(&filepath)?;
                filepath
            }
            OutputFormat::Text => {
                let filepath = output_dir.join(format!("{}.txt", name));
                std::fs::write(&filepath, Self::format_puzzle(puzzle, layout))
                    .with_context(|| format!("Failed to write {}", filepath.display()))?;
                filepath
            }
        };

        Ok(filepath)
    }

    /// Save a solution under `output_dir`, returning the written file
    pub fn save_solution<P: AsRef<Path>>(
        solution: &Solution,
        output_dir: P,
        format: OutputFormat,
        layout: Option<BoardLayout>,
    ) -> Result<PathBuf> {
        let output_dir = output_dir.as_ref();
        std::fs::create_dir_all(output_dir)
            .with_context(|| format!("Failed to create directory: {}", output_dir.display()))?;

        let filepath = match format {
            OutputFormat::Json => {
                let filepath = output_dir.join(format!("{}.json", solution.metadata.id));
                solution.save_to_file(&filepath)?;
                filepath
            }
            OutputFormat::Text => {
                let filepath = output_dir.join(format!("{}.txt", solution.metadata.id));
                std::fs::write(&filepath, Self::format_solution(solution, layout))
                    .with_context(|| format!("Failed to write {}", filepath.display()))?;
                filepath
            }
        };

        Ok(filepath)
    }
}

/// Colored terminal output
pub struct ColorOutput;

impl ColorOutput {
    /// Format text with color (if terminal supports it)
    pub fn colored(text: &str, color: Color) -> String {
        if Self::supports_color() {
            format!("\x1b[{}m{}\x1b[0m", color.code(), text)
        } else {
            text.to_string()
        }
    }

    fn supports_color() -> bool {
        std::env::var("NO_COLOR").is_err() && (std::env::var("TERM").unwrap_or_default() != "dumb")
    }

    pub fn success(text: &str) -> String {
        Self::colored(text, Color::Green)
    }

    pub fn error(text: &str) -> String {
        Self::colored(text, Color::Red)
    }

    pub fn warning(text: &str) -> String {
        Self::colored(text, Color::Yellow)
    }

    pub fn info(text: &str) -> String {
        Self::colored(text, Color::Blue)
    }
}

#[derive(Debug, Clone, Copy)]
pub enum Color {
    Red,
    Green,
    Yellow,
    Blue,
}

impl Color {
    fn code(self) -> u8 {
        match self {
            Color::Red => 31,
            Color::Green => 32,
            Color::Yellow => 33,
            Color::Blue => 34,
        }
    }
}
