//! Graph model and its file formats

pub mod io;
pub mod structure;

pub use io::{load_graph_from_file, parse_graph_from_string, save_graph_to_file};
pub use structure::Graph;
