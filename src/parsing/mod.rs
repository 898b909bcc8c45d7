//! Readers for triple dumps and auxiliary list files

pub mod triple_reader;

pub use triple_reader::{open_text_file, parse_triple_line, read_list, read_list_file, Line, TripleReader};
