pub mod circular_reader;

pub use crate::types::buffers::circular_reader::CircularReader;
