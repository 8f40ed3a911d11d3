pub mod directory;
pub mod matching;
