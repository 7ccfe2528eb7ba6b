//! Application services
//!
//! Concrete service implementations that orchestrate domain logic.
//! Services depend on I/O boundary traits (FileSystem, Prompter)
//! but are themselves concrete structs, not traits.

mod quiz;
mod runner;

pub use quiz::{LoadedTree, QuizService, ResultDetail, TreeSource, BUNDLED_TREE};
pub use runner::{Key, QuizEvent, QuizRunner, ResultNavigator, ResultRoute};
