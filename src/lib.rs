//! Decision-tree personality quiz engine.
//!
//! A quiz is an immutable [`domain::Tree`] of question and result nodes.
//! A [`domain::Session`] walks it one answer at a time with back and restart
//! navigation, and reports progress against the tree's worst-case depth.
//!
//! ```
//! use std::sync::Arc;
//! use typequiz::application::services::QuizService;
//! use typequiz::domain::{Session, Transition};
//!
//! let tree = Arc::new(QuizService::parse_tree(typequiz::application::services::BUNDLED_TREE, "bundled").unwrap());
//! let mut session = Session::new(tree, "en");
//! for answer in [0, 1, 0] {
//!     assert_eq!(session.select_option(answer).unwrap(), Transition::Advanced);
//! }
//! assert!(matches!(session.select_option(1).unwrap(), Transition::Completed(code) if code.as_str() == "ENTP"));
//! ```

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
