//! Domain layer: quiz tree, traversal state machine, and pure helpers
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod depth;
pub mod entities;
pub mod error;
pub mod locale;
pub mod session;
pub mod validate;

pub use depth::estimate_total_steps;
pub use entities::*;
pub use error::{DomainError, DomainResult};
pub use locale::{negotiate_locale, resolve_text};
pub use session::{OptionView, Progress, QuizState, Session, Transition, View};
pub use validate::{validate, Issue, ValidationReport};
