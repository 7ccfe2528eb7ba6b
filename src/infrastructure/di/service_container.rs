//! Service container for dependency injection
//!
//! Wires up all services with their dependencies.

use std::sync::Arc;

use crate::application::services::QuizService;
use crate::config::Settings;
use crate::infrastructure::traits::{FileSystem, Prompter, RealFileSystem, StdinPrompter};

/// Container holding all application services.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Filesystem abstraction
    pub fs: Arc<dyn FileSystem>,

    /// Interactive input
    pub prompter: Arc<dyn Prompter>,

    /// Tree loading and session creation
    pub quiz: QuizService,
}

impl ServiceContainer {
    /// Create a new service container with real implementations.
    pub fn new(settings: Settings) -> Self {
        Self::with_deps(settings, Arc::new(RealFileSystem), Arc::new(StdinPrompter))
    }

    /// Create a service container with custom dependencies (for testing).
    pub fn with_deps(
        settings: Settings,
        fs: Arc<dyn FileSystem>,
        prompter: Arc<dyn Prompter>,
    ) -> Self {
        let settings = Arc::new(settings);
        let quiz = QuizService::new(Arc::clone(&fs), Arc::clone(&settings));

        Self {
            settings,
            fs,
            prompter,
            quiz,
        }
    }
}
