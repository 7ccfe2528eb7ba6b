//! Quiz service
//!
//! Loads decision trees from the configured source, checks their integrity
//! and hands out sessions that share one immutable tree.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, instrument, warn};

use crate::application::services::runner::ResultRoute;
use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::config::Settings;
use crate::domain::{resolve_text, validate, Session, Tree, TypeCode, ValidationReport};
use crate::infrastructure::traits::FileSystem;

/// Reference tree compiled into the binary.
pub const BUNDLED_TREE: &str = include_str!("../../../data/decision_tree.json");

/// Where a tree was loaded from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeSource {
    Bundled,
    File(PathBuf),
}

impl std::fmt::Display for TreeSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TreeSource::Bundled => write!(f, "<bundled>"),
            TreeSource::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// A parsed tree with its validation findings.
#[derive(Debug, Clone)]
pub struct LoadedTree {
    pub tree: Arc<Tree>,
    pub source: TreeSource,
    pub report: ValidationReport,
}

/// Locale-resolved result details, as shown on a result page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultDetail {
    pub key: String,
    pub code: TypeCode,
    pub title: String,
    pub summary: String,
    pub route: ResultRoute,
}

/// Service for loading trees and starting quiz sessions.
pub struct QuizService {
    fs: Arc<dyn FileSystem>,
    settings: Arc<Settings>,
}

impl QuizService {
    pub fn new(fs: Arc<dyn FileSystem>, settings: Arc<Settings>) -> Self {
        Self { fs, settings }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Parse a tree document.
    pub fn parse_tree(content: &str, source_name: &str) -> ApplicationResult<Tree> {
        serde_json::from_str(content).map_err(|source| ApplicationError::Parse {
            source_name: source_name.to_string(),
            source,
        })
    }

    /// Load a tree: `path` if given, else the configured `tree_path`, else
    /// the bundled tree.
    ///
    /// In strict mode a tree with validation errors is rejected; warnings are
    /// logged and returned in the report either way.
    #[instrument(skip(self))]
    pub fn load(&self, path: Option<&Path>) -> ApplicationResult<LoadedTree> {
        let path = path.or(self.settings.tree_path.as_deref());
        let (tree, source) = match path {
            Some(path) => {
                if !self.fs.exists(path) {
                    return Err(ApplicationError::TreeNotFound(path.to_path_buf()));
                }
                let content = self.fs.read_to_string(path).with_path_context("read tree", path)?;
                let tree = Self::parse_tree(&content, &path.display().to_string())?;
                (tree, TreeSource::File(path.to_path_buf()))
            }
            None => (Self::parse_tree(BUNDLED_TREE, "<bundled>")?, TreeSource::Bundled),
        };
        debug!(%source, nodes = tree.nodes.len(), "tree parsed");

        let report = validate(&tree, &self.settings.default_locale);
        for issue in &report.warnings {
            warn!(%source, "{}", issue);
        }
        if self.settings.strict && !report.is_valid() {
            for issue in &report.errors {
                warn!(%source, "{}", issue);
            }
            return Err(ApplicationError::InvalidTree {
                source_name: source.to_string(),
                count: report.errors.len(),
            });
        }

        Ok(LoadedTree {
            tree: Arc::new(tree),
            source,
            report,
        })
    }

    /// Load and validate without rejecting, for reporting.
    pub fn inspect(&self, path: Option<&Path>) -> ApplicationResult<LoadedTree> {
        let lenient = QuizService {
            fs: Arc::clone(&self.fs),
            settings: Arc::new(Settings {
                strict: false,
                ..(*self.settings).clone()
            }),
        };
        lenient.load(path)
    }

    /// Start a fresh session on `tree`.
    pub fn start_session(&self, tree: Arc<Tree>) -> Session {
        Session::new(tree, self.settings.default_locale.clone())
    }

    /// Locale for display, negotiated against the configured locales.
    pub fn locale(&self, requested: Option<&str>) -> String {
        self.settings.effective_locale(requested)
    }

    /// Look up a result by type code and resolve its text for `locale`.
    #[instrument(skip(self, tree))]
    pub fn result_detail(&self, tree: &Tree, code: &str, locale: &str) -> ApplicationResult<ResultDetail> {
        let (key, result) = tree
            .find_result(code)
            .ok_or_else(|| ApplicationError::ResultNotFound(code.to_string()))?;
        let default_locale = &self.settings.default_locale;

        Ok(ResultDetail {
            key: key.to_string(),
            code: result.code.clone(),
            title: resolve_text(&result.title, locale, default_locale, &format!("{key}.title"))?.to_string(),
            summary: resolve_text(&result.summary, locale, default_locale, &format!("{key}.summary"))?
                .to_string(),
            route: ResultRoute::new(locale, result.code.clone()),
        })
    }
}
