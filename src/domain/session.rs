//! Quiz session: the traversal state machine.
//!
//! A session is exclusively owned by one interaction stream. The tree it walks
//! is shared read-only through an `Arc`.

use std::sync::Arc;

use tracing::{debug, instrument};

use crate::domain::entities::{Node, Tree, TypeCode};
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::locale::resolve_text;

/// Where the session currently is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuizState {
    AtQuestion(String),
    AtResult(TypeCode),
}

/// Outcome of a state transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// Moved to another question.
    Advanced,
    /// Entered the terminal state; emitted once per entry.
    Completed(TypeCode),
    /// Moved back one step.
    Reverted,
    /// Back at the start with empty history.
    Restarted,
    /// Nothing to do (empty history, or already at a result).
    Ignored,
}

/// Step counter for progress display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    /// 1-indexed step currently being answered
    pub current: usize,
    /// Worst-case total from the start node
    pub total: usize,
}

impl Progress {
    /// Completed fraction, clamped to `[0, 1]`.
    ///
    /// The total is an upper bound over all branches, so a short path can
    /// finish before reaching it.
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        (self.current as f64 / self.total as f64).min(1.0)
    }

    pub fn percent(&self) -> f64 {
        self.fraction() * 100.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionView {
    pub index: usize,
    pub label: String,
}

/// Locale-resolved snapshot of the current node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum View {
    Question {
        key: String,
        text: String,
        options: Vec<OptionView>,
    },
    Result {
        code: TypeCode,
        title: String,
        summary: String,
    },
}

/// One user's traversal of a tree.
#[derive(Debug, Clone)]
pub struct Session {
    tree: Arc<Tree>,
    current: String,
    history: Vec<String>,
    state: QuizState,
    total_steps: usize,
    default_locale: String,
}

impl Session {
    pub fn new(tree: Arc<Tree>, default_locale: impl Into<String>) -> Self {
        let start = tree.start.clone();
        let total_steps = tree.total_steps();
        let state = entry_state(&tree, &start);
        Self {
            tree,
            current: start,
            history: Vec::new(),
            state,
            total_steps,
            default_locale: default_locale.into(),
        }
    }

    pub fn tree(&self) -> &Arc<Tree> {
        &self.tree
    }

    pub fn state(&self) -> &QuizState {
        &self.state
    }

    pub fn current_key(&self) -> &str {
        &self.current
    }

    pub fn history(&self) -> &[String] {
        &self.history
    }

    pub fn default_locale(&self) -> &str {
        &self.default_locale
    }

    pub fn is_complete(&self) -> bool {
        matches!(self.state, QuizState::AtResult(_))
    }

    pub fn progress(&self) -> Progress {
        Progress {
            current: self.history.len() + 1,
            total: self.total_steps,
        }
    }

    /// Answer the current question with option `index`.
    ///
    /// Rejected indices and dangling `next` keys leave the session untouched.
    #[instrument(level = "debug", skip(self), fields(current = %self.current))]
    pub fn select_option(&mut self, index: usize) -> DomainResult<Transition> {
        if self.is_complete() {
            debug!("select ignored: session already at result");
            return Ok(Transition::Ignored);
        }

        let options = self.tree.require(&self.current)?.options();
        let option = options.get(index).ok_or_else(|| DomainError::OptionOutOfRange {
            node: self.current.clone(),
            index,
            len: options.len(),
        })?;
        let next = option.next.clone();
        let next_node = self.tree.require(&next)?;

        let transition = match next_node {
            Node::Result { result } => {
                self.state = QuizState::AtResult(result.code.clone());
                Transition::Completed(result.code.clone())
            }
            Node::Question { .. } => {
                self.state = QuizState::AtQuestion(next.clone());
                Transition::Advanced
            }
        };
        let previous = std::mem::replace(&mut self.current, next);
        self.history.push(previous);

        debug!(next = %self.current, depth = self.history.len(), ?transition, "selected option");
        Ok(transition)
    }

    /// Step back to the previously answered question.
    ///
    /// Also leaves a result, returning to the question that led there.
    pub fn go_back(&mut self) -> Transition {
        match self.history.pop() {
            Some(previous) => {
                debug!(from = %self.current, to = %previous, "going back");
                self.state = QuizState::AtQuestion(previous.clone());
                self.current = previous;
                Transition::Reverted
            }
            None => Transition::Ignored,
        }
    }

    /// Return to the start node and forget the history. Valid in any state.
    pub fn restart(&mut self) -> Transition {
        debug!("restarting session");
        self.history.clear();
        self.current = self.tree.start.clone();
        self.state = entry_state(&self.tree, &self.current);
        Transition::Restarted
    }

    /// Resolve the current node's text for `locale`.
    pub fn current_view(&self, locale: &str) -> DomainResult<View> {
        let key = self.current.as_str();
        match self.tree.require(key)? {
            Node::Question { question, options } => {
                let text =
                    resolve_text(question, locale, &self.default_locale, &format!("{key}.question"))?;
                let options = options
                    .iter()
                    .enumerate()
                    .map(|(index, option)| {
                        resolve_text(
                            &option.label,
                            locale,
                            &self.default_locale,
                            &format!("{key}.options[{index}].label"),
                        )
                        .map(|label| OptionView {
                            index,
                            label: label.to_string(),
                        })
                    })
                    .collect::<DomainResult<Vec<_>>>()?;
                Ok(View::Question {
                    key: key.to_string(),
                    text: text.to_string(),
                    options,
                })
            }
            Node::Result { result } => Ok(View::Result {
                code: result.code.clone(),
                title: resolve_text(&result.title, locale, &self.default_locale, &format!("{key}.title"))?
                    .to_string(),
                summary: resolve_text(
                    &result.summary,
                    locale,
                    &self.default_locale,
                    &format!("{key}.summary"),
                )?
                .to_string(),
            }),
        }
    }
}

// A start key that points straight at a result is already terminal.
fn entry_state(tree: &Tree, start: &str) -> QuizState {
    match tree.node(start) {
        Some(Node::Result { result }) => QuizState::AtResult(result.code.clone()),
        _ => QuizState::AtQuestion(start.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{ChoiceOption, LocalizedText, ResultInfo};
    use std::collections::BTreeMap;

    fn single_question_tree() -> Arc<Tree> {
        let mut nodes = BTreeMap::new();
        nodes.insert(
            "q1".to_string(),
            Node::Question {
                question: LocalizedText::new().with("en", "Ready?"),
                options: vec![ChoiceOption {
                    label: LocalizedText::new().with("en", "Yes"),
                    next: "done".into(),
                }],
            },
        );
        nodes.insert(
            "done".to_string(),
            Node::Result {
                result: ResultInfo {
                    code: TypeCode::new("ISTJ"),
                    title: LocalizedText::new().with("en", "Inspector"),
                    summary: LocalizedText::new().with("en", "Dutiful"),
                },
            },
        );
        Arc::new(Tree::new("q1", nodes))
    }

    #[test]
    fn given_new_session_when_inspecting_then_at_start_with_empty_history() {
        let session = Session::new(single_question_tree(), "en");
        assert_eq!(session.state(), &QuizState::AtQuestion("q1".into()));
        assert!(session.history().is_empty());
        assert_eq!(session.progress(), Progress { current: 1, total: 2 });
    }

    #[test]
    fn given_completed_session_when_selecting_again_then_ignored() {
        let mut session = Session::new(single_question_tree(), "en");
        assert_eq!(
            session.select_option(0),
            Ok(Transition::Completed(TypeCode::new("ISTJ")))
        );
        assert_eq!(session.select_option(0), Ok(Transition::Ignored));
        assert_eq!(session.history().len(), 1);
    }

    #[test]
    fn given_completed_session_when_going_back_then_last_question_again() {
        let mut session = Session::new(single_question_tree(), "en");
        session.select_option(0).unwrap();

        assert_eq!(session.go_back(), Transition::Reverted);

        assert_eq!(session.state(), &QuizState::AtQuestion("q1".into()));
        assert!(session.history().is_empty());
        assert_eq!(
            session.select_option(0),
            Ok(Transition::Completed(TypeCode::new("ISTJ")))
        );
    }

    #[test]
    fn given_start_is_result_when_created_then_already_complete() {
        let tree = single_question_tree();
        let mut nodes = tree.nodes.clone();
        nodes.remove("q1");
        let mut session = Session::new(Arc::new(Tree::new("done", nodes)), "en");

        assert!(session.is_complete());
        assert_eq!(session.state(), &QuizState::AtResult(TypeCode::new("ISTJ")));
        assert_eq!(session.select_option(99), Ok(Transition::Ignored));
        assert_eq!(session.go_back(), Transition::Ignored);

        assert_eq!(session.restart(), Transition::Restarted);
        assert!(session.is_complete());
    }

    #[test]
    fn given_zero_total_when_computing_fraction_then_zero() {
        let p = Progress { current: 1, total: 0 };
        assert_eq!(p.fraction(), 0.0);
    }

    #[test]
    fn given_short_path_when_computing_fraction_then_clamped() {
        let p = Progress { current: 5, total: 3 };
        assert_eq!(p.fraction(), 1.0);
        assert_eq!(p.percent(), 100.0);
    }
}
