//! Quiz runner: binds a session to input events and result navigation.
//!
//! The runner is the seam between the pure state machine and a presentation
//! layer. Hosts feed it events and implement [`ResultNavigator`] to route to
//! the result view once the session completes.

use std::fmt;

use tracing::{debug, info};

use crate::domain::{DomainResult, Progress, QuizState, Session, Transition, TypeCode, View};

/// Address of a result view: `/{locale}/result/{code}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultRoute {
    pub locale: String,
    pub code: TypeCode,
}

impl ResultRoute {
    pub fn new(locale: impl Into<String>, code: TypeCode) -> Self {
        Self {
            locale: locale.into(),
            code,
        }
    }
}

impl fmt::Display for ResultRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}/result/{}", self.locale, self.code.slug())
    }
}

/// Receives the terminal signal when a session reaches a result.
pub trait ResultNavigator {
    fn navigate(&self, route: &ResultRoute);
}

/// Keyboard shortcuts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// Answer with the first option
    Enter,
    /// Go back one step
    ArrowLeft,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizEvent {
    Select(usize),
    Back,
    Restart,
    Key(Key),
}

/// Drives one session for one display locale.
pub struct QuizRunner<N> {
    session: Session,
    locale: String,
    navigator: N,
}

impl<N: ResultNavigator> QuizRunner<N> {
    /// Notifies the navigator right away when the start node is a result.
    pub fn new(session: Session, locale: impl Into<String>, navigator: N) -> Self {
        let runner = Self {
            session,
            locale: locale.into(),
            navigator,
        };
        runner.notify_if_complete();
        runner
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn navigator(&self) -> &N {
        &self.navigator
    }

    pub fn locale(&self) -> &str {
        &self.locale
    }

    pub fn progress(&self) -> Progress {
        self.session.progress()
    }

    pub fn view(&self) -> DomainResult<View> {
        self.session.current_view(&self.locale)
    }

    /// Apply one event; notifies the navigator on completion.
    pub fn handle(&mut self, event: QuizEvent) -> DomainResult<Transition> {
        let transition = match event {
            QuizEvent::Select(index) => self.session.select_option(index)?,
            QuizEvent::Back => self.session.go_back(),
            QuizEvent::Restart => self.session.restart(),
            QuizEvent::Key(key) => self.handle_key(key)?,
        };
        debug!(?event, ?transition, "handled event");

        match &transition {
            Transition::Completed(code) => self.navigate(code),
            Transition::Restarted => self.notify_if_complete(),
            _ => {}
        }
        Ok(transition)
    }

    fn notify_if_complete(&self) {
        if let QuizState::AtResult(code) = self.session.state() {
            self.navigate(code);
        }
    }

    fn navigate(&self, code: &TypeCode) {
        let route = ResultRoute::new(self.locale.clone(), code.clone());
        info!(%route, "quiz completed");
        self.navigator.navigate(&route);
    }

    // Shortcuts are disabled once the session reaches a result.
    fn handle_key(&mut self, key: Key) -> DomainResult<Transition> {
        if self.session.is_complete() {
            return Ok(Transition::Ignored);
        }
        match key {
            Key::ArrowLeft => Ok(self.session.go_back()),
            Key::Enter => {
                let has_options = self
                    .session
                    .tree()
                    .node(self.session.current_key())
                    .is_some_and(|node| !node.options().is_empty());
                if has_options {
                    self.session.select_option(0)
                } else {
                    Ok(Transition::Ignored)
                }
            }
        }
    }
}
