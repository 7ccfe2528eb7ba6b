//! Command dispatch

use std::cell::RefCell;
use std::io;
use std::path::Path;

use clap::CommandFactory;
use itertools::Itertools;
use tracing::{debug, instrument};

use crate::application::services::{QuizEvent, QuizRunner, QuizService, ResultNavigator, ResultRoute};
use crate::application::ApplicationError;
use crate::cli::args::{parse_event, Cli, Commands, ConfigCommands};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::config::{global_config_path, local_config_path, Settings};
use crate::domain::{
    resolve_text, DomainError, LocalizedText, MbtiType, Node, Progress, Transition, Tree, View,
};
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::traits::Prompter;
use crate::infrastructure::InfraError;

pub fn execute_command(cli: &Cli, container: &ServiceContainer) -> CliResult<()> {
    let tree = cli.tree.as_deref();
    let locale = container.quiz.locale(cli.locale.as_deref());
    if let Some(requested) = cli.locale.as_deref() {
        if requested != locale {
            output::warning(&format!("locale '{requested}' not supported, using '{locale}'"));
        }
    }

    match &cli.command {
        Some(Commands::Run) => {
            run_quiz(&container.quiz, container.prompter.as_ref(), tree, &locale).map(|_| ())
        }
        Some(Commands::Play { steps }) => _play(&container.quiz, tree, &locale, steps),
        Some(Commands::Validate) => _validate(&container.quiz, tree),
        Some(Commands::Tree) => _tree(&container.quiz, tree, &locale),
        Some(Commands::Result { code }) => _result(&container.quiz, tree, &locale, code),
        Some(Commands::Types) => _types(&container.quiz, tree, &locale),
        Some(Commands::Config { command }) => _config(container, command),
        Some(Commands::Completion { shell }) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            clap_complete::generate(*shell, &mut cmd, name, &mut io::stdout());
            Ok(())
        }
        None => Cli::command()
            .print_help()
            .map_err(|e| InfraError::io("print help", e).into()),
    }
}

/// Prints the result route and remembers it for the caller.
#[derive(Debug, Default)]
pub struct TerminalNavigator {
    route: RefCell<Option<ResultRoute>>,
}

impl TerminalNavigator {
    pub fn route(&self) -> Option<ResultRoute> {
        self.route.borrow().clone()
    }
}

impl ResultNavigator for TerminalNavigator {
    fn navigate(&self, route: &ResultRoute) {
        output::action("Result", route);
        *self.route.borrow_mut() = Some(route.clone());
    }
}

fn render_view(view: &View, progress: &Progress) {
    match view {
        View::Question { text, options, .. } => {
            output::progress(progress);
            output::header(text);
            for option in options {
                output::option(option.index, &option.label);
            }
        }
        View::Result { code, title, summary } => {
            output::header(&format!("{code} - {title}"));
            output::info(summary);
        }
    }
}

/// Play the quiz against `prompter` until a result, quit, or end of input.
///
/// Returns the result route when the quiz was completed.
#[instrument(skip(quiz, prompter))]
pub fn run_quiz(
    quiz: &QuizService,
    prompter: &dyn Prompter,
    tree: Option<&Path>,
    locale: &str,
) -> CliResult<Option<ResultRoute>> {
    let loaded = quiz.load(tree)?;
    let session = quiz.start_session(loaded.tree);
    let mut runner = QuizRunner::new(session, locale, TerminalNavigator::default());

    while !runner.session().is_complete() {
        render_view(&runner.view()?, &runner.progress());

        let Some(line) = prompter
            .read_line(">")
            .map_err(|e| InfraError::io("read answer", e))?
        else {
            debug!("end of input, abandoning session");
            return Ok(None);
        };
        if matches!(line.trim(), "q" | "quit") {
            return Ok(None);
        }

        let event = match parse_event(&line) {
            Ok(event) => event,
            Err(msg) => {
                output::warning(&msg);
                continue;
            }
        };
        match runner.handle(event) {
            Ok(Transition::Ignored) => output::warning("nothing to do"),
            Ok(_) => {}
            Err(e @ DomainError::OptionOutOfRange { .. }) => output::warning(&e),
            Err(e) => return Err(e.into()),
        }
    }

    render_view(&runner.view()?, &runner.progress());
    Ok(runner.navigator().route())
}

#[instrument(skip(quiz))]
fn _play(quiz: &QuizService, tree: Option<&Path>, locale: &str, steps: &[QuizEvent]) -> CliResult<()> {
    let loaded = quiz.load(tree)?;
    let session = quiz.start_session(loaded.tree);
    let mut runner = QuizRunner::new(session, locale, TerminalNavigator::default());

    for step in steps {
        if runner.handle(*step)? == Transition::Ignored {
            output::warning(&format!("step {step:?} had no effect"));
        }
    }
    render_view(&runner.view()?, &runner.progress());
    Ok(())
}

#[instrument(skip(quiz))]
fn _validate(quiz: &QuizService, tree: Option<&Path>) -> CliResult<()> {
    let loaded = quiz.inspect(tree)?;
    let report = &loaded.report;
    output::header(&format!("Validating {}", loaded.source));

    for issue in &report.errors {
        output::failure(issue);
    }
    for issue in &report.warnings {
        output::warning(issue);
    }
    if !report.is_valid() {
        return Err(ApplicationError::InvalidTree {
            source_name: loaded.source.to_string(),
            count: report.errors.len(),
        }
        .into());
    }

    let locales = loaded
        .tree
        .results()
        .flat_map(|(_, result)| result.title.locales())
        .unique()
        .sorted()
        .join(", ");
    output::success(&format!(
        "{} nodes, {} results, up to {} steps",
        loaded.tree.nodes.len(),
        loaded.tree.results().count(),
        loaded.tree.total_steps()
    ));
    output::detail(&format!("locales: {locales}"));
    Ok(())
}

#[instrument(skip(quiz))]
fn _tree(quiz: &QuizService, tree: Option<&Path>, locale: &str) -> CliResult<()> {
    let loaded = quiz.inspect(tree)?;
    let default_locale = &quiz.settings().default_locale;
    let mut on_path = Vec::new();
    let display = display_tree(&loaded.tree, &loaded.tree.start, "", locale, default_locale, &mut on_path);
    output::info(&display);
    Ok(())
}

/// Build a printable tree rooted at `key`; edges back onto the current path
/// are shown but not followed.
pub fn display_tree(
    tree: &Tree,
    key: &str,
    prefix: &str,
    locale: &str,
    default_locale: &str,
    on_path: &mut Vec<String>,
) -> termtree::Tree<String> {
    if on_path.iter().any(|k| k == key) {
        return termtree::Tree::new(format!("{prefix}{key} (cycle)"));
    }
    let text = |t: &LocalizedText| -> String {
        resolve_text(t, locale, default_locale, key)
            .unwrap_or("<missing translation>")
            .to_string()
    };

    match tree.node(key) {
        None => termtree::Tree::new(format!("{prefix}{key} (missing)")),
        Some(Node::Result { result }) => {
            termtree::Tree::new(format!("{prefix}{} {}", result.code, text(&result.title)))
        }
        Some(Node::Question { question, options }) => {
            let mut node = termtree::Tree::new(format!("{prefix}{}", text(question)));
            on_path.push(key.to_string());
            for (index, option) in options.iter().enumerate() {
                let edge = format!("[{index}] {} -> ", text(&option.label));
                node.push(display_tree(tree, &option.next, &edge, locale, default_locale, on_path));
            }
            on_path.pop();
            node
        }
    }
}

#[instrument(skip(quiz))]
fn _result(quiz: &QuizService, tree: Option<&Path>, locale: &str, code: &str) -> CliResult<()> {
    let loaded = quiz.load(tree)?;
    let detail = quiz.result_detail(&loaded.tree, code, locale)?;
    output::header(&format!("{} - {}", detail.code, detail.title));
    output::info(&detail.summary);
    output::detail(&detail.route);
    Ok(())
}

#[instrument(skip(quiz))]
fn _types(quiz: &QuizService, tree: Option<&Path>, locale: &str) -> CliResult<()> {
    let loaded = quiz.inspect(tree)?;
    for t in MbtiType::ALL {
        match quiz.result_detail(&loaded.tree, t.as_str(), locale) {
            Ok(detail) => output::info(&format!("{t}  {}", detail.title)),
            Err(ApplicationError::ResultNotFound(_)) => output::info(&format!("{t}  (no result)")),
            Err(e) => return Err(e.into()),
        }
    }
    Ok(())
}

fn _config(container: &ServiceContainer, command: &ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            output::info(&container.settings.to_toml()?);
            Ok(())
        }
        ConfigCommands::Path => {
            match global_config_path() {
                Some(path) => output::action("global", &path.display()),
                None => output::action("global", "<no config directory>"),
            }
            let cwd = std::env::current_dir().map_err(|e| InfraError::io("current dir", e))?;
            output::action("local", &local_config_path(&cwd).display());
            Ok(())
        }
        ConfigCommands::Init { global } => {
            let path = if *global {
                global_config_path()
                    .ok_or_else(|| CliError::Usage("no global config directory available".into()))?
            } else {
                let cwd = std::env::current_dir().map_err(|e| InfraError::io("current dir", e))?;
                local_config_path(&cwd)
            };
            if container.fs.exists(&path) {
                return Err(CliError::Usage(format!("config already exists: {}", path.display())));
            }
            container
                .fs
                .ensure_parent(&path)
                .and_then(|_| container.fs.write(&path, &Settings::template()))
                .map_err(|e| InfraError::io(format!("write {}", path.display()), e))?;
            output::success(&format!("created {}", path.display()));
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::infrastructure::traits::{RealFileSystem, ScriptedPrompter};
    use std::sync::Arc;

    fn quiz() -> QuizService {
        QuizService::new(Arc::new(RealFileSystem), Arc::new(Settings::default()))
    }

    #[test]
    fn given_bundled_tree_when_rendering_display_tree_then_shows_all_leaves() {
        let svc = quiz();
        let loaded = svc.load(None).unwrap();
        let rendered = display_tree(&loaded.tree, &loaded.tree.start, "", "en", "en", &mut Vec::new()).to_string();
        for t in MbtiType::ALL {
            assert!(rendered.contains(t.as_str()), "missing {t} in:\n{rendered}");
        }
    }

    #[test]
    fn given_answers_when_running_quiz_then_returns_route() {
        // E, N, T, P
        let prompter = ScriptedPrompter::new(["0", "1", "0", "1"]);
        let route = run_quiz(&quiz(), &prompter, None, "en").unwrap();
        assert_eq!(route.map(|r| r.to_string()), Some("/en/result/entp".to_string()));
    }

    #[test]
    fn given_typos_back_and_enter_when_running_quiz_then_recovers() {
        // typo, out of range, back at start, then I/S/F/J with back + enter in between
        let prompter = ScriptedPrompter::new(["x", "7", "b", "1", "0", "b", "", "1", "0"]);
        let route = run_quiz(&quiz(), &prompter, None, "es").unwrap();
        assert_eq!(route.map(|r| r.to_string()), Some("/es/result/isfj".to_string()));
    }

    #[test]
    fn given_quit_when_running_quiz_then_no_route() {
        let prompter = ScriptedPrompter::new(["0", "q"]);
        assert_eq!(run_quiz(&quiz(), &prompter, None, "en").unwrap(), None);
    }
}
