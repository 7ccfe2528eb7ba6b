//! Test support: logging setup and small tree fixtures.

use std::collections::BTreeMap;
use std::env;
use std::sync::{Arc, Once};

use tracing::{debug, info};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    prelude::*,
    EnvFilter,
};

use crate::domain::{ChoiceOption, LocalizedText, Node, ResultInfo, Tree, TypeCode};

static TEST_SETUP: Once = Once::new();

/// Install a global tracing subscriber once per test binary.
pub fn init_test_setup() {
    TEST_SETUP.call_once(|| {
        setup_test_logging();
        info!("Test Setup complete");
    });
}

fn setup_test_logging() {
    // RUST_LOG wins; otherwise trace this crate only
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("typequiz=trace"));

    let subscriber = tracing_subscriber::registry().with(
        fmt::layer()
            .with_test_writer()
            .with_target(true)
            .with_thread_names(false)
            .with_span_events(FmtSpan::CLOSE)
            .with_filter(env_filter),
    );

    if tracing::dispatcher::has_been_set() {
        debug!("Tracing subscriber already set");
    } else {
        subscriber.try_init().unwrap_or_else(|e| {
            eprintln!("Error: Failed to set up logging: {}", e);
        });
    }
    debug!(rust_log = ?env::var("RUST_LOG").ok(), "test logging ready");
}

/// Question node with English text; options are `(label, next)` pairs.
pub fn question(text: &str, options: &[(&str, &str)]) -> Node {
    Node::Question {
        question: LocalizedText::new().with("en", text),
        options: options
            .iter()
            .map(|(label, next)| ChoiceOption {
                label: LocalizedText::new().with("en", *label),
                next: next.to_string(),
            })
            .collect(),
    }
}

/// Result node with English title and summary.
pub fn result(code: &str, title: &str, summary: &str) -> Node {
    Node::Result {
        result: ResultInfo {
            code: TypeCode::new(code),
            title: LocalizedText::new().with("en", title),
            summary: LocalizedText::new().with("en", summary),
        },
    }
}

/// The two-question example tree: `q1 -> {q2, leaf_x}`, `q2 -> {leaf_x, leaf_y}`.
pub fn two_question_tree() -> Arc<Tree> {
    let nodes: BTreeMap<String, Node> = [
        ("q1", question("A or B?", &[("A", "q2"), ("B", "leaf_x")])),
        ("q2", question("C or D?", &[("C", "leaf_x"), ("D", "leaf_y")])),
        ("leaf_x", result("X", "X", "...")),
        ("leaf_y", result("Y", "Y", "...")),
    ]
    .into_iter()
    .map(|(k, n)| (k.to_string(), n))
    .collect();
    Arc::new(Tree::new("q1", nodes))
}
