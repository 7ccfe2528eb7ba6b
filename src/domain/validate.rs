//! Tree integrity checks.
//!
//! Runtime transitions fail loudly on broken content; this module finds the
//! same faults up front so authors can fix them before a user hits them.

use std::collections::{BTreeSet, HashSet};
use std::fmt;

use crate::domain::entities::{LocalizedText, MbtiType, Node, Tree};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Issue {
    MissingStart(String),
    DanglingNext { node: String, index: usize, next: String },
    NoOptions(String),
    MissingDefaultText { node: String, field: String },
    EmptyTypeCode(String),
    Unreachable(String),
    Cycle(String),
    NonStandardType { node: String, code: String },
    TypeWithoutResult(MbtiType),
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Issue::MissingStart(key) => write!(f, "start node '{key}' does not exist"),
            Issue::DanglingNext { node, index, next } => {
                write!(f, "{node}.options[{index}] points to missing node '{next}'")
            }
            Issue::NoOptions(node) => write!(f, "question '{node}' has no options"),
            Issue::MissingDefaultText { node, field } => {
                write!(f, "{node}.{field} has no default-locale text")
            }
            Issue::EmptyTypeCode(node) => write!(f, "result '{node}' has an empty type code"),
            Issue::Unreachable(node) => write!(f, "node '{node}' is unreachable from start"),
            Issue::Cycle(node) => write!(f, "cycle through node '{node}'"),
            Issue::NonStandardType { node, code } => {
                write!(f, "result '{node}' uses non-standard type code '{code}'")
            }
            Issue::TypeWithoutResult(t) => write!(f, "no result node for type {t}"),
        }
    }
}

/// Findings from [`validate`], split by severity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub errors: Vec<Issue>,
    pub warnings: Vec<Issue>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Check `tree` for content-integrity faults.
///
/// Errors are faults that would break a session at runtime. Warnings flag
/// content that works but is probably not what the author meant.
pub fn validate(tree: &Tree, default_locale: &str) -> ValidationReport {
    let mut report = ValidationReport::default();

    if tree.node(&tree.start).is_none() {
        report.errors.push(Issue::MissingStart(tree.start.clone()));
    }

    for (key, node) in &tree.nodes {
        check_node(key, node, tree, default_locale, &mut report);
    }

    let reachable = reachable_from_start(tree, &mut report);
    for key in tree.nodes.keys() {
        if !reachable.contains(key.as_str()) {
            report.warnings.push(Issue::Unreachable(key.clone()));
        }
    }

    let present: HashSet<MbtiType> = tree.results().filter_map(|(_, r)| r.code.mbti()).collect();
    for t in MbtiType::ALL {
        if !present.contains(&t) {
            report.warnings.push(Issue::TypeWithoutResult(t));
        }
    }

    report
}

fn check_node(key: &str, node: &Node, tree: &Tree, default_locale: &str, report: &mut ValidationReport) {
    let mut require_text = |text: &LocalizedText, field: String| {
        if !text.contains(default_locale) {
            report.errors.push(Issue::MissingDefaultText {
                node: key.to_string(),
                field,
            });
        }
    };

    match node {
        Node::Question { question, options } => {
            require_text(question, "question".into());
            for (index, option) in options.iter().enumerate() {
                require_text(&option.label, format!("options[{index}].label"));
            }
            if options.is_empty() {
                report.errors.push(Issue::NoOptions(key.to_string()));
            }
            for (index, option) in options.iter().enumerate() {
                if tree.node(&option.next).is_none() {
                    report.errors.push(Issue::DanglingNext {
                        node: key.to_string(),
                        index,
                        next: option.next.clone(),
                    });
                }
            }
        }
        Node::Result { result } => {
            require_text(&result.title, "title".into());
            require_text(&result.summary, "summary".into());
            if result.code.as_str().is_empty() {
                report.errors.push(Issue::EmptyTypeCode(key.to_string()));
            } else if result.code.mbti().is_none() {
                report.warnings.push(Issue::NonStandardType {
                    node: key.to_string(),
                    code: result.code.to_string(),
                });
            }
        }
    }
}

/// Iterative DFS from the start node; records back edges as cycle warnings.
fn reachable_from_start<'t>(tree: &'t Tree, report: &mut ValidationReport) -> BTreeSet<&'t str> {
    let mut seen: BTreeSet<&'t str> = BTreeSet::new();
    let mut on_path: HashSet<&'t str> = HashSet::new();
    let mut cycles: BTreeSet<&'t str> = BTreeSet::new();

    let Some((start, _)) = tree.nodes.get_key_value(&tree.start) else {
        return seen;
    };
    // (key, next child index to explore)
    let mut stack: Vec<(&'t str, usize)> = vec![(start.as_str(), 0)];
    seen.insert(start.as_str());
    on_path.insert(start.as_str());

    while let Some(frame) = stack.last_mut() {
        let (key, child) = *frame;
        let options = tree.node(key).map(Node::options).unwrap_or_default();
        if child >= options.len() {
            on_path.remove(key);
            stack.pop();
            continue;
        }
        frame.1 += 1;

        let Some((next, _)) = tree.nodes.get_key_value(&options[child].next) else {
            continue;
        };
        let next = next.as_str();
        if on_path.contains(next) {
            cycles.insert(next);
        } else if seen.insert(next) {
            on_path.insert(next);
            stack.push((next, 0));
        }
    }

    report
        .warnings
        .extend(cycles.into_iter().map(|k| Issue::Cycle(k.to_string())));
    seen
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{ChoiceOption, ResultInfo, TypeCode};
    use std::collections::BTreeMap;

    fn q(next: &[&str]) -> Node {
        Node::Question {
            question: LocalizedText::new().with("en", "?"),
            options: next
                .iter()
                .map(|n| ChoiceOption {
                    label: LocalizedText::new().with("en", *n),
                    next: n.to_string(),
                })
                .collect(),
        }
    }

    fn r(code: &str) -> Node {
        Node::Result {
            result: ResultInfo {
                code: TypeCode::new(code),
                title: LocalizedText::new().with("en", code),
                summary: LocalizedText::new().with("en", "..."),
            },
        }
    }

    fn tree(start: &str, nodes: Vec<(&str, Node)>) -> Tree {
        Tree::new(
            start,
            nodes
                .into_iter()
                .map(|(k, n)| (k.to_string(), n))
                .collect::<BTreeMap<_, _>>(),
        )
    }

    #[test]
    fn given_well_formed_tree_when_validating_then_no_errors() {
        let t = tree("q1", vec![("q1", q(&["leaf_intj", "leaf_entp"])), ("leaf_intj", r("INTJ")), ("leaf_entp", r("ENTP"))]);
        let report = validate(&t, "en");
        assert!(report.is_valid(), "{:?}", report.errors);
        // 14 of the 16 types have no leaf
        assert_eq!(report.warnings.len(), 14);
    }

    #[test]
    fn given_dangling_next_when_validating_then_error() {
        let t = tree("q1", vec![("q1", q(&["missing"]))]);
        let report = validate(&t, "en");
        assert!(report.errors.contains(&Issue::DanglingNext {
            node: "q1".into(),
            index: 0,
            next: "missing".into(),
        }));
    }

    #[test]
    fn given_missing_start_when_validating_then_error() {
        let t = tree("nope", vec![("leaf", r("INTJ"))]);
        let report = validate(&t, "en");
        assert!(report.errors.contains(&Issue::MissingStart("nope".into())));
        assert!(report.warnings.contains(&Issue::Unreachable("leaf".into())));
    }

    #[test]
    fn given_missing_default_text_when_validating_then_error() {
        let t = tree("q1", vec![("q1", q(&["leaf"])), ("leaf", r("INTJ"))]);
        let report = validate(&t, "es");
        assert!(report.errors.contains(&Issue::MissingDefaultText {
            node: "q1".into(),
            field: "question".into(),
        }));
        assert!(report.errors.contains(&Issue::MissingDefaultText {
            node: "leaf".into(),
            field: "summary".into(),
        }));
    }

    #[test]
    fn given_cycle_when_validating_then_warns() {
        let t = tree("a", vec![("a", q(&["b"])), ("b", q(&["a", "leaf"])), ("leaf", r("X"))]);
        let report = validate(&t, "en");
        assert!(report.is_valid());
        assert!(report.warnings.contains(&Issue::Cycle("a".into())));
        assert!(report.warnings.contains(&Issue::NonStandardType {
            node: "leaf".into(),
            code: "X".into(),
        }));
    }

    #[test]
    fn given_question_without_options_when_validating_then_error() {
        let t = tree("q1", vec![("q1", q(&[]))]);
        let report = validate(&t, "en");
        assert_eq!(report.errors, vec![Issue::NoOptions("q1".into())]);
    }

    #[test]
    fn given_blank_type_code_when_validating_then_error() {
        let t = tree("q1", vec![("q1", q(&["leaf"])), ("leaf", r("  "))]);
        let report = validate(&t, "en");
        assert_eq!(report.errors, vec![Issue::EmptyTypeCode("leaf".into())]);
        assert!(!report
            .warnings
            .iter()
            .any(|w| matches!(w, Issue::NonStandardType { .. })));
    }

    #[test]
    fn given_blank_mbti_in_document_when_validating_then_error() {
        let json = r#"{
            "start": "q1",
            "nodes": {
                "q1": {"question": {"en": "?"}, "options": [{"label": {"en": "go"}, "next": "leaf"}]},
                "leaf": {"result": {"mbti": "  ", "title": {"en": "?"}, "summary": {"en": "?"}}}
            }
        }"#;
        let t: Tree = serde_json::from_str(json).unwrap();
        let report = validate(&t, "en");
        assert!(report.errors.contains(&Issue::EmptyTypeCode("leaf".into())));
    }
}
