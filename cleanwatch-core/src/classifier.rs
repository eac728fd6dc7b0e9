//! Streaming line classifier.
//!
//! Each inbound line is run through an ordered table of rules. The first rule
//! that recognises the line decides its [`ClassificationResult`]; later rules are
//! never consulted. Rules only look at the current line, so classification is
//! deterministic and free of hidden state: the same line always classifies the
//! same way. State changes (captured final output, output path) are returned as
//! [`StateMutation`]s for the controller to apply.
//!
//! # Rule order
//!
//! | # | Rule               | Result                                  |
//! |---|--------------------|-----------------------------------------|
//! | 1 | final-output       | `FinalOutputCaptured` + parser events   |
//! | 2 | issues-truncation  | `ActivityItem` (commentary only)        |
//! | 3 | noise-suppression  | `Suppressed` for echoed script source   |
//! | 4 | embedded-payload   | `AgentAnalysis`                         |
//! | 5 | tool-call          | `ToolCall`                              |
//! | 6 | tool-output        | `ToolOutput`                            |
//! | 7 | path-announcement  | `OutputPathFound`                       |
//! | 8 | default            | `ActivityItem`, or `Suppressed` if blank|

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use crate::result_parser::{self, CODE_EXECUTION_RESULT, PATH_TOKEN};
use crate::types::{ClassificationResult, StateMutation};

/// Prefix of the process's terminal summary line.
pub const FINAL_OUTPUT_PREFIX: &str = "Final output:";

const ISSUES_MARKER: &str = "Issues:";
const CURRENT_SCRIPT_MARKER: &str = "Current script:";
const TOOL_CALL_MARKER: &str = "[calling tool → ";
const TOOL_OUTPUT_MARKER: &str = "[tool output]";
const TOOL_OUTPUT_PREFIX: &str = "[tool output] ";
const PATH_ANNOUNCEMENT: &str = "data available at:";
const PYTHON_FENCE: &str = "```python";
const ANY_FENCE: &str = "```";
const ESCAPED_NEWLINE: &str = "\\n";

/// Lines containing any of these are never treated as script noise.
const SUPPRESSION_EXEMPT: &[&str] = &[
    "[calling tool",
    "[tool output]",
    "=== Run",
    "switched to:",
    "Cleaned data available",
];

/// Statement prefixes that mark echoed script source (checked on the trimmed line).
const STATEMENT_PREFIXES: &[&str] = &["def ", "import ", "from ", "with open"];

/// Expression prefixes that mark echoed script source (checked on the trimmed line).
const EXPRESSION_PREFIXES: &[&str] = &["return ", "for ", "if "];

static PATH_AFTER_AT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"at:\s+{PATH_TOKEN}")).expect("path pattern is valid")
});

/// Which behaviour the classifier applies to every line.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassifierMode {
    /// Full rule table.
    #[default]
    Classified,
    /// Every non-blank line becomes an `ActivityItem`; nothing is parsed.
    Plain,
}

impl ClassifierMode {
    /// Lowercase name, as written in the config file and the status bar.
    pub fn label(self) -> &'static str {
        match self {
            ClassifierMode::Classified => "classified",
            ClassifierMode::Plain => "plain",
        }
    }

    /// The other mode; bound to the `p` key.
    pub fn toggled(self) -> Self {
        match self {
            ClassifierMode::Classified => ClassifierMode::Plain,
            ClassifierMode::Plain => ClassifierMode::Classified,
        }
    }
}

/// Everything the classifier decided about one line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    /// Name of the rule that matched.
    pub rule: &'static str,
    /// The one classification for this line.
    pub result: ClassificationResult,
    /// Events to render, in order. Empty for `Suppressed`; the parser's events
    /// for `FinalOutputCaptured`; otherwise just `result`.
    pub events: Vec<ClassificationResult>,
    /// State changes to apply, in order.
    pub mutations: Vec<StateMutation>,
}

/// One entry of the rule table: a name and a matcher that returns `Some` when
/// the rule claims the line.
struct Rule {
    name: &'static str,
    apply: fn(&str) -> Option<ClassificationResult>,
}

const RULES: &[Rule] = &[
    Rule { name: "final-output", apply: final_output },
    Rule { name: "issues-truncation", apply: issues_truncation },
    Rule { name: "noise-suppression", apply: noise_suppression },
    Rule { name: "embedded-payload", apply: embedded_payload },
    Rule { name: "tool-call", apply: tool_call },
    Rule { name: "tool-output", apply: tool_output },
    Rule { name: "path-announcement", apply: path_announcement },
    Rule { name: "default", apply: default_rule },
];

/// Stateless line classifier. Cheap to construct; rebuilt for every run.
#[derive(Debug, Default, Clone, Copy)]
pub struct LineClassifier {
    mode: ClassifierMode,
}

impl LineClassifier {
    pub fn new(mode: ClassifierMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> ClassifierMode {
        self.mode
    }

    /// Classifies one line.
    ///
    /// Never fails and never blocks. Malformed embedded JSON falls through to
    /// the remaining rules.
    pub fn classify(&self, line: &str) -> Classification {
        let (rule, result) = match self.mode {
            ClassifierMode::Classified => RULES
                .iter()
                .find_map(|r| (r.apply)(line).map(|result| (r.name, result)))
                .unwrap_or(("default", ClassificationResult::Suppressed)),
            ClassifierMode::Plain => {
                ("plain", default_rule(line).unwrap_or(ClassificationResult::Suppressed))
            }
        };

        let (events, mutations) = match &result {
            ClassificationResult::Suppressed => (Vec::new(), Vec::new()),
            ClassificationResult::FinalOutputCaptured { raw } => {
                let events = result_parser::parse(raw);
                let mut mutations = vec![StateMutation::CaptureFinalOutput(raw.clone())];
                mutations.extend(StateMutation::from_events(&events));
                (events, mutations)
            }
            other => {
                let events = vec![other.clone()];
                let mutations = StateMutation::from_events(&events);
                (events, mutations)
            }
        };

        if events.is_empty() {
            tracing::trace!(rule, "line produced no events");
        }

        Classification { rule, result, events, mutations }
    }
}

/// Rule 1: `Final output:` prefix. The trimmed remainder is the payload.
fn final_output(line: &str) -> Option<ClassificationResult> {
    let raw = line.strip_prefix(FINAL_OUTPUT_PREFIX)?;
    Some(ClassificationResult::FinalOutputCaptured { raw: raw.trim().to_owned() })
}

/// Rule 2: diagnostic commentary followed by a full script dump on one line.
/// Only the commentary before `Current script:` is kept.
fn issues_truncation(line: &str) -> Option<ClassificationResult> {
    if !(line.contains(ISSUES_MARKER) && line.contains(CURRENT_SCRIPT_MARKER)) {
        return None;
    }
    let head = line.split(CURRENT_SCRIPT_MARKER).next().unwrap_or_default().trim();
    if head.is_empty() {
        Some(ClassificationResult::Suppressed)
    } else {
        Some(ClassificationResult::ActivityItem { text: head.to_owned() })
    }
}

/// Rule 3: echoed script source. Claims the line only to suppress it.
fn noise_suppression(line: &str) -> Option<ClassificationResult> {
    if SUPPRESSION_EXEMPT.iter().any(|m| line.contains(m)) {
        return None;
    }
    if is_statement_noise(line) || is_expression_noise(line) {
        Some(ClassificationResult::Suppressed)
    } else {
        None
    }
}

/// Group A: comments, definitions, imports, file handling, fenced code.
fn is_statement_noise(line: &str) -> bool {
    let trimmed = line.trim();
    let has_issues = line.contains(ISSUES_MARKER);
    (trimmed.starts_with("# ") && !has_issues)
        || STATEMENT_PREFIXES.iter().any(|p| trimmed.starts_with(p))
        || line.contains("infile:")
        || line.contains(PYTHON_FENCE)
}

/// Group B: indented bodies, control flow, assignments, escaped newlines.
fn is_expression_noise(line: &str) -> bool {
    let trimmed = line.trim();
    let has_issues = line.contains(ISSUES_MARKER);
    line.starts_with("    ")
        || (!has_issues && EXPRESSION_PREFIXES.iter().any(|p| trimmed.starts_with(p)))
        || (line.contains('=') && !has_issues)
        || (line.contains(ESCAPED_NEWLINE) && !line.contains(ANY_FENCE))
}

/// Rule 4: a bare JSON object announcing a code-execution result.
fn embedded_payload(line: &str) -> Option<ClassificationResult> {
    let trimmed = line.trim();
    if !(trimmed.starts_with('{') && trimmed.ends_with('}')) {
        return None;
    }
    let Ok(Value::Object(map)) = serde_json::from_str::<Value>(trimmed) else {
        return None;
    };
    if map.get("type").and_then(Value::as_str) != Some(CODE_EXECUTION_RESULT) {
        return None;
    }
    Some(ClassificationResult::AgentAnalysis {
        content: result_parser::content_text(map.get("content")),
    })
}

/// Rule 5: tool invocation, kept verbatim.
fn tool_call(line: &str) -> Option<ClassificationResult> {
    line.contains(TOOL_CALL_MARKER)
        .then(|| ClassificationResult::ToolCall { text: line.to_owned() })
}

/// Rule 6: tool result, with the first `[tool output] ` marker removed.
fn tool_output(line: &str) -> Option<ClassificationResult> {
    line.contains(TOOL_OUTPUT_MARKER).then(|| ClassificationResult::ToolOutput {
        text: line.replacen(TOOL_OUTPUT_PREFIX, "", 1),
    })
}

/// Rule 7: inline `... data available at: <path>` announcement.
///
/// A matching line with no path token is claimed and suppressed.
fn path_announcement(line: &str) -> Option<ClassificationResult> {
    if !line.contains(PATH_ANNOUNCEMENT) {
        return None;
    }
    Some(match PATH_AFTER_AT.captures(line) {
        Some(caps) => ClassificationResult::OutputPathFound { path: caps[1].to_owned() },
        None => ClassificationResult::Suppressed,
    })
}

/// Rule 8: everything else. Blank lines are suppressed.
fn default_rule(line: &str) -> Option<ClassificationResult> {
    if line.trim().is_empty() {
        Some(ClassificationResult::Suppressed)
    } else {
        Some(ClassificationResult::ActivityItem { text: line.to_owned() })
    }
}
