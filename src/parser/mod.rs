//! Extraction of structured project directives from raw assistant text.
//!
//! Every pass below runs independently over the same immutable text. A pass
//! that finds nothing leaves its field unset; nothing here ever fails.

use crate::models::{Action, CodeProjectDirectives, FileEdit, FileMove, FileWrite, ParsedResult};
use regex::Regex;
use std::sync::LazyLock;

static THINKING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<Thinking>(.*?)</Thinking>").expect("thinking pattern"));

static ACTIONS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<Actions>(.*?)</Actions>").expect("actions pattern"));

static ACTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<Action\s+name="([^"]*)"\s+description="([^"]*)"\s*/>"#).expect("action pattern")
});

static CODE_PROJECT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)<CodeProject\s+id="([^"]*)"\s*>(.*?)</CodeProject>"#)
        .expect("code project pattern")
});

// The leading word is the fence language and is discarded.
static FILE_FENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)```[\w.+-]*[ \t]*file="([^"]*)"(?:[ \t]+type="([^"]*)")?[^\n]*\n(.*?)```"#)
        .expect("file fence pattern")
});

static QUICK_EDIT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?s)<QuickEdit>\s*```[\w.+-]*[ \t]*file="([^"]*)"[^\n]*\n(.*?)```\s*</QuickEdit>"#,
    )
    .expect("quick edit pattern")
});

static DELETE_FILE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<DeleteFile\s+file="([^"]*)"\s*/>"#).expect("delete file pattern")
});

static MOVE_FILE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<MoveFile\s+from="([^"]*)"\s+to="([^"]*)"\s*/>"#).expect("move file pattern")
});

/// Parses a raw assistant response into a successful [`ParsedResult`].
///
/// The raw text is kept verbatim in `content`. Only the first `<Thinking>`,
/// `<Actions>` and `<CodeProject>` block is honoured; later ones are ignored.
pub fn parse(raw_text: &str) -> ParsedResult {
    let mut result = ParsedResult::success(raw_text);
    result.thinking = extract_thinking(raw_text);
    result.actions = extract_actions(raw_text);
    result.code_project = extract_code_project(raw_text);

    log::debug!(
        "Parsed response: {} chars, thinking: {}, actions: {:?}, directives: {:?}",
        raw_text.len(),
        result.thinking.is_some(),
        result.actions.as_ref().map(Vec::len),
        result.code_project.as_ref().map(CodeProjectDirectives::len),
    );

    result
}

fn extract_thinking(text: &str) -> Option<String> {
    THINKING
        .captures(text)
        .map(|caps| caps[1].trim().to_string())
}

/// `None` when there is no `<Actions>` block, `Some(vec![])` when the block is empty.
fn extract_actions(text: &str) -> Option<Vec<Action>> {
    let caps = ACTIONS.captures(text)?;
    let body = caps.get(1).map_or("", |m| m.as_str());

    Some(
        ACTION
            .captures_iter(body)
            .map(|action| Action {
                name: action[1].to_string(),
                description: action[2].to_string(),
            })
            .collect(),
    )
}

fn extract_code_project(text: &str) -> Option<CodeProjectDirectives> {
    let caps = CODE_PROJECT.captures(text)?;
    let id = caps[1].to_string();
    let body = caps.get(2).map_or("", |m| m.as_str());

    let directives = CodeProjectDirectives {
        id,
        files: extract_file_writes(body),
        edits: extract_quick_edits(body),
        delete_files: extract_deletes(body),
        move_files: extract_moves(body),
    };

    if directives.is_empty() {
        log::debug!("Code project '{}' carried no directives", directives.id);
        return None;
    }

    Some(directives)
}

fn extract_file_writes(body: &str) -> Vec<FileWrite> {
    FILE_FENCE
        .captures_iter(body)
        .map(|caps| FileWrite {
            path: caps[1].to_string(),
            content: caps[3].trim().to_string(),
            file_type: caps.get(2).map(|m| m.as_str().to_string()),
        })
        .collect()
}

fn extract_quick_edits(body: &str) -> Vec<FileEdit> {
    QUICK_EDIT
        .captures_iter(body)
        .map(|caps| FileEdit {
            path: caps[1].to_string(),
            instructions: caps[2].trim().to_string(),
        })
        .collect()
}

fn extract_deletes(body: &str) -> Vec<String> {
    DELETE_FILE
        .captures_iter(body)
        .map(|caps| caps[1].to_string())
        .collect()
}

fn extract_moves(body: &str) -> Vec<FileMove> {
    MOVE_FILE
        .captures_iter(body)
        .map(|caps| FileMove {
            from: caps[1].to_string(),
            to: caps[2].to_string(),
        })
        .collect()
}
