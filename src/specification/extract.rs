//! Pulling a specification out of a model reply.
//!
//! Grammar: the first pair of triple-backtick fences delimits the document;
//! everything between them (including any info string such as `markdown`)
//! is taken and trimmed. Without a closed pair the whole reply is taken.

/// Literal reply meaning "nothing to write".
pub const SENTINEL: &str = "N/A";

const FENCE: &str = "```";

/// Extract the specification text from a raw reply.
///
/// Returns `None` when the result is empty or the sentinel.
pub fn extract_specification(raw: &str) -> Option<String> {
    let candidate = fenced_span(raw).unwrap_or(raw).trim();

    if candidate.is_empty() || candidate == SENTINEL {
        None
    } else {
        Some(candidate.to_string())
    }
}

/// Interior of the first closed fence pair. The interior must be non-empty.
fn fenced_span(raw: &str) -> Option<&str> {
    let open = raw.find(FENCE)?;
    let body_start = open + FENCE.len();
    // A closing fence immediately after the opening one does not count
    let search_from = body_start + raw[body_start..].chars().next()?.len_utf8();
    let close = raw[search_from..].find(FENCE)? + search_from;
    Some(&raw[body_start..close])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fenced_block_is_extracted() {
        let raw = "Here you go:\n```# Title\nbody\n```\ntrailing chatter";
        assert_eq!(extract_specification(raw).as_deref(), Some("# Title\nbody"));
    }

    #[test]
    fn test_info_string_is_kept() {
        let raw = "```markdown\n# Spec\n```";
        assert_eq!(extract_specification(raw).as_deref(), Some("markdown\n# Spec"));
    }

    #[test]
    fn test_only_first_block() {
        let raw = "```one```\n```two```";
        assert_eq!(extract_specification(raw).as_deref(), Some("one"));
    }

    #[test]
    fn test_unfenced_reply_is_used_whole() {
        assert_eq!(extract_specification("  # Spec\n\n").as_deref(), Some("# Spec"));
        assert_eq!(extract_specification("```unterminated").as_deref(), Some("```unterminated"));
    }

    #[test]
    fn test_sentinel_and_empty() {
        assert_eq!(extract_specification("N/A"), None);
        assert_eq!(extract_specification("  N/A \n"), None);
        assert_eq!(extract_specification("```N/A```"), None);
        assert_eq!(extract_specification(""), None);
        assert_eq!(extract_specification("```  \n```"), None);
    }

    #[test]
    fn test_lowercase_sentinel_is_content() {
        assert_eq!(extract_specification("n/a").as_deref(), Some("n/a"));
    }
}
