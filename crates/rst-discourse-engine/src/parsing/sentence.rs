use regex::Regex;
use std::sync::LazyLock;

/// A token ending a sentence: `.`, `?` or `!`, optionally followed by a
/// quote mark, optionally followed by trailing whitespace.
static SENTENCE_TERMINAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[.?!]['"]?\s*$"#).expect("invalid sentence-terminal regex"));

/// Split segment text into tokens. Whitespace-delimited, empty tokens
/// discarded.
pub(crate) fn tokenize(text: &str) -> impl Iterator<Item = &str> {
    text.split_whitespace()
}

pub(crate) fn is_sentence_terminal(token: &str) -> bool {
    SENTENCE_TERMINAL.is_match(token)
}

/// Sentence and token assignment for one segment, threaded through the
/// builder's linear pass over segments in reading order.
#[derive(Debug)]
pub(crate) struct SentenceAssigner {
    sentence_id: u32,
    token_cursor: u32,
}

impl SentenceAssigner {
    pub(crate) fn new() -> Self {
        Self {
            sentence_id: 1,
            token_cursor: 1,
        }
    }

    /// Assign IDs for the next segment in reading order.
    ///
    /// Returns `(sentence_id, initial_token_id)` for the segment and advances
    /// the cursors. A segment whose last token is sentence-terminal bumps the
    /// sentence counter for the *next* segment; a zero-token segment neither
    /// advances the token cursor nor ends a sentence.
    pub(crate) fn assign(&mut self, text: &str) -> (u32, u32) {
        let assigned = (self.sentence_id, self.token_cursor);

        let mut token_count = 0u32;
        let mut last_token = None;
        for token in tokenize(text) {
            token_count += 1;
            last_token = Some(token);
        }
        self.token_cursor += token_count;

        if let Some(token) = last_token
            && is_sentence_terminal(token)
        {
            self.sentence_id += 1;
        }

        assigned
    }
}
