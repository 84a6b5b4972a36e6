//! Candidate commands and the selection cursor

/// A proposed shell command together with where it came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suggestion {
    /// The command line, ready to paste into a shell
    pub text: String,
    /// Provenance tag, e.g. the name of the backend that produced it
    pub source: String,
}

impl Suggestion {
    pub fn new(text: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            source: source.into(),
        }
    }
}

/// An ordered list of candidate commands plus the selection cursor.
///
/// The cursor stays within `[0, len-1]` while the list is non-empty and is
/// pinned to `0` when it is empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CandidateList {
    items: Vec<Suggestion>,
    cursor: usize,
}

impl CandidateList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a list from a single suggestion with the cursor on it.
    pub fn single(suggestion: Suggestion) -> Self {
        Self {
            items: vec![suggestion],
            cursor: 0,
        }
    }

    /// Append a suggestion unless an entry with the same text already exists.
    ///
    /// Equality is on `text` only; `source` does not participate, so the same
    /// command arriving from two backends is stored once.
    pub fn push_unique(&mut self, suggestion: Suggestion) -> bool {
        if self.items.iter().any(|s| s.text == suggestion.text) {
            return false;
        }
        self.items.push(suggestion);
        true
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn items(&self) -> &[Suggestion] {
        &self.items
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// The suggestion under the cursor, if any.
    pub fn selected(&self) -> Option<&Suggestion> {
        self.items.get(self.cursor)
    }

    pub fn move_up(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_down(&mut self) {
        if !self.items.is_empty() && self.cursor < self.items.len() - 1 {
            self.cursor += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn list_of(texts: &[&str]) -> CandidateList {
        let mut list = CandidateList::new();
        for t in texts {
            list.push_unique(Suggestion::new(*t, "llm"));
        }
        list
    }

    #[test]
    fn test_push_unique_dedups_on_text() {
        let mut list = CandidateList::new();
        assert!(list.push_unique(Suggestion::new("ls -la", "llm")));
        assert!(!list.push_unique(Suggestion::new("ls -la", "llm")));
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn test_push_unique_ignores_source_in_equality() {
        let mut list = CandidateList::new();
        list.push_unique(Suggestion::new("df -h", "llm"));
        assert!(!list.push_unique(Suggestion::new("df -h", "static")));
        assert_eq!(list.len(), 1);
        assert_eq!(list.items()[0].source, "llm");
    }

    #[test]
    fn test_cursor_clamps_at_ends() {
        let mut list = list_of(&["a", "b"]);
        list.move_up();
        assert_eq!(list.cursor(), 0);
        list.move_down();
        list.move_down();
        list.move_down();
        assert_eq!(list.cursor(), 1);
    }

    #[test]
    fn test_cursor_on_empty_list() {
        let mut list = CandidateList::new();
        list.move_down();
        list.move_up();
        assert_eq!(list.cursor(), 0);
        assert!(list.selected().is_none());
    }

    #[test]
    fn test_selected_follows_cursor() {
        let mut list = list_of(&["a", "b", "c"]);
        list.move_down();
        assert_eq!(list.selected().map(|s| s.text.as_str()), Some("b"));
    }

    proptest! {
        #[test]
        fn prop_cursor_stays_in_bounds(len in 0usize..8, moves in proptest::collection::vec(any::<bool>(), 0..64)) {
            let texts: Vec<String> = (0..len).map(|i| format!("cmd-{i}")).collect();
            let mut list = CandidateList::new();
            for t in &texts {
                list.push_unique(Suggestion::new(t.clone(), "llm"));
            }
            for up in moves {
                if up {
                    list.move_up();
                } else {
                    list.move_down();
                }
                if list.is_empty() {
                    prop_assert_eq!(list.cursor(), 0);
                } else {
                    prop_assert!(list.cursor() < list.len());
                }
            }
        }
    }
}
