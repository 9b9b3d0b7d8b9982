/// Growing buffer for the generated answer of one session.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AnswerBuffer {
    text: String,
    fragments: usize,
}

impl AnswerBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears the text but keeps the allocation for the next session.
    pub fn reset(&mut self) {
        self.text.clear();
        self.fragments = 0;
    }

    pub fn append(&mut self, fragment: &str) {
        self.text.push_str(fragment);
        self.fragments += 1;
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn snapshot(&self) -> String {
        self.text.clone()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn fragment_count(&self) -> usize {
        self.fragments
    }
}
