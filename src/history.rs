/// Sample descriptions offered on a fresh start.
pub const EXAMPLE_DESCRIPTIONS: [&str; 3] = [
    "Mam 18 lat i jestem piękna, a moje średnie tempo na 5 km to 4\"59'",
    "Mam 28 lat, nie jestem m, a moje średnie tempo na 5 km to 4\"33'",
    "Jestem 35-letnim mężczyzną, a mój czas na 5 km to 22:30.",
];

/// Ordered log of submitted descriptions with a cursor. There is always at
/// least one slot; a blank slot, when present, is the trailing one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputHistory {
    entries: Vec<String>,
    cursor: usize,
}

impl Default for InputHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl InputHistory {
    pub fn new() -> Self {
        Self {
            entries: vec![String::new()],
            cursor: 0,
        }
    }

    /// Prefill with example entries followed by a blank slot under the cursor.
    pub fn with_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut history = Self::new();
        for entry in entries {
            let entry = entry.into();
            if !is_blank(&entry) && !history.entries.contains(&entry) {
                history.entries.insert(history.entries.len() - 1, entry);
            }
        }
        history.cursor = history.entries.len() - 1;
        history
    }

    pub fn with_examples() -> Self {
        Self::with_entries(EXAMPLE_DESCRIPTIONS)
    }

    pub fn record_draft(&mut self, text: &str) {
        if is_blank(text) || text == self.current_text() {
            return;
        }

        if let Some(existing) = self.entries.iter().position(|e| e == text) {
            self.entries.remove(existing);
        }

        match self.entries.last_mut() {
            Some(last) if last.is_empty() => *last = text.to_string(),
            _ => self.entries.push(text.to_string()),
        }
        self.cursor = self.entries.len() - 1;
    }

    pub fn navigate_prev(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn navigate_next(&mut self) {
        if self.cursor + 1 < self.entries.len() {
            self.cursor += 1;
        }
    }

    pub fn delete_current(&mut self) {
        if self.entries.len() == 1 {
            return;
        }
        self.entries.remove(self.cursor);
        self.cursor = self.cursor.min(self.entries.len() - 1);
    }

    pub fn clear_current(&mut self) {
        if self.entries.last().is_some_and(|e| !e.is_empty()) {
            self.entries.push(String::new());
        }
        self.cursor = self.entries.len() - 1;
    }

    pub fn current_text(&self) -> &str {
        &self.entries[self.cursor]
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// Entries before and after the cursor, for the navigation hints.
    pub fn position_hint(&self) -> (usize, usize) {
        (self.cursor, self.entries.len() - self.cursor - 1)
    }
}

fn is_blank(text: &str) -> bool {
    text.trim().is_empty()
}
