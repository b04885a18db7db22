/// Append-only log of free-text insight lines.
#[derive(Debug, Default)]
pub struct InsightLog {
    lines: Vec<String>,
}

impl InsightLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append lines in the order given.
    pub fn extend<I, S>(&mut self, lines: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.lines.extend(lines.into_iter().map(Into::into));
    }

    /// Lines, newest first.
    pub fn list(&self) -> Vec<String> {
        self.lines.iter().rev().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Trim each line and drop the blank ones.
pub fn clean_lines<S: AsRef<str>>(lines: &[S]) -> Vec<String> {
    lines
        .iter()
        .map(|l| l.as_ref().trim())
        .filter(|l| !l.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_newest_first() {
        let mut log = InsightLog::new();
        log.extend(["a", "b"]);
        log.extend(vec!["c".to_string()]);
        assert_eq!(log.list(), vec!["c", "b", "a"]);
        assert_eq!(log.list(), log.list());
    }

    #[test]
    fn test_clean_lines() {
        let cleaned = clean_lines(&["  one ", "", "   ", "two\r"]);
        assert_eq!(cleaned, vec!["one", "two"]);
    }
}
