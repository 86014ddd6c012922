/// Strips blank and all-comment lines from source text and maps cleaned
/// offsets back to original `(line, column, line_text)` triples for
/// diagnostic rendering.
///
/// Cleaning keeps every line that contains at least one non-whitespace
/// character, trims its trailing whitespace, and re-appends a newline.
/// A line whose first two characters are `//` is treated as the end of
/// cleanable input entirely (not merely skipped) — later lines, even
/// non-comment ones, are dropped. This mirrors the line-oriented
/// pre-pass the rest of the pipeline expects to see, rather than a
/// strip-comments-everywhere pass.
#[derive(Debug, Default)]
pub struct SourceMap {
    /// Each kept line, trailing-trimmed, with its newline re-appended.
    kept_lines: Vec<String>,
    /// Number of lines dropped strictly before the kept line at the same index.
    deleted_before: Vec<usize>,
}

impl SourceMap {
    pub fn new() -> Self {
        SourceMap::default()
    }

    /// Clean `text`, returning the cleaned source and recording enough
    /// bookkeeping to answer `locate` against offsets in that cleaned text.
    pub fn clean(&mut self, text: &str) -> String {
        self.kept_lines.clear();
        self.deleted_before.clear();

        let mut cleaned = String::new();
        let mut deleted = 0usize;

        for line in text.split('\n') {
            if line.len() >= 2 && &line[0..2] == "//" {
                deleted += 1;
                break;
            }
            if line.chars().any(|c| !c.is_whitespace()) {
                let trimmed_end = line.trim_end_matches(|c: char| c.is_whitespace());
                let mut kept = String::with_capacity(trimmed_end.len() + 1);
                kept.push_str(trimmed_end);
                kept.push('\n');
                cleaned.push_str(&kept);
                self.deleted_before.push(deleted);
                self.kept_lines.push(kept);
            } else {
                deleted += 1;
            }
        }

        cleaned
    }

    /// Map a byte offset in the cleaned text back to the original
    /// `(line_number, column, line_text)`, where `line_number` is
    /// 1-based and counted against the *original* (uncleaned) file.
    pub fn locate(&self, offset: usize) -> (usize, usize, String) {
        if self.kept_lines.is_empty() {
            return (1, 0, String::new());
        }

        let mut cur_len = 0usize;
        let mut line_idx = 0usize;
        let mut col = 0usize;
        let mut found = false;

        for (idx, line) in self.kept_lines.iter().enumerate() {
            if cur_len + line.len() <= offset {
                cur_len += line.len();
                line_idx = idx + 1;
            } else {
                col = offset - cur_len;
                line_idx = idx;
                found = true;
                break;
            }
        }

        if !found || line_idx >= self.kept_lines.len() {
            line_idx = self.kept_lines.len() - 1;
            col = self.kept_lines[line_idx].len().saturating_sub(1);
        } else if col >= self.kept_lines[line_idx].len() {
            col = self.kept_lines[line_idx].len().saturating_sub(1);
        }

        let line_number = line_idx + self.deleted_before[line_idx] + 1;
        let display: String = self.kept_lines[line_idx]
            .trim_end_matches('\n')
            .chars()
            .map(|c| if c == '\t' { ' ' } else { c })
            .collect();

        (line_number, col, display)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_blank_lines_and_trailing_whitespace() {
        let mut map = SourceMap::new();
        let cleaned = map.clean("x = 1   \n\n\ny = 2\n");
        assert_eq!(cleaned, "x = 1\ny = 2\n");
    }

    #[test]
    fn all_comment_line_ends_cleaning() {
        let mut map = SourceMap::new();
        let cleaned = map.clean("x = 1\n// trailing comment\ny = 2\n");
        assert_eq!(cleaned, "x = 1\n");
    }

    #[test]
    fn locate_maps_offset_back_to_original_line_numbering() {
        let mut map = SourceMap::new();
        let cleaned = map.clean("a = 1\n\nb = 2\n");
        // "b = 2" begins right after "a = 1\n" in the cleaned text (offset 6).
        let offset = cleaned.find('b').unwrap();
        let (line, col, text) = map.locate(offset);
        assert_eq!(line, 3);
        assert_eq!(col, 0);
        assert_eq!(text, "b = 2");
    }
}
