//! Offset-to-line/column translation.
//!
//! Built once from the raw source buffer (escape spellings untouched) and
//! queried by diagnostic sinks. Recognizes `\n`, `\r`, and `\r\n` line
//! terminators. Lines and columns are 1-based; columns count bytes, since
//! the front end positions everything by byte offset.

/// Translates byte offsets to 1-based line/column pairs.
pub struct LineMap {
    /// Byte offset of the first character of each line.
    line_starts: Vec<u32>,
}

impl LineMap {
    /// Build a line map from raw source text.
    #[allow(
        clippy::cast_possible_truncation,
        reason = "source length is bounded by u32 span offsets"
    )]
    pub fn new(source: &str) -> Self {
        let bytes = source.as_bytes();
        let mut line_starts = vec![0u32];
        let mut i = 0;
        while i < bytes.len() {
            match bytes[i] {
                b'\n' => {
                    line_starts.push((i + 1) as u32);
                    i += 1;
                }
                b'\r' => {
                    // CRLF counts as one terminator
                    let next = if bytes.get(i + 1) == Some(&b'\n') {
                        i + 2
                    } else {
                        i + 1
                    };
                    line_starts.push(next as u32);
                    i = next;
                }
                _ => i += 1,
            }
        }
        LineMap { line_starts }
    }

    /// Number of lines (a trailing terminator starts a final empty line).
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// 1-based line number containing `offset`.
    pub fn line(&self, offset: u32) -> u32 {
        #[allow(
            clippy::cast_possible_truncation,
            reason = "line count is bounded by source length"
        )]
        match self.line_starts.binary_search(&offset) {
            Ok(idx) => idx as u32 + 1,
            Err(idx) => idx as u32,
        }
    }

    /// 1-based (line, column) for a byte offset.
    pub fn line_col(&self, offset: u32) -> (u32, u32) {
        let line = self.line(offset);
        let start = self.line_starts[(line - 1) as usize];
        (line, offset - start + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_line() {
        let map = LineMap::new("hello");
        assert_eq!(map.line_count(), 1);
        assert_eq!(map.line_col(0), (1, 1));
        assert_eq!(map.line_col(4), (1, 5));
    }

    #[test]
    fn lf_terminators() {
        let map = LineMap::new("ab\ncd\nef");
        assert_eq!(map.line_count(), 3);
        assert_eq!(map.line_col(0), (1, 1));
        assert_eq!(map.line_col(3), (2, 1));
        assert_eq!(map.line_col(4), (2, 2));
        assert_eq!(map.line_col(6), (3, 1));
    }

    #[test]
    fn crlf_counts_as_one_terminator() {
        let map = LineMap::new("ab\r\ncd");
        assert_eq!(map.line_count(), 2);
        assert_eq!(map.line_col(4), (2, 1));
    }

    #[test]
    fn lone_cr_terminates_a_line() {
        let map = LineMap::new("ab\rcd");
        assert_eq!(map.line_count(), 2);
        assert_eq!(map.line_col(3), (2, 1));
    }

    #[test]
    fn offset_at_line_start() {
        let map = LineMap::new("a\nb\nc");
        // exactly at each line start
        assert_eq!(map.line(0), 1);
        assert_eq!(map.line(2), 2);
        assert_eq!(map.line(4), 3);
    }

    #[test]
    fn empty_source() {
        let map = LineMap::new("");
        assert_eq!(map.line_count(), 1);
        assert_eq!(map.line_col(0), (1, 1));
    }
}
