//! Line splitting shared by the text-file parsers.

/// Splits decoded text into lines.
///
/// CRLF is canonical for QWK text files; a bare LF is tolerated. A final
/// line terminator does not produce a trailing empty line.
pub(crate) fn split_lines(text: &str) -> Vec<String> {
    let mut lines: Vec<String> = text
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line).to_string())
        .collect();

    if lines.last().map_or(false, String::is_empty) {
        lines.pop();
    }

    lines
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_split_lines() {
        assert_eq!(split_lines("a\r\nb\r\n"), ["a", "b"]);
        assert_eq!(split_lines("a\nb"), ["a", "b"]);
        assert_eq!(split_lines("a\r\n\r\nb\r\n"), ["a", "", "b"]);
        assert_eq!(split_lines(""), Vec::<String>::new());
    }
}
