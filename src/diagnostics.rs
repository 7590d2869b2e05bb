//! Parse-error rendering: byte offsets become 1-based (row, col) pairs.

use lalrpop_util::ParseError;

/// Converts a byte offset within `source` to a 1-based `(row, col)` pair.
pub fn byte_to_row_col(source: &str, byte: usize) -> (usize, usize) {
    let mut row = 1;
    let mut col = 1;
    for (i, ch) in source.char_indices() {
        if i >= byte {
            break;
        }
        if ch == '\n' {
            row += 1;
            col = 1;
        } else {
            col += 1;
        }
    }
    (row, col)
}

/// Renders a lalrpop parse error with its source position.
pub fn render_parse_error<T, E>(source: &str, err: &ParseError<usize, T, E>) -> String
where
    T: std::fmt::Display,
    E: std::fmt::Display,
{
    let location = match err {
        ParseError::InvalidToken { location } => Some(*location),
        ParseError::UnrecognizedEof { location, .. } => Some(*location),
        ParseError::UnrecognizedToken {
            token: (start, _, _),
            ..
        } => Some(*start),
        ParseError::ExtraToken {
            token: (start, _, _),
        } => Some(*start),
        ParseError::User { .. } => None,
    };

    match location {
        Some(byte) => {
            let (row, col) = byte_to_row_col(source, byte);
            format!("{} at {}:{}", describe(err), row, col)
        }
        None => describe(err),
    }
}

fn describe<T, E>(err: &ParseError<usize, T, E>) -> String
where
    T: std::fmt::Display,
    E: std::fmt::Display,
{
    match err {
        ParseError::InvalidToken { .. } => "invalid token".to_string(),
        ParseError::UnrecognizedEof { expected, .. } => {
            format!("unexpected end of file, expected one of {}", expected.join(", "))
        }
        ParseError::UnrecognizedToken {
            token: (_, token, _),
            expected,
        } => format!(
            "unexpected token '{}', expected one of {}",
            token,
            expected.join(", ")
        ),
        ParseError::ExtraToken {
            token: (_, token, _),
        } => format!("extra token '{}'", token),
        ParseError::User { error } => error.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_col_counting() {
        let src = "abc\ndef\n";
        assert_eq!(byte_to_row_col(src, 0), (1, 1));
        assert_eq!(byte_to_row_col(src, 2), (1, 3));
        assert_eq!(byte_to_row_col(src, 4), (2, 1));
        assert_eq!(byte_to_row_col(src, 6), (2, 3));
    }
}
