// HTML escaping for serialized text and attribute values.

/// Escape a text run for element content.
///
/// A space that starts or ends a line, or follows another space, would be
/// collapsed by an HTML parser, so it is written as `&nbsp;`. A line is a
/// text block or the part of one between two soft breaks.
pub(crate) fn escape_text(value: &str, at_line_start: bool, at_line_end: bool) -> String {
    let count = value.chars().count();
    let mut out = String::with_capacity(value.len());
    let mut previous_space = false;

    for (i, c) in value.chars().enumerate() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            ' ' => {
                let starts_line = i == 0 && at_line_start;
                let ends_line = i + 1 == count && at_line_end;
                if previous_space || starts_line || ends_line {
                    out.push_str("&nbsp;");
                } else {
                    out.push(' ');
                }
            }
            _ => out.push(c),
        }
        previous_space = c == ' ';
    }

    out
}

/// Escape an attribute value for a double-quoted attribute.
pub(crate) fn escape_attribute(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '<' => out.push_str("&lt;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_markup() {
        assert_eq!(escape_text("a < b & c", true, true), "a &lt; b &amp; c");
    }

    #[test]
    fn test_significant_spaces() {
        assert_eq!(escape_text(" a  b ", true, true), "&nbsp;a &nbsp;b&nbsp;");
        assert_eq!(escape_text(" a ", false, false), " a ");
    }

    #[test]
    fn test_escape_attribute() {
        assert_eq!(escape_attribute(r#"say "hi" & go"#), "say &quot;hi&quot; &amp; go");
    }
}
