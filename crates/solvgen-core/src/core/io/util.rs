/// Formats a float with the shortest round-trip digits, always with a decimal
/// point.
pub(crate) fn format_decimal(value: f64) -> String {
    let text = format!("{}", value);
    if !value.is_finite() || text.contains('.') {
        text
    } else {
        format!("{}.0", text)
    }
}

/// Splits an extended XYZ comment line into `key=value` pairs. Values may be wrapped
/// in double quotes to contain whitespace; bare keys map to `"T"`.
pub(crate) fn split_key_values(line: &str) -> Result<Vec<(String, String)>, String> {
    let mut pairs = Vec::new();
    let mut chars = line.chars().peekable();

    loop {
        while chars.peek().is_some_and(|c| c.is_whitespace()) {
            chars.next();
        }
        if chars.peek().is_none() {
            break;
        }

        let mut key = String::new();
        while let Some(&c) = chars.peek() {
            if c == '=' || c.is_whitespace() {
                break;
            }
            key.push(c);
            chars.next();
        }

        if chars.peek() != Some(&'=') {
            pairs.push((key, "T".to_string()));
            continue;
        }
        chars.next();

        let mut value = String::new();
        if chars.peek() == Some(&'"') {
            chars.next();
            let mut closed = false;
            for c in chars.by_ref() {
                if c == '"' {
                    closed = true;
                    break;
                }
                value.push(c);
            }
            if !closed {
                return Err(format!("unterminated quoted value for key '{}'", key));
            }
        } else {
            while let Some(&c) = chars.peek() {
                if c.is_whitespace() {
                    break;
                }
                value.push(c);
                chars.next();
            }
        }
        pairs.push((key, value));
    }

    Ok(pairs)
}
