//! Operand text parsing

use num_traits::Num;

/// Parse an integer literal.
///
/// Literals may carry a `0x`, `0o` or `0b` prefix and use `_` as a digit
/// separator. Anything else, including a sign, is rejected.
pub fn parse_literal<T>(text: &str) -> Option<T>
where
    T: Num,
{
    let text = text.trim();
    let lower = text.to_ascii_lowercase();

    let (digits, radix) = if let Some(rest) = lower.strip_prefix("0x") {
        (rest, 16)
    } else if let Some(rest) = lower.strip_prefix("0o") {
        (rest, 8)
    } else if let Some(rest) = lower.strip_prefix("0b") {
        (rest, 2)
    } else {
        (lower.as_str(), 10)
    };

    if digits.starts_with('_') {
        return None;
    }

    let digits: String = digits.chars().filter(|c| *c != '_').collect();
    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return None;
    }

    T::from_str_radix(&digits, radix).ok()
}

fn code_point(hex: &str) -> Option<char> {
    if hex.is_empty() || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }

    std::char::from_u32(u32::from_str_radix(hex, 16).ok()?)
}

/// Expand the escapes in the body of a string operand.
///
/// Returns `None` on an unknown or malformed escape, or on a bare `"`.
pub fn unescape(text: &str) -> Option<String> {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();

    while let Some(c) = chars.next() {
        match c {
            '"' => return None,
            '\\' => {}
            c => {
                out.push(c);
                continue;
            }
        }

        let escaped = match chars.next()? {
            'n' => '\n',
            't' => '\t',
            'r' => '\r',
            '0' => '\0',
            '\\' => '\\',
            '"' => '"',
            'x' => {
                let hex: String = chars.by_ref().take(2).collect();
                if hex.len() != 2 {
                    return None;
                }

                code_point(&hex)?
            }
            'u' => {
                if chars.next()? != '{' {
                    return None;
                }

                let mut hex = String::new();
                loop {
                    match chars.next()? {
                        '}' => break,
                        c => hex.push(c),
                    }
                }

                if hex.len() > 6 {
                    return None;
                }

                code_point(&hex)?
            }
            _ => return None,
        };

        out.push(escaped);
    }

    Some(out)
}
