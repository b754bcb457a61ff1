//! HTML character reference decoding for message text.

use std::borrow::Cow;

/// Decode `&name;`, `&#NNN;` and `&#xHH;` references.
///
/// Unknown names and invalid code points are left as written.
pub fn unescape(text: &str) -> Cow<'_, str> {
    if !text.contains('&') {
        return Cow::Borrowed(text);
    }

    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let candidate = &rest[amp..];
        match candidate.find(';').and_then(|semi| {
            decode(&candidate[1..semi]).map(|c| (c, semi))
        }) {
            Some((c, semi)) => {
                out.push(c);
                rest = &candidate[semi + 1..];
            }
            None => {
                out.push('&');
                rest = &candidate[1..];
            }
        }
    }
    out.push_str(rest);
    Cow::Owned(out)
}

fn decode(reference: &str) -> Option<char> {
    if let Some(numeric) = reference.strip_prefix('#') {
        let code = match numeric.strip_prefix(['x', 'X']) {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => numeric.parse().ok()?,
        };
        return char::from_u32(code);
    }

    Some(match reference {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => '\u{a0}',
        "copy" => '©',
        "reg" => '®',
        "hellip" => '…',
        "mdash" => '—',
        "ndash" => '–',
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_is_borrowed() {
        assert!(matches!(unescape("no entities"), Cow::Borrowed(_)));
    }

    #[test]
    fn decodes_service_escapes() {
        assert_eq!(unescape("a &lt;b&gt; &amp; c"), "a <b> & c");
    }

    #[test]
    fn decodes_numeric_references() {
        assert_eq!(unescape("&#65;&#x42;&#X43;"), "ABC");
    }

    #[test]
    fn leaves_unknown_and_unterminated_references() {
        assert_eq!(unescape("&bogus; & &amp"), "&bogus; & &amp");
        assert_eq!(unescape("&#xZZ;"), "&#xZZ;");
    }

    #[test]
    fn decodes_angle_brackets_around_mentions() {
        assert_eq!(unescape("&lt;@U123&gt;"), "<@U123>");
    }
}
