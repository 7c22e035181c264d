//! Utility functions and helpers

/// Format an integer string with thousands separators
pub fn format_number<T: ToString>(n: T) -> String {
    group_thousands(&n.to_string(), ",")
}

/// Insert `separator` between groups of three digits in the integer part
/// of a plain decimal string (`-1234567.89` -> `-1,234,567.89`)
pub fn group_thousands(number: &str, separator: &str) -> String {
    let (sign, unsigned) = match number.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", number),
    };
    let (int_part, frac_part) = match unsigned.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (unsigned, None),
    };

    let mut grouped = String::new();
    let mut count = 0;
    for c in int_part.chars().rev() {
        if count == 3 {
            grouped.push_str(&separator.chars().rev().collect::<String>());
            count = 0;
        }
        grouped.push(c);
        count += 1;
    }
    let mut result: String = sign.to_string();
    result.push_str(&grouped.chars().rev().collect::<String>());
    if let Some(frac) = frac_part {
        result.push('.');
        result.push_str(frac);
    }
    result
}

/// Escape text for safe interpolation into HTML markup and attributes
pub fn escape_html(content: &str) -> String {
    let mut escaped = String::with_capacity(content.len());
    for c in content.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Generate a unique ID
pub fn generate_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Generate a random lowercase hex suffix of `len` characters (max 32)
pub fn random_suffix(len: usize) -> String {
    let simple = uuid::Uuid::new_v4().simple().to_string();
    simple[..len.min(simple.len())].to_string()
}

/// Human-readable byte size (`512 B`, `12.3 KB`, `4.0 MB`)
pub fn format_bytes(bytes: u64) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = KB * 1024.0;
    let b = bytes as f64;
    if b < KB {
        format!("{} B", bytes)
    } else if b < MB {
        format!("{:.1} KB", b / KB)
    } else {
        format!("{:.1} MB", b / MB)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(1234567), "1,234,567");
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(-1000), "-1,000");
    }

    #[test]
    fn test_group_thousands_with_fraction() {
        assert_eq!(group_thousands("1234.50", ","), "1,234.50");
        assert_eq!(group_thousands("-1234567.8", " "), "-1 234 567.8");
        assert_eq!(group_thousands("12.00", ","), "12.00");
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html("<script>alert('x') & \"y\"</script>"),
            "&lt;script&gt;alert(&#39;x&#39;) &amp; &quot;y&quot;&lt;/script&gt;"
        );
    }

    #[test]
    fn test_random_suffix() {
        let a = random_suffix(8);
        let b = random_suffix(8);
        assert_eq!(a.len(), 8);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        assert_ne!(a, b);
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(2048), "2.0 KB");
        assert_eq!(format_bytes(3 * 1024 * 1024), "3.0 MB");
    }
}
