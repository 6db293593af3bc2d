pub mod password;
pub mod url_validator;

/// 生成短码使用的 62 字符字母表
pub const CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// 自定义短码长度范围
pub const MIN_CUSTOM_CODE_LEN: usize = 3;
pub const MAX_CUSTOM_CODE_LEN: usize = 50;

pub fn generate_random_code(length: usize) -> String {
    use std::iter;

    iter::repeat_with(|| CODE_ALPHABET[rand::random_range(0..CODE_ALPHABET.len())] as char)
        .take(length)
        .collect()
}

/// 校验用户指定的短码：字母、数字、连字符，3-50 个字符
#[inline]
pub fn is_valid_custom_code(code: &str) -> bool {
    (MIN_CUSTOM_CODE_LEN..=MAX_CUSTOM_CODE_LEN).contains(&code.len())
        && code
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-')
}

/// 跳转路径上的短码预检（生成码和自定义码的并集）
#[inline]
pub fn is_valid_short_code(code: &str) -> bool {
    !code.is_empty()
        && code.len() <= MAX_CUSTOM_CODE_LEN
        && code
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-')
}

/// 转义 HTML 特殊字符（服务端渲染的跳转页使用）
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_random_code_length_and_alphabet() {
        for len in [1, 6, 12] {
            let code = generate_random_code(len);
            assert_eq!(code.len(), len);
            assert!(code.bytes().all(|b| CODE_ALPHABET.contains(&b)));
        }
    }

    #[test]
    fn test_custom_code_pattern() {
        assert!(is_valid_custom_code("abc"));
        assert!(is_valid_custom_code("my-code"));
        assert!(is_valid_custom_code(&"a".repeat(50)));

        assert!(!is_valid_custom_code("ab"));
        assert!(!is_valid_custom_code(&"a".repeat(51)));
        assert!(!is_valid_custom_code("has space"));
        assert!(!is_valid_custom_code("under_score"));
        assert!(!is_valid_custom_code("path/slash"));
        assert!(!is_valid_custom_code("ünï"));
    }

    #[test]
    fn test_short_code_precheck() {
        assert!(is_valid_short_code("a"));
        assert!(is_valid_short_code("Ab3-x"));
        assert!(!is_valid_short_code(""));
        assert!(!is_valid_short_code("favicon.ico"));
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<a href="x">'&'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;&#39;&amp;&#39;&lt;/a&gt;"
        );
        assert_eq!(escape_html("plain"), "plain");
    }
}
