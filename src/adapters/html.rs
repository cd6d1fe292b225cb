// 網頁抓取小工具
use regex::Regex;
use std::sync::LazyLock;

static CSRF_META_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<meta[^>]*name="csrf-token"[^>]*content="([^"]*)"|<meta[^>]*content="([^"]*)"[^>]*name="csrf-token""#)
        .expect("csrf pattern")
});

static NUMERIC_ENTITY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&#(x[0-9a-fA-F]+|[0-9]+);").expect("entity pattern"));

/// The Rails CSRF token from a page's `<meta name="csrf-token">`.
pub fn extract_csrf_token(html: &str) -> Option<String> {
    CSRF_META_RE.captures(html).and_then(|caps| {
        caps.get(1)
            .or_else(|| caps.get(2))
            .map(|m| unescape_html(m.as_str()))
    })
}

/// Decoded `data-react-props` of the first element rendering `component`.
pub fn react_props(html: &str, component: &str) -> Option<String> {
    let name = regex::escape(component);
    let pattern = format!(
        r#"data-react-class="{name}"[^>]*?data-react-props="([^"]*)"|data-react-props="([^"]*)"[^>]*?data-react-class="{name}""#
    );
    let re = Regex::new(&pattern).ok()?;
    let caps = re.captures(html)?;
    caps.get(1)
        .or_else(|| caps.get(2))
        .map(|m| unescape_html(m.as_str()))
}

pub fn unescape_html(text: &str) -> String {
    let named = text
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&nbsp;", " ");

    let numeric = NUMERIC_ENTITY_RE.replace_all(&named, |caps: &regex::Captures| {
        let raw = &caps[1];
        let code = match raw.strip_prefix('x') {
            Some(hex) => u32::from_str_radix(hex, 16).ok(),
            None => raw.parse::<u32>().ok(),
        };
        code.and_then(char::from_u32)
            .map(String::from)
            .unwrap_or_else(|| caps[0].to_string())
    });

    // &amp; 最後處理，避免二次解碼
    numeric.replace("&amp;", "&")
}
