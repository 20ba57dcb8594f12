//! Link classification and rewriting.

/// Whether a link leaves the site.
pub fn is_external(href: &str) -> bool {
    href.starts_with("http://") || href.starts_with("https://") || href.starts_with("//")
}

/// Point relative links at markdown sources to their rendered pages.
///
/// `models.md#tokeninfo` becomes `models.html#tokeninfo`. External links,
/// pure fragments and other targets are returned unchanged.
pub fn rewrite_markdown_link(href: &str) -> String {
    if is_external(href) || href.starts_with('#') || href.contains(':') {
        return href.to_string();
    }

    let (path, fragment) = match href.split_once('#') {
        Some((path, fragment)) => (path, Some(fragment)),
        None => (href, None),
    };

    let Some(stem) = path
        .strip_suffix(".md")
        .or_else(|| path.strip_suffix(".mdx"))
    else {
        return href.to_string();
    };

    match fragment {
        Some(fragment) => format!("{}.html#{}", stem, fragment),
        None => format!("{}.html", stem),
    }
}
