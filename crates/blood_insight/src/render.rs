//! Markdown rendering for analysis results

use pulldown_cmark::{html, Options, Parser};

/// Render Markdown to an HTML fragment
pub fn to_html(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);

    let parser = Parser::new_ext(markdown, options);
    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}

/// Wrap rendered Markdown in a minimal standalone page
pub fn to_html_page(markdown: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"><title>Blood Test Insights</title></head>\n<body>\n{}</body>\n</html>\n",
        to_html(markdown)
    )
}
