use pulldown_cmark::{html, CowStr, Event, Options, Parser, Tag, TagEnd};

/// Render a job description written in Markdown to HTML that is safe to embed.
///
/// Raw HTML in the source is shown as text, links open in a new tab, and
/// link or image targets with a scheme other than http(s)/mailto are dropped.
pub fn render(source: &str) -> String {
    let parser = Parser::new_ext(source, Options::ENABLE_STRIKETHROUGH).map(|event| match event {
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
        Event::Start(Tag::Link { dest_url, .. }) => Event::Html(
            format!(
                r#"<a href="{}" target="_blank" rel="noopener noreferrer">"#,
                escape_attr(safe_url(&dest_url))
            )
            .into(),
        ),
        Event::End(TagEnd::Link) => Event::Html(CowStr::Borrowed("</a>")),
        Event::Start(Tag::Image {
            link_type,
            dest_url,
            title,
            id,
        }) => Event::Start(Tag::Image {
            link_type,
            dest_url: safe_url(&dest_url).to_string().into(),
            title,
            id,
        }),
        other => other,
    });

    let mut out = String::with_capacity(source.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}

fn safe_url(url: &str) -> &str {
    let scheme = url
        .split_once(':')
        .map(|(scheme, _)| scheme)
        .filter(|scheme| !scheme.contains(['/', '?', '#']));
    match scheme {
        None => url,
        Some(s)
            if ["http", "https", "mailto"]
                .iter()
                .any(|allowed| s.eq_ignore_ascii_case(allowed)) =>
        {
            url
        }
        Some(_) => "",
    }
}

fn escape_attr(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\'' => out.push_str("&#x27;"),
            c => out.push(c),
        }
    }
    out
}
