//! Server-rendered HTML pages.
//!
//! Pages are plain `format!` templates wrapped in a shared [`layout`]. Every value that
//! comes from a user, a file name or the LLM goes through [`escape`].

pub mod analysis;
pub mod auth;
pub mod error;
pub mod ranking;

use crate::auth::CurrentUser;

/// HTML-escapes text for element content and quoted attribute values.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

/// Percent-encodes a value for use in a query string or path segment.
pub fn url_encode(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for b in text.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(b as char)
            }
            _ => out.push_str(&format!("%{b:02X}")),
        }
    }
    out
}

/// Wraps `body` in the common page shell. The nav bar is shown for signed-in users.
pub fn layout(title: &str, user: Option<&CurrentUser>, body: &str) -> String {
    let nav = match user {
        Some(user) => format!(
            r#"<nav>
        <a href="/">Upload</a>
        <a href="/ranking">Ranking</a>
        <a href="/filtered_ranking">Filter</a>
        <a href="/history">History</a>
        <span class="user">{name}</span>
        <a href="/logout">Log out</a>
    </nav>"#,
            name = escape(&user.display_name)
        ),
        None => String::new(),
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title} - CV Rank</title>
    <style>
        body {{
            font-family: 'Segoe UI', Tahoma, Geneva, Verdana, sans-serif;
            margin: 0;
            color: #222;
            background-color: #f5f6f8;
        }}
        nav {{
            display: flex;
            gap: 16px;
            align-items: center;
            padding: 12px 24px;
            background-color: #1f3a5f;
        }}
        nav a, nav .user {{
            color: #fff;
            text-decoration: none;
        }}
        nav .user {{
            margin-left: auto;
            opacity: 0.8;
        }}
        main {{
            max-width: 1100px;
            margin: 24px auto;
            padding: 0 24px;
        }}
        table {{
            border-collapse: collapse;
            width: 100%;
            background-color: #fff;
        }}
        th, td {{
            border: 1px solid #d0d4da;
            padding: 6px 8px;
            text-align: left;
            vertical-align: top;
            font-size: 14px;
        }}
        th {{
            background-color: #e8ecf1;
        }}
        .error {{
            color: #b00020;
        }}
        form.inline label {{
            margin-right: 12px;
        }}
    </style>
</head>
<body>
    {nav}
    <main>
        <h1>{title}</h1>
        {body}
    </main>
</body>
</html>"#,
        title = escape(title),
    )
}

/// `<p class="error">` for an optional message.
pub fn error_banner(message: Option<&str>) -> String {
    message
        .map(|m| format!(r#"<p class="error">{}</p>"#, escape(m)))
        .unwrap_or_default()
}
