use axum::http::StatusCode;

use crate::views::{escape, layout};

pub fn error_page(status: StatusCode, message: &str) -> String {
    let title = status.canonical_reason().unwrap_or("Error");
    let body = format!(
        r#"<p class="error">{message}</p>
        <p><a href="/">Back to the upload page</a></p>"#,
        message = escape(message)
    );
    layout(title, None, &body)
}
