//! Login and registration forms.

use crate::views::{error_banner, escape, layout};

pub fn login_page(error: Option<&str>, username: &str) -> String {
    let body = format!(
        r#"{error}
        <form method="post" action="/login">
            <p><label>User name <input name="username" value="{username}" required></label></p>
            <p><label>Password <input name="password" type="password" required></label></p>
            <p><button type="submit">Log in</button></p>
        </form>
        <p>No account yet? <a href="/register">Register</a></p>"#,
        error = error_banner(error),
        username = escape(username),
    );
    layout("Log in", None, &body)
}

pub fn register_page(error: Option<&str>, username: &str, name: &str) -> String {
    let body = format!(
        r#"{error}
        <form method="post" action="/register">
            <p><label>User name <input name="username" value="{username}" required
                pattern="[A-Za-z0-9_-]{{3,32}}"></label></p>
            <p><label>Display name <input name="name" value="{name}"></label></p>
            <p><label>Password <input name="password" type="password" minlength="8" required></label></p>
            <p><button type="submit">Register</button></p>
        </form>
        <p>Already registered? <a href="/login">Log in</a></p>"#,
        error = error_banner(error),
        username = escape(username),
        name = escape(name),
    );
    layout("Register", None, &body)
}
