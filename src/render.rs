//! HTML page rendering.
//!
//! Uses [maud](https://maud.lambda.xyz/) for compile-time HTML templating.
//! Templates are type-safe Rust code with automatic XSS escaping, which
//! matters here because the image filename in the viewer URL is
//! caller-influenced.
//!
//! Three pages:
//!
//! - **Viewer** (`/view/{slug}`): a card with the picked image and a button
//!   that fetches a fresh one.
//! - **Settings** (`/settings`): toggles persisted in browser localStorage,
//!   read back by the viewer script.
//! - **Error**: status code + message, one per resolver failure kind.
//!
//! CSS and JavaScript are embedded at compile time from `static/`, so the
//! binary ships self-contained.

use maud::{DOCTYPE, Markup, PreEscaped, html};

const CSS: &str = include_str!("../static/style.css");
const VIEW_JS: &str = include_str!("../static/view.js");
const SETTINGS_JS: &str = include_str!("../static/settings.js");

const CONFETTI_CDN: &str = "https://cdn.jsdelivr.net/npm/canvas-confetti";

/// Base HTML document shared by all pages.
fn base_document(title: &str, head_extra: Markup, body_class: &str, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                (head_extra)
                title { (title) }
                style { (PreEscaped(CSS)) }
            }
            body class=(body_class) {
                (content)
            }
        }
    }
}

/// The viewer page: a card with the picked image and a "new image" button.
///
/// `image_url` is the relative serving URL (with cache-buster query);
/// `og_image_url` is the same URL with the configured public prefix, used in
/// the Open Graph tags link unfurlers read.
pub fn view_page(image_url: &str, og_image_url: &str) -> Markup {
    let head = html! {
        meta property="og:title" content="Random image";
        meta property="og:description" content="A fresh picture on every visit";
        meta property="og:image" content=(og_image_url);
        meta property="twitter:card" content="summary_large_image";
    };
    let content = html! {
        div.card {
            h2 { "Random image" }
            img src=(image_url) alt="A randomly chosen image";
            form method="GET" action="/" {
                button.button { "New image" }
            }
        }
        script src=(CONFETTI_CDN) {}
        script { (PreEscaped(VIEW_JS)) }
    };
    base_document("Random image", head, "dark", content)
}

/// The settings page. Toggles are stored in localStorage client-side; the
/// server keeps no per-visitor state.
pub fn settings_page() -> Markup {
    let content = html! {
        div.settings-container {
            h2 { "Settings" }
            div.toggle {
                label for="confetti-toggle" { "Enable confetti" }
                input type="checkbox" id="confetti-toggle";
            }
            div.toggle {
                label for="keyboard-toggle" { "Enable keyboard shortcuts" }
                input type="checkbox" id="keyboard-toggle";
            }
            div.toggle {
                label for="darkmode-toggle" { "Enable dark mode" }
                input type="checkbox" id="darkmode-toggle" checked;
            }
            button.button id="save-settings" { "Save settings" }
        }
        script { (PreEscaped(SETTINGS_JS)) }
    };
    base_document("Settings", html! {}, "light", content)
}

/// A user-facing error page for a resolver failure.
pub fn error_page(status: u16, message: &str) -> Markup {
    let content = html! {
        div.card.error-card {
            p.status { (status) }
            p { (message) }
            form method="GET" action="/" {
                button.button { "Try another image" }
            }
        }
    };
    base_document(message, html! {}, "dark", content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn view_page_embeds_image_url() {
        let page = view_page("/image/cat1.jpg?t=123", "/image/cat1.jpg?t=123").into_string();
        assert!(page.contains(r#"src="/image/cat1.jpg?t=123""#));
        assert!(page.contains("og:image"));
    }

    #[test]
    fn view_page_escapes_markup_in_urls() {
        let page = view_page("/image/a\"><script>.jpg", "").into_string();
        assert!(!page.contains(r#"a"><script>"#));
    }

    #[test]
    fn error_page_shows_status_and_message() {
        let page = error_page(404, "Image not found").into_string();
        assert!(page.contains("404"));
        assert!(page.contains("Image not found"));
    }

    #[test]
    fn settings_page_has_all_three_toggles() {
        let page = settings_page().into_string();
        for id in ["confetti-toggle", "keyboard-toggle", "darkmode-toggle"] {
            assert!(page.contains(id), "missing {id}");
        }
    }
}
