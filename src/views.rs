//! Page rendering. Handlers only hand over records plus a [`Page`] context;
//! markup is produced by whichever [`Renderer`] the app was built with.

use std::fmt::Write;

use crate::config::Config;
use crate::models::{Category, Entry};

pub const NO_POSTS: &str = "No posts so far.";

/// Per-request chrome shared by every page.
pub struct Page<'a> {
    pub config: &'a Config,
    pub logged_in: bool,
    pub flashes: Vec<String>,
}

pub trait Renderer: Send + Sync {
    /// Entry list. `category` is set on `/view_category/*` pages.
    fn entries(&self, page: &Page<'_>, entries: &[Entry], category: Option<&str>) -> String;

    fn new_post(&self, page: &Page<'_>, categories: &[Category]) -> String;

    fn new_category(&self, page: &Page<'_>) -> String;

    fn login(&self, page: &Page<'_>, error: Option<&str>) -> String;
}

/// Plain server-side HTML.
#[derive(Debug, Default, Clone, Copy)]
pub struct HtmlRenderer;

impl HtmlRenderer {
    fn layout(&self, page: &Page<'_>, body: &str) -> String {
        let title = escape_html(&page.config.title);
        let mut html = String::new();

        let _ = write!(
            html,
            "<!doctype html>\n<html>\n<head><meta charset=\"utf-8\"><title>{title}</title></head>\n<body>\n<nav>\n<a href=\"/\">{title}</a>\n"
        );
        if page.logged_in {
            html.push_str("<a href=\"/new_post\">New post</a>\n");
            html.push_str("<a href=\"/new_category\">New category</a>\n");
            html.push_str("<a href=\"/logout\">Log out</a>\n");
        } else {
            html.push_str("<a href=\"/login\">Log in</a>\n");
        }
        for link in &page.config.navbar_addl {
            let _ = writeln!(
                html,
                "<a href=\"{}\">{}</a>",
                escape_html(&link.uri),
                escape_html(&link.name)
            );
        }
        html.push_str("</nav>\n");

        for message in &page.flashes {
            let _ = writeln!(html, "<div class=\"flash\">{}</div>", escape_html(message));
        }

        html.push_str(body);

        let _ = write!(
            html,
            "<footer>{}</footer>\n</body>\n</html>\n",
            escape_html(&page.config.copyright)
        );
        html
    }
}

impl Renderer for HtmlRenderer {
    fn entries(&self, page: &Page<'_>, entries: &[Entry], category: Option<&str>) -> String {
        let mut body = String::new();

        if let Some(category) = category {
            let _ = writeln!(body, "<h1>{}</h1>", escape_html(category));
        }

        body.push_str("<ul class=\"entries\">\n");
        for entry in entries {
            let _ = write!(
                body,
                "<li>\n<h2>{}</h2>\n<div class=\"meta\">{} in <a href=\"/view_category/{}\">{}</a>",
                escape_html(&entry.title),
                escape_html(&entry.posted),
                escape_html(&urlencoding::encode(&entry.category)),
                escape_html(&entry.category),
            );
            if page.logged_in {
                let _ = write!(body, " <a href=\"/del/{}\">delete</a>", entry.id);
            }
            // Post bodies are trusted HTML.
            let _ = write!(body, "</div>\n<div class=\"text\">{}</div>\n</li>\n", entry.text);
        }
        if entries.is_empty() {
            let _ = writeln!(body, "<li><em>{NO_POSTS}</em></li>");
        }
        body.push_str("</ul>\n");

        self.layout(page, &body)
    }

    fn new_post(&self, page: &Page<'_>, categories: &[Category]) -> String {
        let mut body = String::from(
            "<form action=\"/add\" method=\"post\" class=\"add-entry\">\n\
             <label>Title <input type=\"text\" name=\"title\"></label>\n\
             <label>Category <select name=\"category\">\n",
        );
        for category in categories {
            let name = escape_html(&category.category);
            let _ = writeln!(
                body,
                "<option value=\"{name}\" title=\"{}\">{name}</option>",
                escape_html(&category.description)
            );
        }
        body.push_str(
            "</select></label>\n\
             <label>Text <textarea name=\"text\" rows=\"10\"></textarea></label>\n\
             <input type=\"submit\" value=\"Post\">\n</form>\n",
        );

        self.layout(page, &body)
    }

    fn new_category(&self, page: &Page<'_>) -> String {
        let body = "<form action=\"/add_category\" method=\"post\" class=\"add-category\">\n\
                    <label>Name <input type=\"text\" name=\"category\"></label>\n\
                    <label>Description <textarea name=\"description\" rows=\"3\"></textarea></label>\n\
                    <input type=\"submit\" value=\"Add\">\n</form>\n";

        self.layout(page, body)
    }

    fn login(&self, page: &Page<'_>, error: Option<&str>) -> String {
        let mut body = String::from("<h1>Log in</h1>\n");
        if let Some(error) = error {
            let _ = writeln!(body, "<p class=\"error\"><strong>Error:</strong> {}</p>", escape_html(error));
        }
        body.push_str(
            "<form action=\"/login\" method=\"post\">\n\
             <label>Username <input type=\"text\" name=\"username\"></label>\n\
             <label>Password <input type=\"password\" name=\"password\"></label>\n\
             <input type=\"submit\" value=\"Log in\">\n</form>\n",
        );

        self.layout(page, &body)
    }
}

pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&#34;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(title: &str, text: &str) -> Entry {
        Entry {
            id: 7,
            title: title.to_string(),
            text: text.to_string(),
            posted: "2015-01-01 00:00:00".to_string(),
            category: "Tech & Stuff".to_string(),
        }
    }

    #[test]
    fn escapes_markup() {
        assert_eq!(escape_html("<a href='x'>&</a>"), "&lt;a href=&#39;x&#39;&gt;&amp;&lt;/a&gt;");
        assert_eq!(escape_html("plain"), "plain");
    }

    #[test]
    fn title_escaped_body_raw() {
        let config = Config::default();
        let page = Page { config: &config, logged_in: false, flashes: vec![] };

        let html = HtmlRenderer.entries(&page, &[entry("<Title>", "<i>Text</i>")], None);

        assert!(html.contains("&lt;Title&gt;"));
        assert!(!html.contains("<Title>"));
        assert!(html.contains("<i>Text</i>"));
        assert!(html.contains("/view_category/Tech%20%26%20Stuff"));
        assert!(!html.contains(NO_POSTS));
    }

    #[test]
    fn delete_link_only_for_admin() {
        let config = Config::default();
        let entries = [entry("t", "b")];

        let anon = Page { config: &config, logged_in: false, flashes: vec![] };
        assert!(!HtmlRenderer.entries(&anon, &entries, None).contains("/del/7"));

        let admin = Page { config: &config, logged_in: true, flashes: vec![] };
        assert!(HtmlRenderer.entries(&admin, &entries, None).contains("/del/7"));
    }

    #[test]
    fn empty_list_and_flashes() {
        let config = Config::default();
        let page = Page {
            config: &config,
            logged_in: false,
            flashes: vec!["You were logged out.".to_string()],
        };

        let html = HtmlRenderer.entries(&page, &[], None);
        assert!(html.contains(NO_POSTS));
        assert!(html.contains("You were logged out."));
    }
}
