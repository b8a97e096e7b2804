//! Handlebars templates for the web UI. Everything is HTML escaped
//! on render since the page shows user code and model output.

use handlebars::Handlebars;

pub const INDEX_TEMPLATE: &str = "index";

const INDEX_HTML: &str = include_str!("index.hbs");

pub fn templates<'a>() -> Handlebars<'a> {
    let mut registry = Handlebars::new();
    registry.set_strict_mode(true);
    registry
        .register_template_string(INDEX_TEMPLATE, INDEX_HTML)
        .expect("Failed to register template");
    registry
}
