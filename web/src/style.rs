//! Stylesheet provider and the class names views build on.

use lumen_shared::StyleConfig;
use web_sys::{Document, Element};

use crate::error::BootError;

/// Class names from the component stylesheet.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Theme {
    pub root: &'static str,
    pub section: &'static str,
    pub title: &'static str,
    pub tag_ok: &'static str,
    pub tag_pending: &'static str,
    pub tag_down: &'static str,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            root: "lumen-root",
            section: "section",
            title: "title",
            tag_ok: "tag is-success",
            tag_pending: "tag is-warning",
            tag_down: "tag is-danger",
        }
    }
}

/// Rules for the classes the component stylesheet does not define.
pub(crate) const BASE_RULES: &str = "\
.lumen-root { min-height: 100vh; display: flex; flex-direction: column; }
.lumen-root .tag { margin-right: 0.5rem; text-transform: capitalize; }
";

/// The installed stylesheet `<link>` and the inline base rules.
pub struct StylePlugin {
    /// Only elements this plugin created; pre-existing ones are left alone on uninstall.
    owned: Vec<Element>,
    theme: Theme,
}

impl StylePlugin {
    pub fn install(document: &Document, config: &StyleConfig) -> Result<Self, BootError> {
        let head = document
            .head()
            .ok_or_else(|| BootError::Style("document has no <head>".into()))?;
        let mut owned = Vec::new();

        if document.get_element_by_id(&config.element_id).is_some() {
            log::debug!("reusing stylesheet #{}", config.element_id);
        } else {
            let link = create(document, "link", &config.element_id)?;
            for (name, value) in [("rel", "stylesheet"), ("href", config.href.as_str())] {
                link.set_attribute(name, value).map_err(style_error)?;
            }
            head.append_child(&link).map_err(style_error)?;
            log::info!("stylesheet {} installed", config.href);
            owned.push(link);
        }

        let base_id = base_rules_id(config);
        if document.get_element_by_id(&base_id).is_none() {
            let style = create(document, "style", &base_id)?;
            style.set_text_content(Some(BASE_RULES));
            head.append_child(&style).map_err(style_error)?;
            owned.push(style);
        }

        Ok(Self {
            owned,
            theme: Theme::default(),
        })
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn uninstall(self) {
        for element in self.owned {
            element.remove();
        }
    }
}

pub(crate) fn base_rules_id(config: &StyleConfig) -> String {
    format!("{}-base", config.element_id)
}

fn create(document: &Document, tag: &str, id: &str) -> Result<Element, BootError> {
    let element = document.create_element(tag).map_err(style_error)?;
    element.set_id(id);
    Ok(element)
}

fn style_error(value: wasm_bindgen::JsValue) -> BootError {
    BootError::Style(crate::error::describe(&value))
}
