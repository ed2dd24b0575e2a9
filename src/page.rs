use log::debug;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlElement};

use crate::config::PageConfig;

/// Every element the enhancements touch, looked up once at boot. Each
/// handle is independently optional.
pub struct PageElements {
    pub header: Option<Element>,
    pub nav_links: Vec<Element>,
    pub overlay: Option<HtmlElement>,
    pub play_trigger: Option<HtmlElement>,
    pub media: Option<Element>,
    pub sections: Vec<Element>,
}

fn html_by_id(document: &Document, id: &str) -> Option<HtmlElement> {
    document
        .get_element_by_id(id)
        .and_then(|element| element.dyn_into::<HtmlElement>().ok())
}

fn select_all(document: &Document, selector: &str) -> Vec<Element> {
    let Ok(nodes) = document.query_selector_all(selector) else {
        debug!("selector {} is not valid", selector);
        return Vec::new();
    };
    (0..nodes.length())
        .filter_map(|i| nodes.item(i))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect()
}

impl PageElements {
    pub fn collect(document: &Document, config: &PageConfig) -> Self {
        Self {
            header: document.get_element_by_id(&config.header.element_id),
            nav_links: select_all(document, &config.nav.link_selector),
            overlay: html_by_id(document, &config.overlay.overlay_id),
            play_trigger: html_by_id(document, &config.overlay.trigger_id),
            media: document.get_element_by_id(&config.overlay.media_id),
            sections: select_all(document, &config.reveal.section_selector),
        }
    }
}
