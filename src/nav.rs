use std::borrow::Cow;

use log::debug;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{
    Document, Element, FocusOptions, HtmlElement, MouseEvent, ScrollBehavior, ScrollIntoViewOptions,
    ScrollLogicalPosition, Window,
};

use crate::config::{HistoryMode, NavConfig};
use crate::error::{EnhanceError, Tolerate};

/// Returns the element id an in-page link points at, percent-decoded.
/// Links that leave the page, and a bare `#`, have no target.
pub fn anchor_target(href: &str) -> Option<Cow<'_, str>> {
    let fragment = href.strip_prefix('#')?;
    if fragment.is_empty() {
        return None;
    }
    match urlencoding::decode(fragment) {
        Ok(id) => Some(id),
        // Not valid UTF-8 once decoded; look it up verbatim.
        Err(_) => Some(Cow::Borrowed(fragment)),
    }
}

fn scroll_to(target: &Element) {
    let options = ScrollIntoViewOptions::new();
    options.set_behavior(ScrollBehavior::Smooth);
    options.set_block(ScrollLogicalPosition::Start);
    target.scroll_into_view_with_scroll_into_view_options(&options);
}

fn focus_quietly(target: &Element) -> Result<(), EnhanceError> {
    if !target.has_attribute("tabindex") {
        target
            .set_attribute("tabindex", "-1")
            .map_err(EnhanceError::platform("setAttribute(tabindex)"))?;
    }
    let Some(target) = target.dyn_ref::<HtmlElement>() else {
        return Ok(());
    };
    let options = FocusOptions::new();
    options.set_prevent_scroll(true);
    target
        .focus_with_options(&options)
        .map_err(EnhanceError::platform("focus"))
}

fn write_fragment(window: &Window, href: &str, mode: HistoryMode) -> Result<(), EnhanceError> {
    let history = window.history().map_err(EnhanceError::platform("history"))?;
    match mode {
        HistoryMode::Replace => history
            .replace_state_with_url(&JsValue::NULL, "", Some(href))
            .map_err(EnhanceError::platform("history.replaceState")),
        HistoryMode::Push => history
            .push_state_with_url(&JsValue::NULL, "", Some(href))
            .map_err(EnhanceError::platform("history.pushState")),
    }
}

/// Smooth scrolling for every in-page link matched by the nav selector.
pub fn install(window: &Window, document: &Document, links: Vec<Element>, config: &NavConfig) -> Result<(), EnhanceError> {
    if links.is_empty() {
        debug!("no links match {}, smooth scroll disabled", config.link_selector);
        return Ok(());
    }

    for link in links {
        let window = window.clone();
        let document = document.clone();
        let mode = config.history;
        let link_clone = link.clone();

        let click_callback = Closure::wrap(Box::new(move |e: MouseEvent| {
            let Some(href) = link_clone.get_attribute("href") else {
                return;
            };
            let Some(id) = anchor_target(&href) else {
                return;
            };
            let Some(target) = document.get_element_by_id(&id) else {
                debug!("anchor {} has no target", href);
                return;
            };

            e.prevent_default();
            scroll_to(&target);
            focus_quietly(&target).tolerate();
            write_fragment(&window, &href, mode).tolerate();
        }) as Box<dyn FnMut(MouseEvent)>);

        link.add_event_listener_with_callback("click", click_callback.as_ref().unchecked_ref())
            .map_err(EnhanceError::platform("addEventListener(click)"))?;
        click_callback.forget();
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_fragment() {
        assert_eq!(anchor_target("#foo").as_deref(), Some("foo"));
    }

    #[test]
    fn external_and_relative_links_are_left_alone() {
        assert_eq!(anchor_target("https://example.com/#foo"), None);
        assert_eq!(anchor_target("/pricing"), None);
        assert_eq!(anchor_target(""), None);
    }

    #[test]
    fn bare_hash_has_no_target() {
        assert_eq!(anchor_target("#"), None);
    }

    #[test]
    fn percent_encoded_fragment_is_decoded() {
        assert_eq!(anchor_target("#contacto%20r%C3%A1pido").as_deref(), Some("contacto rápido"));
    }

    #[test]
    fn undecodable_fragment_is_used_verbatim() {
        assert_eq!(anchor_target("#bad%FF").as_deref(), Some("bad%FF"));
    }
}
