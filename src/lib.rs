use log::{info, warn};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::{window, Document, Window};

pub mod config;
pub mod error;
pub mod header;
pub mod nav;
pub mod page;
pub mod reveal;
pub mod schedule;
pub mod overlay {
    pub mod controller;
    pub mod machine;
    pub mod media;
}

use config::PageConfig;
use error::{EnhanceError, Tolerate};
use page::PageElements;

/// Installs every behavior on a loaded document.
pub fn enhance(window: &Window, document: &Document) {
    let config = match PageConfig::from_document(document) {
        Ok(config) => config,
        Err(err) => {
            warn!("{}, using defaults", err);
            PageConfig::default()
        }
    };
    let elements = PageElements::collect(document, &config);

    // Independent of each other; a failed install only loses that behavior.
    header::install(window, elements.header, &config.header).tolerate();
    nav::install(window, document, elements.nav_links, &config.nav).tolerate();
    overlay::controller::install(
        document,
        elements.overlay,
        elements.play_trigger,
        elements.media,
        &config.overlay,
    )
    .tolerate();
    reveal::install(elements.sections, &config.reveal).tolerate();

    info!("page enhancements wired");
}

/// Runs `enhance` now, or once the document finishes parsing.
pub fn boot() -> Result<(), EnhanceError> {
    let window = window().ok_or(EnhanceError::NoWindow)?;
    let document = window.document().ok_or(EnhanceError::NoDocument)?;

    if document.ready_state() == "loading" {
        let ready_document = document.clone();
        let on_ready = Closure::once_into_js(move || enhance(&window, &ready_document));
        document
            .add_event_listener_with_callback("DOMContentLoaded", on_ready.unchecked_ref())
            .map_err(EnhanceError::platform("addEventListener(DOMContentLoaded)"))?;
    } else {
        enhance(&window, &document);
    }
    Ok(())
}
