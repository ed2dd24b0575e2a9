use log::debug;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::js_sys::Array;
use web_sys::{Element, IntersectionObserver, IntersectionObserverEntry, IntersectionObserverInit};

use crate::config::RevealConfig;
use crate::error::{EnhanceError, Tolerate};

/// One-shot reveal bookkeeping for a fixed list of sections.
#[derive(Debug, Clone)]
pub struct RevealTracker {
    revealed: Vec<bool>,
}

impl RevealTracker {
    pub fn new(sections: usize) -> Self {
        Self { revealed: vec![false; sections] }
    }

    /// Records an intersection. True only the first time a section shows up.
    pub fn mark(&mut self, index: usize) -> bool {
        match self.revealed.get_mut(index) {
            Some(seen) if !*seen => {
                *seen = true;
                true
            }
            _ => false,
        }
    }

    pub fn remaining(&self) -> usize {
        self.revealed.iter().filter(|seen| !**seen).count()
    }
}

pub fn install(sections: Vec<Element>, config: &RevealConfig) -> Result<(), EnhanceError> {
    if sections.is_empty() {
        debug!("no {} sections to reveal", config.section_selector);
        return Ok(());
    }

    let mut tracker = RevealTracker::new(sections.len());
    let visible_class = config.visible_class.clone();
    let observed = sections.clone();

    let callback = Closure::wrap(Box::new(move |entries: Array, observer: IntersectionObserver| {
        for entry in entries.iter() {
            let Ok(entry) = entry.dyn_into::<IntersectionObserverEntry>() else {
                continue;
            };
            if !entry.is_intersecting() {
                continue;
            }
            let target = entry.target();
            observer.unobserve(&target);
            let Some(index) = observed.iter().position(|section| *section == target) else {
                continue;
            };
            if tracker.mark(index) {
                target
                    .class_list()
                    .add_1(&visible_class)
                    .map_err(EnhanceError::platform("section classList"))
                    .tolerate();
            }
        }
        if tracker.remaining() == 0 {
            debug!("all sections revealed");
            observer.disconnect();
        }
    }) as Box<dyn FnMut(Array, IntersectionObserver)>);

    let options = IntersectionObserverInit::new();
    options.set_threshold(&JsValue::from_f64(config.threshold));
    let observer = IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &options)
        .map_err(EnhanceError::platform("IntersectionObserver"))?;
    callback.forget();

    for section in &sections {
        observer.observe(section);
    }
    debug!("observing {} sections", sections.len());
    Ok(())
}
