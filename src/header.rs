use std::cell::RefCell;
use std::rc::Rc;

use log::debug;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::{AddEventListenerOptions, Element, Window};

use crate::config::HeaderConfig;
use crate::error::{EnhanceError, Tolerate};
use crate::schedule::{AnimationFrames, FrameCoalescer};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderChange {
    Compact,
    Expand,
}

/// Scroll-direction tracker with a dead zone between the compact and expand
/// thresholds so the header does not flicker near the boundary.
#[derive(Debug, Clone)]
pub struct HeaderCollapse {
    compact_above: f64,
    expand_below: f64,
    hysteresis: f64,
    last_offset: f64,
    compact: bool,
}

impl HeaderCollapse {
    pub fn new(config: &HeaderConfig, initial_offset: f64, compact: bool) -> Self {
        Self {
            compact_above: config.compact_above,
            expand_below: config.expand_below,
            hysteresis: config.hysteresis,
            last_offset: initial_offset.max(0.0),
            compact,
        }
    }

    #[cfg(test)]
    pub fn is_compact(&self) -> bool {
        self.compact
    }

    #[cfg(test)]
    pub fn last_offset(&self) -> f64 {
        self.last_offset
    }

    /// Feeds one scroll sample. Returns a change only when the compact state
    /// actually flips.
    pub fn observe(&mut self, offset: f64) -> Option<HeaderChange> {
        let wanted = if offset > self.last_offset && offset > self.compact_above {
            Some(true)
        } else if offset < self.last_offset - self.hysteresis || offset < self.expand_below {
            Some(false)
        } else {
            None
        };
        self.last_offset = offset.max(0.0);

        match wanted {
            Some(compact) if compact != self.compact => {
                self.compact = compact;
                Some(if compact { HeaderChange::Compact } else { HeaderChange::Expand })
            }
            _ => None,
        }
    }
}

fn apply(header: &Element, class: &str, change: HeaderChange) -> Result<(), EnhanceError> {
    let classes = header.class_list();
    match change {
        HeaderChange::Compact => classes.add_1(class),
        HeaderChange::Expand => classes.remove_1(class),
    }
    .map_err(EnhanceError::platform("header classList"))
}

/// Hooks the header onto window scroll, sampled once per animation frame.
pub fn install(window: &Window, header: Option<Element>, config: &HeaderConfig) -> Result<(), EnhanceError> {
    let Some(header) = header else {
        debug!("no #{} on page, header collapse disabled", config.element_id);
        return Ok(());
    };

    let initial = window.scroll_y().unwrap_or(0.0);
    let compact = header.class_list().contains(&config.compact_class);
    let tracker = Rc::new(RefCell::new(HeaderCollapse::new(config, initial, compact)));
    let coalescer = FrameCoalescer::new(AnimationFrames::new(window.clone()));
    let class = Rc::new(config.compact_class.clone());
    let window_clone = window.clone();

    let scroll_callback = Closure::wrap(Box::new(move || {
        let tracker = tracker.clone();
        let header = header.clone();
        let class = class.clone();
        let window = window_clone.clone();
        coalescer
            .trigger(move || {
                let offset = window.scroll_y().unwrap_or(0.0);
                let change = tracker.borrow_mut().observe(offset);
                if let Some(change) = change {
                    apply(&header, &class, change).tolerate();
                }
            })
            .tolerate();
    }) as Box<dyn FnMut()>);

    let options = AddEventListenerOptions::new();
    options.set_passive(true);
    window
        .add_event_listener_with_callback_and_add_event_listener_options(
            "scroll",
            scroll_callback.as_ref().unchecked_ref(),
            &options,
        )
        .map_err(EnhanceError::platform("addEventListener(scroll)"))?;

    // Lives as long as the page.
    scroll_callback.forget();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    #[cfg(not(target_arch = "wasm32"))]
    use proptest::prelude::*;

    fn tracker() -> HeaderCollapse {
        HeaderCollapse::new(&HeaderConfig::default(), 0.0, false)
    }

    #[test]
    fn compacts_only_when_scrolling_down_past_threshold() {
        let mut header = tracker();
        assert_eq!(header.observe(50.0), None);
        assert_eq!(header.observe(80.0), None);
        assert_eq!(header.observe(81.0), Some(HeaderChange::Compact));
        assert_eq!(header.observe(300.0), None);
        assert!(header.is_compact());
    }

    #[test]
    fn small_upward_movement_stays_compact() {
        let mut header = tracker();
        header.observe(200.0);
        header.observe(300.0);
        assert_eq!(header.observe(295.0), None);
        assert_eq!(header.observe(290.0), None);
        assert!(header.is_compact());
        assert_eq!(header.observe(279.0), Some(HeaderChange::Expand));
    }

    #[test]
    fn near_top_always_expands() {
        // Upward by less than the hysteresis but under the lower threshold.
        let mut header = HeaderCollapse::new(&HeaderConfig::default(), 42.0, true);
        assert_eq!(header.observe(39.0), Some(HeaderChange::Expand));
    }

    #[test]
    fn dead_zone_leaves_state_alone() {
        let mut header = HeaderCollapse::new(&HeaderConfig::default(), 60.0, false);
        assert_eq!(header.observe(70.0), None);
        assert_eq!(header.observe(65.0), None);
        assert!(!header.is_compact());
    }

    #[test]
    fn negative_offsets_are_stored_as_zero() {
        let mut header = tracker();
        header.observe(-30.0);
        assert_eq!(header.last_offset(), 0.0);
    }

    #[cfg(not(target_arch = "wasm32"))]
    proptest! {
        #[test]
        fn flips_follow_the_threshold_rules(
            start in 0.0f64..400.0,
            initially_compact in any::<bool>(),
            samples in prop::collection::vec(-20.0f64..600.0, 1..60),
        ) {
            let config = HeaderConfig::default();
            let mut header = HeaderCollapse::new(&config, start, initially_compact);
            for offset in samples {
                let previous = header.last_offset();
                let was_compact = header.is_compact();
                let change = header.observe(offset);

                let compact_rule = offset > previous && offset > config.compact_above;
                let expand_rule = offset < previous - config.hysteresis || offset < config.expand_below;

                match change {
                    Some(HeaderChange::Compact) => prop_assert!(compact_rule && !was_compact),
                    Some(HeaderChange::Expand) => prop_assert!(!compact_rule && expand_rule && was_compact),
                    None => prop_assert_eq!(header.is_compact(), was_compact),
                }
                if !compact_rule && !expand_rule {
                    prop_assert_eq!(header.is_compact(), was_compact);
                }
                prop_assert!(header.last_offset() >= 0.0);
            }
        }
    }
}
