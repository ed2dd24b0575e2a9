use log::debug;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys::{Element, HtmlElement, HtmlIFrameElement, HtmlMediaElement};

use crate::config::OverlayConfig;
use crate::error::{EnhanceError, Tolerate};

/// Adds the autoplay directive (and any extras) to an embed address.
/// Returns `None` when the address already autoplays or is empty, so
/// repeated starts never stack directives.
pub fn with_autoplay(src: &str, autoplay: &str, extras: &[String]) -> Option<String> {
    if src.is_empty() || src.contains(autoplay) {
        return None;
    }
    let (address, fragment) = match src.find('#') {
        Some(at) => src.split_at(at),
        None => (src, ""),
    };
    let separator = if address.ends_with('?') || address.ends_with('&') {
        ""
    } else if address.contains('?') {
        "&"
    } else {
        "?"
    };
    let directives: Vec<&str> = std::iter::once(autoplay)
        .chain(extras.iter().map(String::as_str))
        .collect();
    Some(format!("{}{}{}{}", address, separator, directives.join("&"), fragment))
}

/// Address of an embedded player as it was when the page loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbedSource {
    original: String,
    autoplay: String,
    extras: Vec<String>,
}

impl EmbedSource {
    pub fn capture(src: Option<String>, config: &OverlayConfig) -> Self {
        Self {
            original: src.unwrap_or_default(),
            autoplay: config.autoplay_directive.clone(),
            extras: config.extra_directives.clone(),
        }
    }

    #[cfg(test)]
    pub fn original(&self) -> &str {
        &self.original
    }

    /// Address to switch to for playback, if it must change.
    pub fn started(&self, current: &str) -> Option<String> {
        with_autoplay(current, &self.autoplay, &self.extras)
    }

    /// Address to restore to stop playback, if it must change.
    pub fn stopped(&self, current: &str) -> Option<&str> {
        if self.original.is_empty() || current == self.original {
            None
        } else {
            Some(&self.original)
        }
    }
}

pub trait MediaControl {
    fn start(&self);
    fn stop(&self);
    fn focus(&self);
}

/// The video behind the overlay, resolved once at boot.
pub enum Media {
    Native(HtmlMediaElement),
    Embedded { frame: HtmlIFrameElement, source: EmbedSource },
}

impl Media {
    /// `None` if the element is neither a media element nor an iframe.
    pub fn detect(element: Element, config: &OverlayConfig) -> Option<Self> {
        let element = match element.dyn_into::<HtmlMediaElement>() {
            Ok(media) => return Some(Media::Native(media)),
            Err(element) => element,
        };
        match element.dyn_into::<HtmlIFrameElement>() {
            Ok(frame) => {
                let source = EmbedSource::capture(frame.get_attribute("src"), config);
                Some(Media::Embedded { frame, source })
            }
            Err(_) => None,
        }
    }

    fn element(&self) -> &HtmlElement {
        match self {
            Media::Native(media) => &**media,
            Media::Embedded { frame, .. } => &**frame,
        }
    }
}

fn set_src(frame: &HtmlIFrameElement, src: &str) -> Result<(), EnhanceError> {
    frame
        .set_attribute("src", src)
        .map_err(EnhanceError::platform("iframe src"))
}

impl MediaControl for Media {
    fn start(&self) {
        match self {
            Media::Native(media) => {
                // preload="none" leaves nothing buffered
                if media.ready_state() == 0 {
                    media.load();
                }
                match media.play() {
                    Ok(promise) => spawn_local(async move {
                        if let Err(err) = JsFuture::from(promise).await {
                            debug!("play() rejected: {:?}", err);
                        }
                    }),
                    Err(err) => debug!("play() threw: {:?}", err),
                }
            }
            Media::Embedded { frame, source } => {
                let current = frame.get_attribute("src").unwrap_or_default();
                if let Some(src) = source.started(&current) {
                    set_src(frame, &src).tolerate();
                }
            }
        }
    }

    fn stop(&self) {
        match self {
            Media::Native(media) => {
                if !media.paused() {
                    media.pause().map_err(EnhanceError::platform("pause")).tolerate();
                }
            }
            Media::Embedded { frame, source } => {
                let current = frame.get_attribute("src").unwrap_or_default();
                if let Some(src) = source.stopped(&current) {
                    set_src(frame, src).tolerate();
                }
            }
        }
    }

    fn focus(&self) {
        self.element()
            .focus()
            .map_err(EnhanceError::platform("focus media"))
            .tolerate();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(src: &str) -> EmbedSource {
        EmbedSource::capture(Some(src.to_string()), &OverlayConfig::default())
    }

    #[test]
    fn appends_query_when_absent() {
        let embed = source("https://www.youtube.com/embed/abc");
        assert_eq!(
            embed.started(embed.original()).as_deref(),
            Some("https://www.youtube.com/embed/abc?autoplay=1&rel=0")
        );
    }

    #[test]
    fn extends_existing_query() {
        let embed = source("https://www.youtube.com/embed/abc?start=30");
        assert_eq!(
            embed.started(embed.original()).as_deref(),
            Some("https://www.youtube.com/embed/abc?start=30&autoplay=1&rel=0")
        );
    }

    #[test]
    fn starting_twice_adds_one_marker() {
        let embed = source("https://www.youtube.com/embed/abc");
        let first = embed.started(embed.original()).unwrap();
        assert_eq!(embed.started(&first), None);
        assert_eq!(first.matches("autoplay=1").count(), 1);
    }

    #[test]
    fn already_autoplaying_address_is_untouched() {
        assert_eq!(with_autoplay("https://x.test/v?autoplay=1", "autoplay=1", &[]), None);
    }

    #[test]
    fn keeps_fragment_at_the_end() {
        assert_eq!(
            with_autoplay("https://x.test/v?a=b#t=10", "autoplay=1", &[]).as_deref(),
            Some("https://x.test/v?a=b&autoplay=1#t=10")
        );
    }

    #[test]
    fn trailing_separator_is_reused() {
        assert_eq!(
            with_autoplay("https://x.test/v?", "autoplay=1", &[]).as_deref(),
            Some("https://x.test/v?autoplay=1")
        );
        assert_eq!(
            with_autoplay("https://x.test/v?a=b&", "autoplay=1", &[]).as_deref(),
            Some("https://x.test/v?a=b&autoplay=1")
        );
    }

    #[test]
    fn empty_address_never_autoplays() {
        assert_eq!(with_autoplay("", "autoplay=1", &[]), None);
    }

    #[test]
    fn stopping_restores_exact_original() {
        let original = "https://www.youtube.com/embed/abc?si=Xy_z&start=5";
        let embed = source(original);
        let playing = embed.started(original).unwrap();
        assert_eq!(embed.stopped(&playing), Some(original));
    }

    #[test]
    fn stopping_at_original_does_not_reload() {
        let embed = source("https://www.youtube.com/embed/abc");
        assert_eq!(embed.stopped("https://www.youtube.com/embed/abc"), None);
    }

    #[test]
    fn missing_original_cannot_stop() {
        let embed = EmbedSource::capture(None, &OverlayConfig::default());
        assert_eq!(embed.stopped("https://x.test/v?autoplay=1"), None);
    }
}
