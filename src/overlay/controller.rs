use std::cell::RefCell;
use std::rc::Rc;

use log::{debug, info};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlElement, KeyboardEvent, MouseEvent};

use crate::config::OverlayConfig;
use crate::error::{EnhanceError, Tolerate};
use crate::overlay::machine::{hide_plan, is_play_key, OverlayMachine, OverlayStep};
use crate::overlay::media::{Media, MediaControl};
use crate::schedule::StepSequence;

pub struct OverlayController {
    overlay: HtmlElement,
    media: Media,
    hidden_class: String,
    plan: Vec<(u32, OverlayStep)>,
    machine: RefCell<OverlayMachine>,
    sequence: RefCell<StepSequence>,
}

impl OverlayController {
    pub fn new(overlay: HtmlElement, media: Media, config: &OverlayConfig) -> Rc<Self> {
        Rc::new(Self {
            overlay,
            media,
            hidden_class: config.hidden_class.clone(),
            plan: hide_plan(config),
            machine: RefCell::new(OverlayMachine::default()),
            sequence: RefCell::new(StepSequence::idle()),
        })
    }

    fn set_opacity(&self, value: &str) -> Result<(), EnhanceError> {
        self.overlay
            .style()
            .set_property("opacity", value)
            .map_err(EnhanceError::platform("overlay opacity"))
    }

    fn set_aria_hidden(&self, hidden: bool) -> Result<(), EnhanceError> {
        self.overlay
            .set_attribute("aria-hidden", if hidden { "true" } else { "false" })
            .map_err(EnhanceError::platform("overlay aria-hidden"))
    }

    fn show(&self) {
        self.sequence.borrow_mut().cancel();
        self.overlay
            .class_list()
            .remove_1(&self.hidden_class)
            .map_err(EnhanceError::platform("overlay classList"))
            .tolerate();
        self.set_opacity("1").tolerate();
        self.set_aria_hidden(false).tolerate();
    }

    fn run(&self, step: OverlayStep) {
        match step {
            OverlayStep::Conceal => {
                self.overlay
                    .class_list()
                    .add_1(&self.hidden_class)
                    .map_err(EnhanceError::platform("overlay classList"))
                    .tolerate();
                self.set_aria_hidden(true).tolerate();
            }
            OverlayStep::StartMedia => self.media.start(),
            OverlayStep::FocusMedia => self.media.focus(),
        }
    }

    /// Fades the overlay out and starts the video. A second activation
    /// replaces whatever is left of the first one's sequence.
    pub fn play(self: &Rc<Self>) {
        self.machine.borrow_mut().activate();
        self.set_opacity("0").tolerate();

        let this = Rc::downgrade(self);
        let sequence = StepSequence::start(&self.plan, move |step| {
            if let Some(this) = this.upgrade() {
                this.run(step);
            }
        });
        *self.sequence.borrow_mut() = sequence;
    }

    /// Escape: stop the video and bring the overlay back.
    pub fn dismiss(&self) {
        if !self.machine.borrow_mut().dismiss() {
            return;
        }
        self.media.stop();
        self.show();
    }

    fn reset(&self) {
        self.media.stop();
        self.show();
    }
}

/// Wires the overlay only when overlay, trigger and media are all present.
pub fn install(
    document: &Document,
    overlay: Option<HtmlElement>,
    trigger: Option<HtmlElement>,
    media: Option<Element>,
    config: &OverlayConfig,
) -> Result<(), EnhanceError> {
    let (Some(overlay), Some(trigger), Some(media)) = (overlay, trigger, media) else {
        debug!("video overlay incomplete on page, skipping");
        return Ok(());
    };
    let Some(media) = Media::detect(media, config) else {
        debug!("#{} is neither a media element nor an iframe", config.media_id);
        return Ok(());
    };
    let embedded = matches!(media, Media::Embedded { .. });
    let controller = OverlayController::new(overlay.clone(), media, config);

    let click_callback = {
        let controller = controller.clone();
        Closure::wrap(Box::new(move |e: MouseEvent| {
            e.prevent_default();
            controller.play();
        }) as Box<dyn FnMut(MouseEvent)>)
    };
    trigger
        .add_event_listener_with_callback("click", click_callback.as_ref().unchecked_ref())
        .map_err(EnhanceError::platform("addEventListener(click)"))?;
    click_callback.forget();

    let escape_callback = {
        let controller = controller.clone();
        Closure::wrap(Box::new(move |e: KeyboardEvent| {
            if e.key() == "Escape" {
                controller.dismiss();
            }
        }) as Box<dyn FnMut(KeyboardEvent)>)
    };
    document
        .add_event_listener_with_callback("keydown", escape_callback.as_ref().unchecked_ref())
        .map_err(EnhanceError::platform("addEventListener(keydown)"))?;
    escape_callback.forget();

    let key_callback = Closure::wrap(Box::new(move |e: KeyboardEvent| {
        if is_play_key(&e.key()) {
            e.prevent_default();
            trigger.click();
        }
    }) as Box<dyn FnMut(KeyboardEvent)>);
    overlay
        .add_event_listener_with_callback("keydown", key_callback.as_ref().unchecked_ref())
        .map_err(EnhanceError::platform("addEventListener(keydown)"))?;
    key_callback.forget();

    controller.reset();
    info!("video overlay ready ({})", if embedded { "embedded player" } else { "native media" });
    Ok(())
}
