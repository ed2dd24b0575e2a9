use log::debug;
use thiserror::Error;
use wasm_bindgen::JsValue;

#[derive(Debug, Error)]
pub enum EnhanceError {
    #[error("no global window")]
    NoWindow,
    #[error("window has no document")]
    NoDocument,
    #[error("browser rejected {op}: {detail}")]
    Platform { op: &'static str, detail: String },
    #[error("invalid page config: {0}")]
    Config(#[from] serde_json::Error),
}

impl EnhanceError {
    /// Builds a mapper for `Result<_, JsValue>` coming back from a browser call.
    pub fn platform(op: &'static str) -> impl FnOnce(JsValue) -> Self {
        move |value| Self::Platform {
            op,
            detail: describe(&value),
        }
    }
}

fn describe(value: &JsValue) -> String {
    value.as_string().unwrap_or_else(|| format!("{:?}", value))
}

/// Handlers never let a browser failure escape; they log it and move on.
pub trait Tolerate<T> {
    fn tolerate(self) -> Option<T>;
}

impl<T> Tolerate<T> for Result<T, EnhanceError> {
    fn tolerate(self) -> Option<T> {
        match self {
            Ok(value) => Some(value),
            Err(err) => {
                debug!("ignored: {}", err);
                None
            }
        }
    }
}
