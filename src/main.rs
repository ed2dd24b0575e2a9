use log::{info, warn};

use page_enhance::config;

fn main() {
    // Initialize console error panic hook for better error messages
    console_error_panic_hook::set_once();

    // Initialize logging
    console_log::init_with_level(config::log_level()).expect("error initializing log");

    info!("Starting page enhancements");
    if let Err(err) = page_enhance::boot() {
        warn!("page enhancements disabled: {}", err);
    }
}
