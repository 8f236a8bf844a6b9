use std::env;

use log::info;

use crate::logger;

pub fn startup(name: &str) -> Result<(), Box<dyn std::error::Error + Send + Sync + 'static>> {
    unsafe {
        env::set_var("RUST_BACKTRACE", "1");
    }
    logger::setup_logger()?;
    log_panics::init();

    info!("--- {} ---", name);

    Ok(())
}
