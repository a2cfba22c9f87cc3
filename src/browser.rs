use log::{info, warn};

/// Best-effort browser launch for `--open`. A failure here never affects
/// the server itself.
pub fn maybe_open_browser(url: &str, open_flag: bool) {
    if !open_flag {
        return;
    }

    match open::that(url) {
        Ok(()) => info!("Opened {} in the default browser", url),
        Err(e) => warn!(
            "Failed to open browser: {}. Please navigate to {} manually.",
            e, url
        ),
    }
}
