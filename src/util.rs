// Console logging helpers. Native builds (unit tests) have no console to talk to.

pub fn clog(msg: &str) {
    #[cfg(target_arch = "wasm32")]
    gloo::console::log!(msg);
    #[cfg(not(target_arch = "wasm32"))]
    let _ = msg;
}

pub fn cwarn(msg: &str) {
    #[cfg(target_arch = "wasm32")]
    gloo::console::warn!(msg);
    #[cfg(not(target_arch = "wasm32"))]
    let _ = msg;
}

/// Milliseconds since the epoch, the clock pointer handlers stamp samples with.
pub fn now_ms() -> f64 {
    js_sys::Date::now()
}
