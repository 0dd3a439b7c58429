//! Developer-facing log lines. The browser console on wasm32, stderr
//! everywhere else (native tests).

#[cfg(target_arch = "wasm32")]
pub fn log(msg: &str) {
    web_sys::console::log_1(&format!("Dragon Arena: {msg}").into());
}

#[cfg(target_arch = "wasm32")]
pub fn warn(msg: &str) {
    web_sys::console::warn_1(&format!("Dragon Arena: {msg}").into());
}

#[cfg(not(target_arch = "wasm32"))]
pub fn log(msg: &str) {
    eprintln!("Dragon Arena: {msg}");
}

#[cfg(not(target_arch = "wasm32"))]
pub fn warn(msg: &str) {
    eprintln!("Dragon Arena [warn]: {msg}");
}
