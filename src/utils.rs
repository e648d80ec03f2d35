// Browser-side plumbing: panic hook, a `log` backend that writes to the
// developer console, and a console timer guard for profiling frames. Off the
// web the backend discards records; native runs install their own logger.

use log::{Level, LevelFilter, Log, Metadata, Record};

pub fn set_panic_hook() {
    // When the `console_error_panic_hook` feature is enabled, we can call the
    // `set_panic_hook` function at least once during initialization, and then
    // we will get better error messages if our code ever panics.
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

struct ConsoleLogger;

static LOGGER: ConsoleLogger = ConsoleLogger;

impl Log for ConsoleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = format!("[{}] {}", record.target(), record.args());
        write_console(record.level(), &line);
    }

    fn flush(&self) {}
}

#[cfg(target_arch = "wasm32")]
fn write_console(level: Level, line: &str) {
    use web_sys::console;
    let value = wasm_bindgen::JsValue::from_str(line);
    match level {
        Level::Error => console::error_1(&value),
        Level::Warn => console::warn_1(&value),
        Level::Info => console::info_1(&value),
        Level::Debug | Level::Trace => console::debug_1(&value),
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn write_console(_level: Level, _line: &str) {}

/// Installs the console logger. Calling it again only changes the level.
pub fn init_logging(level: LevelFilter) {
    if log::set_logger(&LOGGER).is_err() {
        log::debug!("console logger already installed");
    }
    log::set_max_level(level);
}

/// Reports the time between construction and drop under `name` in the
/// browser's performance timeline. Does nothing off the web.
pub struct Timer<'a> {
    name: &'a str,
}

impl<'a> Timer<'a> {
    pub fn new(name: &'a str) -> Timer<'a> {
        #[cfg(target_arch = "wasm32")]
        web_sys::console::time_with_label(name);
        Timer { name }
    }
}

impl<'a> Drop for Timer<'a> {
    fn drop(&mut self) {
        #[cfg(target_arch = "wasm32")]
        web_sys::console::time_end_with_label(self.name);
        #[cfg(not(target_arch = "wasm32"))]
        let _ = self.name;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn native_logger_accepts_records_silently() {
        LOGGER.log(
            &Record::builder()
                .level(Level::Info)
                .target("particle_surfer")
                .args(format_args!("frame {}", 1))
                .build(),
        );
        LOGGER.flush();
        let _timer = Timer::new("native timer");
    }
}
