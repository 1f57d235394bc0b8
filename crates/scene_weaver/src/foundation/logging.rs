//! Logging utilities and structured logging support

pub use log::{debug, info, warn, error, trace};

/// Initialize the logging system
///
/// Reads the filter from `RUST_LOG`. Calling this twice is harmless: the
/// second initialization attempt is ignored.
pub fn init() {
    let _ = env_logger::try_init();
}

/// Initialize logging with an explicit default filter (e.g. `"scene_weaver=debug"`)
///
/// `RUST_LOG` still takes precedence when it is set.
pub fn init_with_filter(default_filter: &str) {
    let env = env_logger::Env::default().default_filter_or(default_filter);
    let _ = env_logger::Builder::from_env(env).try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repeated_init_is_ignored() {
        init_with_filter("scene_weaver=trace");
        init();
        debug!("logging initialized twice without panicking");
    }
}
