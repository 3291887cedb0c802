/// Route `log` messages to STDERR. The default level is `info`; set `RUST_LOG` to override.
///
/// If a logger is already installed, it stays in place and this says so through it.
pub fn setup() {
    use env_logger::{Builder, Env};
    if let Err(err) = Builder::from_env(Env::default().default_filter_or("info")).try_init() {
        warn!("Keeping the existing logger: {}", err);
    }
}
