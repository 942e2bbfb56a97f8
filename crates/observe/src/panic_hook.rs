/// Installs a panic hook that prints roughly the same message as the default
/// panic hook but uses `tracing::error!` so the message shows up in the
/// regular log format.
pub fn install() {
    std::panic::set_hook(Box::new(|panic| {
        let thread = std::thread::current();
        let name = thread.name().unwrap_or("<unnamed>");
        let backtrace = std::backtrace::Backtrace::force_capture();
        tracing::error!("thread '{name}' {panic}\nstack backtrace:\n{backtrace}");
    }));
}
