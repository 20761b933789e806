//! saavy-poly - play the voice scheduler from a terminal
//!
//! Run with: cargo run --bin saavy-poly
//! Offline:  cargo run --bin saavy-poly -- --headless

mod app;
mod headless;
mod tone;
mod ui;

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    if std::env::args().skip(1).any(|arg| arg == "--headless") {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
        return headless::run();
    }

    app::run()
}
