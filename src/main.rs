mod app;
mod overlay;
mod pet;
mod render;
mod schedule;
mod settings;
mod sprite;

fn main() {
    env_logger::init();
    log::info!("spritecat starting up");

    if let Err(e) = app::run() {
        log::error!("Fatal error: {e}");
        std::process::exit(1);
    }
}
