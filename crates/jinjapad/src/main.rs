mod app;
mod clipboard;
mod config;
mod editor;
mod events;
mod hub;
mod keymap;
mod logging;
mod state;
mod template;
mod theme;
mod ui;

fn main() -> std::io::Result<()> {
    logging::init();
    app::run()
}
