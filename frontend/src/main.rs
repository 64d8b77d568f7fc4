use crate::app::App;

mod app;
mod components;
mod config;
mod platform;

fn main() {
    platform::ConsoleLogger::init(log::LevelFilter::Info);
    platform::install_unload_guard();
    yew::Renderer::<App>::new().render();
}
