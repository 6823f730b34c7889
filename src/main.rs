mod app;
mod application;
mod config;
mod domain;
mod host;
mod logging;
mod ui;
mod utils;

use iced::window;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let settings = config::Settings::load()?;
    logging::init(&settings.log_filter);

    // Transfers run here; iced drives the UI on its own executor
    let runtime = tokio::runtime::Runtime::new()?;
    let handle = runtime.handle().clone();

    let icon_data = include_bytes!("../assets/icon.png");

    let icon = match image::load_from_memory(icon_data) {
        Ok(img) => {
            let rgba = img.to_rgba8();
            let (width, height) = rgba.dimensions();
            window::icon::from_rgba(rgba.into_raw(), width, height).ok()
        }
        Err(_) => None,
    };

    iced::application(
        move || app::DownloadApp::boot(handle.clone(), settings.clone()),
        app::update,
        app::view,
    )
    .title("Download Queue")
    .subscription(app::subscription)
    .window(window::Settings {
        icon,
        ..Default::default()
    })
    .run()?;

    Ok(())
}
