mod messages;
mod state;
mod update;
mod view;

pub use state::App;

use crate::config::AppConfig;

/// Launch the reader, optionally loading `initial_source` right away.
pub fn run_app(config: AppConfig, initial_source: Option<String>) -> iced::Result {
    iced::application("Web2Speech", App::update, App::view)
        .subscription(App::subscription)
        .run_with(move || App::bootstrap(config, initial_source))
}
