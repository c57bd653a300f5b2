mod app;
mod capture;
mod cli;
mod error;
mod platform;
mod save;
mod ui;

use clap::Parser;
use gtk4::glib;
use log::{debug, error};
use std::rc::Rc;

use app::{CaptureConfig, KeyFileSettings};
use cli::Cli;

fn main() -> glib::ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    debug!("Command line: {:?}", cli);

    let settings = Rc::new(KeyFileSettings::open(KeyFileSettings::default_path()));
    let config = match CaptureConfig::from_cli(&cli, settings.as_ref()) {
        Ok(config) => config,
        Err(err) => {
            error!("{}", err);
            return glib::ExitCode::FAILURE;
        }
    };

    app::shell::run(config, settings)
}
