use log::error;

mod bank;
mod commands;
mod config;
mod lint;
mod output;
mod quiz;
mod run;
mod template;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let result = commands::parse(std::env::args().skip(1)).and_then(commands::execute);
    if let Err(e) = result {
        error!("{:#}", e);
        std::process::exit(1);
    }
}
