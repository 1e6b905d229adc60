use anyhow::{anyhow, Result};
use dotenv::dotenv;
use env_logger::Env;

use solar_edge::argsets::{DashboardArgs, LoginArgs};
use solar_edge::command;
use solar_edge::constants::{defaults, envvars};

const CMD_SERVE: &str = "serve";
const CMD_LOGIN: &str = "login";
const CMD_LOGOUT: &str = "logout";
const CMD_DASHBOARD: &str = "dashboard";
const CMD_CACHE_CLEAR: &str = "cache-clear";

fn main() -> Result<()> {
    let _ = dotenv();
    env_logger::Builder::from_env(Env::default().filter_or(envvars::LOG_LEVEL, defaults::LOG_LEVEL))
        .init();

    let mut args = pico_args::Arguments::from_env();
    match args.subcommand()?.as_deref() {
        Some(CMD_SERVE) => command::serve(),
        Some(CMD_LOGIN) => command::login(LoginArgs {
            token: args.free_from_str()?,
        }),
        Some(CMD_LOGOUT) => command::logout(),
        Some(CMD_DASHBOARD) => command::dashboard(DashboardArgs {
            once: args.contains("--once"),
            base_url: args.opt_value_from_str("--base-url")?,
        }),
        Some(CMD_CACHE_CLEAR) => command::cache_clear(),
        _ => Err(anyhow!(
            "Subcommand must be one of 'serve', 'login', 'logout', 'dashboard', 'cache-clear'"
        )),
    }
}
