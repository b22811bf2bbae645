mod config_gen;
mod cron;
mod user;

pub use config_gen::config_generate;
pub use cron::run_cron;
pub use user::create_user;
