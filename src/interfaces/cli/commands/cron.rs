//! 手动执行一次到期的定时任务

use chrono::Utc;
use colored::Colorize;

use crate::interfaces::cli::CliError;
use crate::scheduler::TaskRunner;
use crate::services::AppServices;

pub async fn run_cron(services: &AppServices) -> Result<(), CliError> {
    let runner = TaskRunner::with_default_tasks(services);
    let report = runner.run_due(Utc::now()).await?;

    print!("{}", report);
    if report.failed() > 0 {
        return Err(CliError::CommandError(format!(
            "{} task(s) failed",
            report.failed()
        )));
    }
    println!("{} {} task(s) ran", "Done:".green().bold(), report.ran());
    Ok(())
}
