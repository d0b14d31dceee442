//! Migrate command implementation

use anyhow::Result;
use chm_core::Config;
use chm_migrate::{applied_message, migrate, MigrateError};

use crate::cli::{GlobalArgs, MigrateArgs};
use crate::commands::common::{load_config, ExitCode};

/// Execute the migrate command
pub(crate) async fn execute(args: &MigrateArgs, global: &GlobalArgs) -> Result<()> {
    let config = load_config(global)?.merge(overrides(args));
    let config = match config.resolve() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            return Err(ExitCode(1).into());
        }
    };

    log::debug!(
        "Migrating {} database {} from {}",
        config.url,
        config.db,
        config.migrations_home.display()
    );

    match migrate(&config).await {
        Ok(outcome) => {
            println!("{}", outcome.summary());
            log::debug!(
                "{} applied, {} already applied, {}ms",
                outcome.applied.len(),
                outcome.skipped,
                outcome.duration.as_millis()
            );
            Ok(())
        }
        Err(e) => {
            report_failure(&e);
            Err(ExitCode(1).into())
        }
    }
}

/// Print what completed before the failure, then the failure itself
fn report_failure(err: &MigrateError) {
    if !err.applied().is_empty() {
        println!("{}", applied_message(err.applied()));
    }
    eprintln!("Error: {}", err);
}

/// Flags and environment variables as a config layer
fn overrides(args: &MigrateArgs) -> Config {
    Config {
        url: args.url.clone(),
        user: args.user.clone(),
        password: args.password.clone(),
        db: args.db.clone(),
        migrations_home: args.migrations_home.clone(),
        engine: args.engine.clone(),
        request_timeout: args.request_timeout,
    }
}

#[cfg(test)]
#[path = "migrate_test.rs"]
mod tests;
