//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `taskdesk_core` linkage with deterministic output.
//! - Optionally load a JSON config (first argument), start logging from it
//!   and summarize the configured store without creating it.

use std::error::Error;
use std::process::ExitCode;
use taskdesk_core::{
    AuthSession, CoreConfig, LocalTaskRepository, LocalUserRepository, TaskRepository,
    UserRepository,
};

fn main() -> ExitCode {
    println!("taskdesk_core ping={}", taskdesk_core::ping());
    println!("taskdesk_core version={}", taskdesk_core::core_version());

    let Some(config_path) = std::env::args().nth(1) else {
        return ExitCode::SUCCESS;
    };

    match summarize_store(&config_path) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("taskdesk_cli error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn summarize_store(config_path: &str) -> Result<(), Box<dyn Error>> {
    let config = CoreConfig::from_path(config_path)?;
    config.init_logging()?;

    // Summary is read-only: a mistyped store_path must not create a file.
    let store = config.open_existing_store()?;
    let users = LocalUserRepository::new(&store).list_users()?;
    let tasks = LocalTaskRepository::new(&store).list_all_tasks()?;
    let session = AuthSession::start(&store, config.session_config())?;

    println!(
        "store backend={} users={} tasks={} session={}",
        store.backend().kind(),
        users.len(),
        tasks.len(),
        session.state().label()
    );
    Ok(())
}
