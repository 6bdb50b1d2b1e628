//! vrstartup agent binary.
//!
//! Foreground flow: decides first-run vs subsequent run from the persisted
//! log, gates the start phase on a console acknowledgment the first time,
//! and turns an OS termination signal into cooperative cancellation of the
//! lifecycle worker. All substance lives in the library.

use std::sync::Arc;

use colored::Colorize;
use tokio_util::sync::CancellationToken;

use vrstartup::{
    persisted_log_exists, wait_for_termination, Agent, AgentConfig, AgentError, LogBuffer,
    OpenVrClient, ReadinessGate, ShellSpawner,
};

const FIRST_RUN_NOTICE: &str = "\
This agent waits for the VR runtime, then runs every *.cmd script in the
./start folder. If the ./stop folder also contains *.cmd scripts, it stays
in the background and runs them when the runtime quits.

Diagnostics are kept in ./startup.log; this prompt only appears while that
file does not exist yet.";

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), AgentError> {
    let cfg = AgentConfig::default();
    let log = LogBuffer::new();
    let gate = ReadinessGate::new();
    let first_run = !persisted_log_exists(&cfg.log_path);

    let agent = Agent::new(
        cfg,
        log.clone(),
        gate.clone(),
        Arc::new(OpenVrClient::new()),
        Arc::new(ShellSpawner),
    );
    let token = CancellationToken::new();
    let mut worker = tokio::spawn(agent.run(token.child_token()));

    if first_run {
        log.verbose("First run detected, waiting for acknowledgment.");
        println!("{}", "vrstartup".cyan().bold());
        println!("{FIRST_RUN_NOTICE}");
        println!("{}", "Press Enter to continue...".yellow());
        let _ = tokio::task::spawn_blocking(read_acknowledgment).await;
    }
    gate.open();

    let joined = tokio::select! {
        joined = &mut worker => joined,
        _ = wait_for_termination() => {
            token.cancel();
            (&mut worker).await
        }
    };

    match joined {
        Ok(result) => result,
        Err(e) => {
            eprintln!("{}", format!("Lifecycle worker failed: {e}").red());
            Ok(())
        }
    }
}

fn read_acknowledgment() {
    let mut line = String::new();
    let _ = std::io::stdin().read_line(&mut line);
}
