use std::io::Write;

use clap::{Parser, ValueEnum};
use scardrun::pcsc::PcscSubsystem;
use scardrun::session::{run_and_report, Session};
use scardrun::subsystem::Scope;
use scardrun::Script;
use tracing_subscriber::EnvFilter;

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
enum ScriptName {
    /// SELECT MF, DF 11 00, EF 11 02, then READ BINARY
    Personal,
    /// SELECT MF, DF 10 00, EF 10 03, then READ BINARY
    CardIdentity,
}

impl From<ScriptName> for Script {
    fn from(name: ScriptName) -> Self {
        match name {
            ScriptName::Personal => Script::personal(),
            ScriptName::CardIdentity => Script::card_identity(),
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
enum ScopeName {
    User,
    Terminal,
    System,
}

impl From<ScopeName> for Scope {
    fn from(name: ScopeName) -> Self {
        match name {
            ScopeName::User => Scope::User,
            ScopeName::Terminal => Scope::Terminal,
            ScopeName::System => Scope::System,
        }
    }
}

/// Selects a file on the smartcard in the first reader and dumps its content.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Command sequence to send to the card
    #[arg(long, value_enum, default_value_t = ScriptName::Personal)]
    script: ScriptName,

    /// Scope of the PC/SC context
    #[arg(long, value_enum, default_value_t = ScopeName::System)]
    scope: ScopeName,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let session = Session::new(PcscSubsystem)
        .with_scope(cli.scope.into())
        .with_script(cli.script.into());

    // A handled failure is already printed as the `Ouch:` line and still exits with 0.
    let mut out = std::io::stdout().lock();
    if let Err(e) = run_and_report(&session, &mut out).and_then(|_| out.flush()) {
        tracing::error!("Could not write the report: {}", e);
    }
}
