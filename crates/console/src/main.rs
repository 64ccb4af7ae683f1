use std::io::{BufRead, Write};

use anyhow::Context;
use clap::Parser;

use portal_console::{Cli, Command, Output, Portal};
use portal_infra::FileSessionStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let mut cli = Cli::parse();

    portal_observability::init(cli.log_format);

    if let Command::Login { secret: secret @ None, .. } = &mut cli.command {
        *secret = Some(prompt_secret().context("failed to read secret from stdin")?);
    }

    let path = cli.session_path();
    tracing::debug!(path = %path.display(), key = %cli.session_key, "using session file");

    let store = FileSessionStore::with_key(path, cli.session_key.clone());
    let portal = Portal::new(store, cli.options());
    let output = if cli.json { Output::Json } else { Output::Text };

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    portal_console::execute(&portal, cli.command, output, &mut out).await?;
    out.flush()?;

    Ok(())
}

fn prompt_secret() -> std::io::Result<String> {
    eprint!("secret: ");
    std::io::stderr().flush()?;

    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}
