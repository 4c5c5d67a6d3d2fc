// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: MIT-0

use std::fs::OpenOptions;
use std::io::Write;
use std::sync::Mutex;

use anyhow::Context;
use clap::Parser;
use gke_eks_auth::application::Application;
use gke_eks_auth::configuration::AuthOptions;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let options = AuthOptions::parse();

    let filter = EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| options.log_directive().into()),
    );
    let subscriber = tracing_subscriber::fmt()
        .json()
        .with_env_filter(filter)
        .with_current_span(false)
        .with_ansi(false)
        .with_target(false);

    // stdout is reserved for the ExecCredential
    match &options.log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("failed to open log file {}", path.display()))?;
            subscriber.with_writer(Mutex::new(file)).init();
        }
        None => subscriber.with_writer(std::io::stderr).init(),
    }

    tracing::debug!("[main] {:?}", &options);

    let application = Application::build(options).await?;
    let output = application.run().await?;

    let mut stdout = std::io::stdout().lock();
    stdout.write_all(&output).context("failed to write credential")?;
    stdout.flush().context("failed to write credential")?;

    Ok(())
}
