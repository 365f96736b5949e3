use anyhow::Result;
use clap::Parser;
use smartpdf_cli::{Cli, backend, console, report, upload};
use smartpdf_telemetry::{LogFormat, TelemetryConfig, init_telemetry};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let format = if cli.json_logs { LogFormat::Json } else { LogFormat::Plain };
    let timings = init_telemetry(&TelemetryConfig::default().with_format(format))?;
    let timings = cli.timings.then_some(&timings);

    let session = backend::session(&cli)?;

    println!("Processing {} document(s)...", cli.files.len());
    let batch = upload::ingest_files(&session, &cli.files).await?;
    println!("{}\n", report::batch(&batch));
    if let Some(timings) = timings {
        print!("{}", report::timings(&timings.take()));
    }

    match &cli.question {
        Some(question) => console::ask_and_print(&session, question, timings).await,
        None => console::run_console(&session, timings).await?,
    }

    Ok(())
}
