//! Live streaming: pointer events on stdin, frames on stdout.

use tokio::sync::mpsc;
use webtuio_common::config::AppConfig;
use webtuio_tracker::sources::{spawn_source, JsonLinesSource};
use webtuio_tracker::transport::JsonLinesTransport;
use webtuio_tracker::StreamRunner;

pub async fn run(config: &AppConfig) -> anyhow::Result<()> {
    let transport = JsonLinesTransport::new(std::io::stdout()).line_buffered();
    let mut runner = StreamRunner::new(config, Box::new(transport));

    let (tx, rx) = mpsc::channel(256);
    let source = JsonLinesSource::new(std::io::BufReader::new(std::io::stdin()));
    let reader = spawn_source(Box::new(source), tx);

    let stop_flag = runner.stop_flag();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupt received, stopping stream");
            stop_flag.store(true, std::sync::atomic::Ordering::SeqCst);
        }
    });

    let stats = runner.run(rx).await?;
    if reader.is_finished() {
        let _ = reader.join();
    }

    eprintln!("{}", serde_json::to_string(&stats)?);
    Ok(())
}
