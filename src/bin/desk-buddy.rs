#[path = "desk-buddy/app.rs"]
mod app;
#[path = "desk-buddy/args.rs"]
mod args;
#[path = "desk-buddy/logging.rs"]
mod logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    app::run().await
}
