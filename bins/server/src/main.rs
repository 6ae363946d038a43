use tracing::error;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Panics go through tracing so they land in the same log stream
    std::panic::set_hook(Box::new(|info| {
        error!(service = "auth-server", event = "panic", message = %info, "panic captured");
    }));

    if let Err(e) = server::run().await {
        error!(service = "auth-server", error = %e, "server exited with error");
        return Err(e);
    }
    Ok(())
}
