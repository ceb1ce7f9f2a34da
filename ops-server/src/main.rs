use ops_server::{Config, Server, ServerState, init_logger_with_file};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. 环境与日志
    dotenv::dotenv().ok();
    let config = Config::from_env();
    init_logger_with_file(
        std::env::var("LOG_LEVEL").ok().as_deref(),
        config.log_dir.as_deref(),
    );

    tracing::info!("Ladle operations server starting...");

    // 2. 装配状态并启动 HTTP 服务器
    let state = ServerState::initialize(&config);
    let server = Server::new(state);

    if let Err(e) = server.run().await {
        tracing::error!("Server error: {}", e);
        return Err(e);
    }

    Ok(())
}
