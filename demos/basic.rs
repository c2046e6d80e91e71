use rabbit_log_sink::init::init_console;
use rabbit_log_sink::{LogMessage, LoggerConfig, RabbitLogger};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_console()?;

    let config = LoggerConfig {
        protocol: "amqp".to_string(),
        timezone: "Asia/Aqtau".to_string(),
        hostname: "localhost".to_string(),
        port: 5672,
        username: "guest".to_string(),
        password: "guest".to_string(),
        vhost: "/".to_string(),
        queue: "log-queue".to_string(),
        env: "development".to_string(),
        project_name: "ExampleProject".to_string(),
    };

    let logger = RabbitLogger::connect(config).await?;

    logger
        .info(
            LogMessage::new("Test message")
                .action_name("TestAction")
                .action_stage("success")
                .transaction_id("12345"),
        )
        .await;

    logger.release().await;
    Ok(())
}
