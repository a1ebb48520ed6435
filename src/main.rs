use vendor_dashboard_api::{
    configuration::get_configuration,
    startup::Application,
    telemetry::{get_json_subscriber, get_subscriber, init_subscriber},
};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // JSON logs in deployed environments, human-readable output locally.
    if std::env::var("APP_JSON_LOGS").is_ok() {
        let subscriber =
            get_json_subscriber("vendor-dashboard-api".into(), "info".into(), std::io::stdout);
        init_subscriber(subscriber);
    } else {
        let subscriber =
            get_subscriber("vendor-dashboard-api".into(), "info".into(), std::io::stdout);
        init_subscriber(subscriber);
    }

    let configuration = get_configuration().expect("Failed to read configuration.");
    let application = Application::build(configuration).await?;
    tracing::info!("Listening on port {}", application.port());
    application.run_until_stopped().await?;
    Ok(())
}
