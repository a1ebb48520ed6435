use std::net::TcpListener;
use std::sync::Mutex;

use actix::Actor;
use actix_cors::Cors;
use actix_web::dev::Server;
use actix_web::{web, App, HttpServer};
use tracing_actix_web::TracingLogger;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::configuration::Settings;
use crate::finance_client::FinanceClient;
use crate::openapi::ApiDoc;
use crate::order_client::OrderClient;
use crate::routes::main_route;
use crate::routes::order::models::OrderBoard;
use crate::session_client::SessionClient;
use crate::websocket;

pub struct Application {
    port: u16,
    server: Server,
}

impl Application {
    pub async fn build(configuration: Settings) -> Result<Self, anyhow::Error> {
        let address = format!(
            "{}:{}",
            configuration.application.host, configuration.application.port
        );
        let listener = TcpListener::bind(&address)?;
        let port = listener.local_addr()?.port();
        let server = run(listener, configuration).await?;
        Ok(Self { port, server })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    // Only returns when the application is stopped.
    pub async fn run_until_stopped(self) -> Result<(), std::io::Error> {
        self.server.await
    }
}

async fn run(listener: TcpListener, configuration: Settings) -> Result<Server, anyhow::Error> {
    let order_client = web::Data::new(OrderClient::new(&configuration.order_provider));
    let finance_client = web::Data::new(FinanceClient::new(&configuration.finance_provider));
    let session_client = web::Data::new(SessionClient::new(&configuration.session_provider));
    let order_board = web::Data::new(Mutex::new(OrderBoard::new()));
    let ws_server = web::Data::new(websocket::Server::new().start());
    let workers = configuration.application.workers;
    let cors_origin = configuration.application.cors_origin.clone();
    let settings = web::Data::new(configuration);

    let server = HttpServer::new(move || {
        let cors = Cors::default()
            .allowed_origin(&cors_origin)
            .allow_any_method()
            .allow_any_header()
            .supports_credentials();
        App::new()
            .wrap(TracingLogger::default())
            .wrap(cors)
            .app_data(order_client.clone())
            .app_data(finance_client.clone())
            .app_data(session_client.clone())
            .app_data(order_board.clone())
            .app_data(ws_server.clone())
            .app_data(settings.clone())
            .configure(main_route)
            .service(
                SwaggerUi::new("/docs/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
            )
    })
    .workers(workers)
    .listen(listener)?
    .run();

    Ok(server)
}
