//! Basic usage example for ApiTrail Actix SDK
//!
//! This example demonstrates how to integrate the middleware into an Actix-Web
//! application with a sink that pretty-prints every record to stdout.
//!
//! Run with:
//! ```bash
//! cargo run --example basic_usage
//! ```

use actix_web::{web, App, HttpMessage, HttpRequest, HttpResponse, HttpServer};
use apitrail_actix::{ApiTrailMiddleware, Config, LogRecord, LogSink, Principal, SinkError};
use async_trait::async_trait;

/// Prints each record as pretty JSON instead of persisting it anywhere.
#[derive(Clone, Copy)]
struct StdoutSink;

#[async_trait]
impl LogSink for StdoutSink {
    async fn persist(&self, record: LogRecord) -> Result<(), SinkError> {
        let text = serde_json::to_string_pretty(&record)?;
        println!("{text}");
        Ok(())
    }
}

async fn index() -> HttpResponse {
    HttpResponse::Ok().body("Hello ApiTrail!")
}

async fn search() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "results": [],
        "took_ms": 3
    }))
}

async fn echo(body: String) -> HttpResponse {
    HttpResponse::Ok().body(body)
}

async fn login(req: HttpRequest) -> HttpResponse {
    // A real app would authenticate here; the inserted principal is what
    // ties the record to a user.
    req.extensions_mut().insert(Principal::new("7", "myuser"));
    HttpResponse::Ok().json(serde_json::json!({ "status": "logged in" }))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let config = Config::builder()
        .sensitive_field("token")
        .build()
        .map_err(std::io::Error::other)?;

    println!("🚀 Starting example server on http://0.0.0.0:8080");
    println!("📋 ApiTrail middleware is active - records print to stdout");
    println!("\nTry these endpoints:");
    println!("  GET  http://localhost:8080/");
    println!("  GET  http://localhost:8080/search?q=rust&token=hunter2");
    println!("  POST http://localhost:8080/echo");
    println!("  POST http://localhost:8080/login");

    HttpServer::new(move || {
        App::new()
            // Add ApiTrail middleware - that's all you need!
            .wrap(ApiTrailMiddleware::with_config(config.clone(), StdoutSink))
            // Your normal routes
            .service(web::resource("/").route(web::get().to(index)))
            .service(web::resource("/search").route(web::get().to(search)))
            .service(web::resource("/echo").route(web::post().to(echo)))
            .service(web::resource("/login").route(web::post().to(login)))
    })
    .bind("0.0.0.0:8080")?
    .run()
    .await
}
