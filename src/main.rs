use actix_web::{App, HttpResponse, HttpServer, middleware::Logger, web};
use chrono::Local; // timestamp in log lines
use env_logger::{Env, Target};
use std::io::Write; // for env_logger custom formatter

use contest_rewards_backend::{
    config::Config,
    database::{create_pool, run_migrations},
    external::{AdapterRegistry, Notifier},
    handlers,
    middlewares::{AuthMiddleware, create_cors},
    services::*,
    swagger::swagger_config,
    tasks,
    utils::JwtService,
};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format(|buf, record| {
            let ts = Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z");
            let level = record.level().as_str().to_ascii_lowercase();
            let msg_json = serde_json::to_string(&format!("{}", record.args()))
                .unwrap_or_else(|_| "\"<invalid utf8>\"".to_string());
            writeln!(
                buf,
                "{{\"timestamp\":\"{}\",\"level\":\"{}\",\"message\":{},\"target\":\"{}\"}}",
                ts,
                level,
                msg_json,
                record.target(),
            )
        })
        .target(Target::Stdout)
        .init();

    // 加载配置
    let config = Config::from_toml().expect("Failed to load configuration file");

    // 创建数据库连接池
    let pool = create_pool(&config.database)
        .await
        .expect("Failed to create database connection pool");

    // 运行数据库迁移
    run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");

    // 创建JWT服务
    let jwt_service = JwtService::new(&config.jwt.secret, config.jwt.access_token_expires_in);

    // 创建外部适配器与通知器
    let adapters = AdapterRegistry::from_config(&config.providers);
    let notifier = Notifier::new(config.notify.clone());
    if config.providers.mode != "live" {
        log::warn!("payout providers running in simulated mode");
    }

    // 创建服务
    let entry_service = EntryService::new(pool.clone());
    let draw_service = DrawService::new(pool.clone());
    let payout_account_service = PayoutAccountService::new(pool.clone());
    let payout_service = PayoutService::new(
        pool.clone(),
        payout_account_service.clone(),
        adapters,
        notifier,
        config.providers.send_timeout_secs,
        config.batch.concurrency,
    );

    // 启动后台扫描任务（按配置）
    tasks::spawn_all(&config.batch, payout_service.clone(), draw_service.clone());

    // 启动HTTP服务器
    log::info!(
        "Starting HTTP server at {}:{}",
        config.server.host,
        config.server.port
    );

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(create_cors())
            .wrap(AuthMiddleware::new(jwt_service.clone()))
            .app_data(web::Data::new(entry_service.clone()))
            .app_data(web::Data::new(draw_service.clone()))
            .app_data(web::Data::new(payout_account_service.clone()))
            .app_data(web::Data::new(payout_service.clone()))
            .configure(swagger_config)
            .route("/health", web::get().to(health))
            .service(
                web::scope("/api/v1")
                    .configure(handlers::entry_config)
                    .configure(handlers::draw_config)
                    .configure(handlers::payout_account_config)
                    .configure(handlers::payout_config),
            )
    })
    .bind((config.server.host.as_str(), config.server.port))?
    .run()
    .await
}

async fn health() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}
