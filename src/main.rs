use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use tokio::{signal, sync::watch};
use tracing::{error, info, warn};

use mfg_workflow_api as api;
use api::message_queue::{InMemoryMessageQueue, MessageQueue, RedisMessageQueue};
use api::notifications::{LogMailer, MailWorker};
use api::services::code_generator::{CounterStore, InMemoryCounterStore, RedisCounterStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cfg = api::config::load_config()?;
    api::config::init_tracing(cfg.log_level(), cfg.log_json);
    api::handlers::health::init_start_time();

    let db_pool = api::db::establish_connection_from_app_config(&cfg).await?;
    if cfg.auto_migrate {
        api::db::run_migrations(&db_pool).await?;
    }
    let db = Arc::new(db_pool);

    let uses_redis = |backend: &str| backend.eq_ignore_ascii_case("redis");
    let redis_client = if uses_redis(&cfg.counter_backend) || uses_redis(&cfg.message_queue_backend)
    {
        let client = redis::Client::open(cfg.redis_url.clone())
            .with_context(|| format!("invalid redis url {}", cfg.redis_url))?;
        Some(Arc::new(client))
    } else {
        None
    };

    let counters: Arc<dyn CounterStore> = match &redis_client {
        Some(client) if uses_redis(&cfg.counter_backend) => {
            Arc::new(RedisCounterStore::new(client.clone()))
        }
        _ => {
            warn!("using in-memory code counters; sequences restart with the process");
            Arc::new(InMemoryCounterStore::new())
        }
    };

    let queue: Arc<dyn MessageQueue> = match &redis_client {
        Some(client) if uses_redis(&cfg.message_queue_backend) => {
            match RedisMessageQueue::connect(
                client.as_ref().clone(),
                cfg.message_queue_namespace.clone(),
            )
            .await
            {
                Ok(queue) => Arc::new(queue),
                Err(e) => {
                    error!(error = %e, "redis message queue unavailable, falling back to in-memory");
                    Arc::new(InMemoryMessageQueue::new())
                }
            }
        }
        _ => Arc::new(InMemoryMessageQueue::new()),
    };

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let worker = if cfg.mail_worker_enabled {
        let worker = MailWorker::new(queue.clone(), Arc::new(LogMailer));
        Some(tokio::spawn(worker.run(shutdown_rx)))
    } else {
        None
    };

    let services = api::services::AppServices::new(db.clone(), &cfg, counters, queue);
    let cfg = Arc::new(cfg);
    let state = api::AppState {
        db: db.clone(),
        config: cfg.clone(),
        redis: redis_client,
        services,
    };

    if api::cors_layer(&cfg).is_none() {
        warn!("no CORS policy configured; cross-origin requests will be rejected");
    }
    let app = api::build_router(state);

    let ip = cfg
        .host
        .parse()
        .with_context(|| format!("invalid listen host {}", cfg.host))?;
    let addr = SocketAddr::new(ip, cfg.port);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(%addr, environment = %cfg.environment, "mfg-workflow-api listening");

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    let _ = shutdown_tx.send(true);
    if let Some(worker) = worker {
        if let Err(e) = worker.await {
            error!(error = %e, "mail worker terminated abnormally");
        }
    }
    if let Ok(pool) = Arc::try_unwrap(db) {
        if let Err(e) = pool.close().await {
            warn!(error = %e, "database pool did not close cleanly");
        }
    }
    info!("shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("shutdown signal received");
}
