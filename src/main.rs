use rfq_compare_rust::api::{self, EngineState, WorkflowState};
use rfq_compare_rust::service::rfq_mail::LoggingOutbox;
use rfq_compare_rust::{create_pool, AppConfig, HeuristicEngine, ProcurementService, QuoteEngine};
use std::path::PathBuf;
use std::sync::Arc;
use tower::ServiceBuilder;
use tracing::info;
use tracing_subscriber::fmt::time::ChronoLocal;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 初始化日志 - 使用本地时间格式
    tracing_subscriber::fmt()
        .with_timer(ChronoLocal::new("%Y-%m-%d %H:%M:%S".to_string()))
        .with_target(true)
        .with_level(true)
        .init();

    // 加载配置
    let config = AppConfig::load()?;
    info!("Starting server with config: {:?}", config);

    // 创建数据库连接池
    let pool = create_pool(&config.database).await?;
    info!("Database pool created");

    let engine: Arc<dyn QuoteEngine> = Arc::new(HeuristicEngine);
    let service = Arc::new(ProcurementService::new(
        pool,
        engine.clone(),
        Arc::new(LoggingOutbox::default()),
        config.matching,
    ));

    // 纯引擎路由 + 存储流程路由
    let engine_routes = api::engine_routes(EngineState {
        engine,
        matching: config.matching,
    });
    let workflow_routes = api::workflow_routes(WorkflowState {
        service,
        export_dir: PathBuf::from(&config.export.dir),
    });

    let app = engine_routes
        .merge(workflow_routes)
        .layer(ServiceBuilder::new());

    // 启动服务器
    let addr = format!("{}:{}", config.server.host, config.server.port);
    info!("Server listening on {}", addr);
    info!("API Endpoints:");
    info!("  POST /api/engine/indent/parse        - 请购文本标准化");
    info!("  POST /api/engine/quote/parse         - 报价解析/匹配");
    info!("  POST /api/engine/comparison          - 无存储对比");
    info!("  POST /api/indents/:id/lines          - 导入请购明细");
    info!("  POST /api/indent-lines/:id/normalize - 重新标准化");
    info!("  POST /api/rfqs/:id/quotes            - 导入供应商报价");
    info!("  POST /api/rfqs/:id/send              - 记录询价邮件");
    info!("  GET  /api/indents/:id/comparison     - 对比矩阵");
    info!("  POST /api/indents/:id/comparison/export - 导出CSV");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
