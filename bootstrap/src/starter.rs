//! 服务启动器
//!
//! 提供统一的服务启动模式

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use cases_auth_core::{GrpcIdentityProvider, TokenExchangeClient};
use cases_config::{AppConfig, AuthConfig};
use cases_errors::AppResult;
use cases_telemetry::init_metrics;
use tonic::service::Routes;
use tonic::transport::Server;
use tracing::info;

use crate::interceptor::AuthInterceptor;
use crate::layer::AuthLayer;
use crate::policy::MethodPolicyTable;
use crate::runtime::{init_runtime, shutdown_signal};

/// 组装身份服务客户端、令牌交换客户端与授权中间件
///
/// 身份服务连接延迟建立，必须在 tokio 运行时内调用
pub fn build_auth_layer(config: &AuthConfig) -> AppResult<AuthLayer> {
    let provider = GrpcIdentityProvider::connect_lazy(
        &config.identity_endpoint,
        Duration::from_millis(config.request_timeout_ms),
    )?;
    let client = Arc::new(TokenExchangeClient::new(Arc::new(provider)));

    let policies =
        MethodPolicyTable::default_registry().allow_unregistered(config.allow_unregistered_methods);

    let interceptor = AuthInterceptor::new(client, policies).with_token_header(&config.token_header);

    Ok(AuthLayer::new(interceptor))
}

/// 运行 gRPC 服务
///
/// 1. 加载配置
/// 2. 初始化运行时（日志、metrics）
/// 3. 组装授权中间件
/// 4. 调用用户提供的闭包构建 gRPC 路由
/// 5. 启动服务器并处理 graceful shutdown
///
/// # 示例
///
/// ```ignore
/// use cases_bootstrap::run_server;
/// use tonic::service::Routes;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     run_server("config", |_config| async move {
///         Ok(Routes::new(CasesServer::new(CasesService::default())))
///     })
///     .await
/// }
/// ```
pub async fn run_server<F, Fut>(
    config_dir: &str,
    routes_builder: F,
) -> Result<(), Box<dyn std::error::Error>>
where
    F: FnOnce(AppConfig) -> Fut,
    Fut: Future<Output = AppResult<Routes>>,
{
    let config = AppConfig::load(config_dir)?;

    init_runtime(&config)?;

    info!("Starting {} service", config.app_name);

    if let Some(port) = config.telemetry.metrics_port {
        let listen: SocketAddr = format!("{}:{}", config.server.host, port).parse()?;
        init_metrics(listen)?;
        info!(%listen, "Metrics endpoint started");
    }

    let auth_layer = build_auth_layer(&config.auth)?;
    info!(
        identity_endpoint = %config.auth.identity_endpoint,
        methods = auth_layer.interceptor().policies().len(),
        "Auth layer ready"
    );

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    let routes = routes_builder(config).await?;

    info!(%addr, "gRPC server starting");

    Server::builder()
        .layer(auth_layer)
        .add_routes(routes)
        .serve_with_shutdown(addr, shutdown_signal())
        .await?;

    info!("Service stopped");

    Ok(())
}
