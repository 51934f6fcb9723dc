//! gRPC 认证授权拦截器
//!
//! 每个 RPC：提取令牌 → 解析会话 → 查方法策略 → 许可证检查 → OBAC 检查 → 分发

use std::future::Future;
use std::sync::Arc;

use cases_auth_core::{Session, TokenExchangeClient};
use cases_errors::{AppError, AppResult};
use metrics::counter;
use tonic::{Request, Response, Status};
use tracing::{Instrument, debug, info, warn};

use crate::policy::MethodPolicyTable;
use crate::trace::TraceInfo;

/// 标准认证头
pub const AUTHORIZATION_HEADER: &str = "authorization";

/// 默认的令牌头
pub const DEFAULT_TOKEN_HEADER: &str = "x-access-token";

#[derive(Clone)]
pub struct AuthInterceptor {
    client: Arc<TokenExchangeClient>,
    policies: Arc<MethodPolicyTable>,
    token_header: String,
}

impl AuthInterceptor {
    pub fn new(client: Arc<TokenExchangeClient>, policies: MethodPolicyTable) -> Self {
        Self {
            client,
            policies: Arc::new(policies),
            token_header: DEFAULT_TOKEN_HEADER.to_string(),
        }
    }

    /// 设置携带令牌的元数据键（不区分大小写）
    pub fn with_token_header(mut self, header: impl Into<String>) -> Self {
        self.token_header = header.into().to_ascii_lowercase();
        self
    }

    pub fn token_header(&self) -> &str {
        &self.token_header
    }

    pub fn policies(&self) -> &MethodPolicyTable {
        &self.policies
    }

    /// 先查配置的令牌头，再回退到 `authorization: Bearer <token>`
    fn extract_token<'a, F>(&self, get: F) -> Option<String>
    where
        F: Fn(&str) -> Option<&'a str>,
    {
        get(self.token_header.as_str())
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .or_else(|| {
                get(AUTHORIZATION_HEADER)
                    .and_then(strip_bearer)
                    .map(str::trim)
                    .filter(|token| !token.is_empty())
            })
            .map(str::to_string)
    }

    pub fn token_from_metadata(&self, metadata: &tonic::metadata::MetadataMap) -> Option<String> {
        self.extract_token(|key| metadata.get(key).and_then(|v| v.to_str().ok()))
    }

    pub fn token_from_headers(&self, headers: &http::HeaderMap) -> Option<String> {
        self.extract_token(|key| headers.get(key).and_then(|v| v.to_str().ok()))
    }

    /// 对一次调用做认证与授权，成功时返回会话
    pub async fn authorize(&self, method: &str, token: Option<&str>) -> AppResult<Arc<Session>> {
        let result = self.evaluate(method, token).await;

        let outcome = match &result {
            Ok(_) => "allowed",
            Err(AppError::Unauthorized(_)) => "unauthenticated",
            Err(AppError::Forbidden(_)) => "denied",
            Err(_) => "error",
        };
        counter!("auth_requests_total", "outcome" => outcome).increment(1);

        match &result {
            Ok(session) => debug!(
                user_id = %session.user_id(),
                domain_id = %session.domain_id(),
                outcome,
                "Request authorized"
            ),
            Err(e) => info!(outcome, error = %e, "Request rejected"),
        }

        result
    }

    async fn evaluate(&self, method: &str, token: Option<&str>) -> AppResult<Arc<Session>> {
        let token = token.ok_or_else(|| AppError::unauthorized("Missing access token"))?;

        let session = self.client.user_info(token).await?;
        if session.is_expired() {
            return Err(AppError::unauthorized("Session expired"));
        }

        let Some(policy) = self.policies.resolve(method) else {
            if self.policies.allows_unregistered() {
                warn!(method, "Method has no access policy, authentication only");
                return Ok(session);
            }
            return Err(AppError::forbidden(format!(
                "Method {} has no access policy",
                method
            )));
        };

        let missing = session.missing_licenses(policy.licenses);
        if !missing.is_empty() {
            return Err(AppError::unauthorized(format!(
                "Missing licenses: {}",
                missing.join(", ")
            )));
        }

        if !session.has_obac_access(policy.object_class, policy.access) {
            return Err(AppError::forbidden(format!(
                "Access denied: {} on {}",
                policy.access.obac_requirement().bypass,
                policy.object_class
            )));
        }

        Ok(session)
    }

    /// 授权后调用处理函数，并把会话与追踪信息挂到请求上
    pub async fn intercept<T, R, F, Fut>(
        &self,
        method: &str,
        mut request: Request<T>,
        handler: F,
    ) -> Result<Response<R>, Status>
    where
        F: FnOnce(Request<T>) -> Fut,
        Fut: Future<Output = AppResult<Response<R>>>,
    {
        let trace = TraceInfo::from_metadata(request.metadata());
        let span = trace.span(method);
        let token = self.token_from_metadata(request.metadata());

        let session = self
            .authorize(method, token.as_deref())
            .instrument(span.clone())
            .await?;

        request.extensions_mut().insert(trace);
        request.extensions_mut().insert(session);

        handler(request).instrument(span).await.map_err(Status::from)
    }
}

/// 认证方案名不区分大小写
fn strip_bearer(value: &str) -> Option<&str> {
    const SCHEME: &str = "Bearer ";
    match value.get(..SCHEME.len()) {
        Some(scheme) if scheme.eq_ignore_ascii_case(SCHEME) => Some(&value[SCHEME.len()..]),
        _ => None,
    }
}

/// 从请求扩展中获取会话
pub fn get_session<T>(request: &Request<T>) -> AppResult<Arc<Session>> {
    request
        .extensions()
        .get::<Arc<Session>>()
        .cloned()
        .ok_or_else(|| AppError::unauthorized("No session found in request"))
}
