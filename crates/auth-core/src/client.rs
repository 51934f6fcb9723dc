//! 令牌交换客户端
//!
//! 调用身份服务将访问令牌解析为会话，同一令牌的并发请求合并为一次外部调用。
//! 不缓存已完成的结果：合并窗口结束后的调用会重新查询。

use std::sync::Arc;
use std::time::Instant;

use cases_common::SingleflightGroup;
use cases_errors::{AppError, AppResult};
use metrics::{counter, histogram};
use tracing::{debug, warn};

use crate::provider::IdentityProvider;
use crate::session::Session;

pub struct TokenExchangeClient {
    provider: Arc<dyn IdentityProvider>,
    group: SingleflightGroup<AppResult<Arc<Session>>>,
}

impl TokenExchangeClient {
    pub fn new(provider: Arc<dyn IdentityProvider>) -> Self {
        Self {
            provider,
            group: SingleflightGroup::new(),
        }
    }

    /// 解析访问令牌
    ///
    /// 外部调用失败统一包装为 Unauthorized，本层不重试
    pub async fn user_info(&self, token: &str) -> AppResult<Arc<Session>> {
        if token.is_empty() {
            return Err(AppError::unauthorized("Access token is empty"));
        }

        self.group
            .work(token, || self.exchange(token))
            .await
            .unwrap_or_else(|_| Err(AppError::unauthorized("Identity lookup was cancelled")))
    }

    /// 当前进行中的外部调用数
    pub fn in_flight(&self) -> usize {
        self.group.in_flight()
    }

    async fn exchange(&self, token: &str) -> AppResult<Arc<Session>> {
        let start = Instant::now();
        let result = self.provider.user_info(token).await;
        histogram!("token_exchange_duration_ms").record(start.elapsed().as_millis() as f64);

        match result {
            Ok(info) => {
                counter!("token_exchange_total", "result" => "ok").increment(1);
                let session = Session::from(info);
                debug!(
                    user_id = %session.user_id(),
                    domain_id = %session.domain_id(),
                    "Access token resolved"
                );
                Ok(Arc::new(session))
            }
            Err(e) => {
                counter!("token_exchange_total", "result" => "error").increment(1);
                // 外部错误细节只进日志，不回传给调用方
                warn!(error = %e, "Identity lookup failed");
                Err(AppError::unauthorized("Identity lookup failed"))
            }
        }
    }
}
