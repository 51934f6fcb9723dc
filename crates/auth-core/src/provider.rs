//! 身份服务端口与 gRPC 实现

use std::time::Duration;

use async_trait::async_trait;
use cases_errors::{AppError, AppResult};
use http::uri::PathAndQuery;
use tonic::codec::ProstCodec;
use tonic::transport::{Channel, Endpoint};

use crate::userinfo::v1::{UserinfoRequest, UserinfoResponse};

/// 身份服务 UserInfo 方法路径
pub const USERINFO_PATH: &str = "/api.Auth/UserInfo";

/// 身份服务：以访问令牌换取用户信息
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn user_info(&self, access_token: &str) -> AppResult<UserinfoResponse>;
}

/// 基于 tonic 的身份服务客户端
#[derive(Clone)]
pub struct GrpcIdentityProvider {
    inner: tonic::client::Grpc<Channel>,
}

impl GrpcIdentityProvider {
    /// 创建延迟连接的客户端，首次调用时才建立连接
    pub fn connect_lazy(endpoint: &str, timeout: Duration) -> AppResult<Self> {
        let endpoint = Endpoint::from_shared(endpoint.to_string())
            .map_err(|e| AppError::internal(format!("Invalid identity endpoint: {}", e)))?
            .timeout(timeout);

        Ok(Self {
            inner: tonic::client::Grpc::new(endpoint.connect_lazy()),
        })
    }
}

#[async_trait]
impl IdentityProvider for GrpcIdentityProvider {
    async fn user_info(&self, access_token: &str) -> AppResult<UserinfoResponse> {
        let mut grpc = self.inner.clone();
        grpc.ready()
            .await
            .map_err(|e| AppError::internal(format!("Identity service not ready: {}", e)))?;

        let request = tonic::Request::new(UserinfoRequest {
            access_token: access_token.to_string(),
        });
        let codec: ProstCodec<UserinfoRequest, UserinfoResponse> = ProstCodec::default();

        let response = grpc
            .unary(request, PathAndQuery::from_static(USERINFO_PATH), codec)
            .await
            .map_err(|status| AppError::from_status(&status))?;

        Ok(response.into_inner())
    }
}
