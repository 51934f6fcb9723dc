//! tower 授权中间件
//!
//! 挂在 tonic Server 上，对每个入站 gRPC 请求（方法名即 URI path）执行同样的授权决策

use std::sync::Arc;
use std::task::{Context, Poll};

use futures::future::BoxFuture;
use tower::{Layer, Service};
use tracing::Instrument;

use crate::interceptor::AuthInterceptor;
use crate::trace::TraceInfo;

#[derive(Clone)]
pub struct AuthLayer {
    interceptor: Arc<AuthInterceptor>,
}

impl AuthLayer {
    pub fn new(interceptor: AuthInterceptor) -> Self {
        Self {
            interceptor: Arc::new(interceptor),
        }
    }

    pub fn interceptor(&self) -> &AuthInterceptor {
        &self.interceptor
    }
}

impl<S> Layer<S> for AuthLayer {
    type Service = AuthService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        AuthService {
            inner,
            interceptor: self.interceptor.clone(),
        }
    }
}

#[derive(Clone)]
pub struct AuthService<S> {
    inner: S,
    interceptor: Arc<AuthInterceptor>,
}

impl<S, ReqBody, ResBody> Service<http::Request<ReqBody>> for AuthService<S>
where
    S: Service<http::Request<ReqBody>, Response = http::Response<ResBody>> + Clone + Send + 'static,
    S::Future: Send + 'static,
    ReqBody: Send + 'static,
    ResBody: Default + Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut request: http::Request<ReqBody>) -> Self::Future {
        // 取走已就绪的实例，留一个克隆给下次调用
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);
        let interceptor = self.interceptor.clone();

        Box::pin(async move {
            let method = request.uri().path().to_string();
            let trace = TraceInfo::from_headers(request.headers());
            let span = trace.span(&method);
            let token = interceptor.token_from_headers(request.headers());

            let session = match interceptor
                .authorize(&method, token.as_deref())
                .instrument(span.clone())
                .await
            {
                Ok(session) => session,
                Err(err) => return Ok(tonic::Status::from(err).into_http()),
            };

            request.extensions_mut().insert(trace);
            request.extensions_mut().insert(session);

            inner.call(request).instrument(span).await
        })
    }
}
