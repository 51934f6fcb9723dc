//! 请求追踪 ID
//!
//! 从请求元数据中提取追踪 ID（Trace ID / Correlation ID），缺失时生成

use tracing::info_span;
use uuid::Uuid;

/// 依次查找的追踪头
const TRACE_HEADERS: [&str; 3] = ["x-trace-id", "x-request-id", "x-correlation-id"];

/// 追踪信息
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceInfo {
    pub trace_id: String,
}

impl TraceInfo {
    pub fn from_lookup<'a, F>(get: F) -> Self
    where
        F: Fn(&str) -> Option<&'a str>,
    {
        let trace_id = TRACE_HEADERS
            .into_iter()
            .find_map(|key| get(key).filter(|v| !v.is_empty()))
            .map(str::to_string)
            // 都没有则生成一个
            .unwrap_or_else(|| Uuid::now_v7().to_string());

        Self { trace_id }
    }

    pub fn from_metadata(metadata: &tonic::metadata::MetadataMap) -> Self {
        Self::from_lookup(|key| metadata.get(key).and_then(|v| v.to_str().ok()))
    }

    pub fn from_headers(headers: &http::HeaderMap) -> Self {
        Self::from_lookup(|key| headers.get(key).and_then(|v| v.to_str().ok()))
    }

    /// 授权检查所在的 span
    pub fn span(&self, method: &str) -> tracing::Span {
        info_span!("authorize", method = %method, trace_id = %self.trace_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefers_trace_id_header() {
        let mut headers = http::HeaderMap::new();
        headers.insert("x-request-id", "req-1".parse().unwrap());
        headers.insert("x-trace-id", "trace-1".parse().unwrap());

        assert_eq!(TraceInfo::from_headers(&headers).trace_id, "trace-1");
    }

    #[test]
    fn test_falls_back_to_correlation_id() {
        let mut metadata = tonic::metadata::MetadataMap::new();
        metadata.insert("x-correlation-id", "corr-1".parse().unwrap());

        assert_eq!(TraceInfo::from_metadata(&metadata).trace_id, "corr-1");
    }

    #[test]
    fn test_generates_when_absent() {
        let trace = TraceInfo::from_headers(&http::HeaderMap::new());
        assert!(Uuid::parse_str(&trace.trace_id).is_ok());
    }
}
