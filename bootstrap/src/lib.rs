//! cases-bootstrap - 统一服务启动骨架
//!
//! 方法策略登记、认证授权拦截器与服务启动

pub mod interceptor;
pub mod layer;
pub mod policy;
mod runtime;
mod starter;
pub mod trace;

pub use interceptor::{AuthInterceptor, get_session};
pub use layer::{AuthLayer, AuthService};
pub use policy::{MethodPolicy, MethodPolicyTable};
pub use runtime::*;
pub use starter::*;
pub use trace::TraceInfo;
