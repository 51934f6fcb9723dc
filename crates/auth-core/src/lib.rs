//! cases-auth-core - 认证核心库
//!
//! 会话模型、OBAC/RBAC 策略评估与令牌交换

pub mod access;
pub mod client;
pub mod provider;
pub mod scope;
pub mod session;
pub mod userinfo;

pub use access::{AccessMode, ObacRequirement};
pub use client::TokenExchangeClient;
pub use provider::{GrpcIdentityProvider, IdentityProvider, USERINFO_PATH};
pub use scope::Scope;
pub use session::{Permission, Role, Session, User};
