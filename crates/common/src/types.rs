//! 通用类型定义

use derive_more::{Display, From};
use serde::{Deserialize, Serialize};

/// 租户（域）ID
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
    Display, From,
)]
#[display("{_0}")]
pub struct DomainId(pub i64);

impl DomainId {
    pub fn value(self) -> i64 {
        self.0
    }
}

/// 用户 ID
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
    Display, From,
)]
#[display("{_0}")]
pub struct UserId(pub i64);

impl UserId {
    pub fn value(self) -> i64 {
        self.0
    }
}
