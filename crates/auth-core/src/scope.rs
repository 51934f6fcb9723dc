//! 对象类访问描述

use serde::{Deserialize, Serialize};

use crate::access::AccessMode;

/// 会话在某个对象类（如 `cases`、`dictionaries`）上的访问描述
///
/// 由身份服务返回的数据一次性构建，之后不再修改
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scope {
    pub id: i64,
    pub name: String,
    /// 对象类标识，会话按此查找
    pub class: String,
    /// 权限串，字符集 `x`/`r`/`w`/`d`
    pub access: String,
    /// 是否启用对象级检查；关闭时所有操作放行
    pub obac: bool,
    /// 是否需要存储层追加行级 RBAC 过滤
    pub rbac: bool,
    /// 保留字段，当前不参与评估
    pub abac: bool,
}

impl Scope {
    pub fn new(class: impl Into<String>, access: impl Into<String>) -> Self {
        let class = class.into();
        Self {
            id: 0,
            name: class.clone(),
            class,
            access: access.into(),
            obac: true,
            rbac: false,
            abac: false,
        }
    }

    pub fn with_obac(mut self, obac: bool) -> Self {
        self.obac = obac;
        self
    }

    pub fn with_rbac(mut self, rbac: bool) -> Self {
        self.rbac = rbac;
        self
    }

    /// 查找键：优先 class，为空时退回 name
    pub fn key(&self) -> &str {
        if self.class.is_empty() {
            &self.name
        } else {
            &self.class
        }
    }

    /// 权限串是否包含指定字符
    pub fn can(&self, access: char) -> bool {
        self.access.contains(access)
    }

    pub fn access_mode(&self) -> AccessMode {
        AccessMode::from_access(&self.access)
    }

    /// RBAC 仅在 OBAC 启用时有意义：OBAC 决定能否操作，RBAC 再收窄可见的行
    pub fn is_rbac_used(&self) -> bool {
        self.obac && self.rbac
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_can() {
        let scope = Scope::new("cases", "rw");
        assert!(scope.can('r'));
        assert!(scope.can('w'));
        assert!(!scope.can('d'));
        assert_eq!(scope.access_mode(), AccessMode::READ | AccessMode::EDIT);
    }

    #[test]
    fn test_key_falls_back_to_name() {
        let mut scope = Scope::new("", "r");
        scope.name = "chats".to_string();
        assert_eq!(scope.key(), "chats");

        let scope = Scope::new("cases", "r");
        assert_eq!(scope.key(), "cases");
    }

    #[test]
    fn test_rbac_used_requires_obac() {
        let scope = Scope::new("cases", "r").with_rbac(true);
        assert!(scope.is_rbac_used());

        let scope = scope.with_obac(false);
        assert!(!scope.is_rbac_used());
        assert!(scope.rbac);

        let scope = Scope::new("cases", "r").with_rbac(false);
        assert!(!scope.is_rbac_used());
    }
}
