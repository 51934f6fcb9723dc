//! 认证会话
//!
//! 一个请求对应一个会话：由身份服务的 Userinfo 响应构建，生命周期内只读

use std::collections::HashMap;

use cases_common::{DomainId, UserId};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::access::AccessMode;
use crate::scope::Scope;

/// 会话用户
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub username: String,
    pub extension: String,
}

/// 超级权限或许可证标记
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permission {
    pub id: String,
    pub name: String,
}

impl Permission {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            id: name.clone(),
            name,
        }
    }
}

/// ACL 角色
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub id: i64,
    pub name: String,
}

/// 授权会话
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Session {
    user: User,
    domain_id: DomainId,
    domain_name: String,
    expires_at: i64,
    permissions: Vec<Permission>,
    scopes: HashMap<String, Scope>,
    roles: Vec<Role>,
}

impl Session {
    pub fn new(user: User, domain_id: DomainId, expires_at: i64) -> Self {
        Self {
            user,
            domain_id,
            domain_name: String::new(),
            expires_at,
            permissions: Vec::new(),
            scopes: HashMap::new(),
            roles: Vec::new(),
        }
    }

    pub fn with_domain_name(mut self, domain_name: impl Into<String>) -> Self {
        self.domain_name = domain_name.into();
        self
    }

    pub fn with_permissions(mut self, permissions: Vec<Permission>) -> Self {
        self.permissions = permissions;
        self
    }

    /// 按对象类建立索引，类名重复时后者覆盖前者
    pub fn with_scopes(mut self, scopes: impl IntoIterator<Item = Scope>) -> Self {
        self.scopes = scopes
            .into_iter()
            .map(|scope| (scope.key().to_string(), scope))
            .collect();
        self
    }

    pub fn with_roles(mut self, roles: Vec<Role>) -> Self {
        self.roles = roles;
        self
    }

    pub fn user(&self) -> &User {
        &self.user
    }

    pub fn user_id(&self) -> UserId {
        self.user.id
    }

    pub fn domain_id(&self) -> DomainId {
        self.domain_id
    }

    pub fn domain_name(&self) -> &str {
        &self.domain_name
    }

    pub fn expires_at(&self) -> i64 {
        self.expires_at
    }

    pub fn permissions(&self) -> &[Permission] {
        &self.permissions
    }

    pub fn scopes(&self) -> impl Iterator<Item = &Scope> {
        self.scopes.values()
    }

    pub fn scope(&self, class: &str) -> Option<&Scope> {
        self.scopes.get(class)
    }

    /// ACL 角色 ID，末尾追加用户自身 ID（用于归属检查）
    pub fn roles(&self) -> Vec<i64> {
        self.roles
            .iter()
            .map(|role| role.id)
            .chain(std::iter::once(self.user.id.value()))
            .collect()
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now().timestamp())
    }

    /// 到期当秒仍然有效
    pub fn is_expired_at(&self, now: i64) -> bool {
        now > self.expires_at
    }

    pub fn has_permission(&self, name: &str) -> bool {
        self.permissions.iter().any(|p| p.name == name)
    }

    pub fn has_license(&self, license: &str) -> bool {
        self.has_permission(license)
    }

    /// 返回会话缺少的许可证
    pub fn missing_licenses(&self, required: &[&str]) -> Vec<String> {
        required
            .iter()
            .filter(|license| !self.has_license(license))
            .map(|license| license.to_string())
            .collect()
    }

    /// 对象级访问检查
    ///
    /// 1. 对象类不存在：拒绝
    /// 2. 未启用 OBAC：放行
    /// 3. 持有对应超级权限：放行
    /// 4. 否则权限串必须包含所需的全部字符
    pub fn has_obac_access(&self, class: &str, mode: AccessMode) -> bool {
        let Some(scope) = self.scope(class) else {
            return false;
        };

        if !scope.obac {
            return true;
        }

        let requirement = mode.obac_requirement();
        if self.has_permission(requirement.bypass) {
            return true;
        }

        requirement.access.chars().rev().all(|c| scope.can(c))
    }

    /// 存储层是否需要追加行级 RBAC 过滤，与 OBAC 结果相互独立
    pub fn is_rbac_check_required(&self, class: &str, _mode: AccessMode) -> bool {
        self.scope(class).is_some_and(|scope| scope.rbac)
    }

    /// 以其他用户身份复制会话，原会话保持不变
    pub fn impersonate(&self, user_id: UserId) -> Self {
        let mut session = self.clone();
        session.user.id = user_id;
        session
    }
}
