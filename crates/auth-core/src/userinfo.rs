//! 身份服务 Userinfo 传输结构及其到会话的映射

use cases_common::{DomainId, UserId};

use crate::scope::Scope;
use crate::session::{Permission, Role, Session, User};

/// `api.Auth/UserInfo` 协议 v1
pub mod v1 {
    #[derive(Clone, PartialEq, prost::Message)]
    pub struct UserinfoRequest {
        #[prost(string, tag = "1")]
        pub access_token: String,
    }

    #[derive(Clone, PartialEq, prost::Message)]
    pub struct ObjectId {
        #[prost(int64, tag = "1")]
        pub id: i64,
        #[prost(string, tag = "2")]
        pub name: String,
    }

    #[derive(Clone, PartialEq, prost::Message)]
    pub struct Objclass {
        #[prost(int64, tag = "1")]
        pub id: i64,
        #[prost(string, tag = "2")]
        pub name: String,
        #[prost(string, tag = "3")]
        pub class: String,
        #[prost(string, tag = "4")]
        pub access: String,
        #[prost(bool, tag = "5")]
        pub obac: bool,
        #[prost(bool, tag = "6")]
        pub rbac: bool,
        #[prost(bool, tag = "7")]
        pub abac: bool,
    }

    #[derive(Clone, PartialEq, prost::Message)]
    pub struct Permission {
        #[prost(string, tag = "1")]
        pub id: String,
        #[prost(string, tag = "2")]
        pub name: String,
    }

    #[derive(Clone, PartialEq, prost::Message)]
    pub struct LicenseUser {
        #[prost(string, tag = "1")]
        pub id: String,
        #[prost(string, tag = "2")]
        pub prod: String,
        #[prost(int64, tag = "3")]
        pub issued_at: i64,
        #[prost(int64, tag = "4")]
        pub expires_at: i64,
    }

    #[derive(Clone, PartialEq, prost::Message)]
    pub struct UserinfoResponse {
        /// 租户 ID
        #[prost(int64, tag = "1")]
        pub dc: i64,
        #[prost(string, tag = "2")]
        pub domain: String,
        #[prost(int64, tag = "3")]
        pub user_id: i64,
        #[prost(string, tag = "4")]
        pub name: String,
        #[prost(string, tag = "5")]
        pub username: String,
        #[prost(string, tag = "6")]
        pub extension: String,
        #[prost(message, repeated, tag = "7")]
        pub scope: Vec<Objclass>,
        #[prost(message, repeated, tag = "8")]
        pub roles: Vec<ObjectId>,
        #[prost(message, repeated, tag = "9")]
        pub license: Vec<LicenseUser>,
        #[prost(message, repeated, tag = "10")]
        pub permissions: Vec<Permission>,
        /// Unix 秒
        #[prost(int64, tag = "11")]
        pub expires_at: i64,
    }
}

impl From<v1::Objclass> for Scope {
    fn from(obj: v1::Objclass) -> Self {
        Self {
            id: obj.id,
            name: obj.name,
            class: obj.class,
            access: obj.access,
            obac: obj.obac,
            rbac: obj.rbac,
            abac: obj.abac,
        }
    }
}

impl From<v1::UserinfoResponse> for Session {
    /// 缺失的列表解码为空，构建不会失败。
    /// 许可证产品名并入权限集合，许可证检查与超级权限共用同一查找。
    fn from(info: v1::UserinfoResponse) -> Self {
        let user = User {
            id: UserId(info.user_id),
            name: info.name,
            username: info.username,
            extension: info.extension,
        };

        let mut permissions: Vec<Permission> = info
            .permissions
            .into_iter()
            .map(|p| Permission {
                id: p.id,
                name: p.name,
            })
            .collect();

        for license in info.license {
            if license.prod.is_empty() || permissions.iter().any(|p| p.name == license.prod) {
                continue;
            }
            permissions.push(Permission {
                id: license.id,
                name: license.prod,
            });
        }

        let roles = info
            .roles
            .into_iter()
            .map(|r| Role {
                id: r.id,
                name: r.name,
            })
            .collect();

        Session::new(user, DomainId(info.dc), info.expires_at)
            .with_domain_name(info.domain)
            .with_permissions(permissions)
            .with_scopes(info.scope.into_iter().map(Scope::from))
            .with_roles(roles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::AccessMode;
    use prost::Message;

    fn response() -> v1::UserinfoResponse {
        v1::UserinfoResponse {
            dc: 1,
            domain: "webitel".to_string(),
            user_id: 10,
            name: "Operator".to_string(),
            username: "operator".to_string(),
            extension: "101".to_string(),
            scope: vec![v1::Objclass {
                id: 5,
                name: "Chats".to_string(),
                class: "chats".to_string(),
                access: "xrwd".to_string(),
                obac: true,
                rbac: true,
                abac: false,
            }],
            roles: vec![v1::ObjectId {
                id: 3,
                name: "agents".to_string(),
            }],
            license: vec![v1::LicenseUser {
                id: "lic-1".to_string(),
                prod: "CALL_CENTER".to_string(),
                issued_at: 0,
                expires_at: 0,
            }],
            permissions: vec![v1::Permission {
                id: "read".to_string(),
                name: "read".to_string(),
            }],
            expires_at: 2_000_000_000,
        }
    }

    #[test]
    fn test_session_from_userinfo() {
        let session = Session::from(response());

        assert_eq!(session.user_id(), UserId(10));
        assert_eq!(session.user().username, "operator");
        assert_eq!(session.user().extension, "101");
        assert_eq!(session.domain_id(), DomainId(1));
        assert_eq!(session.domain_name(), "webitel");
        assert_eq!(session.expires_at(), 2_000_000_000);
        assert_eq!(session.roles(), vec![3, 10]);
        assert!(session.has_permission("read"));
        assert!(session.has_license("CALL_CENTER"));

        let scope = session.scope("chats").unwrap();
        assert_eq!(scope.id, 5);
        assert_eq!(scope.name, "Chats");
        assert!(scope.rbac);
        assert!(session.has_obac_access("chats", AccessMode::DELETE));
    }

    #[test]
    fn test_license_not_duplicated() {
        let mut info = response();
        info.permissions.push(v1::Permission {
            id: "cc".to_string(),
            name: "CALL_CENTER".to_string(),
        });
        let session = Session::from(info);
        let count = session
            .permissions()
            .iter()
            .filter(|p| p.name == "CALL_CENTER")
            .count();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_absent_lists_decode_empty() {
        // 只携带用户 ID 与过期时间
        let sparse = v1::UserinfoResponse {
            user_id: 7,
            expires_at: 100,
            ..Default::default()
        };
        let decoded = v1::UserinfoResponse::decode(sparse.encode_to_vec().as_slice()).unwrap();
        let session = Session::from(decoded);

        assert_eq!(session.user_id(), UserId(7));
        assert!(session.permissions().is_empty());
        assert_eq!(session.scopes().count(), 0);
        assert_eq!(session.roles(), vec![7]);
        assert!(!session.has_obac_access("cases", AccessMode::READ));
    }
}
