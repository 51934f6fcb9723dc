//! RPC 方法访问策略登记表
//!
//! 每个对外方法登记其对象类、所需许可证与访问模式，进程启动后只读

use std::collections::HashMap;

use cases_auth_core::AccessMode;

/// 对象类
pub mod object_class {
    pub const CASES: &str = "cases";
    pub const DICTIONARIES: &str = "dictionaries";
}

/// 许可证
pub mod license {
    pub const CALL_CENTER: &str = "CALL_CENTER";
}

/// 单个方法的访问要求
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MethodPolicy {
    pub object_class: &'static str,
    pub licenses: &'static [&'static str],
    pub access: AccessMode,
}

impl MethodPolicy {
    pub const fn new(object_class: &'static str, access: AccessMode) -> Self {
        Self {
            object_class,
            licenses: &[],
            access,
        }
    }

    pub const fn with_licenses(mut self, licenses: &'static [&'static str]) -> Self {
        self.licenses = licenses;
        self
    }
}

const fn cases(access: AccessMode) -> MethodPolicy {
    MethodPolicy::new(object_class::CASES, access)
}

const fn dictionaries(access: AccessMode) -> MethodPolicy {
    MethodPolicy::new(object_class::DICTIONARIES, access)
}

/// 工单管理服务对外方法
pub const CASE_METHODS: &[(&str, MethodPolicy)] = &[
    ("/webitel.cases.Cases/SearchCases", cases(AccessMode::READ)),
    ("/webitel.cases.Cases/LocateCase", cases(AccessMode::READ)),
    ("/webitel.cases.Cases/CreateCase", cases(AccessMode::ADD)),
    ("/webitel.cases.Cases/UpdateCase", cases(AccessMode::EDIT)),
    ("/webitel.cases.Cases/DeleteCase", cases(AccessMode::DELETE)),
    ("/webitel.cases.CaseComments/ListComments", cases(AccessMode::READ)),
    ("/webitel.cases.CaseComments/PublishComment", cases(AccessMode::EDIT)),
    ("/webitel.cases.CaseComments/UpdateComment", cases(AccessMode::EDIT)),
    (
        "/webitel.cases.CaseComments/DeleteComment",
        cases(AccessMode::READ.union(AccessMode::DELETE)),
    ),
    ("/webitel.cases.CaseLinks/ListLinks", cases(AccessMode::READ)),
    ("/webitel.cases.CaseLinks/CreateLink", cases(AccessMode::EDIT)),
    ("/webitel.cases.CaseLinks/DeleteLink", cases(AccessMode::EDIT)),
    (
        "/webitel.cases.CaseCommunications/ListCommunications",
        cases(AccessMode::READ).with_licenses(&[license::CALL_CENTER]),
    ),
    (
        "/webitel.cases.CaseCommunications/LinkCommunication",
        cases(AccessMode::EDIT).with_licenses(&[license::CALL_CENTER]),
    ),
    (
        "/webitel.cases.CaseCommunications/UnlinkCommunication",
        cases(AccessMode::EDIT).with_licenses(&[license::CALL_CENTER]),
    ),
    ("/webitel.cases.Statuses/ListStatuses", dictionaries(AccessMode::READ)),
    ("/webitel.cases.Statuses/LocateStatus", dictionaries(AccessMode::READ)),
    ("/webitel.cases.Statuses/CreateStatus", dictionaries(AccessMode::ADD)),
    ("/webitel.cases.Statuses/UpdateStatus", dictionaries(AccessMode::EDIT)),
    ("/webitel.cases.Statuses/DeleteStatus", dictionaries(AccessMode::DELETE)),
    ("/webitel.cases.Priorities/ListPriorities", dictionaries(AccessMode::READ)),
    ("/webitel.cases.Priorities/CreatePriority", dictionaries(AccessMode::ADD)),
    ("/webitel.cases.Priorities/UpdatePriority", dictionaries(AccessMode::EDIT)),
    ("/webitel.cases.Priorities/DeletePriority", dictionaries(AccessMode::DELETE)),
    ("/webitel.cases.SLAs/ListSLAs", dictionaries(AccessMode::READ)),
    ("/webitel.cases.SLAs/CreateSLA", dictionaries(AccessMode::ADD)),
    ("/webitel.cases.SLAs/UpdateSLA", dictionaries(AccessMode::EDIT)),
    ("/webitel.cases.SLAs/DeleteSLA", dictionaries(AccessMode::DELETE)),
    ("/webitel.cases.Sources/ListSources", dictionaries(AccessMode::READ)),
    ("/webitel.cases.Sources/CreateSource", dictionaries(AccessMode::ADD)),
    ("/webitel.cases.Sources/UpdateSource", dictionaries(AccessMode::EDIT)),
    ("/webitel.cases.Sources/DeleteSource", dictionaries(AccessMode::DELETE)),
    ("/webitel.cases.Catalogs/ListCatalogs", dictionaries(AccessMode::READ)),
    ("/webitel.cases.Catalogs/CreateCatalog", dictionaries(AccessMode::ADD)),
    ("/webitel.cases.Catalogs/UpdateCatalog", dictionaries(AccessMode::EDIT)),
    ("/webitel.cases.Catalogs/DeleteCatalog", dictionaries(AccessMode::DELETE)),
];

/// 方法策略表
#[derive(Debug, Clone, Default)]
pub struct MethodPolicyTable {
    methods: HashMap<&'static str, MethodPolicy>,
    allow_unregistered: bool,
}

impl MethodPolicyTable {
    pub fn new(entries: impl IntoIterator<Item = (&'static str, MethodPolicy)>) -> Self {
        Self {
            methods: entries.into_iter().collect(),
            allow_unregistered: false,
        }
    }

    /// 登记全部工单管理方法
    pub fn default_registry() -> Self {
        Self::new(CASE_METHODS.iter().copied())
    }

    /// 未登记方法默认拒绝；开启后仅做身份认证
    pub fn allow_unregistered(mut self, allow: bool) -> Self {
        self.allow_unregistered = allow;
        self
    }

    pub fn allows_unregistered(&self) -> bool {
        self.allow_unregistered
    }

    /// 按完整方法名（`/package.Service/Method`）查找
    pub fn resolve(&self, method: &str) -> Option<&MethodPolicy> {
        self.methods.get(method)
    }

    pub fn len(&self) -> usize {
        self.methods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_registry_has_no_duplicates() {
        let table = MethodPolicyTable::default_registry();
        assert_eq!(table.len(), CASE_METHODS.len());
        assert!(!table.allows_unregistered());
    }

    #[test]
    fn test_resolve() {
        let table = MethodPolicyTable::default_registry();

        let policy = table.resolve("/webitel.cases.Cases/DeleteCase").unwrap();
        assert_eq!(policy.object_class, object_class::CASES);
        assert_eq!(policy.access, AccessMode::DELETE);
        assert!(policy.licenses.is_empty());

        let policy = table
            .resolve("/webitel.cases.CaseCommunications/LinkCommunication")
            .unwrap();
        assert_eq!(policy.licenses, &[license::CALL_CENTER]);

        assert!(table.resolve("/webitel.cases.Cases/Unknown").is_none());
        assert!(table.resolve("webitel.cases.Cases/SearchCases").is_none());
    }

    #[test]
    fn test_every_method_is_fully_qualified() {
        for (method, _) in CASE_METHODS {
            assert!(method.starts_with('/'), "{}", method);
            assert_eq!(method.matches('/').count(), 2, "{}", method);
        }
    }
}
