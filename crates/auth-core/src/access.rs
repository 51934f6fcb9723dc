//! 访问模式位掩码

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// 对象上的基本操作，可按位组合
    ///
    /// | 模式 | 权限字符 | 超级权限 |
    /// |------|----------|----------|
    /// | [`ADD`](Self::ADD) | `x` | `add` |
    /// | [`READ`](Self::READ) | `r` | `read` |
    /// | [`EDIT`](Self::EDIT) | `w` | `write` |
    /// | [`DELETE`](Self::DELETE) | `d` | `delete` |
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct AccessMode: u8 {
        const DELETE = 1;
        const EDIT = 1 << 1;
        const READ = 1 << 2;
        const ADD = 1 << 3;

        const FULL = Self::ADD.bits() | Self::READ.bits() | Self::EDIT.bits() | Self::DELETE.bits();
    }
}

/// OBAC 检查所需的权限字符与可绕过检查的超级权限
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObacRequirement {
    /// 对象权限串中必须出现的字符
    pub access: &'static str,
    /// 会话持有即放行的超级权限名
    pub bypass: &'static str,
}

const DELETE_REQUIREMENT: ObacRequirement = ObacRequirement {
    access: "d",
    bypass: "delete",
};

const EDIT_REQUIREMENT: ObacRequirement = ObacRequirement {
    access: "w",
    bypass: "write",
};

const READ_REQUIREMENT: ObacRequirement = ObacRequirement {
    access: "r",
    bypass: "read",
};

const ADD_REQUIREMENT: ObacRequirement = ObacRequirement {
    access: "x",
    bypass: "add",
};

impl AccessMode {
    pub const NONE: Self = Self::empty();

    /// 解析对象权限串（`x`/`r`/`w`/`d`），未知字符忽略
    pub fn from_access(access: &str) -> Self {
        access.chars().fold(Self::NONE, |mode, c| match c {
            'x' => mode | Self::ADD,
            'r' => mode | Self::READ,
            'w' => mode | Self::EDIT,
            'd' => mode | Self::DELETE,
            _ => mode,
        })
    }

    /// 转换为对象权限串，顺序固定为 `xrwd`
    pub fn to_access(self) -> String {
        [
            (Self::ADD, 'x'),
            (Self::READ, 'r'),
            (Self::EDIT, 'w'),
            (Self::DELETE, 'd'),
        ]
        .into_iter()
        .filter(|(flag, _)| self.contains(*flag))
        .map(|(_, c)| c)
        .collect()
    }

    /// 解析 OBAC 检查要求
    ///
    /// 组合模式只取其中权限更高的操作（`READ | DELETE` 只要求 `d`）。
    /// 表中没有的组合按读取处理。
    pub fn obac_requirement(self) -> ObacRequirement {
        if self == Self::DELETE || self == (Self::READ | Self::DELETE) {
            DELETE_REQUIREMENT
        } else if self == Self::EDIT || self == (Self::READ | Self::EDIT) {
            EDIT_REQUIREMENT
        } else if self == Self::READ || self == Self::NONE {
            READ_REQUIREMENT
        } else if self == Self::ADD || self == (Self::READ | Self::ADD) {
            ADD_REQUIREMENT
        } else {
            READ_REQUIREMENT
        }
    }
}

impl Default for AccessMode {
    fn default() -> Self {
        Self::NONE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bits_are_distinct_powers_of_two() {
        assert_eq!(AccessMode::DELETE.bits(), 1);
        assert_eq!(AccessMode::EDIT.bits(), 2);
        assert_eq!(AccessMode::READ.bits(), 4);
        assert_eq!(AccessMode::ADD.bits(), 8);
        assert_eq!(AccessMode::FULL.bits(), 15);
        assert_eq!(AccessMode::NONE.bits(), 0);
    }

    #[test]
    fn test_requirement_table() {
        let cases = [
            (AccessMode::DELETE, "d", "delete"),
            (AccessMode::READ | AccessMode::DELETE, "d", "delete"),
            (AccessMode::EDIT, "w", "write"),
            (AccessMode::READ | AccessMode::EDIT, "w", "write"),
            (AccessMode::READ, "r", "read"),
            (AccessMode::NONE, "r", "read"),
            (AccessMode::ADD, "x", "add"),
            (AccessMode::READ | AccessMode::ADD, "x", "add"),
        ];

        for (mode, access, bypass) in cases {
            let req = mode.obac_requirement();
            assert_eq!(req.access, access, "mode {:?}", mode);
            assert_eq!(req.bypass, bypass, "mode {:?}", mode);
        }
    }

    #[test]
    fn test_unlisted_combination_falls_back_to_read() {
        assert_eq!(
            (AccessMode::EDIT | AccessMode::DELETE).obac_requirement(),
            READ_REQUIREMENT
        );
        assert_eq!(AccessMode::FULL.obac_requirement(), READ_REQUIREMENT);
    }

    #[test]
    fn test_access_string_conversion() {
        assert_eq!(AccessMode::from_access("xrwd"), AccessMode::FULL);
        assert_eq!(AccessMode::from_access("dr"), AccessMode::READ | AccessMode::DELETE);
        assert_eq!(AccessMode::from_access(""), AccessMode::NONE);
        assert_eq!(AccessMode::from_access("rq"), AccessMode::READ);
        assert_eq!((AccessMode::DELETE | AccessMode::ADD).to_access(), "xd");
        assert_eq!(AccessMode::FULL.to_access(), "xrwd");
    }
}
