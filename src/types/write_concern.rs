use serde::{Deserialize, Serialize};
use std::fmt;

/// 写关注级别
///
/// 配置文件中可以写成数字（`write_concern = 1`）或者标签（`write_concern = "majority"`）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WriteConcernLevel {
    /// 需要确认的节点数量，0 表示不等待确认
    Nodes(u32),
    /// 命名级别，`"majority"` 或者自定义标签
    Tagged(String),
}

impl WriteConcernLevel {
    /// 多数节点确认
    pub fn majority() -> Self {
        WriteConcernLevel::Tagged("majority".to_string())
    }

    /// 是否需要服务端确认
    pub fn is_acknowledged(&self) -> bool {
        !matches!(self, WriteConcernLevel::Nodes(0))
    }
}

impl Default for WriteConcernLevel {
    fn default() -> Self {
        WriteConcernLevel::Nodes(1)
    }
}

impl From<u32> for WriteConcernLevel {
    fn from(nodes: u32) -> Self {
        WriteConcernLevel::Nodes(nodes)
    }
}

impl fmt::Display for WriteConcernLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WriteConcernLevel::Nodes(n) => write!(f, "w:{}", n),
            WriteConcernLevel::Tagged(tag) => write!(f, "w:{}", tag),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize)]
    struct Holder {
        write_concern: WriteConcernLevel,
    }

    #[test]
    fn test_write_concern_from_toml() {
        let numeric: Holder = toml::from_str("write_concern = 1").unwrap();
        assert_eq!(numeric.write_concern, WriteConcernLevel::Nodes(1));

        let tagged: Holder = toml::from_str("write_concern = \"majority\"").unwrap();
        assert_eq!(tagged.write_concern, WriteConcernLevel::majority());

        assert!(!WriteConcernLevel::Nodes(0).is_acknowledged());
        assert!(WriteConcernLevel::default().is_acknowledged());
    }
}
