//! 組み込みエンジン (`protocol = "homemade"`) の登録表

use std::collections::BTreeMap;

use crate::error::{EngineError, Result};
use crate::protocol::EngineProtocol;
use crate::types::{TimeControl, Variant};

/// 組み込みエンジンのコンストラクタ
pub type BuiltinConstructor = fn(Variant, TimeControl) -> Result<Box<dyn EngineProtocol>>;

/// 名前からコンストラクタを引く静的な表
#[derive(Default, Clone)]
pub struct EngineRegistry {
    constructors: BTreeMap<String, BuiltinConstructor>,
}

impl EngineRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 登録する。同じ名前は上書き。
    pub fn register(&mut self, name: impl Into<String>, constructor: BuiltinConstructor) {
        self.constructors.insert(name.into(), constructor);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.constructors.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.constructors.keys().map(String::as_str)
    }

    pub fn create(
        &self,
        name: &str,
        variant: Variant,
        time_control: TimeControl,
    ) -> Result<Box<dyn EngineProtocol>> {
        let constructor = self
            .constructors
            .get(name)
            .ok_or_else(|| EngineError::UnknownBuiltin(name.to_string()))?;
        constructor(variant, time_control)
    }
}
