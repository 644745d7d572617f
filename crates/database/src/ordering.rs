//! 位置排序管理器
//!
//! 五种可排序实体(customer/workflow status/checklist/checklist item/
//! sticky note)共用同一套 `pos` 分配与冲突校验逻辑：同一兄弟作用域内
//! `pos` 必须唯一，创建时未指定则自动分配(当前最大值 + 步长，空作用域
//! 取起始值)。
//!
//! 纯计算，无 I/O：调用方先加载兄弟集合，再根据结果决定是否持久化。

use mongodb::bson::oid::ObjectId;
use thiserror::Error;
use utils::{AppConfig, AppError};

/// 位置分配/校验失败。对调用方而言是终态，不在内部重试。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PosError {
    /// 同一作用域内出现重复 pos，映射为 409
    #[error("Found duplicate")]
    Conflict,
    /// 自动分配越过 i64 上限，映射为 400
    #[error("pos out of range")]
    Overflow,
}

impl From<PosError> for AppError {
    fn from(err: PosError) -> Self {
        match err {
            PosError::Conflict => AppError::Conflict(err.to_string()),
            PosError::Overflow => AppError::BadRequest(err.to_string()),
        }
    }
}

/// 排序配置常量，来自环境变量 POS_START_VAL / POS_AUTO_INCREMENT
#[derive(Debug, Clone, Copy)]
pub struct PosConfig {
    pub start_val: i64,
    pub auto_increment: i64,
}

impl Default for PosConfig {
    fn default() -> Self {
        Self {
            start_val: 0,
            auto_increment: 10,
        }
    }
}

impl From<&AppConfig> for PosConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            start_val: config.pos_start_val,
            auto_increment: config.pos_auto_increment,
        }
    }
}

/// 参与唯一性比较的兄弟实体视图：{id, pos}
///
/// pos 为 None 的实体不参与唯一性判断(稀疏语义)，也不参与最大值计算。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sibling {
    pub id: Option<ObjectId>,
    pub pos: Option<i64>,
}

pub trait Orderable {
    fn sibling(&self) -> Sibling;
}

pub fn siblings_of<T: Orderable>(entities: &[T]) -> Vec<Sibling> {
    entities.iter().map(Orderable::sibling).collect()
}

/// 创建时分配 pos
///
/// - 指定了 pos：与任一兄弟重复则冲突，否则原样接受；
/// - 未指定：空作用域取 start_val，否则取现有最大值 + auto_increment。
///   最大值只在实际带 pos 的兄弟上计算，全为负数的作用域从负的最大值
///   继续递增(而不是错误地回落到起始值)。加法用 checked_add：兄弟里
///   已有 i64::MAX 附近的 pos 时返回 Overflow 而不是 panic。
pub fn assign_on_create(siblings: &[Sibling], requested: Option<i64>, config: &PosConfig) -> Result<i64, PosError> {
    match requested {
        Some(pos) => {
            if siblings.iter().any(|s| s.pos == Some(pos)) {
                return Err(PosError::Conflict);
            }
            Ok(pos)
        }
        None => match siblings.iter().filter_map(|s| s.pos).max() {
            Some(max_pos) => max_pos.checked_add(config.auto_increment).ok_or(PosError::Overflow),
            None => Ok(config.start_val),
        },
    }
}

/// 全量更新时校验 pos：排除实体自身后与任一兄弟重复则冲突
pub fn validate_on_update(siblings: &[Sibling], self_id: ObjectId, requested: i64) -> Result<(), PosError> {
    if siblings
        .iter()
        .any(|s| s.id != Some(self_id) && s.pos == Some(requested))
    {
        return Err(PosError::Conflict);
    }
    Ok(())
}

/// 合并补丁(merge-patch)更新时校验 pos
///
/// patch_pos 以"字段是否出现在补丁中"判定：补丁里带 `"pos": 0` 同样
/// 参与冲突校验，字段缺失则完全跳过、pos 保持不变。
pub fn validate_on_patch(siblings: &[Sibling], self_id: ObjectId, patch_pos: Option<i64>) -> Result<(), PosError> {
    match patch_pos {
        Some(pos) => validate_on_update(siblings, self_id, pos),
        None => Ok(()),
    }
}
