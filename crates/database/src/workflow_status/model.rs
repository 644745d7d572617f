use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::ordering::{Orderable, Sibling};

/// 工作流状态模型（客户看板的列），全局作用域内 pos 唯一
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct WorkflowStatus {
    /// MongoDB文档ID
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub id: Option<ObjectId>,
    /// 状态名称
    pub name: String,
    /// 看板列颜色
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// 列排序位置
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pos: Option<i64>,
}

impl Orderable for WorkflowStatus {
    fn sibling(&self) -> Sibling {
        Sibling {
            id: self.id,
            pos: self.pos,
        }
    }
}
