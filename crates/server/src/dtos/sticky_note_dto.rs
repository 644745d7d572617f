use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateStickyNoteDto {
    #[validate(length(min = 1))]
    pub text: String,
    /// 未指定时自动分配(当前最大值 + 步长)
    pub pos: Option<i64>,
}

/// 全量更新：body 必须携带与路径一致的 _id 和完整的目标状态
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateStickyNoteDto {
    #[serde(rename = "_id")]
    pub id: String,
    #[validate(length(min = 1))]
    pub text: String,
    pub pos: i64,
}
