use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateCustomerDto {
    #[validate(email)]
    pub email: Option<String>,
    pub surname: Option<String>,
    pub given_name: Option<String>,
    pub nickname: Option<String>,
    pub real_name: Option<String>,
    pub gender: Option<String>,
    pub birthday: Option<String>,
    pub mobile: Option<String>,
    pub qq: Option<String>,
    pub wechat: Option<String>,
    pub au_address: Option<String>,
    pub foreign_address: Option<String>,
    pub visa_expiry_date: Option<String>,
    /// 所属工作流状态的ID，必须已存在
    pub status: String,
    pub is_archived: Option<bool>,
    /// 未指定时自动分配
    pub list_pos: Option<i64>,
    /// 未指定时自动分配
    pub workflow_pos: Option<i64>,
}

/// 全量更新：body 必须携带与路径一致的 _id 和完整的目标状态
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateCustomerDto {
    #[serde(rename = "_id")]
    pub id: String,
    #[validate(email)]
    pub email: Option<String>,
    pub surname: Option<String>,
    pub given_name: Option<String>,
    pub nickname: Option<String>,
    pub real_name: Option<String>,
    pub gender: Option<String>,
    pub birthday: Option<String>,
    pub mobile: Option<String>,
    pub qq: Option<String>,
    pub wechat: Option<String>,
    pub au_address: Option<String>,
    pub foreign_address: Option<String>,
    pub visa_expiry_date: Option<String>,
    pub status: String,
    pub is_archived: bool,
    pub list_pos: i64,
    pub workflow_pos: i64,
}
