use chrono::Utc;
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::ordering::{Orderable, Sibling};

fn now_ts() -> i64 {
    Utc::now().timestamp()
}

/// 客户文档。三种可排序子实体(checklist/checklist item/sticky note)
/// 内嵌其中；客户自身参与 list_pos / workflow_pos 两个独立的全局作用域。
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Customer {
    /// MongoDB文档ID
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub id: Option<ObjectId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub surname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub given_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub real_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    /// 生日，ISO 8601 日期字符串
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birthday: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mobile: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qq: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wechat: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub au_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub foreign_address: Option<String>,
    /// 签证到期日，ISO 8601 日期字符串
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visa_expiry_date: Option<String>,
    /// 所属工作流状态(WorkflowStatus._id)
    #[schema(value_type = String)]
    pub status: ObjectId,
    /// 客户列表视图中的排序位置
    #[serde(skip_serializing_if = "Option::is_none")]
    pub list_pos: Option<i64>,
    /// 看板视图中的排序位置
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workflow_pos: Option<i64>,
    #[serde(default)]
    pub is_archived: bool,
    #[serde(default)]
    pub checklists: Vec<Checklist>,
    #[serde(default)]
    pub sticky_notes: Vec<StickyNote>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Customer {
    /// 保存前刷新 updated_at（对应原 pre-save 钩子）
    pub fn touch(&mut self) {
        self.updated_at = now_ts();
    }

    pub fn checklist(&self, checklist_id: ObjectId) -> Option<&Checklist> {
        self.checklists.iter().find(|c| c.id == checklist_id)
    }

    pub fn checklist_mut(&mut self, checklist_id: ObjectId) -> Option<&mut Checklist> {
        self.checklists.iter_mut().find(|c| c.id == checklist_id)
    }

    /// 定位包含指定 item 的 checklist
    pub fn checklist_with_item(&self, item_id: ObjectId) -> Option<&Checklist> {
        self.checklists.iter().find(|c| c.item(item_id).is_some())
    }

    pub fn checklist_with_item_mut(&mut self, item_id: ObjectId) -> Option<&mut Checklist> {
        self.checklists.iter_mut().find(|c| c.item(item_id).is_some())
    }

    pub fn sticky_note(&self, note_id: ObjectId) -> Option<&StickyNote> {
        self.sticky_notes.iter().find(|n| n.id == note_id)
    }

    pub fn sticky_note_mut(&mut self, note_id: ObjectId) -> Option<&mut StickyNote> {
        self.sticky_notes.iter_mut().find(|n| n.id == note_id)
    }

    /// list_pos 作用域视图
    pub fn list_sibling(&self) -> Sibling {
        Sibling {
            id: self.id,
            pos: self.list_pos,
        }
    }

    /// workflow_pos 作用域视图
    pub fn workflow_sibling(&self) -> Sibling {
        Sibling {
            id: self.id,
            pos: self.workflow_pos,
        }
    }
}

/// 内嵌于Customer的检查清单
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Checklist {
    #[serde(rename = "_id")]
    #[schema(value_type = String)]
    pub id: ObjectId,
    pub name: String,
    /// 同一客户的 checklists 作用域内唯一
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pos: Option<i64>,
    #[serde(default)]
    pub items: Vec<ChecklistItem>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Checklist {
    pub fn new(name: String, pos: i64) -> Self {
        let now = now_ts();
        Self {
            id: ObjectId::new(),
            name,
            pos: Some(pos),
            items: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = now_ts();
    }

    pub fn item(&self, item_id: ObjectId) -> Option<&ChecklistItem> {
        self.items.iter().find(|i| i.id == item_id)
    }

    pub fn item_mut(&mut self, item_id: ObjectId) -> Option<&mut ChecklistItem> {
        self.items.iter_mut().find(|i| i.id == item_id)
    }
}

impl Orderable for Checklist {
    fn sibling(&self) -> Sibling {
        Sibling {
            id: Some(self.id),
            pos: self.pos,
        }
    }
}

/// 内嵌于Checklist的清单条目
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ChecklistItem {
    #[serde(rename = "_id")]
    #[schema(value_type = String)]
    pub id: ObjectId,
    pub text: String,
    #[serde(default)]
    pub checked: bool,
    /// 同一清单的 items 作用域内唯一
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pos: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl ChecklistItem {
    pub fn new(text: String, checked: bool, pos: i64) -> Self {
        let now = now_ts();
        Self {
            id: ObjectId::new(),
            text,
            checked,
            pos: Some(pos),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = now_ts();
    }
}

impl Orderable for ChecklistItem {
    fn sibling(&self) -> Sibling {
        Sibling {
            id: Some(self.id),
            pos: self.pos,
        }
    }
}

/// 内嵌于Customer的便签
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StickyNote {
    #[serde(rename = "_id")]
    #[schema(value_type = String)]
    pub id: ObjectId,
    pub text: String,
    /// 同一客户的 sticky_notes 作用域内唯一
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pos: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl StickyNote {
    pub fn new(text: String, pos: i64) -> Self {
        let now = now_ts();
        Self {
            id: ObjectId::new(),
            text,
            pos: Some(pos),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = now_ts();
    }
}

impl Orderable for StickyNote {
    fn sibling(&self) -> Sibling {
        Sibling {
            id: Some(self.id),
            pos: self.pos,
        }
    }
}
