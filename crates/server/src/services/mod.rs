////////////////////////////////////////////////////////////////////////
//
// 每个资源一个Service：controller只做传参和状态码映射，
// Service负责加载兄弟作用域、调用位置排序算法、回写仓库。
//
//////////////////////////////////////////////////////////////////////

pub mod checklist_item_service;
pub mod checklist_service;
pub mod csv_import;
pub mod customer_service;
pub mod sticky_note_service;
pub mod workflow_status_service;

use checklist_item_service::{ChecklistItemService, DynChecklistItemService};
use checklist_service::{ChecklistService, DynChecklistService};
use customer_service::{CustomerService, DynCustomerService};
use database::ordering::PosConfig;
use database::{
    customer::repository::DynCustomerRepository, workflow_status::repository::DynWorkflowStatusRepository, Database,
};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use sticky_note_service::{DynStickyNoteService, StickyNoteService};
use std::sync::Arc;
use tracing::info;
use utils::{AppError, AppResult};
use workflow_status_service::{DynWorkflowStatusService, WorkflowStatusService};

#[derive(Clone)]
pub struct Services {
    pub customer: DynCustomerService,
    pub workflow_status: DynWorkflowStatusService,
    pub checklist: DynChecklistService,
    pub checklist_item: DynChecklistItemService,
    pub sticky_note: DynStickyNoteService,
}

impl Services {
    pub fn new(db: Database, pos_config: PosConfig) -> Self {
        let database = Arc::new(db);
        let customer_repository = database.clone() as DynCustomerRepository;
        let status_repository = database as DynWorkflowStatusRepository;

        Self::with_repositories(customer_repository, status_repository, pos_config)
    }

    /// 从任意仓库实现组装，测试时注入内存仓库
    pub fn with_repositories(
        customer_repository: DynCustomerRepository,
        status_repository: DynWorkflowStatusRepository,
        pos_config: PosConfig,
    ) -> Self {
        let customer = Arc::new(CustomerService::new(
            customer_repository.clone(),
            status_repository.clone(),
            pos_config,
        )) as DynCustomerService;
        let workflow_status =
            Arc::new(WorkflowStatusService::new(status_repository, pos_config)) as DynWorkflowStatusService;
        let checklist = Arc::new(ChecklistService::new(customer_repository.clone(), pos_config)) as DynChecklistService;
        let checklist_item =
            Arc::new(ChecklistItemService::new(customer_repository.clone(), pos_config)) as DynChecklistItemService;
        let sticky_note = Arc::new(StickyNoteService::new(customer_repository, pos_config)) as DynStickyNoteService;

        info!("🧠 Services initialized");

        Self {
            customer,
            workflow_status,
            checklist,
            checklist_item,
            sticky_note,
        }
    }
}

/// RFC 7386 merge-patch：实体序列化为JSON、合并补丁、再反序列化回来。
/// 反序列化失败说明补丁与Schema不兼容，按400处理。
pub(crate) fn apply_merge_patch<T>(entity: &T, patch: &Value) -> AppResult<T>
where
    T: Serialize + DeserializeOwned,
{
    let mut doc = serde_json::to_value(entity)
        .map_err(|e| AppError::InternalServerErrorWithContext(format!("failed to serialize entity: {}", e)))?;

    json_patch::merge(&mut doc, patch);

    serde_json::from_value(doc).map_err(|_| AppError::BadRequest("Invalid merge patch".to_string()))
}

/// 从merge-patch文档中取pos字段
///
/// 以字段是否出现判定，不做truthy判断：`"pos": 0` 会参与冲突校验。
/// `"pos": null` 按RFC语义是移除字段，不触发校验(稀疏pos允许缺失)。
pub(crate) fn patch_pos_field(patch: &Value, field: &str) -> AppResult<Option<i64>> {
    match patch.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n
            .as_i64()
            .map(Some)
            .ok_or_else(|| AppError::BadRequest(format!("{} must be an integer", field))),
        Some(_) => Err(AppError::BadRequest(format!("{} must be an integer", field))),
    }
}
