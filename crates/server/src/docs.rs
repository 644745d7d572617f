use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "ECA Backend API",
        description = "基于 Rust 和 Axum 的留学客户管理系统 API 文档",
        version = "1.0.0"
    ),
    paths(
        // System health check
        crate::api::health,
        // Customer endpoints
        crate::api::customer_controller::get_customers,
        crate::api::customer_controller::create_customer,
        crate::api::customer_controller::get_customer,
        crate::api::customer_controller::update_customer,
        crate::api::customer_controller::partial_update_customer,
        crate::api::customer_controller::delete_customer,
        // Workflow status endpoints
        crate::api::workflow_status_controller::get_statuses,
        crate::api::workflow_status_controller::create_status,
        crate::api::workflow_status_controller::get_status,
        crate::api::workflow_status_controller::update_status,
        crate::api::workflow_status_controller::partial_update_status,
        crate::api::workflow_status_controller::delete_status,
        // Checklist endpoints
        crate::api::checklist_controller::get_checklists,
        crate::api::checklist_controller::create_checklist,
        crate::api::checklist_controller::get_checklist,
        crate::api::checklist_controller::update_checklist,
        crate::api::checklist_controller::partial_update_checklist,
        crate::api::checklist_controller::delete_checklist,
        // Checklist item endpoints
        crate::api::checklist_item_controller::get_items,
        crate::api::checklist_item_controller::create_item,
        crate::api::checklist_item_controller::get_item,
        crate::api::checklist_item_controller::update_item,
        crate::api::checklist_item_controller::partial_update_item,
        crate::api::checklist_item_controller::delete_item,
        // Sticky note endpoints
        crate::api::sticky_note_controller::get_sticky_notes,
        crate::api::sticky_note_controller::create_sticky_note,
        crate::api::sticky_note_controller::get_sticky_note,
        crate::api::sticky_note_controller::update_sticky_note,
        crate::api::sticky_note_controller::partial_update_sticky_note,
        crate::api::sticky_note_controller::delete_sticky_note,
    ),
    components(
        schemas(
            // Database models
            database::customer::model::Customer,
            database::customer::model::Checklist,
            database::customer::model::ChecklistItem,
            database::customer::model::StickyNote,
            database::workflow_status::model::WorkflowStatus,
            // DTOs
            crate::dtos::customer_dto::CreateCustomerDto,
            crate::dtos::customer_dto::UpdateCustomerDto,
            crate::dtos::workflow_status_dto::CreateWorkflowStatusDto,
            crate::dtos::workflow_status_dto::UpdateWorkflowStatusDto,
            crate::dtos::checklist_dto::CreateChecklistDto,
            crate::dtos::checklist_dto::UpdateChecklistDto,
            crate::dtos::checklist_item_dto::CreateChecklistItemDto,
            crate::dtos::checklist_item_dto::UpdateChecklistItemDto,
            crate::dtos::sticky_note_dto::CreateStickyNoteDto,
            crate::dtos::sticky_note_dto::UpdateStickyNoteDto,
        )
    ),
    tags(
        (name = "系统状态", description = "系统健康检查和状态监控"),
        (name = "customers", description = "客户管理"),
        (name = "workflowStatuses", description = "工作流状态(看板列)管理"),
        (name = "checklists", description = "客户检查清单管理"),
        (name = "checklistItems", description = "清单条目管理"),
        (name = "stickyNotes", description = "客户便签管理")
    )
)]
pub struct ApiDoc;
