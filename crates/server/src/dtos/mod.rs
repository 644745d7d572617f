pub mod checklist_dto;
pub mod checklist_item_dto;
pub mod customer_dto;
pub mod sticky_note_dto;
pub mod workflow_status_dto;
