use chrono::NaiveDate;
use database::customer::repository::DynCustomerRepository;
use database::workflow_status::repository::DynWorkflowStatusRepository;
use database::{Customer, WorkflowStatus};
use mongodb::bson::oid::ObjectId;
use serde::Deserialize;
use std::io::Read;
use tracing::info;
use utils::{AppError, AppResult};

const WRONG_WORKFLOW_STATUS_ID: &str = "Wrong workflow status ID";

/// CSV行：工作流状态，表头 `_id,name,color,pos`
#[derive(Debug, Deserialize)]
struct WorkflowStatusRecord {
    #[serde(rename = "_id")]
    id: Option<String>,
    name: String,
    color: Option<String>,
    pos: Option<i64>,
}

/// CSV行：客户。空字段按缺失处理，不落库
#[derive(Debug, Deserialize)]
struct CustomerRecord {
    email: Option<String>,
    surname: Option<String>,
    given_name: Option<String>,
    nickname: Option<String>,
    real_name: Option<String>,
    gender: Option<String>,
    birthday: Option<String>,
    mobile: Option<String>,
    qq: Option<String>,
    wechat: Option<String>,
    au_address: Option<String>,
    foreign_address: Option<String>,
    visa_expiry_date: Option<String>,
    status: String,
    list_pos: Option<i64>,
    workflow_pos: Option<i64>,
    is_archived: Option<bool>,
}

/// 从CSV批量导入，用于初始数据迁移。
/// 导入的行不走位置分配，pos按文件原值落库。
pub struct CsvImporter {
    customer_repository: DynCustomerRepository,
    status_repository: DynWorkflowStatusRepository,
}

impl CsvImporter {
    pub fn new(customer_repository: DynCustomerRepository, status_repository: DynWorkflowStatusRepository) -> Self {
        Self {
            customer_repository,
            status_repository,
        }
    }

    pub async fn import_workflow_statuses<R: Read>(&self, reader: R) -> AppResult<usize> {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let mut imported = 0;

        for record in csv_reader.deserialize::<WorkflowStatusRecord>() {
            let record = record.map_err(|e| AppError::BadRequest(format!("Invalid CSV row: {}", e)))?;

            let id = match record.id.as_deref() {
                Some(hex) => Some(
                    ObjectId::parse_str(hex)
                        .map_err(|_| AppError::BadRequest(WRONG_WORKFLOW_STATUS_ID.to_string()))?,
                ),
                None => None,
            };

            let status = WorkflowStatus {
                id,
                name: record.name,
                color: record.color,
                pos: record.pos,
            };
            self.status_repository.insert_status(status).await?;
            imported += 1;
        }

        info!("✅ imported {} workflow statuses from csv", imported);
        Ok(imported)
    }

    pub async fn import_customers<R: Read>(&self, reader: R) -> AppResult<usize> {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let mut imported = 0;

        for record in csv_reader.deserialize::<CustomerRecord>() {
            let record = record.map_err(|e| AppError::BadRequest(format!("Invalid CSV row: {}", e)))?;

            let status = ObjectId::parse_str(&record.status)
                .map_err(|_| AppError::BadRequest(WRONG_WORKFLOW_STATUS_ID.to_string()))?;

            let now = chrono::Utc::now().timestamp();
            let customer = Customer {
                id: None,
                email: record.email,
                surname: record.surname,
                given_name: record.given_name,
                nickname: record.nickname,
                real_name: record.real_name,
                gender: record.gender,
                birthday: record.birthday.as_deref().map(normalize_date),
                mobile: record.mobile,
                qq: record.qq,
                wechat: record.wechat,
                au_address: record.au_address,
                foreign_address: record.foreign_address,
                visa_expiry_date: record.visa_expiry_date.as_deref().map(normalize_date),
                status,
                list_pos: record.list_pos,
                workflow_pos: record.workflow_pos,
                is_archived: record.is_archived.unwrap_or(false),
                checklists: Vec::new(),
                sticky_notes: Vec::new(),
                created_at: now,
                updated_at: now,
            };
            self.customer_repository.insert_customer(customer).await?;
            imported += 1;
        }

        info!("✅ imported {} customers from csv", imported);
        Ok(imported)
    }
}

/// 遗留导出文件的日期写作 `dd/mm/yy`，统一成ISO日期；其他格式原样保留
fn normalize_date(value: &str) -> String {
    match NaiveDate::parse_from_str(value, "%d/%m/%y") {
        Ok(date) => date.format("%Y-%m-%d").to_string(),
        Err(_) => value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::{InMemoryCustomerRepository, InMemoryWorkflowStatusRepository};
    use std::sync::Arc;

    fn importer() -> (CsvImporter, Arc<InMemoryCustomerRepository>, Arc<InMemoryWorkflowStatusRepository>) {
        let customers = Arc::new(InMemoryCustomerRepository::default());
        let statuses = Arc::new(InMemoryWorkflowStatusRepository::default());
        let importer = CsvImporter::new(customers.clone(), statuses.clone());
        (importer, customers, statuses)
    }

    #[test]
    fn legacy_dates_are_normalized_to_iso() {
        assert_eq!(normalize_date("25/12/95"), "1995-12-25");
        assert_eq!(normalize_date("01/02/03"), "2003-02-01");
    }

    #[test]
    fn other_date_formats_pass_through() {
        assert_eq!(normalize_date("1995-12-25"), "1995-12-25");
        assert_eq!(normalize_date("not a date"), "not a date");
    }

    #[tokio::test]
    async fn imports_workflow_statuses_with_explicit_ids() {
        let (importer, _, statuses) = importer();
        let id = ObjectId::new();
        let csv = format!("_id,name,color,pos\n{},Open,#00ff00,0\n,Closed,,10\n", id.to_hex());

        let imported = importer.import_workflow_statuses(csv.as_bytes()).await.unwrap();

        assert_eq!(imported, 2);
        let stored = statuses.statuses.lock().unwrap();
        assert_eq!(stored.len(), 2);
        assert_eq!(stored[1].name, "Closed");
        assert_eq!(stored[1].color, None);
        assert_eq!(stored[1].pos, Some(10));
    }

    #[tokio::test]
    async fn imports_customers_and_normalizes_dates() {
        let (importer, customers, _) = importer();
        let status = ObjectId::new();
        let csv = format!(
            "email,surname,given_name,nickname,real_name,gender,birthday,mobile,qq,wechat,au_address,foreign_address,visa_expiry_date,status,list_pos,workflow_pos,is_archived\n\
             a@b.com,Smith,John,,,male,25/12/95,,,,,,01/06/27,{},0,0,false\n",
            status.to_hex()
        );

        let imported = importer.import_customers(csv.as_bytes()).await.unwrap();

        assert_eq!(imported, 1);
        let stored = customers.customers.lock().unwrap();
        assert_eq!(stored[0].birthday.as_deref(), Some("1995-12-25"));
        assert_eq!(stored[0].visa_expiry_date.as_deref(), Some("2027-06-01"));
        assert_eq!(stored[0].nickname, None);
        assert_eq!(stored[0].status, status);
    }

    #[tokio::test]
    async fn malformed_status_id_rejects_the_file() {
        let (importer, _, _) = importer();
        let csv = "email,surname,given_name,nickname,real_name,gender,birthday,mobile,qq,wechat,au_address,foreign_address,visa_expiry_date,status,list_pos,workflow_pos,is_archived\n\
                   a@b.com,,,,,,,,,,,,,not-an-id,,,\n";

        let result = importer.import_customers(csv.as_bytes()).await;

        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }
}
