////////////////////////////////////////////////////////////////////////
//
// 1. 每个Domain(Entity)单独一个文件夹
// 2. 每个Domain由两部分组成:
//    - model: 定义Schema
//    - repository: 实际的数据库底层操作
//
// 嵌套实体(checklist/checklist item/sticky note)内嵌在Customer文档中，
// 统一的位置排序算法见 ordering 模块。
//
//////////////////////////////////////////////////////////////////////

use mongodb::options::IndexOptions;
use mongodb::{bson::doc, Client, Collection, IndexModel};
use std::sync::Arc;
use tracing::info;

use utils::{AppConfig, AppResult};

pub mod customer;
pub mod ordering;
pub mod workflow_status;

pub use customer::model::{Checklist, ChecklistItem, Customer, StickyNote};
pub use workflow_status::model::WorkflowStatus;

#[derive(Clone, Debug)]
pub struct Database {
    pub customers: Collection<Customer>,
    pub workflow_statuses: Collection<WorkflowStatus>,
}

impl Database {
    pub async fn new(config: Arc<AppConfig>) -> AppResult<Self> {
        let client = Client::with_uri_str(&config.mongo_uri).await?;
        let db: mongodb::Database = client.database(&config.mongo_db);

        let customers = db.collection("Customer");
        let workflow_statuses = db.collection("WorkflowStatus");

        info!("🧱 database({:#}) connected.", &config.mongo_db);

        Ok(Database {
            customers,
            workflow_statuses,
        })
    }

    /// 初始化索引
    ///
    /// 内存中的兄弟集合扫描只做提前拒绝；scan-then-write 不是原子操作，
    /// 顶层作用域的并发兜底是唯一稀疏索引的 duplicate key(11000) 拒绝。
    /// 内嵌作用域(checklists/items/sticky_notes)的pos不能建唯一索引：
    /// multikey唯一约束跨文档生效，会让不同Customer之间互相冲突；
    /// 内嵌写入走整文档replace，单文档原子性已足够。
    pub async fn init_indexes(&self) -> AppResult<()> {
        let unique_sparse = || IndexOptions::builder().unique(true).sparse(true).build();

        let status_indexes = vec![IndexModel::builder()
            .keys(doc! { "pos": 1 })
            .options(unique_sparse())
            .build()];
        self.workflow_statuses.create_indexes(status_indexes, None).await?;

        let customer_indexes = vec![
            IndexModel::builder()
                .keys(doc! { "list_pos": 1 })
                .options(unique_sparse())
                .build(),
            IndexModel::builder()
                .keys(doc! { "workflow_pos": 1 })
                .options(unique_sparse())
                .build(),
            // 按内嵌文档_id定位所属Customer的常用查询
            IndexModel::builder().keys(doc! { "checklists._id": 1 }).build(),
            IndexModel::builder().keys(doc! { "checklists.items._id": 1 }).build(),
            IndexModel::builder().keys(doc! { "sticky_notes._id": 1 }).build(),
        ];
        self.customers.create_indexes(customer_indexes, None).await?;

        info!("✅ pos唯一索引初始化完成");
        Ok(())
    }
}
