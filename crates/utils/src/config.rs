use clap::Parser;

#[derive(clap::ValueEnum, Clone, Debug, Copy)]
#[clap(rename_all = "lowercase")]
pub enum CargoEnv {
    Development,
    Production,
}

/// 环境配置加载器
pub struct EnvLoader;

impl EnvLoader {
    /// 根据 CARGO_ENV 加载对应的环境配置文件
    pub fn load_env_file() -> Result<(), Box<dyn std::error::Error>> {
        let cargo_env = std::env::var("CARGO_ENV").unwrap_or_else(|_| "development".to_string());

        let env_file = match cargo_env.as_str() {
            "production" | "Production" | "prod" => ".env.production",
            "development" | "Development" | "dev" => ".env.development",
            "test" | "Test" => ".env.test",
            _ => {
                println!("⚠️  未知的 CARGO_ENV: {}，使用默认的 .env.development", cargo_env);
                ".env.development"
            }
        };

        if !std::path::Path::new(env_file).exists() {
            // 回退到默认的 .env 文件
            if std::path::Path::new(".env").exists() {
                dotenvy::from_filename(".env")?;
                println!("✅ 已加载默认配置文件: .env");
            }
            return Ok(());
        }

        dotenvy::from_filename(env_file)?;
        println!("✅ 已加载环境配置文件: {} (CARGO_ENV={})", env_file, cargo_env);

        Ok(())
    }
}

#[derive(clap::Parser, Clone)]
pub struct AppConfig {
    #[clap(long, env, value_enum, default_value = "development")]
    pub cargo_env: CargoEnv,

    #[clap(long, env, default_value = "0.0.0.0")]
    pub app_host: String,

    #[clap(long, env, default_value = "10010")]
    pub app_port: u16,

    #[clap(long, env, default_value = "mongodb://localhost:27017")]
    pub mongo_uri: String,

    #[clap(long, env, default_value = "eca")]
    pub mongo_db: String,

    /// 空作用域中第一个实体获得的 pos 值
    #[clap(long, env, default_value = "0")]
    pub pos_start_val: i64,

    /// 自动分配 pos 时在当前最大值上追加的步长
    #[clap(long, env, default_value = "10")]
    pub pos_auto_increment: i64,

    #[clap(long, env, default_value = "info")]
    pub rust_log: String,

    /// 启动时从CSV文件导入工作流状态（一次性数据迁移）
    #[clap(long, env)]
    pub import_workflow_statuses_csv: Option<String>,

    /// 启动时从CSV文件导入客户（一次性数据迁移）
    #[clap(long, env)]
    pub import_customers_csv: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        EnvLoader::load_env_file().ok();
        AppConfig::parse()
    }
}

impl AppConfig {
    /// 手动创建配置实例（用于测试）
    pub fn new_for_test() -> Self {
        Self {
            cargo_env: CargoEnv::Development,
            app_host: "0.0.0.0".to_string(),
            app_port: 10010,
            mongo_uri: std::env::var("MONGO_URI").unwrap_or_else(|_| "mongodb://localhost:27017".to_string()),
            mongo_db: std::env::var("MONGO_DB").unwrap_or_else(|_| "eca_test".to_string()),
            pos_start_val: 0,
            pos_auto_increment: 10,
            rust_log: "info".to_string(),
            import_workflow_statuses_csv: None,
            import_customers_csv: None,
        }
    }
}
