#[cfg(feature = "postgres")]
use std::time::Duration;

#[cfg(feature = "postgres")]
use sea_orm::{ConnectOptions, Database, DbConn, DbErr};

/// Name of the secondary database that holds user profiles.
pub const USERS_DB: &str = "users";

/// Connection settings for the content database.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub main_url: String,
    pub main_max_connections: u32,
    pub main_min_connections: u32,
    pub secondary_databases: Vec<SecondaryDbConfig>,
}

/// A named secondary database, e.g. the identity service's `users` database.
#[derive(Debug, Clone)]
pub struct SecondaryDbConfig {
    pub name: String,
    pub url: String,
    pub max_connections: u32,
}

impl SecondaryDbConfig {
    /// Parse a `SECONDARY_DB_<NAME>` value of the form `url[,max_connections]`.
    pub fn parse(name: &str, value: &str) -> Option<Self> {
        let mut parts = value.splitn(2, ',');
        let url = parts.next().map(str::trim).filter(|u| !u.is_empty())?;
        let max_connections = parts
            .next()
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(10);

        Some(Self {
            name: name.to_lowercase(),
            url: url.to_string(),
            max_connections,
        })
    }
}

#[cfg(feature = "postgres")]
pub struct NamedConnection {
    pub name: String,
    pub conn: DbConn,
}

#[cfg(not(feature = "postgres"))]
pub struct NamedConnection {
    pub name: String,
}

/// The main content database plus any named secondaries.
#[cfg(feature = "postgres")]
pub struct DatabaseConnections {
    pub main: DbConn,
    pub secondary: Vec<NamedConnection>,
}

#[cfg(not(feature = "postgres"))]
pub struct DatabaseConnections {
    pub secondary: Vec<NamedConnection>,
}

#[cfg(feature = "postgres")]
async fn connect(url: &str, max: u32, min: u32) -> Result<DbConn, DbErr> {
    let opts = ConnectOptions::new(url)
        .max_connections(max)
        .min_connections(min.min(max))
        .connect_timeout(Duration::from_secs(10))
        .idle_timeout(Duration::from_secs(300))
        .sqlx_logging(false)
        .to_owned();

    Database::connect(opts).await
}

#[cfg(feature = "postgres")]
impl DatabaseConnections {
    pub async fn init(config: &DatabaseConfig) -> Result<Self, DbErr> {
        tracing::info!("Initializing database connections...");

        let main = connect(
            &config.main_url,
            config.main_max_connections,
            config.main_min_connections,
        )
        .await?;
        tracing::info!(pool = config.main_max_connections, "Main database connected");

        let mut secondary = Vec::new();
        for db_config in &config.secondary_databases {
            let conn = connect(&db_config.url, db_config.max_connections, 1).await?;
            tracing::info!(
                name = %db_config.name,
                pool = db_config.max_connections,
                "Secondary database connected"
            );

            secondary.push(NamedConnection {
                name: db_config.name.clone(),
                conn,
            });
        }

        Ok(Self { main, secondary })
    }

    /// Get a secondary database connection by name.
    pub fn get(&self, name: &str) -> Option<&DbConn> {
        self.secondary
            .iter()
            .find(|c| c.name == name)
            .map(|c| &c.conn)
    }

    /// Connection for profile lookups: the `users` secondary when configured,
    /// otherwise the main database.
    pub fn users(&self) -> &DbConn {
        self.get(USERS_DB).unwrap_or(&self.main)
    }

    /// Whether the main database answers a ping.
    pub async fn is_healthy(&self) -> bool {
        match self.main.ping().await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(error = %e, "Database ping failed");
                false
            }
        }
    }
}
