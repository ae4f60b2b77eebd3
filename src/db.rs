use sqlx::postgres::{PgPool, PgPoolOptions};

fn table_name(schema: &Option<String>, name: &str) -> String {
    match schema {
        Some(s) => format!("{s}.{name}"),
        None => name.to_string(),
    }
}

pub async fn connect(db_url: &str) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .connect(db_url)
        .await
}

pub async fn ensure_schema(pool: &PgPool, db_schema: &Option<String>) -> Result<(), sqlx::Error> {
    if let Some(schema) = db_schema {
        let ddl = format!("CREATE SCHEMA IF NOT EXISTS {schema}");
        let _ = sqlx::query(&ddl).execute(pool).await;
    }

    let users = table_name(db_schema, "users");
    let tours = table_name(db_schema, "tours");
    let bookings = table_name(db_schema, "bookings");
    let payments = table_name(db_schema, "payments");
    let reviews = table_name(db_schema, "reviews");

    let ddls = [
        format!(
            "CREATE TABLE IF NOT EXISTS {users} (\
             id VARCHAR(36) PRIMARY KEY,\
             name VARCHAR(120) NOT NULL,\
             email VARCHAR(254) NOT NULL UNIQUE,\
             phone_number VARCHAR(32),\
             address VARCHAR(512),\
             role VARCHAR(16) NOT NULL DEFAULT 'TOURIST',\
             user_status VARCHAR(24) NOT NULL DEFAULT 'ACTIVE',\
             is_deleted INTEGER NOT NULL DEFAULT 0,\
             created_at TEXT\
             )"
        ),
        format!(
            "CREATE TABLE IF NOT EXISTS {tours} (\
             id VARCHAR(36) PRIMARY KEY,\
             guide_id VARCHAR(36) NOT NULL,\
             title VARCHAR(200) NOT NULL,\
             description VARCHAR(4000),\
             city VARCHAR(120),\
             category VARCHAR(64),\
             price_cents BIGINT NOT NULL,\
             max_group_size INTEGER NOT NULL DEFAULT 10,\
             meeting_point VARCHAR(512),\
             is_active INTEGER NOT NULL DEFAULT 1,\
             is_deleted INTEGER NOT NULL DEFAULT 0,\
             average_rating DOUBLE PRECISION NOT NULL DEFAULT 0,\
             review_count INTEGER NOT NULL DEFAULT 0,\
             created_at TEXT\
             )"
        ),
        format!(
            "CREATE TABLE IF NOT EXISTS {bookings} (\
             id VARCHAR(36) PRIMARY KEY,\
             tourist_id VARCHAR(36) NOT NULL,\
             tour_id VARCHAR(36) NOT NULL,\
             guide_id VARCHAR(36) NOT NULL,\
             payment_id VARCHAR(36),\
             guest_count INTEGER NOT NULL DEFAULT 1,\
             total_price_cents BIGINT NOT NULL,\
             commission_cents BIGINT NOT NULL DEFAULT 0,\
             guide_earnings_cents BIGINT NOT NULL DEFAULT 0,\
             status VARCHAR(16) NOT NULL DEFAULT 'PENDING',\
             is_active INTEGER NOT NULL DEFAULT 1,\
             is_deleted INTEGER NOT NULL DEFAULT 0,\
             created_at TEXT\
             )"
        ),
        format!(
            "CREATE TABLE IF NOT EXISTS {payments} (\
             id VARCHAR(36) PRIMARY KEY,\
             booking_id VARCHAR(36) NOT NULL UNIQUE,\
             transaction_id VARCHAR(64) NOT NULL UNIQUE,\
             amount_cents BIGINT NOT NULL,\
             status VARCHAR(16) NOT NULL DEFAULT 'UNPAID',\
             gateway_payload TEXT,\
             gateway_url TEXT,\
             created_at TEXT,\
             updated_at TEXT\
             )"
        ),
        format!(
            "CREATE TABLE IF NOT EXISTS {reviews} (\
             id VARCHAR(36) PRIMARY KEY,\
             booking_id VARCHAR(36) NOT NULL UNIQUE,\
             tourist_id VARCHAR(36) NOT NULL,\
             tour_id VARCHAR(36) NOT NULL,\
             guide_id VARCHAR(36) NOT NULL,\
             rating INTEGER NOT NULL,\
             comment VARCHAR(2000),\
             created_at TEXT\
             )"
        ),
        format!("CREATE INDEX IF NOT EXISTS idx_tours_guide ON {tours}(guide_id)"),
        format!("CREATE INDEX IF NOT EXISTS idx_tours_city ON {tours}(city)"),
        format!("CREATE INDEX IF NOT EXISTS idx_bookings_tourist ON {bookings}(tourist_id)"),
        format!("CREATE INDEX IF NOT EXISTS idx_bookings_guide ON {bookings}(guide_id)"),
        format!("CREATE INDEX IF NOT EXISTS idx_bookings_tour ON {bookings}(tour_id)"),
        format!("CREATE INDEX IF NOT EXISTS idx_bookings_created_at ON {bookings}(created_at)"),
        format!("CREATE INDEX IF NOT EXISTS idx_reviews_tour ON {reviews}(tour_id)"),
    ];

    for ddl in ddls {
        let _ = sqlx::query(&ddl).execute(pool).await;
    }

    // Older deployments predate the audit/url columns on payments.
    let _ = sqlx::query(&format!(
        "ALTER TABLE {payments} ADD COLUMN IF NOT EXISTS gateway_payload TEXT"
    ))
    .execute(pool)
    .await;
    let _ = sqlx::query(&format!(
        "ALTER TABLE {payments} ADD COLUMN IF NOT EXISTS gateway_url TEXT"
    ))
    .execute(pool)
    .await;
    let _ = sqlx::query(&format!(
        "ALTER TABLE {bookings} ADD COLUMN IF NOT EXISTS commission_cents BIGINT DEFAULT 0"
    ))
    .execute(pool)
    .await;
    let _ = sqlx::query(&format!(
        "ALTER TABLE {bookings} ADD COLUMN IF NOT EXISTS guide_earnings_cents BIGINT DEFAULT 0"
    ))
    .execute(pool)
    .await;

    Ok(())
}
