use argon2::{
    Argon2, PasswordHasher,
    password_hash::{rand_core::OsRng, SaltString},
};
use cart_api::{config::AppConfig, db::create_pool};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let config = AppConfig::from_env()?;

    let pool = create_pool(&config.database_url).await?;
    // Ensure migrations are applied.
    sqlx::migrate!("./migrations").run(&pool).await?;

    let user_id = ensure_user(&pool, "user@example.com", "user123").await?;
    seed_products(&pool).await?;

    tracing::info!(user_id, "seed completed");
    Ok(())
}

async fn ensure_user(pool: &sqlx::PgPool, email: &str, password: &str) -> anyhow::Result<i64> {
    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!(e.to_string()))?
        .to_string();

    let (user_id,): (i64,) = sqlx::query_as(
        r#"
        INSERT INTO users (email, password_hash)
        VALUES ($1, $2)
        ON CONFLICT (email) DO UPDATE SET password_hash = EXCLUDED.password_hash
        RETURNING id
        "#,
    )
    .bind(email)
    .bind(password_hash)
    .fetch_one(pool)
    .await?;

    tracing::info!(%email, "ensured user");
    Ok(user_id)
}

async fn seed_products(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    let products = [
        ("Ferris Hoodie", "Warm hoodie for Rustaceans", 5500),
        ("Ferris Mug", "Coffee tastes better with Ferris", 1200),
        ("Sticker Pack", "Decorate your laptop", 500),
        ("Async Handbook", "Printed guide to async patterns", 2500),
    ];

    for (title, description, price) in products {
        sqlx::query(
            r#"
            INSERT INTO products (title, description, price)
            VALUES ($1, $2, $3)
            ON CONFLICT (title) DO NOTHING
            "#,
        )
        .bind(title)
        .bind(description)
        .bind(price as i64)
        .execute(pool)
        .await?;
    }

    tracing::info!(count = products.len(), "seeded products");
    Ok(())
}
