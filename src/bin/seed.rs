use axum_resto_api::{config::AppConfig, db::create_pool, services::auth_service::hash_password};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let pool = create_pool(&config.database_url).await?;
    // Ensure migrations are applied.
    sqlx::migrate!("./migrations").run(&pool).await?;

    ensure_user(&pool, "admin", "admin123", "STAFF").await?;
    ensure_user(&pool, "owner", "owner123", "OWNER").await?;
    seed_menu(&pool).await?;

    println!("Seed completed.");
    Ok(())
}

async fn ensure_user(
    pool: &sqlx::PgPool,
    username: &str,
    password: &str,
    role: &str,
) -> anyhow::Result<()> {
    let password_hash = hash_password(password).map_err(|e| anyhow::anyhow!(e.to_string()))?;

    sqlx::query(
        r#"
        INSERT INTO users (username, password_hash, role)
        VALUES ($1, $2, $3)
        ON CONFLICT (username) DO UPDATE SET role = EXCLUDED.role
        "#,
    )
    .bind(username)
    .bind(password_hash)
    .bind(role)
    .execute(pool)
    .await?;

    println!("Ensured user {username} (role={role})");
    Ok(())
}

async fn seed_menu(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    let menus: Vec<(&str, &str, i64, &str, Option<&str>)> = vec![
        (
            "Ayam Goreng Crispy",
            "Ayam goreng renyah dengan bumbu rahasia",
            25000,
            "Fried Chicken",
            None,
        ),
        (
            "Ayam Pedas",
            "Ayam goreng dengan bumbu pedas level maksimal",
            28000,
            "Fried Chicken",
            None,
        ),
        (
            "Ayam Bakar",
            "Ayam bakar dengan saus spesial",
            30000,
            "Grilled Chicken",
            None,
        ),
        (
            "Chicken Burger",
            "Burger dengan daging ayam crispy",
            22000,
            "Burgers",
            Some("/chicken-burger.png"),
        ),
        (
            "Nasi Ayam Komplit",
            "Nasi dengan ayam goreng, sambal, dan lalapan",
            35000,
            "Rice Bowl",
            Some("/chicken-rice.png"),
        ),
    ];

    for (name, description, price, category, image) in menus {
        let existing: Option<(i32,)> = sqlx::query_as("SELECT id FROM menus WHERE name = $1")
            .bind(name)
            .fetch_optional(pool)
            .await?;
        if existing.is_some() {
            continue;
        }
        let (menu_id,): (i32,) = sqlx::query_as(
            r#"
            INSERT INTO menus (name, description, price, category, image)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(name)
        .bind(description)
        .bind(price)
        .bind(category)
        .bind(image)
        .fetch_one(pool)
        .await?;

        let variants: &[(&str, i64)] = match name {
            "Ayam Goreng Crispy" => &[
                ("Tidak Pedas", 0),
                ("Pedas Sedang", 2000),
                ("Extra Pedas", 3000),
            ],
            "Ayam Bakar" => &[("Regular", 0), ("Large", 8000)],
            _ => &[],
        };
        for (variant_name, price_modifier) in variants {
            sqlx::query("INSERT INTO variants (menu_id, name, price_modifier) VALUES ($1, $2, $3)")
                .bind(menu_id)
                .bind(variant_name)
                .bind(price_modifier)
                .execute(pool)
                .await?;
        }
    }

    println!("Seeded menu");
    Ok(())
}
