use bgs_restaurant_api::{
    config::AppConfig,
    db::{create_pool, run_migrations},
};
use rust_decimal::Decimal;
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let pool = create_pool(&config.database_url, config.max_connections).await?;
    run_migrations(&pool).await?;

    seed_categories(&pool).await?;
    seed_menu_items(&pool).await?;
    seed_extras(&pool).await?;

    println!("Seed completed");
    Ok(())
}

async fn seed_categories(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    let categories = vec![
        ("Traditional Dishes", "traditional", "Stews and tibs served on injera", 1),
        ("Fasting Menu", "fasting", "Plant based dishes for fasting days", 2),
        ("Breakfast", "breakfast", "Morning classics", 3),
        ("Drinks", "drinks", "Coffee, tea and juices", 4),
    ];

    for (name, slug, desc, sort_order) in categories {
        sqlx::query(
            r#"
            INSERT INTO categories (id, name, slug, description, sort_order)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (slug) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(slug)
        .bind(desc)
        .bind(sort_order)
        .execute(pool)
        .await?;
    }

    println!("Seeded categories");
    Ok(())
}

async fn seed_menu_items(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    // (category slug, name, description, price in cents, fasting, sort order)
    let items = vec![
        ("traditional", "Special Tibs", "Sauteed beef with onion and rosemary", 35000, false, 1),
        ("traditional", "Kitfo", "Minced beef with mitmita and niter kibbeh", 42000, false, 2),
        ("traditional", "Doro Wat", "Slow cooked chicken stew with egg", 38000, false, 3),
        ("fasting", "Shiro", "Spiced chickpea stew", 18000, true, 1),
        ("fasting", "Beyaynetu", "Assorted vegetable stews on injera", 22000, true, 2),
        ("breakfast", "Firfir", "Shredded injera in berbere sauce", 15000, false, 1),
        ("breakfast", "Chechebsa", "Flatbread with spiced butter and honey", 14000, false, 2),
        ("drinks", "Buna", "Traditional coffee", 4000, true, 1),
        ("drinks", "Spris", "Layered avocado, mango and papaya juice", 9000, true, 2),
    ];

    for (slug, name, desc, cents, is_fasting, sort_order) in items {
        sqlx::query(
            r#"
            INSERT INTO menu_items
                (id, category_id, name, description, price, is_fasting, sort_order)
            SELECT $1, c.id, $2, $3, $4, $5, $6
            FROM categories c
            WHERE c.slug = $7
            ON CONFLICT (name) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(desc)
        .bind(Decimal::new(cents, 2))
        .bind(is_fasting)
        .bind(sort_order)
        .bind(slug)
        .execute(pool)
        .await?;
    }

    println!("Seeded menu items");
    Ok(())
}

async fn seed_extras(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    let extras = vec![("Extra Injera", 2000), ("Awaze", 1000), ("Ayib", 2500)];

    for (name, cents) in extras {
        sqlx::query(
            r#"
            INSERT INTO extras (id, name, price)
            VALUES ($1, $2, $3)
            ON CONFLICT (name) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(Decimal::new(cents, 2))
        .execute(pool)
        .await?;
    }

    println!("Seeded extras");
    Ok(())
}
