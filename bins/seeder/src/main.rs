//! Database seeder for irbankmock development and testing.
//!
//! Creates a demo merchant terminal and issues one open payment token for it,
//! then prints the credentials and the merchant endpoint URLs.
//!
//! Usage: cargo run --bin seeder

use sea_orm::DatabaseConnection;
use sea_orm_migration::MigratorTrait;

use irbankmock_api::routes::sep::{BANK_NAME, Endpoints};
use irbankmock_core::sep::TokenRequest;
use irbankmock_db::entities::bank_sep_terminals;
use irbankmock_db::{LifecycleRepository, Migrator, TerminalRepository};
use irbankmock_shared::AppConfig;

/// Display name of the seeded terminal.
const DEMO_TERMINAL_NAME: &str = "Demo Shop";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load()?;

    println!("Connecting to database...");
    let db = irbankmock_db::connect(&config.database).await?;
    Migrator::up(&db, None).await?;

    println!("Seeding demo terminal...");
    let terminal = seed_terminal(&db).await?;
    println!("  id:       {}", terminal.id);
    println!("  username: {}", terminal.username);
    println!("  password: {}", terminal.password);

    println!("Seeding open payment token...");
    let token = seed_token(&db, terminal.id).await?;
    println!("  token:    {token}");

    let prefix = format!("/api/banks/{BANK_NAME}");
    let endpoints = Endpoints::new(&config.gateway.public_hostname, &prefix);
    println!("Endpoints:");
    println!("  token:    {}", endpoints.payment_gateway);
    println!("  pay:      {}?token={token}", endpoints.payment_token);
    println!("  receipt:  {}", endpoints.receipt);
    println!("  verify:   {}", endpoints.verify_transaction);
    println!("  reverse:  {}", endpoints.reverse_transaction);

    println!("Seeding complete!");
    Ok(())
}

/// Returns the demo terminal, creating it on first run.
async fn seed_terminal(db: &DatabaseConnection) -> anyhow::Result<bank_sep_terminals::Model> {
    let repo = TerminalRepository::new(db.clone());

    if let Some(existing) = repo
        .list()
        .await?
        .into_iter()
        .find(|t| t.name == DEMO_TERMINAL_NAME)
    {
        println!("  Demo terminal already exists, skipping...");
        return Ok(existing);
    }

    Ok(repo.create(DEMO_TERMINAL_NAME).await?)
}

/// Issues a fresh token so the payment page can be opened right away.
async fn seed_token(db: &DatabaseConnection, terminal_id: i64) -> anyhow::Result<String> {
    let repo = LifecycleRepository::new(db.clone());
    let request = TokenRequest {
        action: "token".to_string(),
        terminal_id: terminal_id.to_string(),
        amount: 10_000,
        res_num: uuid::Uuid::new_v4().simple().to_string(),
        redirect_url: "http://localhost:8080/callback".to_string(),
        token_expiry_in_min: 60,
        ..TokenRequest::default()
    };

    let transaction = repo.issue_token(&request).await?;
    Ok(transaction.token)
}
