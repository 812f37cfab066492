use actix_web::middleware::Logger;
use actix_web::{web, App, HttpServer};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use medilog::config::Settings;
use medilog::{db, manage, AppContext};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    #[command(about = "Run the HTTP server")]
    Serve,
    #[command(about = "Apply pending migrations")]
    CreateDb,
    #[command(about = "Drop every table")]
    DropDb,
    #[command(about = "Create an admin user")]
    CreateAdmin {
        #[arg(long, env = "ADMIN_EMAIL", default_value = manage::DEFAULT_ADMIN_EMAIL)]
        email: String,
        #[arg(long, env = "ADMIN_PASSWORD", default_value = manage::DEFAULT_ADMIN_PASSWORD)]
        password: String,
    },
    #[command(about = "Seed symptoms, treatments and providers")]
    CreateData,
}

#[actix_web::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let settings = Settings::from_env()?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(settings.log_filter()))
        .init();

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(settings).await,
        Command::CreateDb => {
            let pool = db::pool(&settings.database_url)?;
            let mut conn = pool.get()?;
            let version = manage::create_db(&mut conn)?;
            log::info!("database at schema version {}", version);
            Ok(())
        }
        Command::DropDb => {
            let pool = db::pool(&settings.database_url)?;
            let mut conn = pool.get()?;
            manage::drop_db(&mut conn)?;
            Ok(())
        }
        Command::CreateAdmin { email, password } => {
            let ctx = AppContext::new(settings)?;
            let mut conn = ctx.pool.get()?;
            manage::create_admin(&mut conn, &email, &password, &ctx.passwords)?;
            Ok(())
        }
        Command::CreateData => {
            let ctx = AppContext::new(settings)?;
            let mut conn = ctx.pool.get()?;
            manage::create_data(&mut conn)?;
            Ok(())
        }
    }
}

async fn serve(settings: Settings) -> Result<()> {
    let bind_addr = settings.bind_addr.clone();
    let ctx = web::Data::new(AppContext::new(settings).context("failed to build application context")?);
    log::info!("listening on {}", bind_addr);

    let data = ctx.clone();
    HttpServer::new(move || {
        App::new()
            .wrap(Logger::new("%r %s %Ts"))
            .app_data(data.clone())
            .configure(medilog::configure)
    })
    .bind(&bind_addr)
    .with_context(|| format!("failed to bind {}", bind_addr))?
    .run()
    .await?;

    ctx.shutdown();
    Ok(())
}
