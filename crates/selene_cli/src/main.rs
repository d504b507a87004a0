use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use selene_core::{Body, EngineConfig};
use selene_service::{LunaRequest, LunaService, Reply, format_dec, format_ra_hours};

#[derive(Parser)]
#[command(name = "selene", about = "Lunar-return and solar-equivalent search")]
struct Cli {
    /// Path to SPK kernel
    #[arg(
        long,
        global = true,
        env = "SELENE_BSP",
        default_value = "kernels/data/de421.bsp"
    )]
    bsp: PathBuf,
    /// Path to leap second kernel (built-in table if omitted)
    #[arg(long, global = true)]
    lsk: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Find the lunar return and solar equivalent for a reference date
    Luna {
        /// ISO-8601 date or date-time; no offset means Buenos Aires time
        #[arg(long)]
        fecha: String,
        /// Per-axis tolerance in degrees
        #[arg(long, default_value_t = selene_service::DEFAULT_TOLERANCE_DEG)]
        tolerancia: f64,
        /// Any non-empty value adds the interpretation label
        #[arg(long)]
        sexo: Option<String>,
    },
    /// Answer a raw JSON request body (read from stdin if omitted)
    Request {
        body: Option<String>,
    },
    /// Apparent RA/Dec of a single body
    Position {
        /// sun, moon (or sol, luna)
        #[arg(long)]
        body: String,
        /// ISO-8601 date or date-time; no offset means Buenos Aires time
        #[arg(long)]
        fecha: String,
    },
}

fn engine_config(cli: &Cli) -> EngineConfig {
    let config = EngineConfig::new(&cli.bsp);
    match &cli.lsk {
        Some(lsk) => config.with_lsk(lsk),
        None => config,
    }
}

fn start_service(cli: &Cli) -> anyhow::Result<LunaService> {
    LunaService::start(engine_config(cli))
        .with_context(|| format!("failed to load ephemeris from {}", cli.bsp.display()))
}

/// Prints the reply body and fails the process on an error reply.
fn emit(reply: &Reply) -> anyhow::Result<()> {
    println!("{}", reply.to_json());
    if !reply.is_ok() {
        std::process::exit(1);
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match &cli.command {
        Commands::Luna {
            fecha,
            tolerancia,
            sexo,
        } => {
            let service = start_service(&cli)?;
            let mut request = LunaRequest::new(fecha).with_tolerance(*tolerancia);
            request.sexo = sexo.clone();
            emit(&service.respond(&request))
        }

        Commands::Request { body } => {
            let body = match body {
                Some(body) => body.clone(),
                None => {
                    let mut buf = String::new();
                    std::io::stdin()
                        .read_to_string(&mut buf)
                        .context("failed to read request body from stdin")?;
                    buf
                }
            };
            let service = start_service(&cli)?;
            emit(&service.handle_json(&body))
        }

        Commands::Position { body, fecha } => {
            let target: Body = body.parse()?;
            if target == Body::Earth {
                bail!("the observer is on the Earth; choose sun or moon");
            }
            let instant = selene_service::parse_reference_instant(fecha)?;
            let service = start_service(&cli)?;
            let place = service.source().apparent_place(target, &instant)?;
            log::debug!("{} at {instant}: {place:?}", target.name());
            println!("{} at {instant}", target.name());
            println!(
                "  RA {} ({:.6} deg)  Dec {} ({:.6} deg)",
                format_ra_hours(place.coords.ra_deg),
                place.coords.ra_deg,
                format_dec(place.coords.dec_deg),
                place.coords.dec_deg
            );
            println!(
                "  distance {:.1} km  light time {:.6} s  JD {:.6} TDB",
                place.coords.distance_km, place.light_time_s, place.epoch_tdb_jd
            );
            Ok(())
        }
    }
}
