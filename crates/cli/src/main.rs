mod driver;
mod output;

use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use zonic_eval::building::BuildingRecord;
use zonic_eval::parcels::parcels_from_json;
use zonic_eval::resolve::resolve_constraints;
use zonic_eval::zoning::ZoningDocument;

use driver::{run_batch, DriverConfig};

/// Output format for CLI responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    Text,
    Json,
}

/// Zoning compliance toolchain.
#[derive(Parser)]
#[command(name = "zonic", version, about = "Zoning compliance checker")]
struct Cli {
    /// Output format (text or json)
    #[arg(long, global = true, default_value = "text", value_enum)]
    output: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a district's constraints for one building
    Resolve {
        /// Path to the zoning document JSON
        zoning: PathBuf,
        /// Path to the building record JSON
        building: PathBuf,
        /// Path to the parcel feature collection (enables lot metrics)
        #[arg(long)]
        parcels: Option<PathBuf>,
        /// District name (default: every district in the document)
        #[arg(long)]
        district: Option<String>,
        /// Parcel id supplying the lot metrics (default: first parcel)
        #[arg(long)]
        parcel: Option<String>,
        /// Override the building's use-type classification
        #[arg(long)]
        use_type: Option<String>,
    },

    /// Check a building against every parcel and its district
    Check {
        /// Path to the zoning document JSON
        zoning: PathBuf,
        /// Path to the building record JSON
        building: PathBuf,
        /// Path to the parcel feature collection
        parcels: PathBuf,
        /// Also derive buildable envelopes and test footprint fit
        #[arg(long)]
        footprint: bool,
        /// Rotation increment for the footprint search, degrees
        #[arg(long, default_value_t = 15.0)]
        rotation_step: f64,
        /// Buffer distance for the district-boundary setback rule
        #[arg(long, default_value_t = 5.0)]
        boundary_buffer: f64,
        /// Override the building's use-type classification
        #[arg(long)]
        use_type: Option<String>,
        /// Worker threads (default: one per core)
        #[arg(long)]
        workers: Option<usize>,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Resolve {
            zoning,
            building,
            parcels,
            district,
            parcel,
            use_type,
        } => cmd_resolve(
            &zoning,
            &building,
            parcels.as_deref(),
            district.as_deref(),
            parcel.as_deref(),
            use_type,
            cli.output,
        ),
        Commands::Check {
            zoning,
            building,
            parcels,
            footprint,
            rotation_step,
            boundary_buffer,
            use_type,
            workers,
        } => {
            if let Some(n) = workers {
                if let Err(e) = rayon::ThreadPoolBuilder::new().num_threads(n).build_global() {
                    eprintln!("error: could not size worker pool: {e}");
                    process::exit(1);
                }
            }
            let cfg = DriverConfig {
                footprint,
                rotation_step,
                boundary_buffer,
            };
            cmd_check(&zoning, &building, &parcels, use_type, cfg, cli.output)
        }
    }
}

fn load_inputs(
    zoning_path: &Path,
    building_path: &Path,
) -> (ZoningDocument, BuildingRecord) {
    let zoning_src = read_file(zoning_path);
    let zoning = match ZoningDocument::from_json(&zoning_src) {
        Ok(doc) => doc,
        Err(e) => fail(&format!("{}: {e}", zoning_path.display())),
    };
    let building_src = read_file(building_path);
    let building = match building_record_with_defs(&building_src, &zoning) {
        Ok(b) => b,
        Err(e) => fail(&format!("{}: {e}", building_path.display())),
    };
    (zoning, building)
}

/// Sectioned building documents take their effective height from the
/// zoning document's roof-type definitions.
fn building_record_with_defs(
    src: &str,
    zoning: &ZoningDocument,
) -> Result<BuildingRecord, zonic_eval::ZoningError> {
    let value: serde_json::Value = serde_json::from_str(src)?;
    if value.get("bldg_info").is_some() {
        zonic_eval::building::unify_building(&value, Some(&zoning.definitions))
    } else {
        Ok(serde_json::from_value(value)?)
    }
}

fn cmd_resolve(
    zoning_path: &Path,
    building_path: &Path,
    parcels_path: Option<&Path>,
    district_name: Option<&str>,
    parcel_id: Option<&str>,
    use_type: Option<String>,
    format: OutputFormat,
) {
    let (zoning, mut building) = load_inputs(zoning_path, building_path);
    if use_type.is_some() {
        building.use_type = use_type;
    }

    let parcels = parcels_path.map(|path| {
        let src = read_file(path);
        match parcels_from_json(&src) {
            Ok(p) => p,
            Err(e) => fail(&format!("{}: {e}", path.display())),
        }
    });
    let parcel = parcels.as_deref().and_then(|ps| match parcel_id {
        Some(id) => ps.iter().find(|p| p.id == id),
        None => ps.first(),
    });
    if parcel_id.is_some() && parcel.is_none() {
        fail("parcel id not found in parcel dataset");
    }

    let mut matched = false;
    for district in &zoning.districts {
        if district_name.is_some_and(|n| n != district.name) {
            continue;
        }
        matched = true;
        let rows = resolve_constraints(&building, district, parcel);
        output::print_resolved(&district.name, &rows, format);
    }
    if !matched {
        fail("district not found in zoning document");
    }
}

fn cmd_check(
    zoning_path: &Path,
    building_path: &Path,
    parcels_path: &Path,
    use_type: Option<String>,
    cfg: DriverConfig,
    format: OutputFormat,
) {
    let (zoning, mut building) = load_inputs(zoning_path, building_path);
    if use_type.is_some() {
        building.use_type = use_type;
    }
    let parcels_src = read_file(parcels_path);
    let parcels = match parcels_from_json(&parcels_src) {
        Ok(p) => p,
        Err(e) => fail(&format!("{}: {e}", parcels_path.display())),
    };

    let rows = run_batch(&building, &zoning, &parcels, cfg);
    output::print_compliance(&rows, format);
}

fn read_file(path: &Path) -> String {
    match fs::read_to_string(path) {
        Ok(src) => src,
        Err(e) => fail(&format!("{}: {e}", path.display())),
    }
}

fn fail(message: &str) -> ! {
    eprintln!("error: {message}");
    process::exit(1)
}
