//! IsisCB JSON-LD CLI
//!
//! Command-line tool for converting IsisCB CSV exports, or single
//! micro-format fields, into JSON-LD.

use std::fs;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use serde_json::Value;
use tracing::info;
use tracing_subscriber::EnvFilter;

use isiscb_jsonld::{
    read_rows_from_path, to_json_string, AttributesConverter, ConvertError, ConvertOptions,
    ConverterConfig, EntityType, FieldConverter, LinkedDataConverter, MappingTables,
    RecordConverter, RelatedAuthoritiesConverter, RelatedCitationsConverter,
};

#[derive(Parser)]
#[command(name = "isiscb-jsonld")]
#[command(about = "Convert IsisCB citation and authority records to JSON-LD")]
#[command(version)]
struct Cli {
    /// Log debug output (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a CSV export into a JSON array of documents
    Convert(ConvertArgs),
    /// Convert a single micro-format field value
    Field(FieldArgs),
}

#[derive(Args)]
struct ConfigArgs {
    /// TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Base URL for record URIs (overrides the configuration file)
    #[arg(long)]
    base_url: Option<String>,

    /// Pretty-print JSON output
    #[arg(long)]
    pretty: bool,
}

#[derive(Args)]
struct ConvertArgs {
    /// Path to the CSV export
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Record type of the rows; `auto` decides per row from the record id
    #[arg(long, value_enum, default_value_t = KindArg::Auto)]
    kind: KindArg,

    #[command(flatten)]
    config: ConfigArgs,
}

#[derive(Args)]
struct FieldArgs {
    /// Raw field value
    value: String,

    /// Which field the value comes from
    #[arg(long, value_enum)]
    field: FieldArg,

    /// Identifier of the owning record, used in log lines
    #[arg(long, default_value = "CBB000000000")]
    record_id: String,

    #[command(flatten)]
    config: ConfigArgs,
}

#[derive(Clone, Copy, ValueEnum)]
enum KindArg {
    Auto,
    Citation,
    Authority,
}

#[derive(Clone, Copy, ValueEnum)]
enum FieldArg {
    /// Related Authorities of a citation
    CitationAuthorities,
    /// Related Authorities of an authority
    AuthorityAuthorities,
    /// Related Citations of a citation
    RelatedCitations,
    Attributes,
    LinkedData,
}

fn init_tracing(verbose: bool) {
    let default_directive = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| default_directive.into()),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Load configuration from file and apply command-line overrides
fn load_config(args: &ConfigArgs) -> Result<ConverterConfig, ConvertError> {
    let mut config = match &args.config {
        Some(path) => ConverterConfig::from_toml_file(path)?,
        None => ConverterConfig::default(),
    };
    if let Some(base_url) = &args.base_url {
        config.base_url = base_url.clone();
        config.validate()?;
    }
    Ok(config)
}

/// Write output to file or stdout
fn write_output(content: &str, output: Option<&PathBuf>) -> Result<(), ConvertError> {
    match output {
        Some(path) => {
            fs::write(path, content)?;
            info!("Wrote JSON-LD to {}", path.display());
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}

fn run_convert(args: ConvertArgs) -> Result<(), ConvertError> {
    let config = load_config(&args.config)?;
    let rows = read_rows_from_path(&args.input)?;
    info!("Read {} rows from {}", rows.len(), args.input.display());

    let entity_type = match args.kind {
        KindArg::Auto => None,
        KindArg::Citation => Some(EntityType::Citation),
        KindArg::Authority => Some(EntityType::Authority),
    };
    let converter = RecordConverter::new(config, MappingTables::standard())
        .with_options(ConvertOptions { entity_type });
    let result = converter.convert_rows(&rows);

    info!(
        "Converted {} of {} records ({} skipped)",
        result.stats.converted, result.stats.total, result.stats.failed
    );

    let output = to_json_string(&result.documents, args.config.pretty)?;
    write_output(&output, args.output.as_ref())
}

fn run_field(args: FieldArgs) -> Result<(), ConvertError> {
    let config = load_config(&args.config)?;
    let tables = MappingTables::standard();

    let converter: Box<dyn FieldConverter + '_> = match args.field {
        FieldArg::CitationAuthorities => {
            Box::new(RelatedAuthoritiesConverter::for_citations(&config, &tables))
        }
        FieldArg::AuthorityAuthorities => {
            Box::new(RelatedAuthoritiesConverter::for_authorities(&config, &tables))
        }
        FieldArg::RelatedCitations => Box::new(RelatedCitationsConverter::new(&config, &tables)),
        FieldArg::Attributes => Box::new(AttributesConverter::new(&config, &tables)),
        FieldArg::LinkedData => Box::new(LinkedDataConverter::new(&config, &tables)),
    };

    let fragment = Value::Object(converter.convert(Some(&args.value), &args.record_id));
    let output = if args.config.pretty {
        serde_json::to_string_pretty(&fragment)?
    } else {
        serde_json::to_string(&fragment)?
    };
    write_output(&output, None)
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Convert(args) => run_convert(args),
        Commands::Field(args) => run_field(args),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
