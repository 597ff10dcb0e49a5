//! Command-line interface for xmlschema-codegen

#[cfg(feature = "cli")]
use clap::{Parser, Subcommand};

#[cfg(feature = "cli")]
use std::fs;
#[cfg(feature = "cli")]
use std::path::PathBuf;

#[cfg(feature = "cli")]
use xmlschema_codegen::{CompiledSchema, Compiler, CompilerOptions};

#[cfg(feature = "cli")]
#[derive(Parser, Debug)]
#[command(name = "xsd-codegen")]
#[command(author, version, about = "XML Schema compiler for code generators", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[cfg(feature = "cli")]
#[derive(Subcommand, Debug)]
enum Commands {
    /// Compile schemas and write the exported model as JSON
    Compile {
        /// Schema files
        #[arg(value_name = "SCHEMA", required = true)]
        schemas: Vec<PathBuf>,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Pretty print the output
        #[arg(short, long)]
        pretty: bool,

        /// Compiler options as JSON
        #[arg(short, long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Additional reserved word
        #[arg(short, long, value_name = "WORD")]
        reserved: Vec<String>,
    },

    /// Print a per-namespace summary of the compiled model
    Inspect {
        /// Schema files
        #[arg(value_name = "SCHEMA", required = true)]
        schemas: Vec<PathBuf>,
    },

    /// Decode an instance document against a schema
    Decode {
        /// Schema files
        #[arg(short, long = "schema", value_name = "SCHEMA", required = true)]
        schemas: Vec<PathBuf>,

        /// Instance document
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Pretty print the output
        #[arg(short, long)]
        pretty: bool,
    },
}

#[cfg(feature = "cli")]
fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Compile {
            schemas,
            output,
            pretty,
            config,
            reserved,
        } => cmd_compile(schemas, output, pretty, config, reserved),
        Commands::Inspect { schemas } => cmd_inspect(schemas),
        Commands::Decode { schemas, file, pretty } => cmd_decode(schemas, file, pretty),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

#[cfg(feature = "cli")]
fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(feature = "cli")]
fn compile(schemas: &[PathBuf], options: CompilerOptions) -> xmlschema_codegen::Result<CompiledSchema> {
    let mut compiler = Compiler::new(options);
    for schema in schemas {
        compiler.add_file(schema)?;
    }
    compiler.compile()
}

#[cfg(feature = "cli")]
fn cmd_compile(
    schemas: Vec<PathBuf>,
    output: Option<PathBuf>,
    pretty: bool,
    config: Option<PathBuf>,
    reserved: Vec<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut options = match config {
        Some(path) => CompilerOptions::from_json(&fs::read_to_string(path)?)?,
        None => CompilerOptions::default(),
    };
    for word in reserved {
        options = options.with_reserved_word(word);
    }

    let schema = compile(&schemas, options)?;
    let json = schema.export().to_json(pretty)?;

    if let Some(output_path) = output {
        fs::write(output_path, &json)?;
    } else {
        println!("{}", json);
    }
    Ok(())
}

#[cfg(feature = "cli")]
fn cmd_inspect(schemas: Vec<PathBuf>) -> Result<(), Box<dyn std::error::Error>> {
    let schema = compile(&schemas, CompilerOptions::default())?;
    let export = schema.export();

    println!("xmlschema-codegen v{}", xmlschema_codegen::VERSION);
    for namespace in &export.namespaces {
        println!();
        println!("Namespace: {}", namespace.namespace.as_deref().unwrap_or("(none)"));
        println!("  Documents: {}", namespace.documents.len());
        if !namespace.imports.is_empty() {
            let imports: Vec<&str> = namespace.imports.iter().map(|i| i.as_deref().unwrap_or("(none)")).collect();
            println!("  Imports: {}", imports.join(", "));
        }

        println!("\n  === Global Elements ===");
        for element in &namespace.elements {
            let type_str = element
                .type_name
                .as_ref()
                .map(|t| t.name.clone())
                .unwrap_or_else(|| "empty".to_string());
            println!("    {} : {}", element.field.xml_name, type_str);
        }

        println!("\n  === Complex Types ===");
        for t in &namespace.types {
            let recursive = if t.recursive { ", recursive" } else { "" };
            println!("    {} ({}{})", t.name, t.content, recursive);
            for attribute in &t.attributes {
                println!("      @{} ({})", attribute.field.field_name, attribute.cardinality);
            }
            for member in &t.members {
                println!("      {} ({})", member.field().field_name, member.cardinality());
            }
        }

        if !namespace.simple_types.is_empty() {
            println!("\n  === Simple Types ===");
            for t in &namespace.simple_types {
                let root = t.primitive.map(|p| p.to_string()).unwrap_or_default();
                println!("    {} ({} of {})", t.name, t.derivation, root);
            }
        }
    }
    Ok(())
}

#[cfg(feature = "cli")]
fn cmd_decode(schemas: Vec<PathBuf>, file: PathBuf, pretty: bool) -> Result<(), Box<dyn std::error::Error>> {
    let schema = compile(&schemas, CompilerOptions::default())?;
    let instance = schema.decode_str(&fs::read_to_string(&file)?)?;

    let json = if pretty {
        serde_json::to_string_pretty(&instance)?
    } else {
        serde_json::to_string(&instance)?
    };
    println!("{}", json);
    Ok(())
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("CLI feature not enabled. Rebuild with --features cli");
    std::process::exit(1);
}
