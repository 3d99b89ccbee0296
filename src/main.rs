use std::{
    fs::File,
    io::{self, BufReader, Write},
    path::{Path, PathBuf},
};

use serde::Serialize;
use structopt::StructOpt;
use thiserror::Error;
use tracing::info;
use tracing_subscriber::EnvFilter;

use wsdlproxy_compiler::{
    self as compiler,
    directive::{self, SystemMode},
    CompileRequest, ServiceDescriptor,
};
use wsdlproxy_wsdl::{self as wsdl, Wsdl};

mod config;

#[derive(Debug, Error)]
enum Error {
    #[error("Error loading WSDL")]
    LoadError(#[from] wsdl::error::Error),

    #[error("Error compiling service model")]
    CompileError(#[from] compiler::error::Error),

    #[error("Error reading settings")]
    SettingsError(#[from] toml::de::Error),

    #[error("Error reading or writing JSON")]
    JsonError(#[from] serde_json::Error),

    #[error("No service name given, pass --service or set it in the settings file")]
    MissingService,

    #[error("Error")]
    IoError(#[from] io::Error),
}

#[derive(StructOpt)]
#[structopt(about = "Compiles WSDL services into host object models")]
enum Args {
    /// Load a WSDL and print its object graph as JSON
    Load {
        #[structopt(short, long, parse(from_os_str))]
        output: Option<PathBuf>,

        /// URL or local path of the WSDL
        input: String,
    },

    /// Compile enabled operations into a service descriptor
    Model {
        #[structopt(short, long)]
        service: Option<String>,

        /// Operation to enable, may be repeated
        #[structopt(long = "operation")]
        operations: Vec<String>,

        /// Enable every operation the WSDL declares
        #[structopt(long)]
        all: bool,

        /// TOML settings file
        #[structopt(short, long, parse(from_os_str))]
        config: Option<PathBuf>,

        #[structopt(short, long, parse(from_os_str))]
        output: Option<PathBuf>,

        /// WSDL URL or path, or a graph previously written by `load` (*.json)
        input: String,
    },

    /// Turn a service descriptor into provisioning directives
    Directives {
        /// Create the external system instead of updating it
        #[structopt(long)]
        create: bool,

        #[structopt(short, long, parse(from_os_str))]
        output: Option<PathBuf>,

        #[structopt(parse(from_os_str))]
        input: PathBuf,
    },
}

fn load_graph(input: &str) -> Result<Wsdl, Error> {
    if input.ends_with(".json") {
        let file = File::open(input)?;
        return Ok(serde_json::from_reader(BufReader::new(file))?);
    }

    Ok(wsdl::parse(input)?)
}

fn write_json<T: Serialize>(output: Option<&Path>, value: &T) -> Result<(), Error> {
    match output {
        Some(path) => {
            let file = File::create(path)?;
            serde_json::to_writer_pretty(file, value)?;
            info!(path = %path.display(), "wrote output");
        }

        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            serde_json::to_writer_pretty(&mut handle, value)?;
            writeln!(handle)?;
        }
    }

    Ok(())
}

#[paw::main]
fn main(args: Args) -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    match args {
        Args::Load { output, input } => {
            let graph = load_graph(&input)?;
            info!(
                types = graph.types.len(),
                operations = graph.operations.len(),
                "loaded WSDL"
            );

            write_json(output.as_deref(), &graph)
        }

        Args::Model {
            service,
            operations,
            all,
            config: settings_path,
            output,
            input,
        } => {
            let settings = config::Settings::load(settings_path.as_deref())?;
            let graph = load_graph(&input)?;

            let service = service.or(settings.service).ok_or(Error::MissingService)?;
            let operations = if all {
                graph.operations.keys().cloned().collect()
            } else if !operations.is_empty() {
                operations
            } else {
                settings.operations
            };

            let request = CompileRequest::new(service, operations)
                .with_reserved_names(settings.reserved_names)
                .with_config(settings.proxy);

            let descriptor = compiler::compile(&graph, &request)?;
            write_json(output.as_deref(), &descriptor)
        }

        Args::Directives {
            create,
            output,
            input,
        } => {
            let file = File::open(&input)?;
            let descriptor: ServiceDescriptor = serde_json::from_reader(BufReader::new(file))?;

            let mode = if create {
                SystemMode::Create
            } else {
                SystemMode::Update
            };

            let directives = directive::build(&descriptor, mode)?;
            info!(count = directives.len(), "built directives");

            write_json(output.as_deref(), &directives)
        }
    }
}
