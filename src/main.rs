//! tars2rs: compile TARS IDL files into Rust sources.

use std::fs::OpenOptions;
use std::io::{self, IsTerminal};
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{
    EnvFilter,
    fmt::{self, writer::BoxMakeWriter},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

use tars_idl::config::{CompilerConfig, LogFormat, LoggingConfig};
use tars_idl::idl::FsSource;
use tars_idl::model::{Compilation, Compiler};
use tars_idl::emit_compilation;

#[derive(Parser)]
#[command(name = "tars2rs")]
#[command(about = "Compile TARS IDL files into Rust structs, enums, proxies and dispatchers")]
struct Cli {
    /// Configuration file (TOML)
    #[arg(short, long, global = true, env = "TARS2RS_CONFIG")]
    config: Option<PathBuf>,

    /// Log filter directive, e.g. "debug" or "tars_idl=trace"
    #[arg(long, global = true, env = "TARS2RS_LOG")]
    log_level: Option<String>,

    /// Log output format
    #[arg(long, global = true, value_enum)]
    log_format: Option<LogFormat>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct InputArgs {
    /// IDL files to compile
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Extra include directory (repeatable)
    #[arg(short = 'I', long = "include")]
    include_dirs: Vec<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate Rust sources
    Gen {
        #[command(flatten)]
        input: InputArgs,

        /// Output directory
        #[arg(short, long)]
        out_dir: Option<PathBuf>,

        /// Capitalize module file names
        #[arg(long)]
        module_upper: bool,

        /// Skip serializing members holding their default value
        #[arg(long)]
        json_omit_empty: bool,

        /// Generate client proxies only
        #[arg(long)]
        no_servant: bool,

        /// Path of the runtime crate used by generated code
        #[arg(long)]
        runtime_crate: Option<String>,

        /// Print what would be written without touching the filesystem
        #[arg(long)]
        dry_run: bool,
    },

    /// Parse and resolve without generating anything
    Check {
        #[command(flatten)]
        input: InputArgs,
    },

    /// Print the resolved semantic model as JSON
    Dump {
        #[command(flatten)]
        input: InputArgs,

        /// Only dump this module
        #[arg(long)]
        module: Option<String>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => CompilerConfig::from_file(path)?,
        None => CompilerConfig::default(),
    };
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }
    if let Some(format) = cli.log_format {
        config.logging.format = format;
    }
    init_logging(&config.logging)?;

    match cli.command {
        Commands::Gen {
            input,
            out_dir,
            module_upper,
            json_omit_empty,
            no_servant,
            runtime_crate,
            dry_run,
        } => {
            let generator = &mut config.generator;
            if let Some(dir) = out_dir {
                generator.out_dir = dir;
            }
            generator.module_upper |= module_upper;
            generator.json_omit_empty |= json_omit_empty;
            if no_servant {
                generator.add_servant = false;
            }
            if let Some(rt) = runtime_crate {
                generator.runtime_crate = rt;
            }

            let compilation = compile(&input, &config)?;
            let files = emit_compilation(&compilation, &config.generator.emit_options())?;
            let out_dir = &config.generator.out_dir;
            if !dry_run {
                std::fs::create_dir_all(out_dir)
                    .with_context(|| format!("creating {}", out_dir.display()))?;
            }
            for file in &files {
                let target = out_dir.join(&file.path);
                if dry_run {
                    println!("{} ({} bytes)", target.display(), file.contents.len());
                    continue;
                }
                std::fs::write(&target, &file.contents)
                    .with_context(|| format!("writing {}", target.display()))?;
                tracing::info!(path = %target.display(), "generated");
            }
            if !dry_run {
                println!("Generated {} files in {}", files.len(), out_dir.display());
            }
            Ok(())
        }
        Commands::Check { input } => {
            let compilation = compile(&input, &config)?;
            for module in compilation.schema.modules.values() {
                println!(
                    "{}: {} structs, {} enums, {} consts, {} interfaces",
                    module.name,
                    module.structs.len(),
                    module.enums.len(),
                    module.consts.len(),
                    module.interfaces.len()
                );
            }
            Ok(())
        }
        Commands::Dump { input, module } => {
            let compilation = compile(&input, &config)?;
            let json = match module {
                Some(name) => {
                    let info = compilation
                        .schema
                        .module(&name)
                        .with_context(|| format!("module '{name}' not found"))?;
                    serde_json::to_string_pretty(info)?
                }
                None => serde_json::to_string_pretty(&compilation.schema)?,
            };
            println!("{json}");
            Ok(())
        }
    }
}

fn compile(input: &InputArgs, config: &CompilerConfig) -> anyhow::Result<Compilation> {
    let include_dirs = config
        .generator
        .include_dirs
        .iter()
        .chain(&input.include_dirs)
        .cloned();
    let compiler = Compiler::new(FsSource::with_include_dirs(include_dirs));
    let roots: Vec<String> = input
        .files
        .iter()
        .map(|p| p.to_string_lossy().into_owned())
        .collect();
    let roots: Vec<&str> = roots.iter().map(String::as_str).collect();
    Ok(compiler.compile_all(&roots)?)
}

fn init_logging(config: &LoggingConfig) -> anyhow::Result<()> {
    let filter = EnvFilter::try_new(&config.level)
        .with_context(|| format!("invalid log filter '{}'", config.level))?;

    let (writer, terminal) = match config.output.as_str() {
        "stdout" => (BoxMakeWriter::new(io::stdout), io::stdout().is_terminal()),
        "stderr" => (BoxMakeWriter::new(io::stderr), io::stderr().is_terminal()),
        path => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("opening log file '{path}'"))?;
            (BoxMakeWriter::new(Mutex::new(file)), false)
        }
    };
    let ansi = config.color && terminal;
    let registry = tracing_subscriber::registry().with(filter);

    let layer = fmt::layer().with_target(config.target).with_writer(writer);
    let result = match (config.format, config.timestamps) {
        (LogFormat::Text, true) => registry.with(layer.with_ansi(ansi)).try_init(),
        (LogFormat::Text, false) => registry
            .with(layer.with_ansi(ansi).without_time())
            .try_init(),
        (LogFormat::Json, true) => registry.with(layer.json()).try_init(),
        (LogFormat::Json, false) => registry.with(layer.json().without_time()).try_init(),
    };
    result.context("installing log subscriber")
}
