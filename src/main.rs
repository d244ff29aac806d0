use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use serde::Serialize;

use flowstate::config::Config;
use flowstate::service::load_definition_file;
use flowstate::{
    flog, flog_error, Error, ErrorKind, ExecuteActionInput, Result, StartInstanceInput,
    WorkflowService,
};

/// flowstate - validate workflow definitions and replay transitions
#[derive(Parser, Debug)]
#[command(name = "flowstate")]
#[command(version, about, long_about = None)]
#[command(after_help = "ENVIRONMENT:\n    FLOWSTATE_DEBUG=1     Enable debug logging (alternative to --debug)")]
pub struct Cli {
    /// Enable debug logging
    #[arg(short = 'd', long, global = true)]
    pub debug: bool,

    /// Config file (defaults to ~/.flowstate/flowstate.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Check definition files (.json or .toml) without running them
    Validate {
        /// Definition files; ids must be unique across all of them
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Start an instance of a definition and apply actions in order
    Run {
        /// Definition file (.json or .toml)
        file: PathBuf,

        /// Instance id (generated if omitted)
        #[arg(long)]
        instance_id: Option<String>,

        /// Action to execute; repeat for a sequence
        #[arg(short = 'a', long = "action")]
        actions: Vec<String>,
    },

    /// List definitions found in the configured definitions directory
    List,
}

#[derive(Serialize)]
struct Failure<'a> {
    kind: ErrorKind,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    action_id: Option<&'a str>,
}

impl<'a> Failure<'a> {
    fn new(err: &Error, action_id: Option<&'a str>) -> Self {
        Self {
            kind: err.kind(),
            message: err.to_string(),
            action_id,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    flowstate::log::init(config.log_sink()?, cli.debug || config.debug);
    flog!("flowstate {:?}", cli.command);

    let ok = match cli.command {
        Command::Validate { files } => run_validate(&files),
        Command::Run {
            file,
            instance_id,
            actions,
        } => run_replay(&file, instance_id, &actions)?,
        Command::List => run_list(&config)?,
    };

    if !ok {
        std::process::exit(1);
    }
    Ok(())
}

fn run_validate(files: &[PathBuf]) -> bool {
    let service = WorkflowService::new();
    let mut ok = true;
    for file in files {
        match load_definition_file(file).and_then(|input| service.register_definition(input)) {
            Ok(def) => println!(
                "ok    {}  {} ({} states, {} actions)",
                file.display(),
                def.id,
                def.states().count(),
                def.actions().count()
            ),
            Err(e) => {
                ok = false;
                flog_error!("{}: {}", file.display(), e);
                println!("error {}  [{}] {}", file.display(), e.kind(), e);
            }
        }
    }
    ok
}

fn run_replay(file: &Path, instance_id: Option<String>, actions: &[String]) -> Result<bool> {
    let service = WorkflowService::new();
    let definition = match load_definition_file(file).and_then(|i| service.register_definition(i))
    {
        Ok(def) => def,
        Err(e) => {
            print_json(&Failure::new(&e, None))?;
            return Ok(false);
        }
    };

    let instance = service.start_instance(StartInstanceInput {
        definition_id: definition.id.clone(),
        instance_id,
    });
    let instance = match instance {
        Ok(instance) => instance,
        Err(e) => {
            print_json(&Failure::new(&e, None))?;
            return Ok(false);
        }
    };
    let id = instance.id().to_string();
    print_json(&service.get_instance(&id)?)?;

    for action in actions {
        let result = service.execute_action(ExecuteActionInput {
            instance_id: id.clone(),
            action_id: action.clone(),
        });
        match result {
            Ok(summary) => print_json(&summary)?,
            Err(e) => {
                print_json(&Failure::new(&e, Some(action.as_str())))?;
                return Ok(false);
            }
        }
    }
    Ok(true)
}

fn run_list(config: &Config) -> Result<bool> {
    let Some(dir) = config.definitions_dir() else {
        println!("No definitions_dir configured");
        return Ok(true);
    };

    let service = WorkflowService::new();
    let report = service.load_dir(&dir)?;
    for def in service.list_definitions() {
        println!(
            "{:<24} {:<32} {} states, {} actions",
            def.id,
            def.name,
            def.states().count(),
            def.actions().count()
        );
    }
    for (path, e) in &report.failed {
        println!("error {}  [{}] {}", path, e.kind(), e);
    }
    Ok(report.failed.is_empty())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
