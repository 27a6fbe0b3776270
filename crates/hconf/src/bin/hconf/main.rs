mod cli;

use anyhow::Context;
use hconf::value::Value;
use std::path::Path;

fn main() {
    use clap::Parser;
    let cli = cli::Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_env("HCONF_LOG"))
        .with_writer(std::io::stderr)
        .init();

    for new_path in cli.directory.iter() {
        match new_path.canonicalize() {
            Err(e) => {
                eprintln!(
                    "Failed to resolve path for -C/--directory {}\n{}",
                    new_path.display(),
                    e
                );
                std::process::exit(1);
            }
            Ok(cwd) => {
                if let Err(err) = std::env::set_current_dir(&cwd) {
                    eprintln!("Failed to set work directory to {}\n{}", cwd.display(), err,);
                    std::process::exit(1);
                }

                tracing::info!(directory=%cwd.display(), "Changed working directory");
            }
        }
    }

    let command_result = match cli.command {
        cli::Command::Show(show_cli) => show(show_cli),
        cli::Command::Get(get_cli) => get(get_cli),
        cli::Command::Set(set_cli) => set(set_cli),
    };

    if let Err(e) = command_result {
        for error in e.chain() {
            eprintln!("{error}")
        }
        std::process::exit(1);
    }
}

pub fn show(cli: cli::ShowCommand) -> anyhow::Result<()> {
    let value = load(&cli.file)?;
    output(&cli.output, &value)
}

pub fn get(cli: cli::GetCommand) -> anyhow::Result<()> {
    let document = load(&cli.file)?;

    let value = document
        .get(hconf::document::SECTION)
        .and_then(|sections| sections.get(&cli.section))
        .with_context(|| format!("unknown section: {}", cli.section))?
        .get(&cli.key)
        .with_context(|| format!("unknown key: {}.{}", cli.section, cli.key))?;

    output(&cli.output, value)
}

pub fn set(cli: cli::SetCommand) -> anyhow::Result<()> {
    let value = assignment(cli.kind, &cli.value)?;
    hconf::edit_and_save(&cli.file, &cli.section, &cli.key, value)?;
    Ok(())
}

fn assignment(kind: cli::ValueKind, value: &str) -> anyhow::Result<hconf::Assignment> {
    use cli::ValueKind;

    Ok(match kind {
        ValueKind::String => value.into(),
        ValueKind::Int => value
            .parse::<i64>()
            .with_context(|| format!("not an integer: {value}"))?
            .into(),
        ValueKind::Bool => value
            .parse::<bool>()
            .with_context(|| format!("not a bool: {value}"))?
            .into(),
        ValueKind::List => serde_json::from_str::<Vec<String>>(value)
            .with_context(|| format!("not a list of strings: {value}"))?
            .into(),
    })
}

fn load(path: &Path) -> anyhow::Result<Value> {
    let data = std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let document = hconf::Document::from_bytes(&data, Some(path))?;
    Ok(Value::from_document(&document)?)
}

fn output(output: &cli::OutputArgs, value: &Value) -> anyhow::Result<()> {
    match output.format {
        cli::OutputFormat::Yaml => serde_yaml::to_writer(std::io::stdout(), value)?,
        cli::OutputFormat::Json => serde_json::to_writer_pretty(std::io::stdout(), value)?,
    };

    Ok(())
}
