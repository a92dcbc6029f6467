mod cli;

use cfgmap::file::FileConfig;
use cfgmap::registry::ParserRegistry;
use cfgmap::tree::ConfigTree;
use cfgmap::value::Value;
use std::rc::Rc;

fn main() {
    use clap::Parser;
    let cli = cli::Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_env("CFGMAP_LOG"))
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
                    eprintln!("Failed to set work directory to {}\n{}", cwd.display(), err);
                    std::process::exit(1);
                }

                tracing::info!(directory=%cwd.display(), "Changed working directory");
            }
        }
    }

    let registry = Rc::new(ParserRegistry::with_defaults());
    let command_result = match cli.command {
        cli::Command::Get(get_cli) => get(get_cli, registry),
        cli::Command::Set(set_cli) => set(set_cli, registry),
        cli::Command::Keys(keys_cli) => keys(keys_cli, registry),
        cli::Command::Dev(dev_cli) => dev(dev_cli, registry),
    };

    if let Err(e) = command_result {
        for error in e.chain() {
            eprintln!("{error}")
        }
        std::process::exit(1);
    }
}

pub fn get(cli: cli::GetCommand, registry: Rc<ParserRegistry>) -> anyhow::Result<()> {
    let config = load(&cli.input, registry)?;

    let Some(value) = config.get(&cli.path) else {
        anyhow::bail!("Nothing stored at {}", cli.path);
    };

    output(&cli.output, &value)
}

pub fn set(cli: cli::SetCommand, registry: Rc<ParserRegistry>) -> anyhow::Result<()> {
    let value = Value::from_yaml_str(&cli.value)?;

    let mut config = match &cli.input.file {
        Some(file) if !file.exists() => FileConfig::new(registry).with_file(file),
        _ => load(&cli.input, registry)?,
    };
    config.set_value(&cli.path, value)?;

    if config.file().is_some() {
        config.save()?;
        return Ok(());
    }

    output(&cli.output, &config.to_value())
}

pub fn keys(cli: cli::KeysCommand, registry: Rc<ParserRegistry>) -> anyhow::Result<()> {
    let config = load(&cli.input, registry)?;

    let tree: &ConfigTree = match &cli.path {
        Some(path) => config
            .section(path)
            .ok_or_else(|| anyhow::anyhow!("No section at {path}"))?,
        None => &config,
    };

    for key in tree.keys(cli.deep) {
        println!("{key}");
    }

    Ok(())
}

fn load(input: &cli::InputArgs, registry: Rc<ParserRegistry>) -> anyhow::Result<FileConfig> {
    match &input.file {
        Some(file) => Ok(FileConfig::open(file, registry)?),
        None => Ok(FileConfig::from_reader(std::io::stdin(), registry)?),
    }
}

fn output(output: &cli::OutputArgs, value: &Value) -> anyhow::Result<()> {
    match output.format {
        cli::OutputFormat::Yaml => serde_yaml::to_writer(std::io::stdout(), value)?,
        cli::OutputFormat::Json => serde_json::to_writer_pretty(std::io::stdout(), value)?,
    };

    Ok(())
}

/// (cfgmap-)developer utilities
///
/// A quick way to expose internal structures for debugging purposes
pub fn dev(cli: cli::DevCommand, registry: Rc<ParserRegistry>) -> anyhow::Result<()> {
    use cli::DevSubCommand::*;

    match cli.command {
        Parsers => println!("{registry:#?}"),
        Tree(input) => {
            let config = load(&input, registry)?;
            println!("{:#?}", *config);
        }
    }

    Ok(())
}
