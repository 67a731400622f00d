mod cli;

use recfg::flat_attributes::FlatAttributes;

fn main() {
    use clap::Parser;
    let cli = cli::Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_env("RECFG_LOG"))
        .with_writer(std::io::stderr)
        .init();

    let command_result = match cli.command {
        cli::Command::Render(render_cli) => render(render_cli),
        cli::Command::Dev(dev_cli) => dev(dev_cli),
    };

    if let Err(e) = command_result {
        for error in e.chain() {
            eprintln!("{error}")
        }
        std::process::exit(1);
    }
}

pub fn render(cli: cli::RenderCommand) -> anyhow::Result<()> {
    let attributes = load(&cli.input)?;

    let name = match (cli.name, &cli.input.file) {
        (Some(name), _) => name,
        (None, Some(path)) => {
            let stem = path
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_default();
            anyhow::ensure!(!stem.is_empty(), "Unable to derive a name from {}", path.display());
            recfg::util::sanitize_name(&stem)
        }
        (None, None) => anyhow::bail!("--name is required when reading from stdin"),
    };

    let resource = recfg::reconstruct::reconstruct(&cli.resource_type, &name, &attributes)?;
    print!("{}", recfg::render::render(&resource));
    Ok(())
}

fn load(input: &cli::InputArgs) -> anyhow::Result<FlatAttributes> {
    match &input.file {
        Some(path) => Ok(FlatAttributes::load_file(path)?),
        None => {
            let stdin = std::io::read_to_string(std::io::stdin())?;
            Ok(FlatAttributes::from_json(&stdin)?)
        }
    }
}

/// (recfg-)developer utilities
///
/// A quick way to expose internal structures for debugging purposes
pub fn dev(cli: cli::DevCommand) -> anyhow::Result<()> {
    use cli::DevSubCommand::*;

    let attributes = load(&cli.input)?;

    match cli.command {
        Attributes => {
            for (key, value) in attributes.sorted() {
                println!("{key} = {value}");
            }
        }
        Tree => {
            let resource = recfg::reconstruct::reconstruct("resource", "state", &attributes)?;
            match cli.output.format {
                cli::OutputFormat::Yaml => serde_yaml::to_writer(std::io::stdout(), &resource)?,
                cli::OutputFormat::Json => {
                    serde_json::to_writer_pretty(std::io::stdout(), &resource)?
                }
            }
        }
    }

    Ok(())
}
