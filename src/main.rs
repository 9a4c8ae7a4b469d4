use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use plot_series::{LocalWorkspace, SeriesConfig, SeriesLoader, WriterSink};

const USAGE: &str = "usage: plot-series <workspace-dir> <series.json> [build-number]";

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let (root, config_path, build_number) = match args.as_slice() {
        [root, config] => (root, config, 0),
        [root, config, build] => {
            let build = build
                .parse::<u32>()
                .with_context(|| format!("invalid build number '{build}'"))?;
            (root, config, build)
        }
        _ => bail!(USAGE),
    };

    let text = std::fs::read_to_string(config_path)
        .with_context(|| format!("reading series config {config_path}"))?;
    let config: SeriesConfig = serde_json::from_str(&text).context("parsing series config")?;
    log::info!(
        "Loading series '{}' ({} filter) from {root}",
        config.file(),
        config.filter_mode()
    );

    let workspace = LocalWorkspace::new(PathBuf::from(root));
    let loader = SeriesLoader::new(config);
    let mut console = WriterSink::new(std::io::stderr());

    let points = loader
        .load_series(&workspace, build_number, &mut console)
        .context("loading series")?;

    println!("{}", serde_json::to_string_pretty(&points)?);
    Ok(())
}
