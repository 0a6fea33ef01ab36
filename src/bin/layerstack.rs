use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "layerstack", version)]
struct Cli {
    /// Log debug output to stderr. `RUST_LOG` overrides this when set.
    #[arg(long, short, global = true)]
    verbose: bool,

    /// Ignore group records and attach every layer to the root.
    #[arg(long, global = true)]
    no_groups: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the layer tree with per-leaf visibility.
    Inspect(InspectArgs),
    /// Write the merged composite as an image.
    Preview(PreviewArgs),
    /// Write every leaf layer as its own canvas-sized image.
    Export(ExportArgs),
}

#[derive(Parser, Debug)]
struct InspectArgs {
    /// Input layer manifest JSON.
    #[arg(long = "in")]
    in_path: PathBuf,
}

#[derive(Parser, Debug)]
struct PreviewArgs {
    /// Input layer manifest JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output image path; the extension picks the format.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct ExportArgs {
    /// Input layer manifest JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output directory.
    #[arg(long)]
    out_dir: PathBuf,

    /// Output format extension.
    #[arg(long, default_value = "png")]
    format: String,

    /// Skip layers that are fully hidden behind other layers.
    #[arg(long, default_value_t = false)]
    only_visible: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if cli.verbose { "debug" } else { "warn" }));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let opts = layerstack::LoadOptions {
        load_groups: !cli.no_groups,
    };
    match cli.cmd {
        Command::Inspect(args) => cmd_inspect(args, opts),
        Command::Preview(args) => cmd_preview(args, opts),
        Command::Export(args) => cmd_export(args, opts),
    }
}

fn load(
    path: &std::path::Path,
    opts: layerstack::LoadOptions,
) -> anyhow::Result<layerstack::Document> {
    let (doc, report) = layerstack::load_manifest(path, opts, &mut |p| {
        tracing::debug!(current = p.current, total = p.total, "loaded {}%", p.percent);
    })
    .with_context(|| format!("load '{}'", path.display()))?;
    for w in &report.warnings {
        eprintln!("warning: {w}");
    }
    if !report.discarded.is_empty() {
        eprintln!(
            "note: {} transparency-protected layer(s) left out: {}",
            report.discarded.len(),
            report.discarded.join(", ")
        );
    }
    Ok(doc)
}

fn cmd_inspect(args: InspectArgs, opts: layerstack::LoadOptions) -> anyhow::Result<()> {
    let doc = load(&args.in_path, opts)?;
    let canvas = doc.canvas();
    println!(
        "canvas {}x{} {}-bit {}",
        canvas.width(),
        canvas.height(),
        canvas.bit_depth(),
        canvas.color_space().label()
    );

    let tree = doc.tree();
    let flat_index: HashMap<layerstack::NodeId, usize> = doc
        .leaves()
        .iter()
        .enumerate()
        .map(|(i, &id)| (id, i))
        .collect();

    for (id, depth) in tree.depth_first() {
        let indent = "  ".repeat(depth);
        match (tree.layer(id), flat_index.get(&id)) {
            (Some(layer), Some(&i)) => {
                let b = layer.bounds;
                println!(
                    "{indent}[{i}] {} ({},{} {}x{}) opacity {:.2}{}{}",
                    tree.name(id),
                    b.x,
                    b.y,
                    b.width,
                    b.height,
                    layer.opacity,
                    if layer.shape { " shape" } else { "" },
                    if doc.is_visible(i) { "" } else { " hidden" },
                );
            }
            _ => println!("{indent}{}/", tree.name(id)),
        }
    }
    Ok(())
}

fn cmd_preview(args: PreviewArgs, opts: layerstack::LoadOptions) -> anyhow::Result<()> {
    let doc = load(&args.in_path, opts)?;
    layerstack::write_raster(&args.out, doc.merged())
        .with_context(|| format!("write preview '{}'", args.out.display()))?;
    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_export(args: ExportArgs, opts: layerstack::LoadOptions) -> anyhow::Result<()> {
    let mut doc = load(&args.in_path, opts)?;
    let mut encoder = layerstack::ImageFileEncoder::new(&args.out_dir, &args.format)?;
    let export_opts = layerstack::ExportOptions {
        only_visible: args.only_visible,
    };
    let summary = layerstack::export_layers(&mut doc, &mut encoder, &export_opts, &mut |p| {
        tracing::debug!(current = p.current, total = p.total, "exported {}%", p.percent);
    })?;

    for issue in &summary.skipped {
        eprintln!("skipped: {issue}");
    }
    if !summary.occluded.is_empty() {
        eprintln!("skipped {} fully hidden layer(s)", summary.occluded.len());
    }
    eprintln!(
        "wrote {} file(s) to {}",
        summary.exported.len(),
        args.out_dir.display()
    );
    Ok(())
}
