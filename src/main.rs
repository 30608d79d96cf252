use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::{debug, info};

use jsinsight::backend::Analysis;
use jsinsight::config::AnalysisConfig;
use jsinsight::ir::index::Index;
use jsinsight::ir::scope::{Resolution, ScopeId};
use jsinsight::ir::transforms::sexpr_printer::{SexprOptions, format_index, format_snapshot};
use jsinsight::logging::init_logger;

#[derive(Parser, Debug)]
#[command(name = "jsinsight", version, about = "Inspect the structure, scopes and completions of a JavaScript file")]
struct Cli {
    /// Log filter, e.g. `debug` or `jsinsight=trace`. Falls back to RUST_LOG.
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[arg(long, global = true)]
    no_color: bool,

    /// Also write a debug log to the platform cache directory.
    #[arg(long, global = true)]
    log_file: bool,

    /// JSON config file; overrides JSINSIGHT_CONFIG.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the indexed AST as an S-expression.
    Index(TreeArgs),
    /// Print the concrete syntax tree snapshot as an S-expression.
    Cst(TreeArgs),
    /// Print the scope tree with bindings, references and unresolved names.
    Scopes {
        file: PathBuf,
    },
    /// Show the completion context and candidates at a 0-based position.
    Complete {
        file: PathBuf,
        row: usize,
        col: usize,
    },
}

#[derive(Args, Debug)]
struct TreeArgs {
    file: PathBuf,

    #[arg(long)]
    compact: bool,

    #[arg(long)]
    max_depth: Option<usize>,

    #[arg(long)]
    max_nodes: Option<usize>,

    #[arg(long)]
    no_spans: bool,
}

impl TreeArgs {
    fn options(&self) -> SexprOptions {
        SexprOptions {
            include_span: !self.no_spans,
            compact: self.compact,
            max_depth: self.max_depth,
            max_nodes: self.max_nodes,
            ..Default::default()
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => AnalysisConfig::load(path)?,
        None => AnalysisConfig::from_env_or_default(),
    };
    let log_level = cli.log_level.as_deref().or(config.log_level.as_deref());
    let _guard = init_logger(cli.no_color, log_level, cli.log_file).context("initializing logger")?;
    debug!("{:?}", cli);

    let output = match &cli.command {
        Command::Index(args) => {
            let analysis = analyse(&args.file, &config)?;
            format_index(analysis.index(), &args.options())
        }
        Command::Cst(args) => {
            let analysis = analyse(&args.file, &config)?;
            format_snapshot(analysis.snapshot(), &args.options())
        }
        Command::Scopes { file } => {
            let analysis = analyse(file, &config)?;
            render_scopes(analysis.index())
        }
        Command::Complete { file, row, col } => {
            let analysis = analyse(file, &config)?;
            render_completion(&analysis, *row, *col)
        }
    };
    println!("{}", output.trim_end());
    Ok(())
}

fn analyse(path: &Path, config: &AnalysisConfig) -> Result<Analysis> {
    let source = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let analysis =
        Analysis::build(&source, 0, config).with_context(|| format!("analysing {}", path.display()))?;
    for diagnostic in analysis.diagnostics() {
        info!("{}: {:?}", path.display(), diagnostic);
    }
    Ok(analysis)
}

fn render_scopes(index: &Index) -> String {
    let mut out = String::new();
    let Some(resolution) = index.resolution() else {
        return out;
    };
    render_scope(index, resolution, resolution.root_scope_id, 0, &mut out);

    if !resolution.unresolved.is_empty() {
        let _ = writeln!(out, "unresolved:");
        for &id in &resolution.unresolved {
            let _ = writeln!(out, "  {} {}", index.text_of(id).unwrap_or_default(), position(index, id));
        }
    }
    out
}

fn render_scope(index: &Index, resolution: &Resolution, id: ScopeId, depth: usize, out: &mut String) {
    let Some(scope) = resolution.scope(id) else {
        return;
    };
    let indent = "  ".repeat(depth);
    let _ = writeln!(out, "{}{} #{} {}..{}", indent, scope.kind.as_str(), scope.id, scope.start, scope.end);
    for &binding_id in scope.bindings.values() {
        let Some(binding) = resolution.binding(binding_id) else {
            continue;
        };
        let references: Vec<String> = binding.references.iter().map(|&r| position(index, r)).collect();
        let _ = writeln!(
            out,
            "{}  {} {} {} -> [{}]",
            indent,
            binding.kind.as_str(),
            binding.name,
            position(index, binding.decl_node_id),
            references.join(", ")
        );
    }
    for &child in &scope.children {
        render_scope(index, resolution, child, depth + 1, out);
    }
}

fn position(index: &Index, id: usize) -> String {
    index
        .node(id)
        .map(|n| format!("{}:{}", n.start_line, n.start_col))
        .unwrap_or_else(|| "?".to_string())
}

fn render_completion(analysis: &Analysis, row: usize, col: usize) -> String {
    let (context, candidates) = analysis.complete_at(row, col, None);
    let mut out = String::new();
    let _ = writeln!(
        out,
        "context: {} base={:?} partial={:?}",
        context.kind.as_str(),
        context.base_expr,
        context.partial_text
    );
    for candidate in candidates {
        let _ = writeln!(out, "{}\t{}\t{}", candidate.label, candidate.kind.as_str(), candidate.detail);
    }
    out
}
