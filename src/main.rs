use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};

use gomod_exporter::analyzer::Analyzer;
use gomod_exporter::checkout::GitCheckout;
use gomod_exporter::config::{Config, GitAuth, LogConfig, ProjectConfig};
use gomod_exporter::logging;
use gomod_exporter::metrics::push::PushGateway;
use gomod_exporter::metrics::registry::GaugeRegistry;
use gomod_exporter::metrics::server;
use gomod_exporter::module::query::GoListQuery;
use gomod_exporter::pusher::{self, Destination};

#[derive(Parser)]
#[command(name = "gomod-exporter")]
#[command(version, about = "Reports how far behind the Go module dependencies of git projects are")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Analyze configured projects periodically and serve metrics over http
    Serve {
        /// Configuration file path
        #[arg(long)]
        config: PathBuf,
    },
    /// Analyze a single project once and push metrics to a push gateway
    Push(PushArgs),
}

#[derive(Args)]
struct PushArgs {
    /// Push gateway url
    #[arg(long, required_unless_present = "fake")]
    pushgw_url: Option<String>,

    /// Skip SSL verify
    #[arg(long)]
    pushgw_unsecure: bool,

    /// Write metrics to stdout instead of pushing them
    #[arg(long)]
    fake: bool,

    /// Name seen by prometheus as job_name
    #[arg(long, default_value = "gomod")]
    metric_job_name: String,

    /// Metric prefix namespace
    #[arg(long, default_value = "gomod")]
    metric_namespace: String,

    /// Git target project to analyze
    #[arg(long)]
    project_url: String,

    /// Username for git authentication
    #[arg(long, requires = "project_password")]
    project_user: Option<String>,

    /// Password for git authentication
    #[arg(long, requires = "project_user")]
    project_password: Option<String>,

    /// Go binary used to list modules
    #[arg(long, default_value = "go")]
    go_binary: String,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Log in JSON
    #[arg(long)]
    log_json: bool,

    /// Disable log coloring
    #[arg(long)]
    log_no_color: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    match cli.command {
        Command::Serve { config } => runtime.block_on(serve(config)),
        Command::Push(args) => runtime.block_on(push(args)),
    }
}

async fn serve(config_path: PathBuf) -> anyhow::Result<()> {
    let config = Config::load(&config_path)
        .with_context(|| format!("invalid configuration {:?}", config_path))?;
    let _guard = logging::init(&config.log)?;
    let interval = config.exporter.interval()?;

    let registry = Arc::new(GaugeRegistry::new(&config.exporter.namespace));
    let analyzer = Analyzer::new(
        config.projects.clone(),
        Arc::new(GitCheckout),
        Arc::new(GoListQuery::new(&config.exporter.go_binary)),
        registry.clone(),
    );
    let analysis = tokio::spawn(async move { analyzer.run_forever(interval).await });

    let router = server::router(registry, &config.exporter.path);
    server::serve_alongside(&config.web.listen_addr(), config.web.tls(), router, analysis).await?;
    Ok(())
}

async fn push(args: PushArgs) -> anyhow::Result<()> {
    let _guard = logging::init(&LogConfig {
        level: args.log_level.clone(),
        json: args.log_json,
        no_color: args.log_no_color,
    })?;

    let project = ProjectConfig {
        url: args.project_url.clone(),
        auth: args
            .project_user
            .zip(args.project_password)
            .map(|(username, password)| GitAuth { username, password }),
    };

    let registry = Arc::new(GaugeRegistry::new(&args.metric_namespace));
    let analyzer = Analyzer::new(
        vec![project.clone()],
        Arc::new(GitCheckout),
        Arc::new(GoListQuery::new(&args.go_binary)),
        registry.clone(),
    );

    let mut stdout = std::io::stdout().lock();
    let destination = if args.fake {
        Destination::Writer(&mut stdout)
    } else {
        let url = args
            .pushgw_url
            .as_deref()
            .context("--pushgw-url is required")?;
        Destination::Gateway(PushGateway::new(
            url,
            &args.metric_job_name,
            args.pushgw_unsecure,
        )?)
    };

    pusher::push_project(&analyzer, &registry, &project, destination)
        .await
        .context("unable to push data to gateway")?;
    Ok(())
}
