use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tower_lsp::{LspService, Server};

use phpantom_annotations::Backend;
use phpantom_annotations::check::run_check;
use phpantom_annotations::logging::init_logging;

/// Reports PHP annotation tags whose class is not imported.
///
/// Without `--check` it speaks the Language Server Protocol over stdio.
#[derive(Parser, Debug)]
#[command(name = "phpantom-annotations", version)]
struct Args {
    /// Log filter (e.g. `debug`, `phpantom_annotations=trace`).  The
    /// PHPANTOM_LOG environment variable takes precedence.
    #[arg(long)]
    log_level: Option<String>,

    /// Workspace root used for indexing and configuration in check mode.
    #[arg(long, default_value = ".")]
    workspace: PathBuf,

    /// Inspect these files or directories once and exit.
    #[arg(long, num_args = 1..)]
    check: Vec<PathBuf>,

    /// With --check, add the import for every tag with a single candidate.
    #[arg(long, requires = "check")]
    fix: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.log_level.as_deref());

    if !args.check.is_empty() {
        return check(args).await;
    }

    let (service, socket) = LspService::new(Backend::new);
    Server::new(tokio::io::stdin(), tokio::io::stdout(), socket)
        .serve(service)
        .await;
    ExitCode::SUCCESS
}

async fn check(args: Args) -> ExitCode {
    let outcome = tokio::task::spawn_blocking(move || {
        run_check(&args.workspace, &args.check, args.fix)
    })
    .await;

    match outcome {
        Ok(Ok(report)) => {
            for problem in &report.problems {
                println!("{}", problem);
            }
            if report.fixed > 0 {
                eprintln!("Added {} import(s)", report.fixed);
            }
            if report.problems.is_empty() {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(1)
            }
        }
        Ok(Err(err)) => {
            tracing::error!("{}", err);
            ExitCode::from(2)
        }
        Err(err) => {
            tracing::error!("check task failed: {}", err);
            ExitCode::from(2)
        }
    }
}
