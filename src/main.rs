// Entrypoint for the CLI application.
// - Keeps `main` small: parse arguments, set up logging, hand off to
//   the interactive menu.

use anyhow::Result;
use image_review_cli::api::RepoRef;
use image_review_cli::ui::{self, ReviewTarget};
use tracing_subscriber::EnvFilter;

const HELP: &str = "\
Review and delete image files from a pull request's source branch.

USAGE:
    image-review-cli [owner/repo] [pr-number]

Anything not given on the command line is prompted for interactively.
Set GITHUB_API_URL / GITHUB_RAW_URL to point at a different host.
";

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let mut args = pico_args::Arguments::from_env();
    if args.contains(["-h", "--help"]) {
        print!("{HELP}");
        return Ok(());
    }
    let repo = match args.opt_free_from_str::<String>()? {
        Some(spec) => Some(RepoRef::parse(&spec)?),
        None => None,
    };
    let number = args.opt_free_from_str::<u64>()?;
    let rest = args.finish();
    if !rest.is_empty() {
        anyhow::bail!("unexpected arguments: {:?}", rest);
    }

    ui::main_menu(ReviewTarget { repo, number })
}
