// src/cli.rs
use std::env;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use crate::browser::Session;
use crate::config::consts::TREE_MARKER;
use crate::config::options::ScrapeOptions;
use crate::progress::Progress;
use crate::sink::JsonDirSink;
use crate::tree::live::LiveTree;
use crate::tree::traverse::Traverser;

pub fn run() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let mut opts = ScrapeOptions::default();
    parse_cli(&mut opts)?;

    let session = Session::launch(&opts).context("could not start browser")?;
    session
        .open(&opts.url, TREE_MARKER)
        .with_context(|| format!("could not open {}", opts.url))?;

    let mut driver = LiveTree::new(&session, &opts);
    let mut sink = JsonDirSink::new(opts.out_dir.clone());
    let mut progress = CliProgress::default();

    let mut traverser = Traverser::new(&mut driver, &mut sink, &opts, Some(&mut progress));
    let outcome = traverser.run();
    let (visited, failed) = (traverser.visited(), traverser.failed());

    match outcome {
        Ok(_) => {
            println!("Done. {} nodes visited, {} failed.", visited, failed);
            println!("Output in {}", opts.out_dir.display());
            Ok(())
        }
        // Partial results are already on disk at this point.
        Err(e) => Err(e).with_context(|| {
            format!(
                "run aborted after {} nodes ({} failed); partial snapshot saved to {}",
                visited,
                failed,
                opts.out_dir.display()
            )
        }),
    }
}

fn parse_cli(opts: &mut ScrapeOptions) -> anyhow::Result<()> {
    let mut args = env::args().skip(1);
    while let Some(a) = args.next() {
        match a.as_str() {
            "--url" => opts.url = args.next().context("Missing value for --url")?,
            "--root" => opts.root_label = args.next().context("Missing value for --root")?,
            "--visible" => opts.headless = false,
            "-o" | "--out" => {
                opts.out_dir = PathBuf::from(args.next().context("Missing output path")?)
            }
            "--settle-ms" => opts.settle_timeout = millis(&mut args, "--settle-ms")?,
            "--grace-ms" => opts.grace = millis(&mut args, "--grace-ms")?,
            "--deadline-ms" => opts.node_deadline = millis(&mut args, "--deadline-ms")?,
            "--attempts" => {
                let v: u32 = args
                    .next()
                    .context("Missing value for --attempts")?
                    .parse()
                    .context("Invalid value for --attempts")?;
                if v == 0 {
                    anyhow::bail!("--attempts must be at least 1");
                }
                opts.attempts = v;
            }
            "--max-depth" => {
                opts.max_depth = args
                    .next()
                    .context("Missing value for --max-depth")?
                    .parse()
                    .context("Invalid value for --max-depth")?;
            }
            "-h" | "--help" => {
                eprintln!(include_str!("cli_help.txt"));
                std::process::exit(0);
            }
            _ => anyhow::bail!("Unknown arg: {}", a),
        }
    }
    Ok(())
}

fn millis(args: &mut impl Iterator<Item = String>, flag: &str) -> anyhow::Result<Duration> {
    let v: u64 = args
        .next()
        .with_context(|| format!("Missing value for {}", flag))?
        .parse()
        .with_context(|| format!("Invalid value for {}", flag))?;
    Ok(Duration::from_millis(v))
}

/// Plain line-per-node console reporting.
#[derive(Default)]
struct CliProgress {
    done: usize,
}

impl Progress for CliProgress {
    fn log(&mut self, msg: &str) {
        println!("{}", msg);
    }

    fn node_done(&mut self, label_path: &str) {
        self.done += 1;
        println!("  [{}] finished {}", self.done, label_path);
    }
}
