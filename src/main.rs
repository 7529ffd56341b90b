use std::env;
use std::path::PathBuf;

use clap::Parser;
use log::{info, LevelFilter};

use simplec::config::{find_go_toolchain, Config};
use simplec::driver::{self, Driver, Mode, Outcome};
use simplec::errors::{Diagnostic, SourceFile};
use simplec::{compile, Options};

#[derive(Parser)]
#[command(name = "simplec")]
#[command(about = "Translate .simple scripts to Go and run or build them")]
#[command(version)]
struct Cli {
    /// Input .simple file
    #[arg(value_name = "FILE")]
    input: PathBuf,

    /// Convert to a .go file only (does not run)
    #[arg(long, conflicts_with = "build")]
    src: bool,

    /// Compile to a standalone executable
    #[arg(long)]
    build: bool,

    /// Executable name for --build
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Skip unknown statements with a warning instead of failing
    #[arg(long)]
    lenient: bool,

    /// Go toolchain to use (default: $SIMPLEC_GO, config go_path, then `go`)
    #[arg(long, value_name = "PATH")]
    go: Option<PathBuf>,

    /// Log driver steps
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn mode(&self) -> Mode {
        if self.src {
            Mode::Src
        } else if self.build {
            Mode::Build
        } else {
            Mode::Run
        }
    }
}

/// Accept the single-dash `-src` and `-build` spellings as well.
fn normalize_args(args: impl Iterator<Item = String>) -> Vec<String> {
    args.map(|arg| match arg.as_str() {
        "-src" => "--src".to_string(),
        "-build" => "--build".to_string(),
        _ => arg,
    })
    .collect()
}

fn main() {
    let cli = Cli::parse_from(normalize_args(env::args()));

    let default_level = if cli.verbose { LevelFilter::Info } else { LevelFilter::Warn };
    env_logger::Builder::new()
        .filter_level(default_level)
        .parse_default_env()
        .format_timestamp(None)
        .init();

    let config = Config::load();
    let options = Options {
        strict: !(cli.lenient || config.lenient.unwrap_or(false)),
    };

    let source = match driver::read_source(&cli.input) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    info!("translating {}", cli.input.display());
    let generated = match compile(&source, &options) {
        Ok(go) => go,
        Err(e) => {
            let file = SourceFile::new(&cli.input.to_string_lossy(), &source);
            eprint!("{}", Diagnostic::new(&e, &file));
            std::process::exit(1);
        }
    };

    let go = find_go_toolchain(cli.go.as_deref(), &config);
    info!("using Go toolchain {}", go.display());
    let driver = Driver::new(go).mode(cli.mode()).output(cli.output.clone());

    if cli.mode() == Mode::Build {
        println!("Building executable '{}'...", driver.artifact_path(&cli.input).display());
    }

    match driver.execute(&cli.input, &generated) {
        Ok(Outcome::Converted(path)) => {
            println!("Successfully converted '{}' to '{}'.", cli.input.display(), path.display());
        }
        Ok(Outcome::Built(_)) => println!("Build successful."),
        Ok(Outcome::Ran(code)) => std::process::exit(code),
        Err(e) => {
            if cli.mode() == Mode::Build {
                println!("Build failed.");
            }
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::parse_from(normalize_args(args.iter().map(|s| s.to_string())))
    }

    #[test]
    fn test_legacy_flags() {
        assert_eq!(parse(&["simplec", "a.simple", "-src"]).mode(), Mode::Src);
        assert_eq!(parse(&["simplec", "-build", "a.simple"]).mode(), Mode::Build);
        assert_eq!(parse(&["simplec", "a.simple"]).mode(), Mode::Run);
    }

    #[test]
    fn test_options() {
        let cli = parse(&["simplec", "a.simple", "--build", "-o", "app", "--lenient", "--go", "/opt/go", "-v"]);
        assert_eq!(cli.output, Some(PathBuf::from("app")));
        assert_eq!(cli.go, Some(PathBuf::from("/opt/go")));
        assert!(cli.lenient && cli.verbose);
    }

    #[test]
    fn test_src_and_build_conflict() {
        let args = normalize_args(["simplec", "a.simple", "--src", "--build"].iter().map(|s| s.to_string()));
        assert!(Cli::try_parse_from(args).is_err());
    }
}
