use anyhow::Result;
use clap::{Arg, ArgAction, ArgMatches, Command, ValueHint};
use log::LevelFilter;
use std::path::PathBuf;

use rebalance_cli::config::BenchmarkConfig;

fn main() -> Result<()> {
    env_logger::Builder::default()
        .filter_level(LevelFilter::Error)
        .parse_env(env_logger::Env::default().filter_or("REBALANCE_LOG", "error,rebalance=info"))
        .init();

    let matches = Command::new("rebalance")
        .version(clap::crate_version!())
        .about("Benchmark imbalance handling strategies for neural network binary classifiers")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("benchmark")
                .about("Cross-validate every strategy on every dataset and write scores and a report")
                .arg(
                    Arg::new("config")
                        .help("Path to benchmark JSON configuration file. Defaults are used (and printed) when omitted.")
                        .required(false)
                        .value_parser(clap::value_parser!(PathBuf))
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("dataset")
                        .short('d')
                        .long("dataset")
                        .help(
                            "KEEL .dat dataset file, may be repeated. \
                             Overrides the datasets specified in the configuration file.",
                        )
                        .action(ArgAction::Append)
                        .value_parser(clap::value_parser!(PathBuf))
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("synthetic")
                        .long("synthetic")
                        .help("Also benchmark on generated Gaussian datasets.")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("strategy")
                        .short('s')
                        .long("strategy")
                        .help(
                            "Imbalance strategy to run, may be repeated. \
                             Overrides the strategies specified in the configuration file.",
                        )
                        .action(ArgAction::Append)
                        .value_parser([
                            "none",
                            "count_weighting",
                            "density_weighting",
                            "random_oversampling",
                            "smote",
                            "adasyn",
                        ]),
                )
                .arg(
                    Arg::new("epochs")
                        .short('e')
                        .long("epochs")
                        .help("Number of training epochs. Overrides the configuration file.")
                        .value_parser(clap::value_parser!(usize)),
                )
                .arg(
                    Arg::new("device")
                        .long("device")
                        .help("Device to train on: cpu, cuda or cuda:N.")
                        .value_parser(clap::builder::NonEmptyStringValueParser::new()),
                )
                .arg(
                    Arg::new("output_dir")
                        .short('o')
                        .long("output-dir")
                        .help("Directory the scores, summary and report are written to.")
                        .value_parser(clap::value_parser!(PathBuf))
                        .value_hint(ValueHint::DirPath),
                )
                .arg(
                    Arg::new("no_report")
                        .long("no-report")
                        .help("Disable HTML report generation.")
                        .action(ArgAction::SetTrue),
                ),
        )
        .get_matches();

    match matches.subcommand() {
        Some(("benchmark", sub_m)) => handle_benchmark(sub_m),
        _ => unreachable!("Subcommand is required by CLI configuration"),
    }
}

fn handle_benchmark(matches: &ArgMatches) -> Result<()> {
    let config_path: Option<&PathBuf> = matches.get_one("config");
    match config_path {
        Some(path) => log::info!("[rebalance] Benchmark using config: {:?}", path),
        None => eprintln!("[rebalance] No config file provided; using defaults."),
    }

    let config = BenchmarkConfig::from_arguments(config_path, matches)?;
    if config_path.is_none() {
        println!("{}", serde_json::to_string_pretty(&config)?);
    }

    match rebalance_cli::run(&config) {
        Ok(results) => {
            eprintln!(
                "[rebalance] Completed {} folds; outputs in {}",
                results.folds.len(),
                config.output_dir.display()
            );
            Ok(())
        }
        Err(e) => {
            log::error!("Benchmark failed: {:#}", e);
            std::process::exit(1)
        }
    }
}
