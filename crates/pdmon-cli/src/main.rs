use std::env;
use std::path::PathBuf;
use std::process;

use pdmon_cli::types::{InputFormat, MonitorConfig};
use pdmon_cli::SessionReplayer;

const USAGE: &str = "usage: pdmon <imu.csv> [--config cfg.yaml] [--output report.json] [--raw | --dump]";

struct CliArgs {
    imu: PathBuf,
    config: Option<PathBuf>,
    output: Option<PathBuf>,
    format: Option<InputFormat>,
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<CliArgs, String> {
    let mut imu = None;
    let mut config = None;
    let mut output = None;
    let mut format = None;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => {
                let path = args.next().ok_or("--config needs a path")?;
                config = Some(PathBuf::from(path));
            }
            "--output" => {
                let path = args.next().ok_or("--output needs a path")?;
                output = Some(PathBuf::from(path));
            }
            "--raw" => format = Some(InputFormat::Raw),
            "--dump" => format = Some(InputFormat::RegisterDump),
            "-h" | "--help" => return Err(String::new()),
            flag if flag.starts_with("--") => return Err(format!("unknown option {flag}")),
            path if imu.is_none() => imu = Some(PathBuf::from(path)),
            extra => return Err(format!("unexpected argument {extra}")),
        }
    }

    let imu = imu.ok_or("missing IMU file")?;
    Ok(CliArgs {
        imu,
        config,
        output,
        format,
    })
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = env::args();
    let _bin = args.next();
    let cli = match parse_args(args) {
        Ok(cli) => cli,
        Err(message) => {
            if !message.is_empty() {
                eprintln!("{message}");
            }
            eprintln!("{USAGE}");
            process::exit(2);
        }
    };

    let mut config = match &cli.config {
        Some(path) => match MonitorConfig::from_yaml_file(path) {
            Ok(config) => config,
            Err(err) => {
                eprintln!("could not load {}: {err}", path.display());
                process::exit(1);
            }
        },
        None => MonitorConfig::default(),
    };
    if let Some(format) = cli.format {
        config.input.format = format;
    }

    let replayer = match SessionReplayer::new(config) {
        Ok(replayer) => replayer,
        Err(err) => {
            eprintln!("invalid configuration: {err}");
            process::exit(1);
        }
    };

    let output = match replayer.replay_file(&cli.imu, cli.config.clone()) {
        Ok(output) => output,
        Err(err) => {
            eprintln!("replay failed: {err}");
            process::exit(1);
        }
    };

    for line in &output.telemetry {
        println!("{line}");
    }

    let summary = &output.report.summary;
    println!("session: {}", output.report.metadata.session_name);
    println!("windows: {}", summary.windows_analyzed);
    println!(
        "samples: {} received, {} failed reads, {} rejected",
        summary.samples_received, summary.failed_reads, summary.rejected_samples
    );
    println!(
        "peak levels: tremor={} dysk={} fog={}",
        summary.peak_levels.tremor, summary.peak_levels.dyskinesia, summary.peak_levels.freeze
    );
    println!(
        "indicators: freeze={} tremor={} dyskinesia={}",
        summary.indicators.freeze, summary.indicators.tremor, summary.indicators.dyskinesia
    );

    if let Some(path) = &cli.output {
        if let Err(err) = output.report.write_json(path) {
            eprintln!("could not write {}: {err}", path.display());
            process::exit(1);
        }
        println!("report: {}", path.display());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> impl Iterator<Item = String> {
        list.iter().map(|s| s.to_string()).collect::<Vec<_>>().into_iter()
    }

    #[test]
    fn parses_all_options() {
        let cli = parse_args(args(&[
            "walk.csv",
            "--config",
            "cfg.yaml",
            "--output",
            "out.json",
            "--raw",
        ]))
        .unwrap();
        assert_eq!(cli.imu, PathBuf::from("walk.csv"));
        assert_eq!(cli.config, Some(PathBuf::from("cfg.yaml")));
        assert_eq!(cli.output, Some(PathBuf::from("out.json")));
        assert_eq!(cli.format, Some(InputFormat::Raw));

        let cli = parse_args(args(&["walk.bin", "--dump"])).unwrap();
        assert_eq!(cli.format, Some(InputFormat::RegisterDump));
        assert_eq!(cli.config, None);
    }

    #[test]
    fn rejects_missing_input_and_unknown_flags() {
        assert!(parse_args(args(&[])).is_err());
        assert!(parse_args(args(&["walk.csv", "--fast"])).is_err());
        assert!(parse_args(args(&["walk.csv", "--config"])).is_err());
        assert!(parse_args(args(&["a.csv", "b.csv"])).is_err());
    }
}
