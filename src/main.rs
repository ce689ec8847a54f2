use clap::Parser;
use log::debug;
use minerva::cli::{build_options, Cli, Command};
use minerva::cli_pretty_printing::{analysis_report, decryption_report, error_report};
use minerva::config::AnalysisOptions;
use minerva::engines::CipherType;
use minerva::languages::Language;

fn main() {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    if let Err(err) = run(cli) {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), String> {
    match cli.command {
        Command::Analyze {
            text,
            max_key_length,
            max_rails,
            hill_climb_iterations,
            hill_climb_restarts,
            language,
            seed,
            tier_budget_ms,
        } => {
            let language = language
                .map(|name| name.parse::<Language>())
                .transpose()?;
            let options = build_options(
                max_key_length,
                max_rails,
                hill_climb_iterations,
                hill_climb_restarts,
                language,
                seed,
                tier_budget_ms,
            );
            debug!("analyzing with options {options:?}");
            let result = minerva::analyze(&text, &options)
                .map_err(|e| error_report(&e))?;
            if cli.json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&result).map_err(|e| e.to_string())?
                );
            } else {
                println!("{}", analysis_report(&result));
            }
        }
        Command::Decrypt { text, cipher, key } => {
            let cipher_type: CipherType = cipher.parse().map_err(|e| error_report(&e))?;
            let result = minerva::decrypt(
                &text,
                cipher_type,
                key.as_deref(),
                &AnalysisOptions::default(),
            )
            .map_err(|e| error_report(&e))?;
            if cli.json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&result).map_err(|e| e.to_string())?
                );
            } else {
                println!("{}", decryption_report(&result));
            }
        }
        Command::Encrypt { text, cipher, key } => {
            let cipher_type: CipherType = cipher.parse().map_err(|e| error_report(&e))?;
            let ciphertext = minerva::encrypt(&text, cipher_type, key.as_deref())
                .map_err(|e| error_report(&e))?;
            println!("{ciphertext}");
        }
    }
    Ok(())
}
