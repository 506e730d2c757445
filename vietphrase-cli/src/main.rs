use clap::{Arg, ArgAction, Command};
use std::path::Path;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;
use vietphrase::fetch::{HttpFetcher, refresh};
use vietphrase::{Config, Language, Session};

fn command() -> Command {
    Command::new("vietphrase")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Translate Chinese or English text into Vietnamese using phrase dictionaries")
        .arg(
            Arg::new("text")
                .help("Text to translate; reads stdin line by line when omitted")
                .num_args(1..),
        )
        .arg(
            Arg::new("lang")
                .long("lang")
                .short('l')
                .help("Source language code (en, zh)"),
        )
        .arg(
            Arg::new("bundled")
                .long("bundled")
                .short('b')
                .help("Directory with the bundled dictionaries"),
        )
        .arg(
            Arg::new("override")
                .long("override")
                .short('o')
                .help("Writable directory whose files shadow the bundled ones"),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .help("JSON config file (default: environment variables)"),
        )
        .arg(
            Arg::new("fetch")
                .long("fetch")
                .value_name("URL")
                .requires("name")
                .help("Download a dictionary file into the override directory before loading"),
        )
        .arg(
            Arg::new("name")
                .long("name")
                .value_name("PATH")
                .help("Destination for --fetch, relative to the override directory (e.g. zh/Names.txt)"),
        )
        .arg(
            Arg::new("report")
                .long("report")
                .help("Print the dictionary load report as JSON")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .help("Log loading details")
                .action(ArgAction::SetTrue),
        )
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let matches = command().get_matches();

    let level = if matches.get_flag("verbose") { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with_writer(std::io::stderr)
        .init();

    let mut config = match matches.get_one::<String>("config") {
        Some(path) => Config::from_json_file(Path::new(path))?,
        None => Config::from_env()?,
    };
    if let Some(code) = matches.get_one::<String>("lang") {
        config.language = code.parse::<Language>()?;
    }
    if let Some(dir) = matches.get_one::<String>("bundled") {
        config.bundled_dir = dir.into();
    }
    if let Some(dir) = matches.get_one::<String>("override") {
        config.override_dir = Some(dir.into());
    }
    debug!("{:?}", config);

    if let (Some(url), Some(name)) = (
        matches.get_one::<String>("fetch"),
        matches.get_one::<String>("name"),
    ) {
        let Some(dir) = &config.override_dir else {
            return Err("--fetch needs an override directory (--override or VIETPHRASE_OVERRIDE_DIR)".into());
        };
        let fetcher = HttpFetcher::new(dir)?;
        if !refresh(&fetcher, url, name).await {
            warn!("Keeping the existing {}", name);
        }
    }

    let session = Session::from_config(&config);
    let report = session.load_language(config.language).await?;
    if matches.get_flag("report") {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }

    if let Some(words) = matches.get_many::<String>("text") {
        let text = words.map(String::as_str).collect::<Vec<_>>().join(" ");
        if let Some(translated) = session.translate(&text) {
            println!("{}", translated);
        }
        return Ok(());
    }

    if matches.get_flag("report") {
        return Ok(());
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if let Some(translated) = session.translate(&line) {
            println!("{}", translated);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_is_well_formed() {
        command().debug_assert();
    }

    #[test]
    fn test_fetch_requires_name() {
        let result = command().try_get_matches_from(["vietphrase", "--fetch", "http://x/y.txt"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_text_collects_all_words() {
        let matches = command()
            .try_get_matches_from(["vietphrase", "-l", "zh", "你好", "世界"])
            .unwrap();
        let words: Vec<&String> = matches.get_many::<String>("text").unwrap().collect();
        assert_eq!(words, ["你好", "世界"]);
        assert_eq!(matches.get_one::<String>("lang").map(String::as_str), Some("zh"));
    }
}
