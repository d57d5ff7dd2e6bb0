use anyhow::{bail, Context};
use std::fs;
use std::path::PathBuf;
use yofix::correction::{CorrectionMode, CorrectionReport};
use yofix::logging::{parse_level, Logger};
use yofix::{error, Config, Corrector, LineEnding, MemoryDocument, TerminalPrompt, TextBuffer};

const USAGE: &str = "usage: yofix [--dict PATH] [--encoding NAME] [--file-encoding NAME] \
[--fileformat unix|dos|mac] [--mode necessary|optional|both] [--refresh] \
[--log-level LEVEL] [--log-file PATH] FILE";

/// 実行する修正
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunMode {
    Single(CorrectionMode),
    Both,
}

#[derive(Debug)]
struct Options {
    file: PathBuf,
    dictionary: Option<String>,
    encoding: Option<String>,
    file_encoding: String,
    line_ending: Option<LineEnding>,
    mode: RunMode,
    refresh: bool,
    log_level: log::LevelFilter,
    log_file: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    error::setup_panic_handler();
    let args: Vec<String> = std::env::args().skip(1).collect();
    let options = parse_args(&args)?;

    let mut logger = Logger::new(options.log_level);
    if let Some(path) = &options.log_file {
        logger = logger.with_file_output(path);
    }
    logger.init();

    run(&options)
}

fn run(options: &Options) -> anyhow::Result<()> {
    let config = match &options.dictionary {
        Some(raw) => Config::from_setting(raw)?,
        None => Config::from_env()?,
    };
    let store = config.store();
    let dictionary = if options.refresh {
        store.refresh()
    } else {
        store.load_or_refresh()
    }
    .with_context(|| format!("failed to load dictionary {}", store.base().display()))?;
    log::info!("dictionary loaded: {} entries", dictionary.len());

    let bytes = fs::read(&options.file)
        .with_context(|| format!("failed to read {}", options.file.display()))?;
    let mut document =
        MemoryDocument::from_bytes(&bytes, &options.file_encoding, options.line_ending)?;
    if let Some(encoding) = &options.encoding {
        document = document.with_encoding(encoding.as_str());
    }

    let corrector = Corrector::new(dictionary)
        .with_pattern(config.word_pattern())
        .with_options(config.prompt.clone());
    let mut buffer = TextBuffer::new(document)?;
    let mut prompt = TerminalPrompt::stdio();

    let report = match options.mode {
        RunMode::Both => corrector.run_all(&mut buffer, &mut prompt)?,
        RunMode::Single(CorrectionMode::Necessary) => CorrectionReport {
            necessary: corrector.run(&mut buffer, &mut prompt, CorrectionMode::Necessary)?,
            ..CorrectionReport::default()
        },
        RunMode::Single(CorrectionMode::Optional) => CorrectionReport {
            optional: corrector.run(&mut buffer, &mut prompt, CorrectionMode::Optional)?,
            ..CorrectionReport::default()
        },
    };

    let output = buffer.into_inner().to_bytes()?;
    if output != bytes {
        fs::write(&options.file, &output)
            .with_context(|| format!("failed to write {}", options.file.display()))?;
        println!(
            "{}: {} words corrected",
            options.file.display(),
            report.corrected()
        );
    } else {
        println!("{}: no changes", options.file.display());
    }
    Ok(())
}

fn parse_args(args: &[String]) -> anyhow::Result<Options> {
    let mut file: Option<PathBuf> = None;
    let mut options = Options {
        file: PathBuf::new(),
        dictionary: None,
        encoding: None,
        file_encoding: "utf-8".to_string(),
        line_ending: None,
        mode: RunMode::Both,
        refresh: false,
        log_level: log::LevelFilter::Warn,
        log_file: None,
    };

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        let mut value = |name: &str| {
            iter.next()
                .cloned()
                .with_context(|| format!("{} requires a value\n{}", name, USAGE))
        };
        match arg.as_str() {
            "--dict" => options.dictionary = Some(value("--dict")?),
            "--encoding" => options.encoding = Some(value("--encoding")?),
            "--file-encoding" => options.file_encoding = value("--file-encoding")?,
            "--fileformat" => options.line_ending = Some(value("--fileformat")?.parse()?),
            "--mode" => {
                options.mode = match value("--mode")?.as_str() {
                    "both" => RunMode::Both,
                    other => RunMode::Single(other.parse()?),
                }
            }
            "--refresh" => options.refresh = true,
            "--log-level" => {
                let level = value("--log-level")?;
                options.log_level = parse_level(&level)
                    .with_context(|| format!("unknown log level '{}'", level))?;
            }
            "--log-file" => options.log_file = Some(PathBuf::from(value("--log-file")?)),
            "-h" | "--help" => bail!("{}", USAGE),
            other if other.starts_with('-') => bail!("unknown option '{}'\n{}", other, USAGE),
            other => {
                if file.is_some() {
                    bail!("only one file can be corrected at a time\n{}", USAGE);
                }
                file = Some(PathBuf::from(other));
            }
        }
    }

    options.file = file.with_context(|| format!("missing FILE\n{}", USAGE))?;
    Ok(options)
}
