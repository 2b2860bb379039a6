use std::path::{Path, PathBuf};
use std::process::exit;

use bedrock_config::{CodecConfiguration, LoadConfiguration, LoggingConfig};
use bedrock_nbt::{BigEndian, LittleEndian, NetworkBigEndian, NetworkLittleEndian};
use clap::{Parser, ValueEnum};
use log::LevelFilter;
use simplelog::{ColorChoice, ConfigBuilder, TermLogger, TerminalMode};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Encoding {
    /// Fixed width little endian, as used in level.dat and LevelDB values.
    Little,
    /// Fixed width big endian, as used by Java edition files.
    Big,
    /// Varint lengths and numbers, as sent over the network.
    Network,
    /// Big endian with no root name.
    NetworkBig,
}

/// Prints an NBT file one tag per line.
#[derive(Parser, Debug)]
#[command(name = "nbt-dump", version)]
struct Args {
    file: PathBuf,
    #[arg(short, long, value_enum, default_value_t = Encoding::Little)]
    encoding: Encoding,
    /// Compression id to undo before decoding, 0 for flate or 1 for snappy.
    #[arg(short, long)]
    compression: Option<u16>,
}

fn init_logger(config: &LoggingConfig) {
    if !config.enabled {
        return;
    }
    let mut builder = ConfigBuilder::new();
    if !config.timestamp {
        builder.set_time_level(LevelFilter::Off);
    }
    let color = if config.color {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    };
    if let Err(err) = TermLogger::init(
        config.level.into(),
        builder.build(),
        TerminalMode::Stderr,
        color,
    ) {
        eprintln!("failed to set up logging: {err}");
    }
}

// Reads ./config/codec.toml when present. The defaults are never written from here.
fn load_config() -> CodecConfiguration {
    let dir = Path::new(".");
    if !dir.join("config").join(CodecConfiguration::get_path()).exists() {
        return CodecConfiguration::default();
    }
    match CodecConfiguration::load(dir) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("ignoring codec config: {err}");
            CodecConfiguration::default()
        }
    }
}

fn run(args: &Args) -> Result<String, Box<dyn std::error::Error>> {
    let mut data = std::fs::read(&args.file)?;
    log::debug!("read {} bytes from {}", data.len(), args.file.display());

    if let Some(id) = args.compression {
        data = bedrock_protocol::compression::decompress_by_id(id, &data)?;
        log::debug!("decompressed to {} bytes", data.len());
    }

    let text = match args.encoding {
        Encoding::Little => bedrock_nbt::dump(&data, LittleEndian)?,
        Encoding::Big => bedrock_nbt::dump(&data, BigEndian)?,
        Encoding::Network => bedrock_nbt::dump(&data, NetworkLittleEndian)?,
        Encoding::NetworkBig => bedrock_nbt::dump(&data, NetworkBigEndian)?,
    };
    Ok(text)
}

fn main() {
    let args = Args::parse();
    let config = load_config();
    init_logger(&config.logging);

    match run(&args) {
        Ok(text) => println!("{text}"),
        Err(err) => {
            if log::log_enabled!(log::Level::Error) {
                log::error!("failed to dump {}: {err}", args.file.display());
            } else {
                eprintln!("failed to dump {}: {err}", args.file.display());
            }
            exit(1);
        }
    }
}
