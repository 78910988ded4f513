//! Scytale CLI
//!
//! Classical ciphers from the command line, with optional step tables.

use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;

use scytale_classic::{
    Atbash, Caesar, Cipher, CipherKind, CipherOutput, ColumnarTransposition, FrequencyAnalysis,
    Gamma, HillCipher, Lfsr, OneTimePad, Playfair, PlayfairVariant, Polybius, PolybiusLayout,
    Trithemius, Vigenere,
};
use scytale_config::ScytaleConfig;
use scytale_core::{Alphabet, AlphabetId, Matrix, Mode};

#[derive(Parser)]
#[command(name = "scytale")]
#[command(about = "Scytale - classical ciphers with step-by-step traces")]
#[command(version)]
struct Cli {
    /// Decrypt instead of encrypt
    #[arg(short, long, global = true)]
    decrypt: bool,

    /// Alphabet: ru33, ru32, en26 (defaults to the config value)
    #[arg(short, long, global = true)]
    alphabet: Option<AlphabetId>,

    /// Print the step table
    #[arg(short, long, global = true)]
    steps: bool,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    /// Config file (default ~/.config/scytale/config.yaml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Caesar shift
    Caesar {
        /// Shift, 1..m-1
        #[arg(short = 'k', long)]
        shift: i64,

        /// Text ("-" reads stdin)
        text: String,
    },

    /// Atbash mirror substitution
    Atbash { text: String },

    /// Vigenère keyword cipher
    Vigenere {
        #[arg(short, long)]
        key: String,
        text: String,
    },

    /// Belaso keyword cipher
    Belaso {
        #[arg(short, long)]
        key: String,
        text: String,
    },

    /// Trithemius progressive shift
    Trithemius { text: String },

    /// Playfair digraph cipher
    Playfair {
        #[arg(short, long, default_value = "")]
        key: String,

        /// Grid: ru, en (defaults to the config value)
        #[arg(long)]
        variant: Option<PlayfairVariant>,

        text: String,
    },

    /// Polybius square coordinates
    Polybius {
        /// Optional keyword for a keyed square
        #[arg(short, long, default_value = "")]
        key: String,

        /// Layout: ru32, ru30, en25 (defaults to the config value)
        #[arg(long)]
        layout: Option<PolybiusLayout>,

        text: String,
    },

    /// Hill matrix cipher
    Hill {
        /// Key rows separated by ';', entries by ',' (e.g. "3,5;2,7")
        #[arg(short, long, conflicts_with = "random")]
        matrix: Option<String>,

        /// Use a random invertible key of this size
        #[arg(long)]
        random: Option<usize>,

        text: String,
    },

    /// Keyed columnar transposition
    Columnar {
        #[arg(short, long)]
        key: String,
        text: String,
    },

    /// One-time pad
    Otp {
        /// Pad letters; generated to the text length when omitted
        #[arg(short, long)]
        key: Option<String>,
        text: String,
    },

    /// Byte XOR with a hex or LFSR gamma
    Gamma {
        /// Gamma bytes in hex (e.g. "AB CD EF")
        #[arg(long, conflicts_with = "seed")]
        hex: Option<String>,

        /// LFSR seed, decimal or 0x-prefixed hex
        #[arg(long, value_parser = parse_seed)]
        seed: Option<u32>,

        text: String,
    },

    /// Try every Caesar shift
    Bruteforce { text: String },

    /// Letter frequencies, index of coincidence, Kasiski
    Analyze {
        /// Number of top letters to list
        #[arg(short, long, default_value = "5")]
        top: usize,

        text: String,
    },

    /// Show a Playfair or Polybius square
    Square {
        #[arg(short, long, default_value = "")]
        key: String,

        /// Show the Playfair grid instead of a Polybius square
        #[arg(long)]
        playfair: bool,
    },

    /// Generate keys
    Keygen {
        #[command(subcommand)]
        command: KeygenCommands,
    },

    /// Show or create the config file
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum KeygenCommands {
    /// Random one-time pad
    Otp {
        /// Pad length in letters
        length: usize,
    },

    /// Random invertible Hill matrix
    Hill {
        /// Block size, 2..=10
        size: usize,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Print the effective config
    Show,

    /// Write a config file with default values
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
}

/// Flags and config merged
struct Session {
    mode: Mode,
    alphabet_id: AlphabetId,
    steps: bool,
    json: bool,
    config: ScytaleConfig,
    config_path: PathBuf,
}

impl Session {
    fn new(cli: &Cli, config: ScytaleConfig) -> Self {
        Self {
            mode: if cli.decrypt { Mode::Decrypt } else { Mode::Encrypt },
            alphabet_id: cli.alphabet.unwrap_or(config.alphabet),
            steps: cli.steps || config.trace,
            json: cli.json,
            config_path: cli.config.clone().unwrap_or_else(ScytaleConfig::default_path),
            config,
        }
    }

    fn alphabet(&self) -> Alphabet {
        self.alphabet_id.alphabet()
    }

    fn playfair_variant(&self, flag: Option<PlayfairVariant>) -> Result<PlayfairVariant> {
        match flag {
            Some(v) => Ok(v),
            None => self
                .config
                .playfair
                .parse()
                .map_err(|e: String| anyhow::anyhow!("config playfair: {}", e)),
        }
    }

    fn polybius_layout(&self, flag: Option<PolybiusLayout>) -> Result<PolybiusLayout> {
        match flag {
            Some(l) => Ok(l),
            None => self
                .config
                .polybius
                .parse()
                .map_err(|e: String| anyhow::anyhow!("config polybius: {}", e)),
        }
    }
}

#[derive(Serialize)]
struct CipherReport<'a> {
    cipher: CipherKind,
    mode: Mode,
    alphabet: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    key: Option<&'a str>,
    input: &'a str,
    #[serde(flatten)]
    result: &'a CipherOutput,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = ScytaleConfig::resolve(cli.config.as_deref())?;
    init_logging(&config)?;

    let ctx = Session::new(&cli, config);
    match cli.command {
        Commands::Caesar { shift, text } => {
            let cipher = Caesar::new(shift, ctx.alphabet())?;
            run(&ctx, &cipher, ctx.alphabet_id.name(), Some(&shift.to_string()), &text)
        }
        Commands::Atbash { text } => {
            run(&ctx, &Atbash::new(ctx.alphabet()), ctx.alphabet_id.name(), None, &text)
        }
        Commands::Vigenere { key, text } => {
            let cipher = Vigenere::new(&key, ctx.alphabet())?;
            run_with_analysis(&ctx, &cipher, &key, &text)
        }
        Commands::Belaso { key, text } => {
            let cipher = Vigenere::belaso(&key, ctx.alphabet())?;
            run_with_analysis(&ctx, &cipher, &key, &text)
        }
        Commands::Trithemius { text } => {
            run(&ctx, &Trithemius::new(ctx.alphabet()), ctx.alphabet_id.name(), None, &text)
        }
        Commands::Playfair { key, variant, text } => {
            let variant = ctx.playfair_variant(variant)?;
            let cipher = Playfair::new(&key, variant)?;
            if !ctx.json {
                println!("\n{}", cipher.square());
            }

            let text = read_text(&text)?;
            let result = transform(&ctx, &cipher, &text)?;
            print_result(&ctx, cipher.kind(), variant.name(), Some(&key), &text, &result)?;
            if ctx.mode == Mode::Decrypt && !ctx.json {
                println!("  Plain:  {}", cipher.strip_fillers(&result.output));
            }
            Ok(())
        }
        Commands::Polybius { key, layout, text } => {
            let layout = ctx.polybius_layout(layout)?;
            let cipher = Polybius::new(&key, layout)?;
            let key = (!key.is_empty()).then_some(key.as_str());
            run(&ctx, &cipher, layout.name(), key, &text)
        }
        Commands::Hill { matrix, random, text } => cmd_hill(&ctx, matrix, random, &text),
        Commands::Columnar { key, text } => {
            let cipher = ColumnarTransposition::new(&key, ctx.alphabet())?;
            run(&ctx, &cipher, ctx.alphabet_id.name(), Some(&key), &text)
        }
        Commands::Otp { key, text } => cmd_otp(&ctx, key, &text),
        Commands::Gamma { hex, seed, text } => cmd_gamma(&ctx, hex, seed, &text),
        Commands::Bruteforce { text } => cmd_bruteforce(&ctx, &text),
        Commands::Analyze { top, text } => cmd_analyze(&ctx, top, &text),
        Commands::Square { key, playfair } => cmd_square(&ctx, &key, playfair),
        Commands::Keygen { command } => cmd_keygen(&ctx, command),
        Commands::Config { command } => cmd_config(&ctx, command),
    }
}

fn init_logging(config: &ScytaleConfig) -> Result<()> {
    let directive: tracing_subscriber::filter::Directive = config
        .log_directive()
        .parse()
        .with_context(|| format!("invalid log level: {}", config.log_level))?;
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(directive))
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

/// `-` reads the text from stdin
fn read_text(text: &str) -> Result<String> {
    if text != "-" {
        return Ok(text.to_string());
    }
    let mut buf = String::new();
    std::io::stdin()
        .read_to_string(&mut buf)
        .context("reading stdin")?;
    Ok(buf.trim_end_matches(['\r', '\n']).to_string())
}

fn transform(ctx: &Session, cipher: &dyn Cipher, text: &str) -> Result<CipherOutput> {
    let result = cipher.apply(text, ctx.mode, ctx.steps)?;
    tracing::info!("{} {} done", cipher.kind().name(), ctx.mode.name());
    Ok(result)
}

fn print_result(
    ctx: &Session,
    kind: CipherKind,
    alphabet: &str,
    key: Option<&str>,
    input: &str,
    result: &CipherOutput,
) -> Result<()> {
    if ctx.json {
        let report = CipherReport {
            cipher: kind,
            mode: ctx.mode,
            alphabet,
            key,
            input,
            result,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!(
        "\n  {} ({})",
        ctx.mode.name().to_uppercase(),
        kind.name().to_uppercase()
    );
    println!("  Alphabet: {}", alphabet);
    if let Some(key) = key {
        println!("  Key:    {}", key);
    }
    println!("  Input:  {}", input);
    println!("  Output: {}", result.output);

    if ctx.steps && !result.steps.is_empty() {
        println!("\n  STEPS:");
        print!("{}", result.render_steps());
    }
    Ok(())
}

fn run(
    ctx: &Session,
    cipher: &dyn Cipher,
    alphabet: &str,
    key: Option<&str>,
    text: &str,
) -> Result<()> {
    let text = read_text(text)?;
    let result = transform(ctx, cipher, &text)?;
    print_result(ctx, cipher.kind(), alphabet, key, &text, &result)
}

/// Keyword ciphers also get the ciphertext letter distribution
fn run_with_analysis(ctx: &Session, cipher: &dyn Cipher, key: &str, text: &str) -> Result<()> {
    let text = read_text(text)?;
    let result = transform(ctx, cipher, &text)?;
    print_result(ctx, cipher.kind(), ctx.alphabet_id.name(), Some(key), &text, &result)?;

    if !ctx.json && ctx.steps {
        let ciphertext = match ctx.mode {
            Mode::Encrypt => &result.output,
            Mode::Decrypt => &text,
        };
        let analysis = FrequencyAnalysis::analyze(ciphertext, &ctx.alphabet());
        let top: Vec<String> = analysis
            .top(5)
            .iter()
            .map(|(c, _)| format!("{c} {:.1}%", analysis.percent(*c)))
            .collect();
        println!("\n  CIPHERTEXT TOP LETTERS: {}", top.join(", "));
        println!(
            "  Index of coincidence:  {:.4}",
            analysis.index_of_coincidence()
        );
    }
    Ok(())
}

fn parse_matrix(input: &str) -> Result<Vec<Vec<i64>>> {
    input.split(';')
        .map(|row| {
            row.split(',')
                .map(|v| {
                    v.trim()
                        .parse::<i64>()
                        .with_context(|| format!("bad matrix entry '{}'", v.trim()))
                })
                .collect()
        })
        .collect()
}

fn parse_seed(s: &str) -> std::result::Result<u32, String> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => s.parse(),
    };
    parsed.map_err(|e| format!("invalid seed '{s}': {e}"))
}

fn cmd_hill(ctx: &Session, matrix: Option<String>, random: Option<usize>, text: &str) -> Result<()> {
    let cipher = match (matrix, random) {
        (Some(matrix), _) => {
            let rows = parse_matrix(&matrix)?;
            HillCipher::from_rows(rows.len(), rows, ctx.alphabet())?
        }
        (None, Some(size)) => HillCipher::random(size, ctx.alphabet())?,
        (None, None) => anyhow::bail!("Hill needs --matrix \"a,b;c,d\" or --random <size>"),
    };

    if !ctx.json {
        println!("\n  KEY MATRIX (mod {}):", ctx.alphabet().modulus());
        for line in cipher.key().to_string().lines() {
            println!("  {}", line);
        }
        println!(
            "  det mod {} = {}{}",
            ctx.alphabet().modulus(),
            cipher.determinant_mod(),
            if cipher.is_invertible() { "" } else { " (not invertible)" }
        );
    }

    let key = cipher
        .key()
        .rows()
        .iter()
        .map(|r| r.iter().map(i64::to_string).collect::<Vec<_>>().join(","))
        .collect::<Vec<_>>()
        .join(";");
    run(ctx, &cipher, ctx.alphabet_id.name(), Some(&key), text)
}

fn cmd_otp(ctx: &Session, key: Option<String>, text: &str) -> Result<()> {
    let text = read_text(text)?;
    let alphabet = ctx.alphabet();

    let key = match key {
        Some(key) => key,
        None if ctx.mode == Mode::Encrypt => {
            let len = alphabet.indices(&text).len().max(1);
            let key = OneTimePad::generate_key(len, &alphabet);
            tracing::info!("generated a {}-letter pad", len);
            key
        }
        None => anyhow::bail!("Decrypting a one-time pad needs --key"),
    };

    let cipher = OneTimePad::new(&key, alphabet)?;
    let result = transform(ctx, &cipher, &text)?;
    print_result(ctx, cipher.kind(), ctx.alphabet_id.name(), Some(&key), &text, &result)
}

fn cmd_gamma(ctx: &Session, hex: Option<String>, seed: Option<u32>, text: &str) -> Result<()> {
    let (cipher, key) = match (hex, seed) {
        (Some(hex), _) => (Gamma::manual(&hex)?, hex),
        (None, seed) => {
            let seed = Lfsr::new(seed.unwrap_or(0)).state();
            (Gamma::lfsr(seed), format!("LFSR seed 0x{:08X}", seed))
        }
    };
    run(ctx, &cipher, "bytes (UTF-8)", Some(&key), text)
}

fn cmd_bruteforce(ctx: &Session, text: &str) -> Result<()> {
    let text = read_text(text)?;
    let alphabet = ctx.alphabet();
    let candidates = Caesar::bruteforce(&text, &alphabet);

    if ctx.json {
        println!("{}", serde_json::to_string_pretty(&candidates)?);
        return Ok(());
    }

    println!("\n  CAESAR BRUTE FORCE ({})", alphabet.name());
    println!("  ==================\n");
    for (shift, plain) in candidates {
        println!("  {:>2}: {}", shift, plain);
    }
    Ok(())
}

fn cmd_analyze(ctx: &Session, top: usize, text: &str) -> Result<()> {
    let text = read_text(text)?;
    let analysis = FrequencyAnalysis::analyze(&text, &ctx.alphabet());
    let key_lengths = analysis.kasiski_examination();

    if ctx.json {
        #[derive(Serialize)]
        struct AnalysisReport<'a> {
            #[serde(flatten)]
            analysis: &'a FrequencyAnalysis,
            index_of_coincidence: f64,
            top: Vec<(char, usize)>,
            kasiski: &'a [usize],
        }
        let report = AnalysisReport {
            analysis: &analysis,
            index_of_coincidence: analysis.index_of_coincidence(),
            top: analysis.top(top),
            kasiski: &key_lengths,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("\n{}\n", analysis.render_ascii());
    let top: Vec<String> = analysis
        .top(top)
        .iter()
        .map(|(c, n)| format!("{c}={n}"))
        .collect();
    println!("Top letters: {}", top.join(" "));
    if key_lengths.is_empty() {
        println!("Kasiski: no repeated trigrams");
    } else {
        let lengths: Vec<String> = key_lengths.iter().map(usize::to_string).collect();
        println!("Kasiski key lengths: {}", lengths.join(", "));
    }
    Ok(())
}

fn cmd_square(ctx: &Session, key: &str, playfair: bool) -> Result<()> {
    let (name, square) = if playfair {
        let variant = ctx.playfair_variant(None)?;
        (variant.name(), Playfair::new(key, variant)?.square().clone())
    } else {
        let layout = ctx.polybius_layout(None)?;
        (layout.name(), Polybius::new(key, layout)?.square().clone())
    };

    if ctx.json {
        let rows: Vec<String> = square.rows().map(|r| r.iter().collect()).collect();
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    println!("\n  {} {}\n", name, square.dims());
    print!("{}", square);
    Ok(())
}

fn cmd_keygen(ctx: &Session, command: KeygenCommands) -> Result<()> {
    let alphabet = ctx.alphabet();
    match command {
        KeygenCommands::Otp { length } => {
            let key = OneTimePad::generate_key(length, &alphabet);
            if ctx.json {
                println!("{}", serde_json::to_string(&key)?);
            } else {
                println!("{}", key);
            }
        }
        KeygenCommands::Hill { size } => {
            let cipher = HillCipher::random(size, alphabet)?;
            let key: &Matrix = cipher.key();
            if ctx.json {
                println!("{}", serde_json::to_string(key)?);
            } else {
                print!("{}", key);
                println!("det mod {} = {}", cipher.alphabet().modulus(), cipher.determinant_mod());
            }
        }
    }
    Ok(())
}

fn cmd_config(ctx: &Session, command: ConfigCommands) -> Result<()> {
    match command {
        ConfigCommands::Show => {
            println!("# {}", ctx.config_path.display());
            print!("{}", serde_yaml::to_string(&ctx.config)?);
        }
        ConfigCommands::Init { force } => {
            if ctx.config_path.exists() && !force {
                anyhow::bail!(
                    "{} already exists (use --force to overwrite)",
                    ctx.config_path.display()
                );
            }
            ScytaleConfig::default().save(&ctx.config_path)?;
            println!("  Wrote {}", ctx.config_path.display());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_matrix() {
        assert_eq!(parse_matrix("3,5;2,7").unwrap(), vec![vec![3, 5], vec![2, 7]]);
        assert_eq!(parse_matrix(" 1, -2 ; 3,4 ").unwrap(), vec![vec![1, -2], vec![3, 4]]);
        assert!(parse_matrix("1,x;2,3").is_err());
    }

    #[test]
    fn test_parse_seed() {
        assert_eq!(parse_seed("0x12345678").unwrap(), 0x1234_5678);
        assert_eq!(parse_seed("42").unwrap(), 42);
        assert!(parse_seed("0xZZ").is_err());
    }

    #[test]
    fn test_cli_parses() {
        let cli = Cli::try_parse_from([
            "scytale", "--alphabet", "en", "-d", "vigenere", "-k", "KEY", "KXRKGIKXBKAL",
        ])
        .unwrap();
        assert!(cli.decrypt);
        assert_eq!(cli.alphabet, Some(AlphabetId::En26));
        assert!(matches!(cli.command, Commands::Vigenere { .. }));
    }

    #[test]
    fn test_hill_flags_conflict() {
        let parsed = Cli::try_parse_from([
            "scytale", "hill", "--matrix", "3,5;2,7", "--random", "2", "HELP",
        ]);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_context_prefers_flags() {
        let cli = Cli::try_parse_from(["scytale", "--alphabet", "ru32", "--steps", "atbash", "Я"])
            .unwrap();
        let ctx = Session::new(&cli, ScytaleConfig::default());
        assert_eq!(ctx.alphabet_id, AlphabetId::Ru32);
        assert!(ctx.steps);
        assert_eq!(ctx.playfair_variant(None).unwrap(), PlayfairVariant::Ru);
        assert_eq!(ctx.polybius_layout(None).unwrap(), PolybiusLayout::Ru32);
    }
}
