use anyhow::{Context, bail};
use clap::Parser;
use std::ops::RangeInclusive;
use wordmill::{Alphabet, DEFAULT_QUEUE_CAPACITY, ProducerConfig, ThreadsPerQueue};

/// Runtime configuration for the `wordmill` binary.
///
/// Every value can come from a CLI argument or an environment variable; a
/// `.env` file in the working directory is loaded first.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "wordmill",
    version,
    about = "Streams every word of length-specific alphabets to stdout, exactly once"
)]
pub struct CliArgs {
    /// Alphabet for one or more word lengths, as `LENGTHS=SYMBOLS`.
    ///
    /// `LENGTHS` is a single length (`3`), a half-open range (`2..5`) or an
    /// inclusive range (`2..=4`). `SYMBOLS` is split on `--separator`. Repeat
    /// the flag for more lengths; a later entry for the same length replaces
    /// an earlier one.
    ///
    /// Example: `--alphabet 1..=3=a,b,c --alphabet 4=0,1`
    ///
    /// Environment variable: `WORDMILL_ALPHABETS` (entries separated by `;`)
    #[arg(
        long = "alphabet",
        value_name = "LENGTHS=SYMBOLS",
        env = "WORDMILL_ALPHABETS",
        value_delimiter = ';',
        required = true
    )]
    pub alphabets: Vec<String>,

    /// Separator between symbols of an alphabet. An empty separator makes
    /// every character its own symbol.
    ///
    /// Environment variable: `WORDMILL_SEPARATOR`
    #[arg(long, env = "WORDMILL_SEPARATOR", default_value_t = String::from(","))]
    pub separator: String,

    /// Number of independent output queues.
    ///
    /// Environment variable: `WORDMILL_QUEUES`
    #[arg(long, env = "WORDMILL_QUEUES", default_value_t = 1)]
    pub queues: usize,

    /// Producer threads feeding each queue; `0` derives it from the number of
    /// logical CPUs.
    ///
    /// Environment variable: `WORDMILL_THREADS_PER_QUEUE`
    #[arg(long, env = "WORDMILL_THREADS_PER_QUEUE", default_value_t = 0)]
    pub threads_per_queue: usize,

    /// Words each queue buffers before its producers block.
    ///
    /// Environment variable: `WORDMILL_QUEUE_CAPACITY`
    #[arg(long, env = "WORDMILL_QUEUE_CAPACITY", default_value_t = DEFAULT_QUEUE_CAPACITY)]
    pub queue_capacity: usize,

    /// Drain every word but only print the total count.
    #[arg(long, default_value_t = false)]
    pub count_only: bool,

    /// Print the validated schedule as JSON and exit without producing.
    #[arg(long, default_value_t = false, conflicts_with = "count_only")]
    pub plan: bool,
}

/// What to do with the produced words.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// One word per line on stdout.
    Words,
    CountOnly,
    Plan,
}

#[derive(Debug, Clone)]
pub struct RunConfig {
    pub producer: ProducerConfig,
    pub mode: OutputMode,
}

impl TryFrom<CliArgs> for RunConfig {
    type Error = anyhow::Error;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        if args.queues == 0 {
            bail!("WORDMILL_QUEUES must be greater than 0");
        }
        if args.queue_capacity == 0 {
            bail!("WORDMILL_QUEUE_CAPACITY must be greater than 0");
        }

        let threads = match args.threads_per_queue {
            0 => ThreadsPerQueue::Auto,
            n => ThreadsPerQueue::Fixed(n),
        };
        let mut builder = ProducerConfig::builder()
            .number_of_queues(args.queues)
            .threads(threads)
            .queue_capacity(args.queue_capacity);

        for entry in args.alphabets.iter().filter(|e| !e.trim().is_empty()) {
            let (lengths, alphabet) = parse_alphabet(entry, &args.separator)
                .with_context(|| format!("invalid alphabet entry {entry:?}"))?;
            builder = builder.put_symbols_to_range(*lengths.start(), *lengths.end(), alphabet);
        }

        let mode = if args.plan {
            OutputMode::Plan
        } else if args.count_only {
            OutputMode::CountOnly
        } else {
            OutputMode::Words
        };

        Ok(Self {
            producer: builder.build()?,
            mode,
        })
    }
}

/// Parses `LENGTHS=SYMBOLS`. The `=` of an inclusive range (`..=`) belongs
/// to `LENGTHS`.
fn parse_alphabet(
    entry: &str,
    separator: &str,
) -> anyhow::Result<(RangeInclusive<usize>, Alphabet)> {
    let Some(split) = entry
        .match_indices('=')
        .map(|(i, _)| i)
        .find(|i| !entry[..*i].ends_with(".."))
    else {
        bail!("expected LENGTHS=SYMBOLS");
    };
    let lengths = parse_lengths(entry[..split].trim())?;
    let symbols = &entry[split + 1..];

    let symbols: Vec<String> = if separator.is_empty() {
        symbols.chars().map(String::from).collect()
    } else {
        symbols.split(separator).map(String::from).collect()
    };
    if symbols.iter().any(String::is_empty) {
        bail!("symbols must not be empty");
    }

    Ok((lengths, Alphabet::from(symbols)))
}

/// Parses `n`, `a..b` or `a..=b`.
fn parse_lengths(text: &str) -> anyhow::Result<RangeInclusive<usize>> {
    let parse = |s: &str| {
        s.trim()
            .parse::<usize>()
            .with_context(|| format!("invalid length {s:?}"))
    };

    if let Some((start, end)) = text.split_once("..=") {
        return Ok(parse(start)?..=parse(end)?);
    }
    if let Some((start, end)) = text.split_once("..") {
        let (start, end) = (parse(start)?, parse(end)?);
        if end <= start {
            bail!("length range {start}..{end} is empty");
        }
        return Ok(start..=end - 1);
    }
    let length = parse(text)?;
    Ok(length..=length)
}
