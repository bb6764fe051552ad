mod logging;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, ValueEnum};
use timestring::{parse_range, set_default_timezone, ParseOptions, WeekStartDay, WeekWindow};

#[derive(Parser)]
#[command(
    name = "timestring",
    version,
    about = "Resolve a natural-language time expression to a [start, end) range"
)]
struct Cli {
    /// The expression, e.g. "next 2 months" or "from 2 PM to 4PM"
    #[arg(required = true)]
    text: Vec<String>,

    /// IANA timezone to resolve in (default: $TZ, else the system zone, else UTC)
    #[arg(long, value_name = "ZONE")]
    tz: Option<String>,

    /// Reference instant instead of the system clock (RFC 3339)
    #[arg(long, value_name = "RFC3339")]
    now: Option<String>,

    /// Convention for "this/next/last week"
    #[arg(long, value_enum, default_value_t = WeekArg::Rolling)]
    week: WeekArg,

    /// Print the range as JSON
    #[arg(long)]
    json: bool,

    /// Log each parse step to stderr
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum WeekArg {
    /// Seven days starting now
    Rolling,
    /// Calendar week starting Monday
    Monday,
    /// Calendar week starting Sunday
    Sunday,
}

impl From<WeekArg> for WeekWindow {
    fn from(arg: WeekArg) -> Self {
        match arg {
            WeekArg::Rolling => WeekWindow::Rolling,
            WeekArg::Monday => WeekWindow::Calendar(WeekStartDay::Monday),
            WeekArg::Sunday => WeekWindow::Calendar(WeekStartDay::Sunday),
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);

    if let Some(tz) = &cli.tz {
        set_default_timezone(tz).with_context(|| format!("Failed to use --tz {tz}"))?;
    }

    let mut options = ParseOptions::new()
        .with_week_window(cli.week.into())
        .with_verbose(cli.verbose);
    if let Some(now) = &cli.now {
        let now: DateTime<Utc> = DateTime::parse_from_rfc3339(now)
            .with_context(|| format!("Failed to parse --now '{now}' as RFC 3339"))?
            .with_timezone(&Utc);
        options = options.with_now(now);
    }

    let text = cli.text.join(" ");
    let range = parse_range(&text, &options)
        .with_context(|| format!("Failed to resolve '{text}'"))?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&range.summary())?);
    } else {
        println!("{range}");
    }
    Ok(())
}
