//! Platter CLI
//!
//! Quotes a fixture cart the way the storefront checkout would.

use std::{
    io::{self, Write},
    path::PathBuf,
    process::ExitCode,
};

use clap::{Args, Parser, Subcommand};
use jiff::{Timestamp, Zoned, civil::Time};
use platter::{
    checkout::CheckoutBuilder,
    config::StorefrontConfig,
    content::Locale,
    fixtures::Fixture,
    fulfilment::Fulfilment,
    observability::{LoggingConfig, init_subscriber},
    receipt::Receipt,
};
use tracing::debug;

#[derive(Debug, Parser)]
#[command(name = "platter", about = "Storefront cart pricing", long_about = None)]
struct Cli {
    /// Storefront configuration file (YAML)
    #[arg(long, env = "PLATTER_CONFIG", global = true)]
    config: Option<PathBuf>,

    #[command(flatten)]
    logging: LoggingConfig,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Value a fixture cart and build its checkout request
    Quote(QuoteArgs),

    /// Show which fulfilment modes are offered at a time of day
    Hours(HoursArgs),
}

#[derive(Debug, Args)]
struct QuoteArgs {
    /// Fixture set name
    #[arg(short, long, default_value = "lunch")]
    set: String,

    /// Fixture base directory
    #[arg(long, env = "PLATTER_FIXTURES", default_value = "./fixtures")]
    fixtures: PathBuf,

    /// Voucher code to apply
    #[arg(short, long)]
    voucher: Option<String>,

    /// Pickup or delivery
    #[arg(short, long, value_enum, default_value_t = Fulfilment::Pickup)]
    fulfilment: Fulfilment,

    /// Store-local time of ordering (HH:MM:SS); defaults to now
    #[arg(long)]
    at: Option<Time>,

    /// Display locale; defaults to the configured locale
    #[arg(long, value_enum)]
    locale: Option<Locale>,

    /// Customer placing the order
    #[arg(long, default_value = "guest")]
    customer: String,

    /// Delivery address
    #[arg(long, requires = "phone")]
    address: Option<String>,

    /// Delivery phone
    #[arg(long, requires = "address")]
    phone: Option<String>,

    /// Order note
    #[arg(long)]
    note: Option<String>,
}

#[derive(Debug, Args)]
struct HoursArgs {
    /// Store-local time (HH:MM:SS); defaults to now
    #[arg(long)]
    at: Option<Time>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(error) = init_subscriber(&cli.logging) {
        eprintln!("{error}");
        return ExitCode::FAILURE;
    }

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("{error}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), String> {
    let config = match &cli.config {
        Some(path) => StorefrontConfig::load(path)
            .map_err(|error| format!("failed to load {}: {error}", path.display()))?,
        None => StorefrontConfig::default(),
    };

    match cli.command {
        Commands::Quote(args) => quote(&config, args),
        Commands::Hours(args) => hours(&config, &args),
    }
}

fn quote(config: &StorefrontConfig, args: QuoteArgs) -> Result<(), String> {
    let policy = config.shipping_policy().map_err(|error| error.to_string())?;

    let fixture = Fixture::from_set_in(&args.fixtures, &args.set)
        .map_err(|error| format!("failed to load fixture set {}: {error}", args.set))?;

    let cart = fixture.cart().map_err(|error| error.to_string())?;
    let valuation = cart.value(&policy).map_err(|error| error.to_string())?;

    debug!(
        lines = cart.len(),
        total = %valuation.total_price(),
        "valued fixture cart"
    );

    let voucher = args
        .voucher
        .as_deref()
        .map(|code| fixture.voucher(code))
        .transpose()
        .map_err(|error| error.to_string())?;

    let mut builder = CheckoutBuilder::new(&valuation, args.customer).fulfilment(args.fulfilment);

    if let Some(voucher) = voucher {
        builder = builder.voucher(voucher);
    }

    if let (Some(address), Some(phone)) = (args.address, args.phone) {
        builder = builder.deliver_to(address, phone);
    }

    if let Some(note) = args.note {
        builder = builder.note(note);
    }

    let checkout = builder
        .build(&config.hours, &policy, Timestamp::now(), local_time(args.at))
        .map_err(|error| format!("checkout rejected: {error}"))?;

    let mut receipt = Receipt::new(
        &valuation,
        checkout.summary,
        args.locale.unwrap_or(config.locale),
    );

    if let Some(voucher) = voucher {
        receipt = receipt.with_voucher(format!("{} {}", voucher.code(), voucher.describe()));
    }

    let request =
        serde_json::to_string_pretty(&checkout.request).map_err(|error| error.to_string())?;

    let mut out = io::stdout().lock();

    receipt
        .write_to(&mut out)
        .map_err(|error| error.to_string())?;

    writeln!(out, "{request}").map_err(|error| error.to_string())
}

fn hours(config: &StorefrontConfig, args: &HoursArgs) -> Result<(), String> {
    let policy = config.shipping_policy().map_err(|error| error.to_string())?;
    let at = local_time(args.at);
    let options = config.hours.options_at(at, &policy);

    let mut out = io::stdout().lock();

    for (label, option) in [("pickup", options.pickup), ("delivery", options.delivery)] {
        let state = if option.available { "open" } else { "closed" };

        writeln!(out, "{label:<8} {state:<6} {}", option.notice)
            .map_err(|error| error.to_string())?;
    }

    Ok(())
}

fn local_time(at: Option<Time>) -> Time {
    at.unwrap_or_else(|| Zoned::now().time())
}

#[cfg(test)]
mod tests {
    use clap::{CommandFactory, error::ErrorKind};
    use testresult::TestResult;

    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn address_without_phone_is_rejected() {
        let result = Cli::try_parse_from(["platter", "quote", "--address", "12 Hàng Bạc"]);

        assert!(
            matches!(&result, Err(error) if error.kind() == ErrorKind::MissingRequiredArgument),
            "expected --phone to be required, got {result:?}"
        );
    }

    #[test]
    fn phone_without_address_is_rejected() {
        let result = Cli::try_parse_from(["platter", "quote", "--phone", "0901234567"]);

        assert!(
            matches!(&result, Err(error) if error.kind() == ErrorKind::MissingRequiredArgument),
            "expected --address to be required, got {result:?}"
        );
    }

    #[test]
    fn delivery_details_parse_together() -> TestResult {
        let cli = Cli::try_parse_from([
            "platter",
            "quote",
            "--fulfilment",
            "delivery",
            "--address",
            "12 Hàng Bạc",
            "--phone",
            "0901234567",
        ])?;

        let Commands::Quote(args) = cli.command else {
            return Err(std::io::Error::other("expected the quote command").into());
        };

        assert_eq!(args.address.as_deref(), Some("12 Hàng Bạc"));
        assert_eq!(args.phone.as_deref(), Some("0901234567"));
        assert_eq!(args.fulfilment, Fulfilment::Delivery);

        Ok(())
    }
}
