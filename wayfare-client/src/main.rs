use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use wayfare_client::{telemetry, AppState};
use wayfare_core::{SearchForm, TripType};
use wayfare_offer::rank_for_display;

const USAGE: &str = "usage: wayfare-client <from> <to> <YYYY-MM-DD> [return YYYY-MM-DD]";

#[tokio::main]
async fn main() -> Result<()> {
    telemetry::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.len() < 3 {
        bail!(USAGE);
    }

    let config = wayfare_store::Config::load().context("Failed to load config")?;
    if config.aggregator.api_key.is_empty() {
        tracing::warn!("No aggregator API key configured; set WAYFARE__AGGREGATOR__API_KEY");
    }

    let app = AppState::from_config(&config).context("Failed to build HTTP client")?;
    app.hydrate().await;

    let origin = app.airports.search(&args[0]).await.map_err(|e| anyhow::anyhow!(e.user_message()))?;
    let destination = app.airports.search(&args[1]).await.map_err(|e| anyhow::anyhow!(e.user_message()))?;
    let departure_date = parse_date(&args[2])?;
    let return_date = args.get(3).map(|d| parse_date(d)).transpose()?;

    let form = SearchForm {
        trip_type: if return_date.is_some() { TripType::RoundTrip } else { TripType::OneWay },
        origin: origin.into_iter().next(),
        destination: destination.into_iter().next(),
        departure_date: Some(departure_date),
        return_date,
        ..Default::default()
    };

    let result = match app.flights.search(&form).await {
        Ok(result) => result,
        Err(e) => bail!(e.user_message()),
    };

    tracing::info!(
        "{} offers, {:.2}-{:.2} {}",
        result.filter_stats.total_results,
        result.filter_stats.min_price,
        result.filter_stats.max_price,
        result.query.currency
    );

    for offer in rank_for_display(&result.offers) {
        let airlines: Vec<&str> = offer.segments().map(|s| s.airline.name.as_str()).collect();
        println!(
            "{:>12}  {:>4} min  {} stop(s)  {}{}",
            offer.price.formatted,
            offer.outbound.total_duration,
            offer.outbound.stops,
            airlines.join(" / "),
            if offer.is_best_value { "  [best value]" } else { "" }
        );
    }

    Ok(())
}

fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").with_context(|| format!("Invalid date '{}'", value))
}
