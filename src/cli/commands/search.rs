use anyhow::Context;

use crate::clients::ontopo::{OntopoClient, OntopoConfig};
use crate::config::Config;
use crate::constants::limits;
use crate::models::SearchCriteria;
use crate::services::{BookingCalendar, LoadMore, SearchSession};

pub async fn cmd_search(
    config: &Config,
    size: u32,
    date: Option<String>,
    time: Option<String>,
    pages: u32,
) -> anyhow::Result<()> {
    let calendar = BookingCalendar::from_config(&config.schedule)?;
    let date = date.unwrap_or_else(|| calendar.today_or_next_day());
    let available = calendar.available_time_slots(&date);

    let time = match time {
        Some(time) => {
            if !available.iter().any(|slot| slot.value == time) {
                println!("Note: {time} is not among the bookable times on {date}");
            }
            time
        }
        None => available
            .first()
            .map(|slot| slot.value.clone())
            .with_context(|| format!("No bookable times left on {date}"))?,
    };

    let client = OntopoClient::new(OntopoConfig::from(&config.api))
        .context("Failed to build HTTP client")?;
    let session = SearchSession::new(client);
    let criteria = SearchCriteria::new(size, date, time);

    println!(
        "Searching tables for {} on {} at {}...",
        criteria.size, criteria.date, criteria.time
    );

    session
        .initialize_search(&criteria)
        .await
        .context("Search failed")?;

    for _ in 1..pages.clamp(1, limits::MAX_SEARCH_PAGES) {
        if !session.has_more() {
            break;
        }
        if session.load_more().await.context("Loading more results failed")? == LoadMore::Skipped {
            break;
        }
    }

    let restaurants = session.restaurants();

    if restaurants.is_empty() {
        println!("No restaurants with free tables found");
        return Ok(());
    }

    println!();
    println!("Restaurants ({} of {}):", restaurants.len(), session.total());
    println!("{:-<60}", "");

    for restaurant in &restaurants {
        println!(
            "• {} ({}) - {} times",
            restaurant.venue_name(),
            restaurant.venue_slug(),
            restaurant.offered_times().len()
        );
        for area in restaurant.availability_areas() {
            let times = area
                .options
                .iter()
                .map(|o| o.time.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            if times.is_empty() {
                println!("  {}: no times", area.name);
            } else {
                println!("  {}: {times}", area.name);
            }
        }
    }

    if session.has_more() {
        println!();
        println!("More results available: rerun with --pages {}", pages + 1);
    }

    Ok(())
}
