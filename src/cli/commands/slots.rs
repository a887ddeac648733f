use crate::config::Config;
use crate::services::BookingCalendar;

pub fn cmd_slots(config: &Config, date: Option<String>) -> anyhow::Result<()> {
    let calendar = BookingCalendar::from_config(&config.schedule)?;
    let date = date.unwrap_or_else(|| calendar.today_or_next_day());

    let slots = calendar.available_time_slots(&date);

    if slots.is_empty() {
        println!("No bookable times left on {date}");
        return Ok(());
    }

    println!("Bookable times on {date}:");
    println!("{:-<60}", "");

    for row in slots.chunks(8) {
        let line = row
            .iter()
            .map(|slot| format!("{:>6}", slot.label))
            .collect::<String>();
        println!("{line}");
    }

    println!();
    println!("{} slots", slots.len());

    Ok(())
}

pub fn cmd_today(config: &Config) -> anyhow::Result<()> {
    let calendar = BookingCalendar::from_config(&config.schedule)?;
    let now = calendar.current_time();
    let today = calendar.today();
    let default_date = calendar.today_or_next_day();
    let open_today = !calendar.available_time_slots(&today).is_empty();

    println!("Local time:   {} ({})", now.format("%Y-%m-%d %H:%M"), calendar.timezone());
    println!("Default date: {default_date}");
    println!(
        "Booking for today: {}",
        if open_today { "open" } else { "closed" }
    );

    Ok(())
}
