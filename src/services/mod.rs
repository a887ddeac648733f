pub mod booking_service;
pub use booking_service::{BookingGateway, GatewayError};

pub mod search_session;
pub use search_session::{LoadMore, SearchSession, SearchState};

pub mod time_slots;
pub use time_slots::{
    BookingCalendar, BusinessHours, Clock, FixedClock, SelectedDate, SystemClock, TimeOptions,
    generate_time_slots,
};
