pub mod search;
pub mod slot;

pub use search::{
    Area, AreaOption, RestaurantResult, SearchCriteria, SearchPage, SearchToken, Session,
};
pub use slot::TimeSlot;
