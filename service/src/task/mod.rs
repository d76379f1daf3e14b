//! Background [`Task`]s definitions.

mod background;
pub mod finish_elapsed_slots;
pub mod notify_waste_money;

pub use common::Handler as Task;

pub use self::{
    background::Background, finish_elapsed_slots::FinishElapsedSlots,
    notify_waste_money::NotifyWasteMoney,
};
