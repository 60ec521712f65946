//! 座席まわり: 座席台帳・テーブル予約・空席検索・待機列

mod availability;
mod seat_registry;
mod table;
mod waiting_line;

pub use availability::TableAvailabilityIndex;
pub use seat_registry::{SeatClaim, SeatFacing};
pub use table::{SeatingError, Table};
pub use waiting_line::{LineDirection, SlotShift, WaitingLine};
