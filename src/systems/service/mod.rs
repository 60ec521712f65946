//! 接客まわりの外部協力者: 注文ダイアログ・採点・来店サイクル

pub mod dialogue;
pub mod scoring;
pub mod visit;

pub use dialogue::{OrderDialogues, order_dialogue_system};
pub use scoring::{OrderScoring, SeededOrderScorer};
pub use visit::{GuestVisit, guest_visit_system};
