use bevy::prelude::*;

use crate::events::{
    GuestDepartedEvent, GuestSeatedEvent, GuestStateChangedEvent, OrderInteractionFinished,
    OrderInteractionStarted, TaskAssignmentRejected, TaskAssignmentRequest, TaskCompletedEvent,
};

pub struct MessagesPlugin;

impl Plugin for MessagesPlugin {
    fn build(&self, app: &mut App) {
        app.add_message::<GuestSeatedEvent>()
            .add_message::<GuestStateChangedEvent>()
            .add_message::<GuestDepartedEvent>()
            .add_message::<OrderInteractionStarted>()
            .add_message::<OrderInteractionFinished>()
            .add_message::<TaskAssignmentRequest>()
            .add_message::<TaskAssignmentRejected>()
            .add_message::<TaskCompletedEvent>();
    }
}
