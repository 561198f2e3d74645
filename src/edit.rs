//! The borrowed bundle tool and selection code mutate the document through.

use tracing::{debug, error, warn};

use crate::canvas::CanvasState;
use crate::components::colors::{ColourState, Swatch};
use crate::components::history::{Command, CommandLog};
use crate::config::EngineConfig;
use crate::error::CoreError;
use crate::geometry::PixelRect;
use crate::project::Notification;

pub struct EditContext<'a> {
    pub canvas: &'a mut CanvasState,
    pub log: &'a mut CommandLog,
    pub colours: &'a mut ColourState,
    pub swatch: &'a Swatch,
    pub config: &'a EngineConfig,
    pub notifications: &'a mut Vec<Notification>,
}

impl EditContext<'_> {
    /// Push `command` onto the log (which executes it). Returns the selection
    /// area the command asks to restore.
    pub fn commit(&mut self, command: Command) -> Option<PixelRect> {
        debug!(command = %command.description(), "commit");
        let modifies = command.modifies_contents();
        let selection = self.log.push(command, self.canvas);
        if modifies && !self.log.is_composing() {
            self.emit(Notification::ContentsModified);
        }
        selection
    }

    pub fn emit(&mut self, notification: Notification) {
        self.notifications.push(notification);
    }

    /// Route an error: user-facing ones become a notification, the rest are
    /// sequencing problems that only get logged.
    pub fn report(&mut self, err: CoreError) {
        route_error(self.notifications, err);
    }
}

/// Log `err`, queueing an `ErrorOccurred` notification when the user should see it.
pub fn route_error(notifications: &mut Vec<Notification>, err: CoreError) {
    if err.is_user_facing() {
        error!(%err, "operation failed");
        notifications.push(Notification::ErrorOccurred(err.to_string()));
    } else {
        warn!(%err, "ignored");
    }
}
