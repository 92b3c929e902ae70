pub mod send_event_reminders;
