mod admission;
mod club;
mod dispatch;
mod event;
mod member;
mod pass;
mod registration;
mod reminder;
mod shared;

pub use admission::{
    capacity_warnings, check_subscription, missing_channels, AdmissionPolicy, CapacityWarning,
    ChannelMembership, DenialReason,
};
pub use club::ClubOwner;
pub use dispatch::{
    group_by_event, DispatchProfile, EventPasses, PassDigest, PassExportRow, RenderedDigest,
    PASS_EXPORT_COLUMNS,
};
pub use event::Event;
pub use member::{Member, MembershipStatus};
pub use pass::{Pass, PassStatus, PassType, Requester, RequesterKind};
pub use registration::{Registration, RegistrationInsert};
pub use reminder::{
    default_reminder_bands, due_reminders, NotificationRecord, ReminderBand, ReminderKind,
};
pub use shared::entity::{Entity, InvalidIDError, ID};
pub use shared::role::{parse_role_list, Role};
