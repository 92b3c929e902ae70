pub mod remind_club_owners;
pub mod warn_club_owners;
