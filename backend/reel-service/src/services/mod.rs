pub mod engagement;
pub mod membership;

pub use engagement::EngagementService;
pub use membership::MembershipResolver;
